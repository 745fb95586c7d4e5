//! HTML table extraction.
//!
//! Header row: the first `thead` row, else the first row made only of `th`
//! cells. Without one, columns are named `0, 1, …`. Every other row with
//! at least one `td` is data; a leading `th` row label stays in place as
//! its first cell. Cell text is
//! whitespace-collapsed; data rows are padded or truncated to the header
//! width.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use katilim_recon::Table;

use super::SourceError;

// Static selectors; `Selector::parse` only fails on malformed input.
static TABLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static THEAD_ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("thead tr").unwrap());
static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("th, td").unwrap());
static TH_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("th").unwrap());
static TD_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());

/// Extract table `position` from `body`, optionally searching only inside
/// elements matching `container`.
pub fn extract_table(body: &str, position: usize, container: Option<&str>) -> Result<Table, SourceError> {
    let document = Html::parse_document(body);
    let tables = find_tables(&document, container)?;
    let found = tables.len();
    let table = tables
        .into_iter()
        .nth(position)
        .ok_or(SourceError::TableNotFound { position, found })?;
    Ok(to_table(table))
}

/// `td` cell texts of every row in the first table inside `container`.
/// Rows without `td` cells (header rows) are left out.
pub fn data_rows(body: &str, container: &str) -> Result<Vec<Vec<String>>, SourceError> {
    let document = Html::parse_document(body);
    let tables = find_tables(&document, Some(container))?;
    let table = tables
        .into_iter()
        .next()
        .ok_or(SourceError::TableNotFound { position: 0, found: 0 })?;

    Ok(table
        .select(&ROW_SELECTOR)
        .map(|row| row.select(&TD_SELECTOR).map(cell_text).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect())
}

fn find_tables<'a>(document: &'a Html, container: Option<&str>) -> Result<Vec<ElementRef<'a>>, SourceError> {
    match container {
        None => Ok(document.select(&TABLE_SELECTOR).collect()),
        Some(css) => {
            let selector =
                Selector::parse(css).map_err(|e| SourceError::Selector(format!("'{css}': {e}")))?;
            Ok(document
                .select(&selector)
                .flat_map(|c| c.select(&TABLE_SELECTOR))
                .collect())
        }
    }
}

fn to_table(table: ElementRef<'_>) -> Table {
    let rows: Vec<ElementRef<'_>> = table.select(&ROW_SELECTOR).collect();

    let header = table
        .select(&THEAD_ROW_SELECTOR)
        .next()
        .or_else(|| rows.iter().copied().find(|r| is_header_only(*r)));

    let body: Vec<Vec<String>> = rows
        .iter()
        .filter(|r| header.map_or(true, |h| h.id() != r.id()))
        .filter(|r| r.select(&TD_SELECTOR).next().is_some())
        .map(|r| r.select(&CELL_SELECTOR).map(cell_text).collect())
        .collect();

    let columns: Vec<String> = match header {
        Some(h) => h.select(&CELL_SELECTOR).map(cell_text).collect(),
        None => {
            let width = body.iter().map(Vec::len).max().unwrap_or(0);
            (0..width).map(|i| i.to_string()).collect()
        }
    };

    let width = columns.len();
    let mut out = Table::new(columns);
    for mut row in body {
        row.resize(width, String::new());
        out.rows.push(row);
    }
    out
}

fn is_header_only(row: ElementRef<'_>) -> bool {
    row.select(&TH_SELECTOR).next().is_some() && row.select(&TD_SELECTOR).next().is_none()
}

fn cell_text(cell: ElementRef<'_>) -> String {
    let raw = cell.text().collect::<String>();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
<table id="nav"><tr><td>menu</td></tr></table>
<div class="content">
  <table>
    <thead><tr><th>Kod</th><th>Hisse Adı</th><th>Sektör</th></tr></thead>
    <tbody>
      <tr><td><a href="/a">AKBNK</a>  Akbank</td><td>Akbank T.A.Ş.</td><td>Banka</td></tr>
      <tr><td>ŞOK</td><td>Şok Marketler</td></tr>
      <tr><td>THYAO</td><td>Türk Hava Yolları</td><td>Ulaştırma</td><td>extra</td></tr>
    </tbody>
  </table>
</div>
</body></html>"#;

    #[test]
    fn position_counts_every_table() {
        let t = extract_table(PAGE, 1, None).unwrap();
        assert_eq!(t.columns, vec!["Kod", "Hisse Adı", "Sektör"]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.rows[0][0], "AKBNK Akbank");
    }

    #[test]
    fn rows_padded_and_truncated() {
        let t = extract_table(PAGE, 1, None).unwrap();
        assert_eq!(t.rows[1], vec!["ŞOK", "Şok Marketler", ""]);
        assert_eq!(t.rows[2], vec!["THYAO", "Türk Hava Yolları", "Ulaştırma"]);
    }

    #[test]
    fn container_narrows_search() {
        let t = extract_table(PAGE, 0, Some("div.content")).unwrap();
        assert_eq!(t.columns[0], "Kod");
    }

    #[test]
    fn missing_position_reports_count() {
        let err = extract_table(PAGE, 2, None).unwrap_err();
        assert_eq!(err, SourceError::TableNotFound { position: 2, found: 2 });
    }

    #[test]
    fn headerless_table_gets_numeric_columns() {
        let page = "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></table>";
        let t = extract_table(page, 0, None).unwrap();
        assert_eq!(t.columns, vec!["0", "1"]);
        assert_eq!(t.rows, vec![vec!["a", "b"], vec!["c", ""]]);
    }

    #[test]
    fn header_row_without_thead() {
        let page = "<table><tr><th>Hisseler</th><th>Son</th></tr>\
                    <tr><td>GARAN Garanti</td><td>100</td></tr></table>";
        let t = extract_table(page, 0, None).unwrap();
        assert_eq!(t.columns, vec!["Hisseler", "Son"]);
        assert_eq!(t.rows, vec![vec!["GARAN Garanti", "100"]]);
    }

    #[test]
    fn row_header_cells_kept() {
        let page = "<table><tr><th>Kod</th><th>Son</th></tr>\
                    <tr><th>AKBNK</th><td>52</td></tr>\
                    <tr><td>GARAN</td><td>100</td></tr></table>";
        let t = extract_table(page, 0, None).unwrap();
        assert_eq!(t.columns, vec!["Kod", "Son"]);
        assert_eq!(t.rows, vec![vec!["AKBNK", "52"], vec!["GARAN", "100"]]);
    }

    #[test]
    fn bad_container_selector() {
        assert!(matches!(extract_table(PAGE, 0, Some("div[")), Err(SourceError::Selector(_))));
    }

    #[test]
    fn data_rows_skip_header() {
        let page = r#"<div class="portlet box green"><table>
            <tr><th>Sembol</th></tr>
            <tr><td>AKBNK</td><td>1</td></tr>
        </table></div>"#;
        let rows = data_rows(page, "div.portlet.box.green").unwrap();
        assert_eq!(rows, vec![vec!["AKBNK", "1"]]);
    }

    #[test]
    fn data_rows_without_container_match() {
        let err = data_rows("<table></table>", "div.portlet").unwrap_err();
        assert_eq!(err, SourceError::TableNotFound { position: 0, found: 0 });
    }
}
