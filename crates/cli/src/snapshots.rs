//! Index snapshot refresher.
//!
//! Pulls the quote table of each configured index page (BIST 30/50/100 by
//! default) and keeps a CSV per index, rewritten only when the quotes move.

use std::thread;
use std::time::Duration;

use katilim_config::settings::SnapshotSource;
use katilim_config::Settings;
use katilim_io::{persist, Artifact};
use katilim_recon::{RunContext, Table};
use serde::Serialize;

use crate::fetch::{html, SourceError, TableSource};
use crate::report::{ArtifactReport, SnapshotReport};

pub const SNAPSHOT_COLUMNS: [&str; 10] = [
    "symbol",
    "name",
    "last",
    "high",
    "low",
    "volume",
    "daily_change",
    "weekly_change",
    "monthly_change",
    "annual_change",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSnapshotRow {
    pub symbol: String,
    pub name: String,
    pub last: String,
    pub high: String,
    pub low: String,
    pub volume: String,
    pub daily_change: String,
    pub weekly_change: String,
    pub monthly_change: String,
    pub annual_change: String,
}

impl IndexSnapshotRow {
    /// First ten cells; `None` for shorter rows.
    pub fn from_cells(cells: &[String]) -> Option<Self> {
        let [symbol, name, last, high, low, volume, daily, weekly, monthly, annual] =
            cells.get(..SNAPSHOT_COLUMNS.len())?
        else {
            return None;
        };
        Some(Self {
            symbol: symbol.clone(),
            name: name.clone(),
            last: last.clone(),
            high: high.clone(),
            low: low.clone(),
            volume: volume.clone(),
            daily_change: daily.clone(),
            weekly_change: weekly.clone(),
            monthly_change: monthly.clone(),
            annual_change: annual.clone(),
        })
    }

    fn cells(&self) -> [&str; 10] {
        [
            self.symbol.as_str(),
            self.name.as_str(),
            self.last.as_str(),
            self.high.as_str(),
            self.low.as_str(),
            self.volume.as_str(),
            self.daily_change.as_str(),
            self.weekly_change.as_str(),
            self.monthly_change.as_str(),
            self.annual_change.as_str(),
        ]
    }
}

pub fn snapshot_table(rows: &[IndexSnapshotRow]) -> Table {
    let mut table = Table::new(SNAPSHOT_COLUMNS);
    for row in rows {
        table.push_row(row.cells());
    }
    table
}

/// Fetch one index page and map its quote rows.
pub fn fetch_snapshot(
    ctx: &mut RunContext<'_>,
    source: &dyn TableSource,
    snapshot: &SnapshotSource,
) -> Result<Vec<IndexSnapshotRow>, SourceError> {
    let body = source.fetch_page(ctx, &snapshot.url)?;
    let rows: Vec<IndexSnapshotRow> = html::data_rows(&body, &snapshot.container)?
        .iter()
        .filter_map(|cells| IndexSnapshotRow::from_cells(cells))
        .collect();
    if rows.is_empty() {
        return Err(SourceError::NoDataRows { url: snapshot.url.clone() });
    }
    Ok(rows)
}

/// Refresh every configured snapshot, sequentially. A failing source is
/// logged and skipped.
pub fn refresh_snapshots(
    ctx: &mut RunContext<'_>,
    settings: &Settings,
    source: &dyn TableSource,
) -> Vec<SnapshotReport> {
    let delay = Duration::from_millis(settings.snapshots.delay_ms);
    let mut reports = Vec::with_capacity(settings.snapshots.sources.len());

    for (i, snapshot) in settings.snapshots.sources.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            thread::sleep(delay);
        }

        let rows = match fetch_snapshot(ctx, source, snapshot) {
            Ok(rows) => rows,
            Err(e) => {
                ctx.warn(format!("snapshot {} skipped: {e}", snapshot.url));
                reports.push(SnapshotReport {
                    url: snapshot.url.clone(),
                    rows: None,
                    artifact: None,
                    error: Some(e.to_string()),
                });
                continue;
            }
        };

        let table = snapshot_table(&rows);
        let path = settings.data_path(&snapshot.output);
        let outcome = persist(ctx, Artifact::Csv { table: &table, bom: false }, &path);
        if let Err(e) = &outcome {
            ctx.warn(e.to_string());
        }
        reports.push(SnapshotReport {
            url: snapshot.url.clone(),
            rows: Some(rows.len()),
            artifact: Some(ArtifactReport::from_result(&path, &outcome)),
            error: None,
        });
    }

    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticSource;
    use katilim_recon::{NullSink, RecordingSink};
    use std::fs;
    use tempfile::tempdir;

    fn quote_row(symbol: &str, last: &str) -> String {
        format!(
            "<tr><td>{symbol}</td><td>{symbol} A.Ş.</td><td>{last}</td><td>1</td><td>0,5</td>\
             <td>1.000</td><td>%1</td><td>%2</td><td>%3</td><td>%4</td><td>extra</td></tr>"
        )
    }

    fn page(rows: &[String]) -> String {
        format!(
            "<table><tr><td>elsewhere</td></tr></table>\
             <div class=\"portlet box green\"><table>\
             <tr><th>Sembol</th><th>Ad</th></tr>\
             <tr><td>short</td><td>row</td></tr>{}</table></div>",
            rows.concat()
        )
    }

    fn settings(dir: &std::path::Path, urls: &[&str]) -> Settings {
        let mut s = Settings::default();
        s.data_dir = dir.to_path_buf();
        s.snapshots.delay_ms = 0;
        s.snapshots.sources = urls
            .iter()
            .enumerate()
            .map(|(i, url)| SnapshotSource {
                url: url.to_string(),
                container: "div.portlet.box.green".into(),
                output: format!("snap{i}.csv"),
            })
            .collect();
        s
    }

    #[test]
    fn short_rows_skipped() {
        let cells: Vec<String> = (0..9).map(|i| i.to_string()).collect();
        assert!(IndexSnapshotRow::from_cells(&cells).is_none());
        let cells: Vec<String> = (0..11).map(|i| i.to_string()).collect();
        let row = IndexSnapshotRow::from_cells(&cells).unwrap();
        assert_eq!(row.symbol, "0");
        assert_eq!(row.annual_change, "9");
    }

    #[test]
    fn writes_snapshot_without_bom() {
        let dir = tempdir().unwrap();
        let body = page(&[quote_row("AKBNK", "52,10"), quote_row("THYAO", "301,25")]);
        let source = StaticSource::default().with("http://test/XU030", &body);
        let s = settings(dir.path(), &["http://test/XU030"]);
        let mut sink = NullSink;
        let mut ctx = RunContext::new(&mut sink);

        let reports = refresh_snapshots(&mut ctx, &s, &source);
        assert_eq!(reports[0].rows, Some(2));
        let csv = fs::read_to_string(dir.path().join("snap0.csv")).unwrap();
        assert!(csv.starts_with("symbol,name,last,"));
        assert!(csv.contains("AKBNK,AKBNK A.Ş.,\"52,10\",1,\"0,5\",1.000,%1,%2,%3,%4\n"));
    }

    #[test]
    fn unchanged_quotes_not_rewritten() {
        let dir = tempdir().unwrap();
        let body = page(&[quote_row("AKBNK", "52,10")]);
        let source = StaticSource::default().with("http://test/XU030", &body);
        let s = settings(dir.path(), &["http://test/XU030"]);
        let mut sink = NullSink;
        let mut ctx = RunContext::new(&mut sink);

        refresh_snapshots(&mut ctx, &s, &source);
        let second = refresh_snapshots(&mut ctx, &s, &source);
        assert_eq!(second[0].artifact.as_ref().unwrap().outcome, "unchanged");
    }

    #[test]
    fn failing_source_skipped_others_continue() {
        let dir = tempdir().unwrap();
        let empty = page(&[]);
        let good = page(&[quote_row("GARAN", "120")]);
        let source = StaticSource::default()
            .with("http://test/empty", &empty)
            .with("http://test/good", &good);
        let s = settings(dir.path(), &["http://test/missing", "http://test/empty", "http://test/good"]);
        let mut sink = RecordingSink::default();
        let reports = {
            let mut ctx = RunContext::new(&mut sink);
            refresh_snapshots(&mut ctx, &s, &source)
        };

        assert_eq!(reports.len(), 3);
        assert!(reports[0].error.as_ref().unwrap().contains("HTTP 404"));
        assert!(reports[1].error.as_ref().unwrap().contains("no data rows"));
        assert_eq!(reports[2].rows, Some(1));
        assert_eq!(sink.warnings().count(), 2);
        assert!(!dir.path().join("snap1.csv").exists());
        assert!(dir.path().join("snap2.csv").exists());
    }
}
