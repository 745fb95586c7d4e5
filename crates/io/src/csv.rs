// CSV read/write for persisted tables

use std::io::Read;
use std::path::Path;

use katilim_recon::Table;

use crate::UTF8_BOM;

/// Delimiters a seed may use. Comma is last so it wins ties.
const DELIMITERS: [u8; 4] = [b'|', b'\t', b';', b','];

/// Pick the delimiter of a CSV document from its header and the rows after it.
///
/// Seeds hand-edited in a Turkish-locale spreadsheet come back semicolon-separated,
/// so the metadata store cannot assume commas. A delimiter qualifies when it
/// splits the header; among those, one whose sampled rows all agree with the
/// header width beats one that doesn't, then the wider header wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let mut lines = content.lines().filter(|l| !l.trim().is_empty());
    let Some(header) = lines.next() else {
        return b',';
    };
    let rows: Vec<&str> = lines.take(5).collect();

    DELIMITERS
        .iter()
        .filter_map(|&delim| {
            let width = field_count(header, delim);
            if width < 2 {
                return None;
            }
            let agrees = rows.iter().all(|row| field_count(row, delim) == width);
            Some((delim, (agrees, width)))
        })
        .max_by_key(|&(_, score)| score)
        .map_or(b',', |(delim, _)| delim)
}

fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .map_or(0, |record| record.len())
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252 exports).
/// A leading BOM is stripped.
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

/// Parse CSV text with a header row into a table.
pub fn parse_table(content: &str, delimiter: u8) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut table = Table::new(columns);
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        table.push_row(record.iter());
    }
    Ok(table)
}

/// Read and parse a CSV file, sniffing the delimiter.
pub fn read_table(path: &Path) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    parse_table(&content, sniff_delimiter(&content))
}

/// Serialize a table as comma-separated text, `\n` line endings.
pub fn to_csv_string(table: &Table, bom: bool) -> Result<String, String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&table.columns).map_err(|e| e.to_string())?;
    for row in &table.rows {
        writer.write_record(row).map_err(|e| e.to_string())?;
    }

    let bytes = writer.into_inner().map_err(|e| e.to_string())?;
    let body = String::from_utf8(bytes).map_err(|e| e.to_string())?;
    Ok(if bom { format!("{UTF8_BOM}{body}") } else { body })
}
