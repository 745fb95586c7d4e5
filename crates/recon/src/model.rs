use std::collections::HashMap;

use serde::Serialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Ordered column names plus ordered rows of string cells.
///
/// Equality is structural: same columns, same row count, same cells in the
/// same order. Row order matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// What a table source hands to the engine.
pub type ScrapedTable = Table;

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell lookup that tolerates short rows and absent columns.
    pub fn cell(&self, row: usize, col: Option<usize>) -> Option<&str> {
        let col = col?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Stock records
// ---------------------------------------------------------------------------

pub const APPROVED_LABEL: &str = "Katılım Endeksine Uygundur";
pub const NOT_APPROVED_LABEL: &str = "Katılım Endeksine Uygun Değildir";

/// Membership in the restricted (participation) universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Approval {
    #[serde(rename = "Katılım Endeksine Uygundur")]
    Approved,
    #[serde(rename = "Katılım Endeksine Uygun Değildir")]
    NotApproved,
}

impl Approval {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Approved => APPROVED_LABEL,
            Self::NotApproved => NOT_APPROVED_LABEL,
        }
    }
}

impl std::fmt::Display for Approval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Historical metadata carried across runs. Opaque strings, empty when unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StockMetadata {
    pub id: String,
    #[serde(rename = "ipoDate")]
    pub ipo_date: String,
    #[serde(rename = "firstTradeDate")]
    pub first_trade_date: String,
}

/// The canonical reconciled unit. `stock` is the unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockRecord {
    pub stock: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub sector: String,
    pub approval: Approval,
    #[serde(flatten)]
    pub metadata: StockMetadata,
}

// ---------------------------------------------------------------------------
// Historical metadata table
// ---------------------------------------------------------------------------

pub const METADATA_COLUMNS: [&str; 4] = ["stock", "id", "ipoDate", "firstTradeDate"];

/// Previous run's `{stock -> id, ipoDate, firstTradeDate}` lookup.
/// Read-only during a run.
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    entries: HashMap<String, StockMetadata>,
}

impl MetadataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the stock is already known. The first occurrence wins,
    /// matching how a left join followed by first-keep dedup resolves
    /// duplicated history rows.
    pub fn insert(&mut self, stock: impl Into<String>, metadata: StockMetadata) -> bool {
        let stock = stock.into();
        if stock.is_empty() || self.entries.contains_key(&stock) {
            return false;
        }
        self.entries.insert(stock, metadata);
        true
    }

    pub fn get(&self, stock: &str) -> Option<&StockMetadata> {
        self.entries.get(stock)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build from a persisted `stock,id,ipoDate,firstTradeDate` table.
    /// Extra columns are ignored; missing ones are an error.
    pub fn from_table(table: &Table) -> Result<Self, ReconError> {
        let mut idx = [0usize; 4];
        for (slot, name) in idx.iter_mut().zip(METADATA_COLUMNS) {
            *slot = table.column_index(name).ok_or_else(|| ReconError::MissingColumn {
                source: "metadata".into(),
                column: name.into(),
            })?;
        }

        let mut out = Self::new();
        for row in 0..table.len() {
            let get = |i: usize| table.cell(row, Some(idx[i])).unwrap_or("").trim().to_string();
            out.insert(
                get(0),
                StockMetadata {
                    id: get(1),
                    ipo_date: get(2),
                    first_trade_date: get(3),
                },
            );
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: crate::summary::ReconSummary,
    /// Every record, deduplicated, in full-universe scan order.
    pub all: Vec<StockRecord>,
    pub approved: Vec<StockRecord>,
    pub not_approved: Vec<StockRecord>,
    /// Sorted, unique stock codes of the full universe.
    pub stock_index: Vec<String>,
    /// All records that shared a stock key before dedup, sorted by stock.
    pub duplicates: Vec<StockRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta_table() -> Table {
        let mut t = Table::new(["stock", "id", "ipoDate", "firstTradeDate", "extra"]);
        t.push_row(["AKBNK", "123", "1990-01-01", "1990-02-01", "x"]);
        t.push_row(["AKBNK", "999", "2000-01-01", "2000-02-01", "y"]);
        t.push_row(["THYAO", "7", "", "", ""]);
        t
    }

    #[test]
    fn metadata_first_occurrence_wins() {
        let m = MetadataTable::from_table(&meta_table()).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m.get("AKBNK").unwrap().id, "123");
        assert_eq!(m.get("THYAO").unwrap().ipo_date, "");
    }

    #[test]
    fn metadata_missing_column() {
        let t = Table::new(["stock", "id"]);
        let err = MetadataTable::from_table(&t).unwrap_err();
        assert!(err.to_string().contains("ipoDate"));
    }

    #[test]
    fn approval_labels_distinct() {
        assert_ne!(Approval::Approved.label(), Approval::NotApproved.label());
        assert_eq!(Approval::Approved.to_string(), APPROVED_LABEL);
    }

    #[test]
    fn short_rows_read_as_missing() {
        let mut t = Table::new(["a", "b"]);
        t.push_row(["1"]);
        assert_eq!(t.cell(0, Some(0)), Some("1"));
        assert_eq!(t.cell(0, Some(1)), None);
        assert_eq!(t.cell(0, None), None);
    }

    #[test]
    fn record_json_uses_artifact_names() {
        let r = StockRecord {
            stock: "AKBNK".into(),
            display_name: "Akbank".into(),
            sector: "Banka".into(),
            approval: Approval::NotApproved,
            metadata: StockMetadata {
                id: "123".into(),
                ipo_date: "1990-01-01".into(),
                first_trade_date: "1990-02-01".into(),
            },
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["displayName"], "Akbank");
        assert_eq!(json["ipoDate"], "1990-01-01");
        assert_eq!(json["firstTradeDate"], "1990-02-01");
        assert!(json.get("metadata").is_none());
    }
}
