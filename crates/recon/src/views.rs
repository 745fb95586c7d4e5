//! Tabular views derived from a reconciliation result.
//!
//! Column names are part of the persisted artifact contract; downstream
//! spreadsheets and the next run's metadata load depend on them.

use crate::model::{ReconResult, StockRecord, Table, METADATA_COLUMNS};

pub const APPROVAL_COLUMNS: [&str; 7] = [
    "stock",
    "Onay",
    "Hisse Adı",
    "Sektör",
    "id",
    "Halka Arz Tarihi",
    "İlk İşlem Tarihi",
];

/// The participation-index approval report.
pub fn approval_table(records: &[StockRecord]) -> Table {
    let mut table = Table::new(APPROVAL_COLUMNS);
    for r in records {
        table.push_row([
            r.stock.as_str(),
            r.approval.label(),
            r.display_name.as_str(),
            r.sector.as_str(),
            r.metadata.id.as_str(),
            r.metadata.ipo_date.as_str(),
            r.metadata.first_trade_date.as_str(),
        ]);
    }
    table
}

/// `stock,id,ipoDate,firstTradeDate`: the shape the metadata store reads back.
pub fn partition_table(records: &[StockRecord]) -> Table {
    let mut table = Table::new(METADATA_COLUMNS);
    for r in records {
        table.push_row([
            r.stock.as_str(),
            r.metadata.id.as_str(),
            r.metadata.ipo_date.as_str(),
            r.metadata.first_trade_date.as_str(),
        ]);
    }
    table
}

/// Codes joined by `",\n"` with a trailing comma after the last one.
pub fn render_stock_index(codes: &[String]) -> String {
    let mut out = codes.join(",\n");
    out.push(',');
    out
}

/// Which partition of the result a view is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    All,
    Approved,
    NotApproved,
}

impl Partition {
    pub fn records<'a>(&self, result: &'a ReconResult) -> &'a [StockRecord] {
        match self {
            Self::All => &result.all,
            Self::Approved => &result.approved,
            Self::NotApproved => &result.not_approved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Approval, StockMetadata};

    fn record() -> StockRecord {
        StockRecord {
            stock: "AKBNK".into(),
            display_name: "Akbank".into(),
            sector: "Bankacılık".into(),
            approval: Approval::NotApproved,
            metadata: StockMetadata {
                id: "123".into(),
                ipo_date: "1990-01-01".into(),
                first_trade_date: "1990-02-01".into(),
            },
        }
    }

    #[test]
    fn approval_table_layout() {
        let t = approval_table(&[record()]);
        assert_eq!(t.columns[6], "İlk İşlem Tarihi");
        assert_eq!(
            t.rows[0],
            vec!["AKBNK", "Katılım Endeksine Uygun Değildir", "Akbank", "Bankacılık", "123", "1990-01-01", "1990-02-01"]
        );
    }

    #[test]
    fn partition_table_layout() {
        let t = partition_table(&[record()]);
        assert_eq!(t.columns, vec!["stock", "id", "ipoDate", "firstTradeDate"]);
        assert_eq!(t.rows[0], vec!["AKBNK", "123", "1990-01-01", "1990-02-01"]);
    }

    #[test]
    fn stock_index_trailing_comma() {
        let codes = vec!["AKBNK".to_string(), "GARAN".to_string(), "THYAO".to_string()];
        assert_eq!(render_stock_index(&codes), "AKBNK,\nGARAN,\nTHYAO,");
        assert_eq!(render_stock_index(&[]), ",");
    }
}
