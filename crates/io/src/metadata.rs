//! Loads the previous run's `stock,id,ipoDate,firstTradeDate` record.
//!
//! Absent or unreadable metadata is never fatal: the run proceeds with an
//! empty table and a warning, and the enriched columns come out empty.

use std::path::{Path, PathBuf};

use katilim_recon::{MetadataTable, RunContext};

pub struct MetadataStore;

impl MetadataStore {
    /// Load one seed file. Missing or unparsable ⇒ empty table + warning.
    pub fn load(ctx: &mut RunContext<'_>, path: &Path) -> MetadataTable {
        if !path.exists() {
            ctx.warn(format!(
                "{} not found; id and date columns will be empty",
                path.display()
            ));
            return MetadataTable::new();
        }
        match Self::try_load(path) {
            Ok(table) => {
                ctx.info(format!(
                    "loaded metadata for {} stock(s) from {}",
                    table.len(),
                    path.display()
                ));
                table
            }
            Err(e) => {
                ctx.warn(format!(
                    "cannot parse {} ({e}); id and date columns will be empty",
                    path.display()
                ));
                MetadataTable::new()
            }
        }
    }

    /// Load the first seed that exists and parses, in order. Candidates that
    /// exist but fail to parse are skipped with a warning. The chosen path is
    /// returned alongside; `None` when nothing loads.
    pub fn load_first(ctx: &mut RunContext<'_>, candidates: &[PathBuf]) -> (MetadataTable, Option<PathBuf>) {
        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::try_load(path) {
                Ok(table) => {
                    ctx.info(format!(
                        "loaded metadata for {} stock(s) from {}",
                        table.len(),
                        path.display()
                    ));
                    return (table, Some(path.clone()));
                }
                Err(e) => ctx.warn(format!("cannot parse {} ({e}); trying next seed", path.display())),
            }
        }

        let names: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
        ctx.warn(format!(
            "no metadata seed found (tried {}); id and date columns will be empty",
            if names.is_empty() { "nothing".to_string() } else { names.join(", ") }
        ));
        (MetadataTable::new(), None)
    }

    fn try_load(path: &Path) -> Result<MetadataTable, String> {
        let table = crate::csv::read_table(path)?;
        MetadataTable::from_table(&table).map_err(|e| e.to_string())
    }
}
