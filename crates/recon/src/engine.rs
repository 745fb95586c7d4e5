use std::collections::{BTreeSet, HashMap, HashSet};

use crate::config::ColumnMapping;
use crate::context::RunContext;
use crate::error::ReconError;
use crate::extract::extract_stock_code;
use crate::model::{Approval, MetadataTable, ReconMeta, ReconResult, ScrapedTable, StockRecord};
use crate::summary::{compute_summary, SummaryInputs};

/// A full-universe row after ingestion: code derived, optional columns defaulted.
#[derive(Debug, Clone)]
struct ScrapedStock {
    stock: String,
    display_name: String,
    sector: String,
}

/// Reconcile the full universe against the restricted universe, enriching
/// every stock with the previous run's metadata.
pub fn reconcile(
    ctx: &mut RunContext<'_>,
    mapping: &ColumnMapping,
    full: &ScrapedTable,
    restricted: &ScrapedTable,
    history: &MetadataTable,
) -> Result<ReconResult, ReconError> {
    let (scraped, full_dropped) = ingest_full(full, mapping)?;
    let (members, restricted_dropped) = membership(restricted, mapping)?;

    if full_dropped > 0 {
        ctx.warn(format!(
            "full universe: dropped {full_dropped} row(s) without a stock code"
        ));
    }
    if restricted_dropped > 0 {
        ctx.warn(format!(
            "restricted universe: dropped {restricted_dropped} row(s) without a stock code"
        ));
    }

    let stock_index: Vec<String> = scraped
        .iter()
        .map(|s| s.stock.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    ctx.info(format!(
        "full universe: {} row(s), {} unique stock(s); restricted universe: {} member(s)",
        scraped.len(),
        stock_index.len(),
        members.len(),
    ));

    // Tag + join
    let mut enriched = 0;
    let joined: Vec<StockRecord> = scraped
        .into_iter()
        .map(|s| {
            let approval = if members.contains(&s.stock) {
                Approval::Approved
            } else {
                Approval::NotApproved
            };
            let metadata = match history.get(&s.stock) {
                Some(m) => {
                    enriched += 1;
                    m.clone()
                }
                None => Default::default(),
            };
            StockRecord {
                stock: s.stock,
                display_name: s.display_name,
                sector: s.sector,
                approval,
                metadata,
            }
        })
        .collect();

    let duplicates = find_duplicates(&joined);
    report_duplicates(ctx, &duplicates);

    let all = dedup_first(joined);
    let duplicates_removed = duplicates.len().saturating_sub(
        duplicates.iter().map(|r| r.stock.as_str()).collect::<HashSet<_>>().len(),
    );

    let (approved, not_approved): (Vec<_>, Vec<_>) = all
        .iter()
        .cloned()
        .partition(|r| r.approval == Approval::Approved);

    let listed: HashSet<&str> = all.iter().map(|r| r.stock.as_str()).collect();
    let mut unlisted_members: Vec<String> = members
        .iter()
        .filter(|m| !listed.contains(m.as_str()))
        .cloned()
        .collect();
    unlisted_members.sort();
    if !unlisted_members.is_empty() {
        ctx.warn(format!(
            "{} restricted member(s) missing from the full universe: {}",
            unlisted_members.len(),
            unlisted_members.join(", "),
        ));
    }

    let summary = compute_summary(SummaryInputs {
        full_rows: full.len(),
        restricted_rows: restricted.len(),
        dropped_empty_keys: full_dropped + restricted_dropped,
        duplicates_removed,
        enriched_before_dedup: enriched,
        records: &all,
        unlisted_members,
    });

    ctx.info(format!(
        "reconciled {} stock(s): {} approved, {} not approved, {} with metadata",
        summary.total, summary.approved, summary.not_approved, summary.enriched,
    ));

    Ok(ReconResult {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: ctx.run_at().to_rfc3339(),
        },
        summary,
        all,
        approved,
        not_approved,
        stock_index,
        duplicates,
    })
}

/// Derive codes for the full universe. Rows without a code carry no identity
/// and are dropped; the count is returned alongside.
fn ingest_full(
    table: &ScrapedTable,
    mapping: &ColumnMapping,
) -> Result<(Vec<ScrapedStock>, usize), ReconError> {
    let code_idx = required_column(table, "full", &mapping.full_code)?;
    let name_idx = table.column_index(&mapping.full_display_name);
    let sector_idx = table.column_index(&mapping.full_sector);

    let mut rows = Vec::with_capacity(table.len());
    let mut dropped = 0;
    for i in 0..table.len() {
        let stock = extract_stock_code(table.cell(i, Some(code_idx)));
        if stock.is_empty() {
            dropped += 1;
            continue;
        }
        rows.push(ScrapedStock {
            stock,
            display_name: table.cell(i, name_idx).unwrap_or("").to_string(),
            sector: table.cell(i, sector_idx).unwrap_or("").to_string(),
        });
    }
    Ok((rows, dropped))
}

fn membership(
    table: &ScrapedTable,
    mapping: &ColumnMapping,
) -> Result<(HashSet<String>, usize), ReconError> {
    let code_idx = required_column(table, "restricted", &mapping.restricted_code)?;

    let mut members = HashSet::new();
    let mut dropped = 0;
    for i in 0..table.len() {
        let stock = extract_stock_code(table.cell(i, Some(code_idx)));
        if stock.is_empty() {
            dropped += 1;
        } else {
            members.insert(stock);
        }
    }
    Ok((members, dropped))
}

fn required_column(table: &ScrapedTable, source: &str, column: &str) -> Result<usize, ReconError> {
    table.column_index(column).ok_or_else(|| ReconError::MissingColumn {
        source: source.into(),
        column: column.into(),
    })
}

/// Every record whose stock occurs more than once, sorted by stock.
/// The sort is stable so scan order survives within a group.
fn find_duplicates(records: &[StockRecord]) -> Vec<StockRecord> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in records {
        *counts.entry(r.stock.as_str()).or_insert(0) += 1;
    }

    let mut dups: Vec<StockRecord> = records
        .iter()
        .filter(|r| counts[r.stock.as_str()] > 1)
        .cloned()
        .collect();
    dups.sort_by(|a, b| a.stock.cmp(&b.stock));
    dups
}

fn report_duplicates(ctx: &mut RunContext<'_>, duplicates: &[StockRecord]) {
    if duplicates.is_empty() {
        ctx.info("no duplicate stock records");
        return;
    }
    ctx.info(format!(
        "{} duplicate stock record(s) found, keeping the first of each:",
        duplicates.len()
    ));
    for r in duplicates {
        ctx.info(format!(
            "  {} id={} ipoDate={} firstTradeDate={}",
            r.stock, r.metadata.id, r.metadata.ipo_date, r.metadata.first_trade_date,
        ));
    }
}

fn dedup_first(records: Vec<StockRecord>) -> Vec<StockRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.stock.clone()))
        .collect()
}
