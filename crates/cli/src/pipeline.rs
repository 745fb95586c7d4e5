//! Approval pipeline: fetch both universes, reconcile against the previous
//! run's metadata, persist every view.
//!
//! A source failure stops the pipeline before anything is written, so the
//! previous artifacts stay in place. Once reconciliation succeeds, each
//! artifact is persisted independently.

use katilim_config::Settings;
use katilim_io::{persist, Artifact, MetadataStore};
use katilim_recon::views::{approval_table, partition_table, render_stock_index, Partition};
use katilim_recon::{reconcile, RunContext};

use crate::fetch::{TableLocator, TableSource};
use crate::report::{ApprovalReport, ApprovalStatus, ArtifactReport};

pub fn run_approval(
    ctx: &mut RunContext<'_>,
    settings: &Settings,
    source: &dyn TableSource,
) -> ApprovalReport {
    let full_locator = TableLocator::from(&settings.sources.full);
    let full = match source.fetch_table(ctx, &full_locator) {
        Ok(t) => t,
        Err(e) => {
            let msg = format!("full universe unavailable: {e}");
            ctx.warn(&msg);
            return ApprovalReport::failed(ApprovalStatus::SourceFailed, msg);
        }
    };

    let restricted_locator = TableLocator::from(&settings.sources.restricted);
    let restricted = match source.fetch_table(ctx, &restricted_locator) {
        Ok(t) => t,
        Err(e) => {
            let msg = format!("participation index unavailable: {e}");
            ctx.warn(&msg);
            return ApprovalReport::failed(ApprovalStatus::SourceFailed, msg);
        }
    };

    let (history, seed) = MetadataStore::load_first(ctx, &settings.seed_paths());

    let result = match reconcile(ctx, &settings.columns, &full, &restricted, &history) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!("reconciliation failed: {e}");
            ctx.warn(&msg);
            return ApprovalReport::failed(ApprovalStatus::ReconFailed, msg);
        }
    };

    let names = &settings.artifacts;
    let approval = approval_table(&result.all);
    let all = partition_table(Partition::All.records(&result));
    let approved = partition_table(Partition::Approved.records(&result));
    let not_approved = partition_table(Partition::NotApproved.records(&result));
    let index = render_stock_index(&result.stock_index);

    let planned = [
        (&names.approval_csv, Artifact::Csv { table: &approval, bom: true }),
        (&names.approval_html, Artifact::Html(&approval)),
        (&names.all_csv, Artifact::Csv { table: &all, bom: true }),
        (&names.approved_csv, Artifact::Csv { table: &approved, bom: true }),
        (&names.not_approved_csv, Artifact::Csv { table: &not_approved, bom: true }),
        (&names.stock_index, Artifact::Text(&index)),
    ];

    let mut artifacts = Vec::with_capacity(planned.len());
    for (name, artifact) in planned {
        let path = settings.data_path(name);
        let outcome = persist(ctx, artifact, &path);
        if let Err(e) = &outcome {
            ctx.warn(e.to_string());
        }
        artifacts.push(ArtifactReport::from_result(&path, &outcome));
    }

    ApprovalReport {
        status: ApprovalStatus::Completed,
        metadata_seed: seed,
        summary: Some(result.summary),
        artifacts,
        errors: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticSource;
    use katilim_config::settings::SourceSettings;
    use katilim_recon::{NullSink, RecordingSink};
    use std::fs;
    use tempfile::tempdir;

    const FULL: &str = "<table><tr><td>nav</td></tr></table>\
        <table><tr><th>Kod</th><th>Hisse Adı</th><th>Sektör</th></tr>\
        <tr><td>AKBNK Akbank</td><td>Akbank</td><td>Banka</td></tr>\
        <tr><td>İŞCTR</td><td>İş Bankası</td><td>Banka</td></tr>\
        <tr><td>BIMAS</td><td>BİM</td><td>Perakende</td></tr></table>";
    const RESTRICTED: &str = "<table><tr><th>Hisseler</th></tr>\
        <tr><td>BIMAS BİM Birleşik Mağazalar</td></tr></table>";

    fn settings(dir: &std::path::Path) -> Settings {
        let mut s = Settings::default();
        s.data_dir = dir.to_path_buf();
        s.sources.full = SourceSettings {
            url: "http://test/full".into(),
            table_index: 1,
            container: None,
        };
        s.sources.restricted = SourceSettings {
            url: "http://test/katilim".into(),
            table_index: 0,
            container: None,
        };
        s
    }

    fn source() -> StaticSource {
        StaticSource::default()
            .with("http://test/full", FULL)
            .with("http://test/katilim", RESTRICTED)
    }

    #[test]
    fn writes_every_view() {
        let dir = tempdir().unwrap();
        let s = settings(dir.path());
        let mut sink = NullSink;
        let mut ctx = RunContext::new(&mut sink);

        let report = run_approval(&mut ctx, &s, &source());
        assert_eq!(report.status, ApprovalStatus::Completed);
        assert_eq!(report.artifacts.len(), 6);
        assert!(report.artifacts.iter().all(|a| a.outcome == "written"));

        let summary = report.summary.unwrap();
        assert_eq!((summary.total, summary.approved, summary.not_approved), (3, 1, 2));

        let approval = fs::read_to_string(dir.path().join("Katilim_Endeksi_Onay_Tablosu.csv")).unwrap();
        assert!(approval.starts_with("\u{feff}stock,Onay,"));
        assert!(approval.contains("BIMAS,Katılım Endeksine Uygundur,BİM,Perakende"));
        assert!(approval.contains("İŞCTR,Katılım Endeksine Uygun Değildir"));

        let index = fs::read_to_string(dir.path().join("stockall.txt")).unwrap();
        assert_eq!(index, "AKBNK,\nBIMAS,\nİŞCTR,");

        let approved = fs::read_to_string(dir.path().join("stock_xktum_data.csv")).unwrap();
        assert_eq!(approved, "\u{feff}stock,id,ipoDate,firstTradeDate\nBIMAS,,,\n");
    }

    #[test]
    fn second_run_changes_nothing() {
        let dir = tempdir().unwrap();
        let s = settings(dir.path());
        let mut sink = NullSink;
        let mut ctx = RunContext::new(&mut sink);

        run_approval(&mut ctx, &s, &source());
        let second = run_approval(&mut ctx, &s, &source());
        assert!(second.artifacts.iter().all(|a| a.outcome == "unchanged"));
        assert!(second.metadata_seed.unwrap().ends_with("stock_xutum_data.csv"));
    }

    #[test]
    fn seed_metadata_carried_into_views() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("all_data.csv"),
            "stock,id,ipoDate,firstTradeDate\nAKBNK,123,1990-01-01,1990-02-01\n",
        )
        .unwrap();
        let s = settings(dir.path());
        let mut sink = NullSink;
        let mut ctx = RunContext::new(&mut sink);

        let report = run_approval(&mut ctx, &s, &source());
        assert_eq!(report.summary.unwrap().enriched, 1);
        let all = fs::read_to_string(dir.path().join("stock_xutum_data.csv")).unwrap();
        assert!(all.contains("AKBNK,123,1990-01-01,1990-02-01"));
    }

    #[test]
    fn source_failure_leaves_artifacts_untouched() {
        let dir = tempdir().unwrap();
        let s = settings(dir.path());
        let index = dir.path().join("stockall.txt");
        fs::write(&index, "OLD,").unwrap();

        let only_full = StaticSource::default().with("http://test/full", FULL);
        let mut sink = RecordingSink::default();
        let report = {
            let mut ctx = RunContext::new(&mut sink);
            run_approval(&mut ctx, &s, &only_full)
        };
        assert_eq!(report.status, ApprovalStatus::SourceFailed);
        assert!(report.artifacts.is_empty());
        assert!(report.errors[0].contains("participation index unavailable"));
        assert_eq!(fs::read_to_string(&index).unwrap(), "OLD,");
        assert!(sink.warnings().any(|w| w.contains("HTTP 404")));
    }

    #[test]
    fn missing_code_column_stops_before_writing() {
        let dir = tempdir().unwrap();
        let mut s = settings(dir.path());
        s.columns.restricted_code = "Sembol".into();
        let mut sink = NullSink;
        let mut ctx = RunContext::new(&mut sink);

        let report = run_approval(&mut ctx, &s, &source());
        assert_eq!(report.status, ApprovalStatus::ReconFailed);
        assert!(report.errors[0].contains("Sembol"));
        assert!(!dir.path().join("stockall.txt").exists());
    }

    #[test]
    fn one_failed_artifact_does_not_block_the_rest() {
        let dir = tempdir().unwrap();
        let mut s = settings(dir.path());
        // A regular file where a directory is needed
        fs::write(dir.path().join("blocked"), "x").unwrap();
        s.artifacts.approval_html = "blocked/report.html".into();
        let mut sink = NullSink;
        let mut ctx = RunContext::new(&mut sink);

        let report = run_approval(&mut ctx, &s, &source());
        let failed: Vec<_> = report.artifacts.iter().filter(|a| a.is_failure()).collect();
        assert_eq!(failed.len(), 1);
        assert!(failed[0].path.ends_with("blocked/report.html"));
        assert!(dir.path().join("stockall.txt").exists());
    }
}
