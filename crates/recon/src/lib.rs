//! `katilim-recon`: stock-universe reconciliation engine.
//!
//! Pure engine crate: receives pre-scraped tables and the previous run's
//! metadata, returns the reconciled stock records and their derived views.
//! No network or filesystem dependencies.

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod extract;
pub mod model;
pub mod summary;
pub mod views;

pub use config::ColumnMapping;
pub use context::{Level, NullSink, ObservationSink, RecordingSink, RunContext};
pub use engine::reconcile;
pub use error::ReconError;
pub use extract::extract_stock_code;
pub use model::{Approval, MetadataTable, ReconResult, ScrapedTable, StockMetadata, StockRecord, Table};
