// Artifact I/O: codecs, the metadata store and change-aware persistence

pub mod csv;
pub mod error;
pub mod html;
pub mod metadata;
pub mod persist;

pub use error::PersistError;
pub use metadata::MetadataStore;
pub use persist::{persist, Artifact, WriteOutcome};

/// Byte-order mark prepended to CSVs consumed by legacy spreadsheet tools.
pub const UTF8_BOM: &str = "\u{feff}";
