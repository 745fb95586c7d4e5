use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// Config validation error (empty column name, etc.).
    ConfigValidation(String),
    /// The identifier column of a source is absent from its scrape.
    MissingColumn { source: String, column: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { source, column } => {
                write!(f, "source '{source}': missing column '{column}'")
            }
        }
    }
}

impl std::error::Error for ReconError {}
