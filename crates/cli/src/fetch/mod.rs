//! Table sources: where scraped tables come from.
//!
//! A [`TableSource`] turns a [`TableLocator`] (page URL, table position,
//! optional container selector) into a [`ScrapedTable`]. The HTTP
//! implementation lives in [`http`], HTML table extraction in [`html`].

pub mod html;
pub mod http;

use std::fmt;

use katilim_config::settings::SourceSettings;
use katilim_recon::{RunContext, ScrapedTable};

pub use http::HttpTableSource;

/// Which table on which page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLocator {
    pub url: String,
    /// Zero-based, counted among the tables inside `container` when set.
    pub position: usize,
    pub container: Option<String>,
}

impl From<&SourceSettings> for TableLocator {
    fn from(s: &SourceSettings) -> Self {
        Self {
            url: s.url.clone(),
            position: s.table_index,
            container: s.container.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Network failure, timeout, or unreadable body.
    Http { url: String, message: String },
    /// Non-success HTTP status after retries (or immediately for 4xx).
    Status { url: String, status: u16 },
    /// The page holds fewer tables than requested.
    TableNotFound { position: usize, found: usize },
    /// The table exists but yields no usable data rows.
    NoDataRows { url: String },
    /// A configured container selector does not parse.
    Selector(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { url, message } => write!(f, "request to {url} failed: {message}"),
            Self::Status { url, status } => write!(f, "{url} answered HTTP {status}"),
            Self::TableNotFound { position, found } => write!(
                f,
                "table {position} not found (page has {found} table{})",
                if *found == 1 { "" } else { "s" }
            ),
            Self::NoDataRows { url } => write!(f, "no data rows in table at {url}"),
            Self::Selector(msg) => write!(f, "invalid selector {msg}"),
        }
    }
}

impl std::error::Error for SourceError {}

pub trait TableSource {
    /// Raw page body, BOM stripped.
    fn fetch_page(&self, ctx: &mut RunContext<'_>, url: &str) -> Result<String, SourceError>;

    fn fetch_table(
        &self,
        ctx: &mut RunContext<'_>,
        locator: &TableLocator,
    ) -> Result<ScrapedTable, SourceError> {
        let body = self.fetch_page(ctx, &locator.url)?;
        let table = html::extract_table(&body, locator.position, locator.container.as_deref())?;
        ctx.info(format!(
            "{}: table {} has {} row(s), columns [{}]",
            locator.url,
            locator.position,
            table.len(),
            table.columns.join(", ")
        ));
        Ok(table)
    }
}
