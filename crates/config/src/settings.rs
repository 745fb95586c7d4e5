// Run settings
// Loaded from ./katilim.toml (or --config); every section falls back to defaults

use std::fs;
use std::path::{Path, PathBuf};

use katilim_recon::ColumnMapping;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "katilim.toml";

pub const URL_ALL_STOCKS: &str =
    "https://www.isyatirim.com.tr/tr-tr/analiz/hisse/Sayfalar/Temel-Degerler-Ve-Oranlar.aspx#page-1";
pub const URL_KATILIM_STOCKS: &str =
    "https://finans.mynet.com/borsa/endeks/xktum-bist-katilim-tum/endekshisseleri/";

/// Where one table lives: page URL, zero-based table position, and an
/// optional CSS selector the table must sit inside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSettings {
    pub url: String,
    #[serde(default)]
    pub table_index: usize,
    #[serde(default)]
    pub container: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesSettings {
    /// Full-universe page (all stocks with fundamentals)
    pub full: SourceSettings,
    /// Participation-index constituents page
    pub restricted: SourceSettings,
}

impl Default for SourcesSettings {
    fn default() -> Self {
        Self {
            full: SourceSettings {
                url: URL_ALL_STOCKS.into(),
                table_index: 2,
                container: None,
            },
            restricted: SourceSettings {
                url: URL_KATILIM_STOCKS.into(),
                table_index: 0,
                container: None,
            },
        }
    }
}

/// Metadata seed files, relative to the data dir, tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSettings {
    pub seeds: Vec<String>,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            seeds: vec!["all_data.csv".into(), "stock_xutum_data.csv".into()],
        }
    }
}

/// Output file names, relative to the data dir.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactSettings {
    pub approval_csv: String,
    pub approval_html: String,
    pub all_csv: String,
    pub approved_csv: String,
    pub not_approved_csv: String,
    pub stock_index: String,
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            approval_csv: "Katilim_Endeksi_Onay_Tablosu.csv".into(),
            approval_html: "Katilim_Endeksi_Onay_Tablosu.html".into(),
            all_csv: "stock_xutum_data.csv".into(),
            approved_csv: "stock_xktum_data.csv".into(),
            not_approved_csv: "stock_xktumext_data.csv".into(),
            stock_index: "stockall.txt".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    /// Retries after the first attempt, for network errors, 429 and 5xx
    pub max_retries: u32,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 2,
            user_agent: concat!("katilim/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSource {
    pub url: String,
    /// CSS selector of the element holding the quote table
    #[serde(default = "default_snapshot_container")]
    pub container: String,
    /// Output CSV, relative to the data dir
    pub output: String,
}

fn default_snapshot_container() -> String {
    "div.portlet.box.green".into()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotSettings {
    pub enabled: bool,
    /// Pause between snapshot requests
    pub delay_ms: u64,
    pub sources: Vec<SnapshotSource>,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        let source = |index: &str| SnapshotSource {
            url: format!("https://oyakyatirim.com.tr/piyasa-verileri/{index}"),
            container: default_snapshot_container(),
            output: format!("stock_{}_data.csv", index.to_lowercase()),
        };
        Self {
            enabled: true,
            delay_ms: 2000,
            sources: vec![source("XU030"), source("XU050"), source("XU100")],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` env-filter directive; RUST_LOG takes precedence
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { filter: "info".into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub sources: SourcesSettings,
    pub columns: ColumnMapping,
    pub metadata: MetadataSettings,
    pub artifacts: ArtifactSettings,
    pub http: HttpSettings,
    pub snapshots: SnapshotSettings,
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            sources: SourcesSettings::default(),
            columns: ColumnMapping::default(),
            metadata: MetadataSettings::default(),
            artifacts: ArtifactSettings::default(),
            http: HttpSettings::default(),
            snapshots: SnapshotSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings.
    ///
    /// An explicit path must exist and parse. Without one, `./katilim.toml`
    /// is used when present and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let settings: Settings = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.full.url.trim().is_empty() {
            return Err(ConfigError::Validation("sources.full.url must not be empty".into()));
        }
        if self.sources.restricted.url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "sources.restricted.url must not be empty".into(),
            ));
        }
        self.columns
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        for (i, source) in self.snapshots.sources.iter().enumerate() {
            if source.url.trim().is_empty() || source.output.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "snapshots.sources[{i}] needs both url and output"
                )));
            }
        }
        Ok(())
    }

    /// Resolve a data-dir relative file name.
    pub fn data_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    pub fn seed_paths(&self) -> Vec<PathBuf> {
        self.metadata.seeds.iter().map(|s| self.data_path(s)).collect()
    }
}
