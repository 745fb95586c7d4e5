//! Logger setup and the observation sink that feeds it.

use katilim_recon::{Level, ObservationSink};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (tests) is harmless
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

/// Forwards engine observations to `tracing`, tagged with the pipeline name.
pub struct TracingSink {
    pipeline: &'static str,
    warnings: usize,
}

impl TracingSink {
    pub fn new(pipeline: &'static str) -> Self {
        Self { pipeline, warnings: 0 }
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }
}

impl ObservationSink for TracingSink {
    fn observe(&mut self, level: Level, message: &str) {
        match level {
            Level::Info => tracing::info!(pipeline = self.pipeline, "{message}"),
            Level::Warn => {
                self.warnings += 1;
                tracing::warn!(pipeline = self.pipeline, "{message}");
            }
        }
    }
}
