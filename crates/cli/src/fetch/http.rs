//! HTTP table source.
//!
//! Blocking client with a bounded retry loop: network errors, 429 and 5xx
//! are retried with exponential backoff (429 honours `Retry-After`); any
//! other 4xx fails immediately. Retries are reported to the run context.

use std::thread;
use std::time::Duration;

use katilim_config::settings::HttpSettings;
use katilim_recon::RunContext;

use super::{SourceError, TableSource};

pub struct HttpTableSource {
    http: reqwest::blocking::Client,
    max_retries: u32,
    initial_backoff: Duration,
}

impl HttpTableSource {
    pub fn new(settings: &HttpSettings) -> Result<Self, SourceError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|e| SourceError::Http {
                url: String::new(),
                message: format!("cannot build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            max_retries: settings.max_retries,
            initial_backoff: Duration::from_secs(1),
        })
    }

    #[cfg(test)]
    fn with_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }
}

impl TableSource for HttpTableSource {
    fn fetch_page(&self, ctx: &mut RunContext<'_>, url: &str) -> Result<String, SourceError> {
        let mut backoff = self.initial_backoff;

        for attempt in 0..=self.max_retries {
            let last = attempt == self.max_retries;

            match self.http.get(url).send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    // Retryable: 429, 5xx
                    if status == 429 || status >= 500 {
                        if last {
                            return Err(SourceError::Status { url: url.to_string(), status });
                        }
                        let wait = if status == 429 {
                            resp.headers()
                                .get("retry-after")
                                .and_then(|v| v.to_str().ok())
                                .and_then(|v| v.parse::<u64>().ok())
                                .map(Duration::from_secs)
                                .unwrap_or(backoff)
                        } else {
                            backoff
                        };
                        ctx.warn(format!(
                            "{url}: retry {}/{} in {}ms (HTTP {status})",
                            attempt + 1,
                            self.max_retries,
                            wait.as_millis(),
                        ));
                        thread::sleep(wait);
                        backoff *= 2;
                        continue;
                    }

                    // Other 4xx: fail immediately
                    if status >= 400 {
                        return Err(SourceError::Status { url: url.to_string(), status });
                    }

                    let text = resp.text().map_err(|e| SourceError::Http {
                        url: url.to_string(),
                        message: format!("cannot read body: {e}"),
                    })?;
                    return Ok(text.trim_start_matches('\u{feff}').to_string());
                }
                Err(e) => {
                    if last {
                        return Err(SourceError::Http {
                            url: url.to_string(),
                            message: format!("{e} (after {} attempts)", attempt + 1),
                        });
                    }
                    ctx.warn(format!(
                        "{url}: retry {}/{} in {}ms ({e})",
                        attempt + 1,
                        self.max_retries,
                        backoff.as_millis(),
                    ));
                    thread::sleep(backoff);
                    backoff *= 2;
                }
            }
        }

        Err(SourceError::Http {
            url: url.to_string(),
            message: "no attempt made".into(),
        })
    }
}
