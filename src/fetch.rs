//! Markup sources
//!
//! Fetch failures keep the HTTP status (or transport text) so callers can tell
//! a blocked request apart from a generic failure.

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;
use ureq::ResponseExt;

use crate::config::FetchConfig;
use crate::error::{ProdlensError, Result};

/// Raw markup plus the location it was actually served from
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects, or the file path
    pub location: String,
    pub markup: String,
}

pub trait MarkupSource {
    fn fetch(&self, target: &str) -> Result<FetchedPage>;
}

/// Fetch over HTTP(S) with a shared agent
pub struct HttpMarkupSource {
    agent: ureq::Agent,
    user_agent: String,
}

impl HttpMarkupSource {
    pub fn new(config: &FetchConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .into();
        Self {
            agent,
            user_agent: config.user_agent.clone(),
        }
    }
}

impl MarkupSource for HttpMarkupSource {
    fn fetch(&self, url: &str) -> Result<FetchedPage> {
        debug!(url, "fetching markup");

        let response = self
            .agent
            .get(url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "text/html,application/xhtml+xml")
            .call()
            .map_err(fetch_error)?;

        let location = response.get_uri().to_string();
        let markup = response.into_body().read_to_string().map_err(fetch_error)?;

        debug!(location = %location, bytes = markup.len(), "markup fetched");
        Ok(FetchedPage { location, markup })
    }
}

/// Classify a transport error, keeping the status code when there is one
fn fetch_error(err: ureq::Error) -> ProdlensError {
    match err {
        ureq::Error::StatusCode(code) => ProdlensError::Fetch {
            status: Some(code),
            message: format!("HTTP {}", code),
        },
        other => ProdlensError::Fetch {
            status: None,
            message: other.to_string(),
        },
    }
}

/// Read markup saved to disk
#[derive(Debug, Default)]
pub struct FileMarkupSource;

impl MarkupSource for FileMarkupSource {
    fn fetch(&self, path: &str) -> Result<FetchedPage> {
        let path = PathBuf::from(path);
        let markup = std::fs::read_to_string(&path).map_err(|e| ProdlensError::Fetch {
            status: None,
            message: format!("{}: {}", path.display(), e),
        })?;
        Ok(FetchedPage {
            location: path.display().to_string(),
            markup,
        })
    }
}

/// True when the target looks like a URL rather than a local file
pub fn is_url(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
