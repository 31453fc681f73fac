use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProdlensError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] ureq::Error),

    #[error("Cache database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] refinery::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Markup source failure. `status` is the HTTP status when the server
    /// answered, `None` for transport-level failures.
    #[error("Fetch failed: {message}")]
    Fetch { status: Option<u16>, message: String },

    #[error("Generative request failed: {0}")]
    Generative(String),

    #[error("Generative collaborator unavailable")]
    AiUnavailable,

    #[error("Invalid product record: {0}")]
    InvalidRecord(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Cache error: {0}")]
    CacheError(String),
}

impl ProdlensError {
    /// Whether the markup source refused the request (auth wall, bot
    /// protection, rate limiting) rather than failing generically.
    pub fn is_blocked(&self) -> bool {
        matches!(
            self,
            ProdlensError::Fetch { status: Some(401 | 403 | 429), .. }
        )
    }

    /// HTTP status carried by a fetch failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ProdlensError::Fetch { status, .. } => *status,
            _ => None,
        }
    }

    /// Get an actionable hint for how to resolve this error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            err @ ProdlensError::Fetch { .. } if err.is_blocked() => Some(
                "The site refused the request (blocked or forbidden).\n\
                 Save the page from your browser and run:\n  \
                 prodlens extract ./page.html --location <url>"
            ),
            ProdlensError::Fetch { .. } | ProdlensError::HttpError(_) => Some(
                "Check the URL and your internet connection, then retry"
            ),
            ProdlensError::AiUnavailable | ProdlensError::Generative(_) => Some(
                "Run `prodlens doctor` to check the AI provider, or pass --offline"
            ),
            ProdlensError::DatabaseError(_)
            | ProdlensError::MigrationError(_)
            | ProdlensError::CacheError(_) => Some(
                "Try `prodlens cache clear`, or disable the cache in config.toml"
            ),
            ProdlensError::ConfigError(_) | ProdlensError::TomlError(_) => Some(
                "Run `prodlens config path` to locate the config file and check its syntax"
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProdlensError>;
