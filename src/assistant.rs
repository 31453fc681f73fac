//! Session-scoped access to the generative collaborator
//!
//! The capability probe runs once when the assistant is built. Responses are
//! cached per (operation, product name, brand); concurrent identical requests
//! are not de-duplicated.

use tracing::{debug, warn};

use crate::agent::{
    generator_from_config, strip_code_fencing, CompletionOptions, DisabledGenerator, TextGenerator,
};
use crate::cache::{cache_key, ResponseCache, SqliteCache};
use crate::config::Config;
use crate::error::{ProdlensError, Result};

/// One generative request about a product
#[derive(Debug, Clone)]
pub struct Prompt<'a> {
    /// Cache namespace, e.g. "competitors" or "narrative"
    pub operation: &'a str,
    pub product_name: &'a str,
    pub brand: &'a str,
    pub system: &'a str,
    pub user: &'a str,
    pub options: CompletionOptions,
}

pub struct Assistant {
    generator: Box<dyn TextGenerator>,
    cache: Option<Box<dyn ResponseCache>>,
    available: bool,
    max_tokens: u32,
}

impl Assistant {
    pub fn new(generator: Box<dyn TextGenerator>, cache: Option<Box<dyn ResponseCache>>) -> Self {
        let available = generator.is_available();
        debug!(generator = generator.name(), available, "generative collaborator probed");
        Self {
            generator,
            cache,
            available,
            max_tokens: CompletionOptions::default().max_tokens,
        }
    }

    /// An assistant that never attempts generative calls
    pub fn offline() -> Self {
        Self::new(Box::new(DisabledGenerator), None)
    }

    /// Build the configured generator and cache. An unusable cache only
    /// disables caching.
    pub fn from_config(config: &Config) -> Self {
        let cache: Option<Box<dyn ResponseCache>> = if config.cache.enabled {
            let ttl = chrono::Duration::hours(config.cache.ttl_hours as i64);
            match config.cache_db_path().and_then(|path| SqliteCache::open(&path, ttl)) {
                Ok(cache) => {
                    if let Err(e) = cache.purge_expired() {
                        warn!(error = %e, "failed to purge stale cache entries");
                    }
                    Some(Box::new(cache))
                }
                Err(e) => {
                    warn!(error = %e, "response cache unavailable, continuing without it");
                    None
                }
            }
        } else {
            None
        };

        let mut assistant = Self::new(generator_from_config(&config.ai), cache);
        assistant.max_tokens = config.ai.max_tokens;
        assistant
    }

    /// Token budget for long-form replies
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn generator_name(&self) -> &'static str {
        self.generator.name()
    }

    /// Run a prompt through the cache and generator.
    ///
    /// In JSON mode the reply is unwrapped from any code fence and must parse
    /// as JSON. Only accepted replies are cached.
    pub fn ask(&self, prompt: &Prompt<'_>) -> Result<String> {
        self.ask_with(prompt, |reply| Ok(reply.to_string()))
    }

    /// Like [`Assistant::ask`], but the reply must also pass `accept` before
    /// it is returned or cached. A cached reply that `accept` rejects counts
    /// as a miss.
    pub fn ask_with<T>(
        &self,
        prompt: &Prompt<'_>,
        accept: impl Fn(&str) -> Result<T>,
    ) -> Result<T> {
        if !self.available {
            return Err(ProdlensError::AiUnavailable);
        }

        let key = cache_key(prompt.operation, prompt.product_name, prompt.brand);
        if let Some(cached) = self.cached(&key) {
            match accept(&cached) {
                Ok(value) => {
                    debug!(operation = prompt.operation, "cache hit");
                    return Ok(value);
                }
                Err(e) => debug!(operation = prompt.operation, error = %e, "cached reply rejected"),
            }
        } else {
            debug!(operation = prompt.operation, "cache miss");
        }

        let raw = self.generator.complete(prompt.system, prompt.user, &prompt.options)?;
        let reply = if prompt.options.json_mode {
            let body = strip_code_fencing(&raw);
            serde_json::from_str::<serde_json::Value>(&body)
                .map_err(|e| ProdlensError::Generative(format!("Malformed JSON reply: {}", e)))?;
            body
        } else {
            raw.trim().to_string()
        };

        if reply.is_empty() {
            return Err(ProdlensError::Generative("Empty reply".into()));
        }
        let value = accept(&reply)?;

        if let Some(ref cache) = self.cache {
            if let Err(e) = cache.set(&key, &reply) {
                warn!(error = %e, "failed to store cached response");
            }
        }
        Ok(value)
    }

    fn cached(&self, key: &str) -> Option<String> {
        let cache = self.cache.as_ref()?;
        match cache.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "cache lookup failed, treating as miss");
                None
            }
        }
    }
}
