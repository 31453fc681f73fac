//! Generative response cache with a freshness window

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::error::{ProdlensError, Result};

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Key-value store for generative responses
pub trait ResponseCache {
    /// Fresh value for `key`, or `None` when missing or stale
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Cache key for an operation on a product
pub fn cache_key(operation: &str, product_name: &str, brand: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(operation.as_bytes());
    hasher.update([0x1f_u8]);
    hasher.update(product_name.as_bytes());
    hasher.update([0x1f_u8]);
    hasher.update(brand.as_bytes());
    hex::encode(hasher.finalize())
}

/// Counts reported by `prodlens cache stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub fresh: u64,
    pub stale: u64,
}

/// SQLite-backed cache
pub struct SqliteCache {
    conn: Connection,
    ttl: Duration,
}

impl SqliteCache {
    /// Open or create the cache database
    pub fn open(path: &Path, ttl: Duration) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn, ttl)
    }

    /// Open an in-memory cache (for testing)
    pub fn open_in_memory(ttl: Duration) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, ttl)
    }

    fn with_connection(mut conn: Connection, ttl: Duration) -> Result<Self> {
        embedded::migrations::runner().run(&mut conn)?;
        Ok(Self { conn, ttl })
    }

    fn cutoff(&self, now: DateTime<Utc>) -> i64 {
        (now - self.ttl).timestamp()
    }

    fn get_at(&self, key: &str, now: DateTime<Utc>) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM response_cache WHERE key = ?1 AND created_at >= ?2",
                params![key, self.cutoff(now)],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_at(&self, key: &str, value: &str, now: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT INTO response_cache (key, value, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, created_at = excluded.created_at",
            params![key, value, now.timestamp()],
        )?;
        Ok(())
    }

    /// Delete rows outside the freshness window, returning how many went
    pub fn purge_expired(&self) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM response_cache WHERE created_at < ?1",
            params![self.cutoff(Utc::now())],
        )?;
        Ok(removed)
    }

    pub fn stats(&self) -> Result<CacheStats> {
        let cutoff = self.cutoff(Utc::now());
        let (fresh, stale): (i64, i64) = self.conn.query_row(
            "SELECT
                COALESCE(SUM(CASE WHEN created_at >= ?1 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN created_at < ?1 THEN 1 ELSE 0 END), 0)
             FROM response_cache",
            params![cutoff],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(CacheStats {
            fresh: fresh as u64,
            stale: stale as u64,
        })
    }
}

impl ResponseCache for SqliteCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_at(key, Utc::now())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_at(key, value, Utc::now())
    }

    fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM response_cache", [])?;
        Ok(())
    }
}

/// In-process cache, mainly for tests and one-shot runs
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, DateTime<Utc>)>>,
    ttl: Duration,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResponseCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| ProdlensError::CacheError(e.to_string()))?;
        let cutoff = Utc::now() - self.ttl;
        Ok(entries
            .get(key)
            .filter(|(_, stored_at)| *stored_at >= cutoff)
            .map(|(value, _)| value.clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|e| ProdlensError::CacheError(e.to_string()))?
            .insert(key.to_string(), (value.to_string(), Utc::now()));
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries
            .lock()
            .map_err(|e| ProdlensError::CacheError(e.to_string()))?
            .clear();
        Ok(())
    }
}
