//! SQLite-backed response store
//!
//! Small payloads live inline in the `responses` table; anything over
//! `INLINE_THRESHOLD` goes to a sharded blob file next to the database.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CacheError;

/// Bump to drop and rebuild existing caches on upgrade
const SCHEMA_VERSION: i32 = 1;

/// Payloads larger than this are written as blob files
const INLINE_THRESHOLD: usize = 10 * 1024;

const DB_FILE: &str = "cache.db";
const BLOBS_DIR: &str = "blobs";

type Result<T> = std::result::Result<T, CacheError>;

/// Response store used by `CachedGitHubClient`
pub struct CacheStorage {
    conn: Connection,
    root: PathBuf,
}

impl CacheStorage {
    /// Open or create the store in the user cache directory
    pub fn open() -> Result<Self> {
        Self::open_at(&Self::cache_dir()?)
    }

    /// `~/.cache/ghops` on Linux, the platform equivalent elsewhere
    pub fn cache_dir() -> Result<PathBuf> {
        let base = dirs::cache_dir().ok_or(CacheError::NoHome)?;
        Ok(base.join("ghops"))
    }

    /// Open or create the store under `dir`
    pub fn open_at(dir: &Path) -> Result<Self> {
        let blobs = dir.join(BLOBS_DIR);
        std::fs::create_dir_all(&blobs)
            .map_err(|e| CacheError::Io(format!("Failed to create {}: {}", blobs.display(), e)))?;

        let db_path = dir.join(DB_FILE);
        let conn = Connection::open(&db_path)?;

        let version: i32 = conn
            .pragma_query_value(None, "user_version", |r| r.get(0))
            .unwrap_or(0);

        if version != 0 && version != SCHEMA_VERSION {
            log::info!(
                "Cache schema {} is not {}, rebuilding {}",
                version,
                SCHEMA_VERSION,
                dir.display()
            );
            drop(conn);
            Self::remove_files(&db_path, &blobs)?;
            return Self::open_at(dir);
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS responses (
                cache_key TEXT PRIMARY KEY NOT NULL,
                endpoint TEXT NOT NULL,
                scope TEXT,
                data TEXT,
                blob_path TEXT,
                created_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL,
                size_bytes INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_responses_expires ON responses(expires_at);
            CREATE INDEX IF NOT EXISTS idx_responses_endpoint ON responses(endpoint, scope);
            "#,
        )?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        let storage = Self {
            conn,
            root: dir.to_path_buf(),
        };
        let pruned = storage.prune_expired()?;
        if pruned > 0 {
            log::debug!("Pruned {} expired cache entries", pruned);
        }
        Ok(storage)
    }

    /// Directory holding the database and blobs
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blobs_dir(&self) -> PathBuf {
        self.root.join(BLOBS_DIR)
    }

    /// Unexpired payload for `key`
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Utc::now().timestamp();

        let row: Option<(Option<String>, Option<String>)> = self
            .conn
            .query_row(
                "SELECT data, blob_path FROM responses WHERE cache_key = ?1 AND expires_at > ?2",
                params![key, now],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((Some(data), None)) => Ok(Some(data.into_bytes())),
            Some((None, Some(blob_path))) => match std::fs::read(self.blobs_dir().join(&blob_path)) {
                Ok(data) => Ok(Some(data)),
                Err(e) => {
                    log::warn!("Dropping cache entry with unreadable blob {}: {}", blob_path, e);
                    self.delete(key)?;
                    Ok(None)
                }
            },
            _ => Ok(None),
        }
    }

    /// Store a payload for `ttl`
    pub fn put(
        &self,
        key: &str,
        data: &[u8],
        endpoint: &str,
        scope: Option<&str>,
        ttl: Duration,
    ) -> Result<()> {
        let now = Utc::now().timestamp();
        let expires = now + ttl.as_secs() as i64;
        self.delete(key)?;

        let (inline, blob_path) = if data.len() <= INLINE_THRESHOLD {
            (Some(String::from_utf8_lossy(data).into_owned()), None)
        } else {
            (None, Some(self.write_blob(key, data)?))
        };

        self.conn.execute(
            "INSERT OR REPLACE INTO responses
             (cache_key, endpoint, scope, data, blob_path, created_at, expires_at, size_bytes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                key,
                endpoint,
                scope.map(str::to_ascii_lowercase),
                inline,
                blob_path,
                now,
                expires,
                data.len()
            ],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        self.delete_where("cache_key = ?1", params![key])
            .map(|deleted| deleted > 0)
    }

    /// Drop every entry of `endpoint`, optionally limited to one scope.
    ///
    /// Called after writes so later reads see the change.
    pub fn invalidate(&self, endpoint: &str, scope: Option<&str>) -> Result<usize> {
        match scope {
            Some(scope) => self.delete_where(
                "endpoint = ?1 AND scope = ?2",
                params![endpoint, scope.to_ascii_lowercase()],
            ),
            None => self.delete_where("endpoint = ?1", params![endpoint]),
        }
    }

    /// Drop entries whose TTL has run out, blobs included
    pub fn prune_expired(&self) -> Result<usize> {
        let now = Utc::now().timestamp();
        self.delete_where("expires_at <= ?1", params![now])
    }

    /// Delete matching rows and the blob files they point at
    fn delete_where(&self, condition: &str, args: &[&dyn rusqlite::ToSql]) -> Result<usize> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT blob_path FROM responses WHERE blob_path IS NOT NULL AND {condition}"
        ))?;
        let blobs = stmt
            .query_map(args, |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let deleted = self
            .conn
            .execute(&format!("DELETE FROM responses WHERE {condition}"), args)?;

        for blob in blobs {
            let path = self.blobs_dir().join(&blob);
            if let Err(e) = std::fs::remove_file(&path)
                && e.kind() != std::io::ErrorKind::NotFound
            {
                log::warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
        Ok(deleted)
    }

    /// Remove every entry and blob
    pub fn clear_all(&self) -> Result<ClearStats> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM responses", [], |r| r.get(0))?;
        self.conn.execute("DELETE FROM responses", [])?;

        let blobs = self.blobs_dir();
        if blobs.exists() {
            if let Err(e) = std::fs::remove_dir_all(&blobs) {
                log::warn!("Failed to clear {}: {}", blobs.display(), e);
            }
            std::fs::create_dir_all(&blobs)
                .map_err(|e| CacheError::Io(format!("Failed to recreate blobs dir: {}", e)))?;
        }

        Ok(ClearStats {
            entries_removed: count as usize,
        })
    }

    /// Entry counts, sizes and age
    pub fn stats(&self) -> Result<CacheStats> {
        let now = Utc::now().timestamp();

        let (total, valid, size, oldest, newest): (i64, i64, i64, Option<i64>, Option<i64>) =
            self.conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN expires_at > ?1 THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(size_bytes), 0),
                        MIN(CASE WHEN expires_at > ?1 THEN created_at END),
                        MAX(CASE WHEN expires_at > ?1 THEN created_at END)
                 FROM responses",
                [now],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
            )?;

        Ok(CacheStats {
            total_entries: total as usize,
            valid_entries: valid as usize,
            expired_entries: (total - valid) as usize,
            total_size_bytes: size as usize,
            oldest_entry: oldest,
            newest_entry: newest,
        })
    }

    /// Blobs are sharded by the first two hex characters of the key
    fn write_blob(&self, key: &str, data: &[u8]) -> Result<String> {
        let shard = &key[..2.min(key.len())];
        let shard_dir = self.blobs_dir().join(shard);
        std::fs::create_dir_all(&shard_dir)
            .map_err(|e| CacheError::Io(format!("Failed to create shard dir: {}", e)))?;

        let filename = format!("{}.json", key);
        std::fs::write(shard_dir.join(&filename), data)
            .map_err(|e| CacheError::Io(format!("Failed to write blob: {}", e)))?;

        Ok(format!("{}/{}", shard, filename))
    }

    fn remove_files(db_path: &Path, blobs: &Path) -> Result<()> {
        if db_path.exists() {
            std::fs::remove_file(db_path)
                .map_err(|e| CacheError::Io(format!("Failed to remove cache DB: {}", e)))?;
        }
        if blobs.exists() {
            std::fs::remove_dir_all(blobs)
                .map_err(|e| CacheError::Io(format!("Failed to remove blobs dir: {}", e)))?;
        }
        Ok(())
    }
}

/// Result of `clear_all`
#[derive(Debug)]
pub struct ClearStats {
    pub entries_removed: usize,
}

/// Snapshot of the store
#[derive(Debug)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub total_size_bytes: usize,
    /// Unix seconds of the oldest live entry
    pub oldest_entry: Option<i64>,
    pub newest_entry: Option<i64>,
}
