//! File-backed token cache.
//!
//! All accounts share one JSON file mapping login to raw token:
//! ```json
//! {
//!   "example-user": "eyJ0eXAiOiJKV1QiLCJhbGciOiJSUzUxMiJ9.eyJleHAiOjE3MDAwMDAwMDB9.c2ln"
//! }
//! ```
//! Tokens grant API access; keep the file out of shared locations.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use cloudhost_application::ports::{TokenCache, TokenCacheError};
use cloudhost_domain::Token;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

type CacheFile = BTreeMap<String, String>;

/// Owner read/write only.
#[cfg(unix)]
const CACHE_FILE_MODE: u32 = 0o600;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Token cache persisted to a JSON file.
#[derive(Debug)]
pub struct FileTokenCache {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTokenCache {
    /// Creates a cache stored at `path`. Nothing is read until first use.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the cache file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<CacheFile, TokenCacheError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                from_json_bytes(&bytes).map_err(|e| TokenCacheError::Serialization(e.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(CacheFile::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_entries(&self, entries: &CacheFile) -> Result<(), TokenCacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content =
            to_json_stable_bytes(entries).map_err(|e| TokenCacheError::Serialization(e.to_string()))?;

        // Readers never see a half-written file.
        let tmp = self.tmp_path();
        if let Err(e) = write_private(&tmp, &content).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Sibling temp path, unique per process and write.
    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(".");
        name.push(self.path.file_name().unwrap_or_else(|| "tokens".as_ref()));
        name.push(format!(
            ".{}.{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        self.path.with_file_name(name)
    }
}

async fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(CACHE_FILE_MODE);

    let mut file = options.open(path).await?;
    file.write_all(content).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}

#[async_trait]
impl TokenCache for FileTokenCache {
    async fn load(&self, key: &str) -> Result<Option<Token>, TokenCacheError> {
        let entries = self.read_entries().await?;
        let Some(raw) = entries.get(key) else {
            debug!(path = %self.path.display(), key, "no cached token");
            return Ok(None);
        };

        Token::parse(raw)
            .map(Some)
            .map_err(|e| TokenCacheError::Serialization(format!("entry for {key}: {e}")))
    }

    async fn store(&self, key: &str, token: &Token) -> Result<(), TokenCacheError> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), token.as_str().to_string());
        self.write_entries(&entries).await?;

        debug!(path = %self.path.display(), key, "stored token");
        Ok(())
    }
}
