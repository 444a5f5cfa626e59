//! Token persistence backends
//!
//! - [`NoopTokenStore`]: nothing is stored; used when no persistence is configured
//! - [`FileTokenStore`]: JSON file readable only by its owner
//! - [`CallbackTokenStore`]: caller-supplied load/save closures

use std::fmt;
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use super::traits::TokenStore;
use super::types::TokenRecord;

/// Errors raised by a token store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Token file I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Stored token is malformed: {0}")]
    Malformed(String),

    #[error("Token store failed: {0}")]
    Backend(String),
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }
}

/// Store that never persists anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTokenStore;

#[async_trait]
impl TokenStore for NoopTokenStore {
    async fn load(&self) -> Result<Option<TokenRecord>, StoreError> {
        Ok(None)
    }

    async fn save(&self, _record: &TokenRecord) -> Result<(), StoreError> {
        Ok(())
    }
}

/// JSON file store
///
/// Every save writes a temp file with mode `0600` (on Unix) next to the target
/// and renames it into place, so a failed save never leaves a truncated file
/// and a file that pre-existed with wider permissions is tightened too.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store tokens at `path`; the file is created on first save
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the token file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<TokenRecord>, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no token file");
                return Ok(None);
            }
            Err(err) => return Err(StoreError::io(&self.path, err)),
        };

        serde_json::from_str(&raw).map(Some).map_err(|e| StoreError::Malformed(e.to_string()))
    }

    async fn save(&self, record: &TokenRecord) -> Result<(), StoreError> {
        let json = serde_json::to_vec(record).map_err(|e| StoreError::Malformed(e.to_string()))?;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || replace_file(&path, |file| file.write_all(&json)))
            .await
            .map_err(|e| StoreError::io(&self.path, io::Error::other(e)))?
            .map_err(|e| StoreError::io(&self.path, e))?;

        debug!(path = %self.path.display(), "token file written");
        Ok(())
    }
}

/// Write a sibling temp file and rename it over `path`.
///
/// `path` is only replaced once `write` and the sync succeed; on any error the
/// temp file is removed and the previous contents stay in place.
fn replace_file<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::Builder::new().prefix(".adfin-tokens").tempfile_in(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file().set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    write(&mut file)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

type LoadFn = Box<dyn Fn() -> BoxFuture<'static, Result<Option<TokenRecord>, StoreError>> + Send + Sync>;
type SaveFn = Box<dyn Fn(TokenRecord) -> BoxFuture<'static, Result<(), StoreError>> + Send + Sync>;

/// Store backed by caller-supplied closures
///
/// Either half may be omitted: a missing loader reports nothing stored and a
/// missing saver discards records.
///
/// ```
/// use adfin_common::auth::{CallbackTokenStore, StoreError, TokenRecord};
///
/// let store = CallbackTokenStore::new()
///     .with_load(|| async { Ok::<_, StoreError>(None) })
///     .with_save(|record: TokenRecord| async move {
///         let _ = record;
///         Ok::<_, StoreError>(())
///     });
/// # let _ = store;
/// ```
#[derive(Default)]
pub struct CallbackTokenStore {
    load: Option<LoadFn>,
    save: Option<SaveFn>,
}

impl CallbackTokenStore {
    /// Store with neither closure set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Closure that returns the stored record, if any
    #[must_use]
    pub fn with_load<F, Fut>(mut self, load: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<TokenRecord>, StoreError>> + Send + 'static,
    {
        self.load = Some(Box::new(move || load().boxed()));
        self
    }

    /// Closure that persists each newly acquired record
    #[must_use]
    pub fn with_save<F, Fut>(mut self, save: F) -> Self
    where
        F: Fn(TokenRecord) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), StoreError>> + Send + 'static,
    {
        self.save = Some(Box::new(move |record| save(record).boxed()));
        self
    }
}

impl fmt::Debug for CallbackTokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackTokenStore")
            .field("load", &self.load.is_some())
            .field("save", &self.save.is_some())
            .finish()
    }
}

#[async_trait]
impl TokenStore for CallbackTokenStore {
    async fn load(&self) -> Result<Option<TokenRecord>, StoreError> {
        match &self.load {
            Some(load) => load().await,
            None => Ok(None),
        }
    }

    async fn save(&self, record: &TokenRecord) -> Result<(), StoreError> {
        match &self.save {
            Some(save) => save(record.clone()).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use super::*;

    fn record() -> TokenRecord {
        let expires_at = Utc.with_ymd_and_hms(2030, 6, 1, 8, 30, 0).unwrap()
            + chrono::TimeDelta::milliseconds(250);
        TokenRecord::new("access", "refresh", expires_at)
    }

    #[tokio::test]
    async fn noop_store_is_empty() {
        let store = NoopTokenStore;
        store.save(&record()).await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("tokens.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_round_trip_is_exact() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("tokens.json"));

        store.save(&record()).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, Some(record()));
    }

    #[tokio::test]
    async fn file_contents_use_persisted_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        FileTokenStore::new(&path).save(&record()).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["access_token"], "access");
        assert_eq!(raw["refresh_token"], "refresh");
        assert_eq!(raw["expires_at"], "2030-06-01T08:30:00.250Z");
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = FileTokenStore::new(&path).load().await;
        assert!(matches!(result, Err(StoreError::Malformed(_))));
    }

    #[tokio::test]
    async fn save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("missing").join("tokens.json"));

        let result = store.save(&record()).await;
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    #[test]
    fn failed_write_keeps_previous_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, r#"{"access_token":"old"}"#).unwrap();

        let result = replace_file(&path, |file| {
            file.write_all(br#"{"access_tok"#)?;
            Err(io::Error::other("disk full"))
        });

        assert_eq!(result.unwrap_err().to_string(), "disk full");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"access_token":"old"}"#);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn save_replaces_previous_record() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("tokens.json"));
        store.save(&TokenRecord::new("old", "old-r", Utc::now())).await.unwrap();

        store.save(&record()).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(record()));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        FileTokenStore::new(&path).save(&record()).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn existing_file_permissions_are_tightened() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        FileTokenStore::new(&path).save(&record()).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn callback_store_delegates() {
        let saved = Arc::new(tokio::sync::Mutex::new(Vec::new()));
        let sink = saved.clone();

        let store = CallbackTokenStore::new()
            .with_load(|| async { Ok::<_, StoreError>(Some(record())) })
            .with_save(move |record| {
                let sink = sink.clone();
                async move {
                    sink.lock().await.push(record);
                    Ok::<_, StoreError>(())
                }
            });

        assert_eq!(store.load().await.unwrap(), Some(record()));
        store.save(&record()).await.unwrap();
        assert_eq!(saved.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn callback_store_without_closures_behaves_like_noop() {
        let store = CallbackTokenStore::new();
        assert!(store.load().await.unwrap().is_none());
        store.save(&record()).await.unwrap();
    }

    #[tokio::test]
    async fn callback_save_errors_propagate() {
        let store = CallbackTokenStore::new()
            .with_save(|_| async { Err::<(), _>(StoreError::Backend("disk full".into())) });

        let err = store.save(&record()).await.unwrap_err();
        assert_eq!(err.to_string(), "Token store failed: disk full");
    }
}
