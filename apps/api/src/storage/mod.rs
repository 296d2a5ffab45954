//! Ephemeral File Store: short-lived on-disk storage for uploaded resumes.
//!
//! Each upload is written to `<upload_dir>/<id><ext>` and registered with a
//! sliding expiry: every `lookup` pushes `expires_at` forward by the TTL.
//! Entries leave the store through an explicit `delete`, through a
//! [`StoredFileGuard`] going out of scope, or through the background sweep.
//!
//! The table is a `DashMap`, so single-key mutations are atomic. Removal of
//! the record always happens before the unlink; whichever caller removes the
//! record owns the unlink, which makes `delete` and the sweep safe to race.
//! When the sweep's unlink fails for any reason other than the file already
//! being gone, the record goes back into the table so the next sweep retries.

pub mod guard;
pub mod sweeper;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, warn};
use uuid::Uuid;

pub use guard::StoredFileGuard;
pub use sweeper::spawn_sweeper;

/// A single registered upload.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub id: String,
    pub path: PathBuf,
    pub expires_at: DateTime<Utc>,
}

/// Returned by [`FileStore::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub id: String,
    pub path: PathBuf,
}

pub struct FileStore {
    dir: PathBuf,
    ttl: chrono::Duration,
    entries: DashMap<String, StoredFile>,
}

impl FileStore {
    /// Creates the store, creating `dir` if it does not exist yet.
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        Ok(Self {
            dir,
            ttl,
            entries: DashMap::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes `bytes` to a fresh path and registers it with a new expiry.
    pub async fn save(&self, bytes: &[u8], original_name: &str) -> io::Result<SavedFile> {
        let id = new_file_id();
        let path = self.dir.join(format!("{id}{}", extension_suffix(original_name)));

        tokio::fs::write(&path, bytes).await?;

        self.entries.insert(
            id.clone(),
            StoredFile {
                id: id.clone(),
                path: path.clone(),
                expires_at: Utc::now() + self.ttl,
            },
        );
        debug!(file_id = %id, bytes = bytes.len(), "Stored upload");

        Ok(SavedFile { id, path })
    }

    /// Saves the upload and wraps it in a guard that deletes it when dropped.
    pub async fn acquire(
        self: &Arc<Self>,
        bytes: &[u8],
        original_name: &str,
    ) -> io::Result<StoredFileGuard> {
        let saved = self.save(bytes, original_name).await?;
        Ok(StoredFileGuard::new(Arc::clone(self), saved))
    }

    /// Returns the path for `id` and slides its expiry forward.
    /// An unknown id is a normal outcome, not an error.
    pub fn lookup(&self, id: &str) -> Option<PathBuf> {
        let mut entry = self.entries.get_mut(id)?;
        entry.expires_at = Utc::now() + self.ttl;
        Some(entry.path.clone())
    }

    /// Removes the record and its file. Returns `false` if the id was not
    /// registered (including when the sweep already removed it).
    pub async fn delete(&self, id: &str) -> bool {
        let Some((_, entry)) = self.entries.remove(id) else {
            return false;
        };
        unlink_async(&entry).await;
        true
    }

    /// Synchronous variant of [`delete`](Self::delete) for `Drop` paths.
    pub(crate) fn delete_blocking(&self, id: &str) -> bool {
        let Some((_, entry)) = self.entries.remove(id) else {
            return false;
        };
        report_unlink(&entry, std::fs::remove_file(&entry.path));
        true
    }

    /// Deletes every entry whose expiry is at or before `now`.
    /// Returns the number of entries removed; entries whose file could not be
    /// unlinked stay registered for the next sweep.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.expires_at <= now)
            .map(|e| e.key().clone())
            .collect();

        let mut removed = 0;
        for id in expired {
            // Re-check under the shard lock: a lookup may have refreshed it.
            let Some((id, entry)) = self.entries.remove_if(&id, |_, e| e.expires_at <= now) else {
                continue;
            };
            if unlink_async(&entry).await {
                removed += 1;
            } else {
                self.entries.entry(id).or_insert(entry);
            }
        }
        removed
    }
}

async fn unlink_async(entry: &StoredFile) -> bool {
    report_unlink(entry, tokio::fs::remove_file(&entry.path).await)
}

/// Logs the unlink outcome. Returns whether the file is gone from disk.
fn report_unlink(entry: &StoredFile, result: io::Result<()>) -> bool {
    match result {
        Ok(()) => {
            debug!(file_id = %entry.id, "Deleted stored file");
            true
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(file_id = %entry.id, "Stored file was already missing from disk");
            true
        }
        Err(e) => {
            warn!(
                file_id = %entry.id,
                path = %entry.path.display(),
                "Failed to unlink stored file: {e}"
            );
            false
        }
    }
}

/// `<base36 millis>-<uuid v4>`: ordered by creation, unique under concurrency.
fn new_file_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{}-{}", to_base36(millis), Uuid::new_v4().simple())
}

fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Lowercased `.ext` of the original name, restricted to alphanumerics so a
/// client-supplied name can never influence the directory part of the path.
fn extension_suffix(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn make_store(dir: &tempfile::TempDir) -> Arc<FileStore> {
        Arc::new(FileStore::new(dir.path(), Duration::from_secs(60)).unwrap())
    }

    fn force_expiry(store: &FileStore, id: &str, at: DateTime<Utc>) {
        store.entries.get_mut(id).unwrap().expires_at = at;
    }

    #[tokio::test]
    async fn test_save_then_lookup_returns_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);
        let payload = b"%PDF-1.5 not really a pdf \x00\x01\x02";

        let saved = store.save(payload, "Resume.PDF").await.unwrap();
        let path = store.lookup(&saved.id).unwrap();

        assert_eq!(path, saved.path);
        assert_eq!(path.extension().unwrap(), "pdf");
        assert_eq!(std::fs::read(&path).unwrap(), payload);
    }

    #[tokio::test]
    async fn test_lookup_unknown_id_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);
        assert!(store.lookup("nope").is_none());
    }

    #[tokio::test]
    async fn test_lookup_slides_expiry_forward() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);
        let saved = store.save(b"x", "a.docx").await.unwrap();

        let soon = Utc::now() + chrono::Duration::seconds(1);
        force_expiry(&store, &saved.id, soon);
        store.lookup(&saved.id).unwrap();

        let refreshed = store.entries.get(&saved.id).unwrap().expires_at;
        assert!(refreshed > soon + chrono::Duration::seconds(30));
    }

    #[tokio::test]
    async fn test_delete_removes_file_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);
        let saved = store.save(b"hello", "cv.doc").await.unwrap();

        assert!(store.delete(&saved.id).await);
        assert!(!saved.path.exists());
        assert!(!store.delete(&saved.id).await);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_delete_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);
        let saved = store.save(b"hello", "cv.pdf").await.unwrap();
        std::fs::remove_file(&saved.path).unwrap();

        assert!(store.delete(&saved.id).await);
        assert!(store.lookup(&saved.id).is_none());
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);
        let stale = store.save(b"old", "old.pdf").await.unwrap();
        let fresh = store.save(b"new", "new.pdf").await.unwrap();
        force_expiry(&store, &stale.id, Utc::now() - chrono::Duration::seconds(5));

        let removed = store.sweep_expired(Utc::now()).await;

        assert_eq!(removed, 1);
        assert!(!stale.path.exists());
        assert!(fresh.path.exists());
        assert_eq!(std::fs::read(&fresh.path).unwrap(), b"new");
        assert!(store.lookup(&fresh.id).is_some());
    }

    #[tokio::test]
    async fn test_delete_after_sweep_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);
        let saved = store.save(b"bye", "cv.docx").await.unwrap();
        force_expiry(&store, &saved.id, Utc::now() - chrono::Duration::seconds(1));

        assert_eq!(store.sweep_expired(Utc::now()).await, 1);
        assert!(!store.delete(&saved.id).await);
    }

    #[tokio::test]
    async fn test_sweep_continues_past_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);
        let a = store.save(b"a", "a.pdf").await.unwrap();
        let b = store.save(b"b", "b.pdf").await.unwrap();
        std::fs::remove_file(&a.path).unwrap();
        let past = Utc::now() - chrono::Duration::seconds(1);
        force_expiry(&store, &a.id, past);
        force_expiry(&store, &b.id, past);

        assert_eq!(store.sweep_expired(Utc::now()).await, 2);
        assert!(!b.path.exists());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_sweep_keeps_entry_whose_file_cannot_be_unlinked() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);
        let saved = store.save(b"cv", "cv.pdf").await.unwrap();
        // A directory in place of the file makes remove_file fail.
        std::fs::remove_file(&saved.path).unwrap();
        std::fs::create_dir(&saved.path).unwrap();
        std::fs::write(saved.path.join("inner"), b"x").unwrap();
        force_expiry(&store, &saved.id, Utc::now() - chrono::Duration::seconds(1));

        assert_eq!(store.sweep_expired(Utc::now()).await, 0);
        assert_eq!(store.len(), 1);

        std::fs::remove_dir_all(&saved.path).unwrap();
        std::fs::write(&saved.path, b"cv").unwrap();
        assert_eq!(store.sweep_expired(Utc::now()).await, 1);
        assert!(!saved.path.exists());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_saves_never_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.save(&[i as u8], "r.pdf").await.unwrap().id })
            })
            .collect();

        let mut ids = HashSet::new();
        for h in handles {
            ids.insert(h.await.unwrap());
        }
        assert_eq!(ids.len(), 32);
        assert_eq!(store.len(), 32);
    }

    #[test]
    fn test_extension_suffix_rejects_path_tricks() {
        assert_eq!(extension_suffix("resume.DOCX"), ".docx");
        assert_eq!(extension_suffix("resume"), "");
        assert_eq!(extension_suffix("../../etc/passwd"), "");
        assert_eq!(extension_suffix("weird.p/df"), "");
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
