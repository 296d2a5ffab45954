#[cfg(test)]
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::{FileStore, SavedFile};

/// Scoped ownership of a stored upload.
///
/// Call [`release`](Self::release) on the happy path. If the guard is
/// dropped instead (an early `?` return, or the handler future being dropped
/// because the client went away), the record and file are removed
/// synchronously in `Drop`.
pub struct StoredFileGuard {
    store: Arc<FileStore>,
    saved: SavedFile,
    released: bool,
}

impl StoredFileGuard {
    pub(super) fn new(store: Arc<FileStore>, saved: SavedFile) -> Self {
        Self {
            store,
            saved,
            released: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.saved.id
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.saved.path
    }

    /// Deletes the stored file. Returns whether the store still held it.
    pub async fn release(mut self) -> bool {
        self.released = true;
        self.store.delete(&self.saved.id).await
    }
}

impl Drop for StoredFileGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if self.store.delete_blocking(&self.saved.id) {
            debug!(file_id = %self.saved.id, "Released stored file on drop");
        }
    }
}
