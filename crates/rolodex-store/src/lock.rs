//! Process-wide registry of per-document locks.
//!
//! Repositories opened separately over the same file must still serialize
//! against each other, so the lock belongs to the document path rather than
//! to the repository value.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock, Weak};

type Registry = Mutex<HashMap<PathBuf, Weak<RwLock<()>>>>;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// The lock shared by every repository bound to `key`.
///
/// `key` must already be canonical so that different spellings of one path
/// resolve to the same entry.
pub(crate) fn document_lock(key: &Path) -> Arc<RwLock<()>> {
    let mut registry = REGISTRY
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    if let Some(lock) = registry.get(key).and_then(Weak::upgrade) {
        return lock;
    }

    registry.retain(|_, weak| weak.strong_count() > 0);
    let lock = Arc::new(RwLock::new(()));
    registry.insert(key.to_path_buf(), Arc::downgrade(&lock));
    lock
}
