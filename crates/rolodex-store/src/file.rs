use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use rolodex_types::{RequestContext, User, UserId, UserList};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::document::Document;
use crate::error::{StoreError, StoreResult};
use crate::lock::document_lock;
use crate::traits::UserRepository;

/// Repository backed by a single JSON document file.
///
/// Every call reads the file, applies its change to the decoded
/// [`Document`], and for writes replaces the file with the new document.
/// The per-document lock is held for that whole span: `create`, `update`
/// and `delete` take it exclusively, `get_by_id` and `get_all` share it.
///
/// The file is replaced by writing a temporary file in the same directory,
/// syncing it, and renaming it over the original, so a crash mid-write
/// leaves either the old or the new document behind.
///
/// A path that is a symlink is resolved once at open time; reads, writes
/// and the lock all go to the link's target, and the link is left in place.
pub struct JsonFileRepository {
    path: PathBuf,
    staging_dir: PathBuf,
    lock: Arc<RwLock<()>>,
}

impl JsonFileRepository {
    /// Bind to an existing document file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        fs::metadata(path).map_err(|e| StoreError::unavailable(path, e))?;
        let repo = Self::bind(path)?;
        debug!(path = %repo.path.display(), "opened user store");
        Ok(repo)
    }

    /// Bind to a document file, first writing an empty document if none
    /// exists. Missing parent directories are created.
    pub fn open_or_init(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = parent_dir(path) {
            fs::create_dir_all(parent).map_err(|e| StoreError::unavailable(path, e))?;
        }
        let repo = Self::bind(path)?;
        repo.init()?;
        Ok(repo)
    }

    fn bind(path: &Path) -> StoreResult<Self> {
        let target = resolve(path)?;
        let staging_dir = parent_dir(&target)
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        Ok(Self {
            lock: document_lock(&target),
            path: target,
            staging_dir,
        })
    }

    /// Resolved path of the document file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write an empty document unless one already exists.
    ///
    /// Returns `true` if a new document was written.
    pub fn init(&self) -> StoreResult<bool> {
        let _guard = self.write_guard();
        let exists = self
            .path
            .try_exists()
            .map_err(|e| StoreError::unavailable(&self.path, e))?;
        if exists {
            return Ok(false);
        }
        self.store(&Document::new())?;
        debug!(path = %self.path.display(), "initialized empty user store");
        Ok(true)
    }

    fn load(&self) -> StoreResult<Document> {
        let bytes = fs::read(&self.path).map_err(|e| StoreError::unavailable(&self.path, e))?;
        Document::decode(&bytes, &self.path)
    }

    fn store(&self, doc: &Document) -> StoreResult<()> {
        let bytes = doc.encode(&self.path)?;
        write_atomic(&self.staging_dir, &self.path, &bytes)
            .map_err(|e| StoreError::unavailable(&self.path, e))
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read().unwrap_or_else(|poisoned| {
            warn!(path = %self.path.display(), "recovering poisoned store lock");
            poisoned.into_inner()
        })
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().unwrap_or_else(|poisoned| {
            warn!(path = %self.path.display(), "recovering poisoned store lock");
            poisoned.into_inner()
        })
    }

    /// Load under the shared lock.
    fn inspect<T>(&self, f: impl FnOnce(Document) -> StoreResult<T>) -> StoreResult<T> {
        let _guard = self.read_guard();
        f(self.load()?)
    }

    /// Load, mutate and store under the exclusive lock.
    ///
    /// Nothing is written if `f` fails.
    fn mutate<T>(&self, f: impl FnOnce(&mut Document) -> StoreResult<T>) -> StoreResult<T> {
        let _guard = self.write_guard();
        let mut doc = self.load()?;
        let out = f(&mut doc)?;
        self.store(&doc)?;
        Ok(out)
    }
}

impl UserRepository for JsonFileRepository {
    fn create(&self, ctx: &RequestContext, display_name: &str, email: &str) -> StoreResult<User> {
        let user = self.mutate(|doc| doc.create_user(&self.path, display_name, email, Utc::now()))?;
        debug!(request_id = ctx.request_id(), user_id = %user.id, "created user");
        Ok(user)
    }

    fn get_by_id(&self, ctx: &RequestContext, id: &UserId) -> StoreResult<User> {
        debug!(request_id = ctx.request_id(), user_id = %id, "get user");
        self.inspect(|doc| doc.user(id))
    }

    fn get_all(&self, ctx: &RequestContext) -> StoreResult<UserList> {
        let users = self.inspect(|doc| Ok(doc.records))?;
        debug!(request_id = ctx.request_id(), count = users.len(), "listed users");
        Ok(users)
    }

    fn update(&self, ctx: &RequestContext, id: &UserId, display_name: &str) -> StoreResult<()> {
        self.mutate(|doc| doc.rename_user(id, display_name))?;
        debug!(request_id = ctx.request_id(), user_id = %id, "updated user");
        Ok(())
    }

    fn delete(&self, ctx: &RequestContext, id: &UserId) -> StoreResult<()> {
        self.mutate(|doc| doc.remove_user(id).map(|_| ()))?;
        debug!(request_id = ctx.request_id(), user_id = %id, "deleted user");
        Ok(())
    }
}

impl std::fmt::Debug for JsonFileRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileRepository")
            .field("path", &self.path)
            .finish()
    }
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

/// Resolve `path` to the file that reads, writes and the lock key refer to.
///
/// An existing path is canonicalized, following symlinks. A dangling symlink
/// is followed to the file it names. Otherwise the canonical parent directory
/// is joined with the file name, so the file itself need not exist yet.
fn resolve(path: &Path) -> StoreResult<PathBuf> {
    match fs::canonicalize(path) {
        Ok(resolved) => return Ok(resolved),
        Err(e) if e.kind() != io::ErrorKind::NotFound => {
            return Err(StoreError::unavailable(path, e));
        }
        Err(_) => {}
    }

    if let Ok(meta) = fs::symlink_metadata(path) {
        if meta.file_type().is_symlink() {
            let link = fs::read_link(path).map_err(|e| StoreError::unavailable(path, e))?;
            let parent = parent_dir(path).unwrap_or_else(|| Path::new("."));
            return resolve(&parent.join(link));
        }
    }

    let file_name = path.file_name().ok_or_else(|| {
        StoreError::unavailable(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "store path has no file name"),
        )
    })?;
    let parent = parent_dir(path).unwrap_or_else(|| Path::new("."));
    let parent = parent
        .canonicalize()
        .map_err(|e| StoreError::unavailable(path, e))?;
    Ok(parent.join(file_name))
}

/// Replace `path` with `bytes` via a synced temporary file in `dir` and a
/// rename. Permissions of an existing file are carried over.
fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;

    match fs::metadata(path) {
        Ok(meta) => tmp.as_file().set_permissions(meta.permissions())?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
