//! User record repository for rolodex.
//!
//! The whole dataset lives in one JSON document on disk:
//!
//! ```text
//! {
//!   "counter": 2,
//!   "records": {
//!     "1": { "created_at": "...", "display_name": "Alice", "email": "alice@x.com" },
//!     "2": { "created_at": "...", "display_name": "Bob", "email": "bob@x.com" }
//!   }
//! }
//! ```
//!
//! Every operation loads the document fresh, applies its mutation in memory,
//! and (for writes) rewrites the whole document. Nothing is cached between
//! calls.
//!
//! # Storage Backends
//!
//! All backends implement the [`UserRepository`] trait:
//!
//! - [`JsonFileRepository`] -- the document file on a local filesystem
//! - [`InMemoryRepository`] -- `RwLock`-guarded document for tests and embedding
//!
//! # Design Rules
//!
//! 1. The per-document lock covers the full load -> mutate -> store span.
//!    Writers are exclusive; readers may share with each other.
//! 2. The counter is bumped exactly once per successful create and never
//!    decreases, so identifiers are never reused.
//! 3. Documents are replaced atomically (temp file + rename); a reader never
//!    observes a partially written document.
//! 4. Failures keep their kind ([`ErrorKind`]) all the way up.

pub mod document;
pub mod error;
pub mod file;
mod lock;
pub mod memory;
pub mod traits;

pub use document::Document;
pub use error::{ErrorKind, StoreError, StoreResult};
pub use file::JsonFileRepository;
pub use memory::InMemoryRepository;
pub use traits::UserRepository;
