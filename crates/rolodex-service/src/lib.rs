//! Service layer for rolodex.
//!
//! [`UserService`] exposes the repository operations to transports. Failures
//! are wrapped in [`ServiceError`], which names the operation that failed and
//! keeps the underlying [`StoreError`] as its source, so callers can still
//! branch on [`ErrorKind`].

pub mod error;
pub mod service;

pub use error::{Operation, ServiceError, ServiceResult};
pub use service::UserService;

pub use rolodex_store::{ErrorKind, StoreError};
pub use rolodex_types::{RequestContext, User, UserId, UserList};
