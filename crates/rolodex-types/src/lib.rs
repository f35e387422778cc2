//! Foundation types for rolodex.
//!
//! Every other rolodex crate depends on `rolodex-types`.
//!
//! # Key Types
//!
//! - [`UserId`] -- decimal identifier allocated from the document counter
//! - [`User`] -- a single user record
//! - [`UserList`] -- identifier-keyed mapping of records
//! - [`RequestContext`] -- per-call context used for log correlation

pub mod context;
pub mod user;

pub use context::RequestContext;
pub use user::{User, UserId, UserList};
