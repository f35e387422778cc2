use rolodex_types::{RequestContext, User, UserId, UserList};

use crate::error::StoreResult;

/// Persistence boundary for user records.
///
/// All implementations must satisfy these invariants:
/// - Each call observes a consistent document: the load, the mutation and the
///   write-back of one call never interleave with a concurrent writer.
/// - `create` bumps the counter exactly once and uses the new value as the id.
/// - Identifiers are never reused, even after `delete`.
/// - Lookups of unknown ids fail with [`StoreError::NotFound`](crate::StoreError::NotFound).
///
/// Calls are blocking. Async callers should run them on a blocking pool.
pub trait UserRepository: Send + Sync {
    /// Allocate a new id, stamp `created_at` with the current time, and
    /// persist the new record.
    fn create(&self, ctx: &RequestContext, display_name: &str, email: &str) -> StoreResult<User>;

    /// Look up a single record.
    fn get_by_id(&self, ctx: &RequestContext, id: &UserId) -> StoreResult<User>;

    /// Every record in the document. May be empty.
    fn get_all(&self, ctx: &RequestContext) -> StoreResult<UserList>;

    /// Replace the display name of an existing record. `email` and
    /// `created_at` are left untouched.
    fn update(&self, ctx: &RequestContext, id: &UserId, display_name: &str) -> StoreResult<()>;

    /// Remove a record. Its id stays retired.
    fn delete(&self, ctx: &RequestContext, id: &UserId) -> StoreResult<()>;
}
