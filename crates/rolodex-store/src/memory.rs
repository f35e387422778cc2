use std::path::Path;
use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use rolodex_types::{RequestContext, User, UserId, UserList};
use tracing::debug;

use crate::document::Document;
use crate::error::StoreResult;
use crate::traits::UserRepository;

/// Origin reported in errors raised by the in-memory backend.
const MEMORY_ORIGIN: &str = ":memory:";

/// In-memory repository holding one [`Document`] behind a `RwLock`.
///
/// Intended for tests and embedding. Same contract as
/// [`JsonFileRepository`](crate::JsonFileRepository), minus durability.
pub struct InMemoryRepository {
    document: RwLock<Document>,
}

impl InMemoryRepository {
    /// Create a repository over an empty document.
    pub fn new() -> Self {
        Self::from_document(Document::new())
    }

    /// Create a repository seeded with `document`.
    pub fn from_document(document: Document) -> Self {
        Self {
            document: RwLock::new(document),
        }
    }

    /// A copy of the current document.
    pub fn snapshot(&self) -> Document {
        self.document
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.document
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRepository for InMemoryRepository {
    fn create(&self, ctx: &RequestContext, display_name: &str, email: &str) -> StoreResult<User> {
        let mut doc = self.document.write().unwrap_or_else(PoisonError::into_inner);
        let user = doc.create_user(Path::new(MEMORY_ORIGIN), display_name, email, Utc::now())?;
        debug!(request_id = ctx.request_id(), user_id = %user.id, "created user");
        Ok(user)
    }

    fn get_by_id(&self, _ctx: &RequestContext, id: &UserId) -> StoreResult<User> {
        let doc = self.document.read().unwrap_or_else(PoisonError::into_inner);
        doc.user(id)
    }

    fn get_all(&self, _ctx: &RequestContext) -> StoreResult<UserList> {
        let doc = self.document.read().unwrap_or_else(PoisonError::into_inner);
        Ok(doc.records.clone())
    }

    fn update(&self, ctx: &RequestContext, id: &UserId, display_name: &str) -> StoreResult<()> {
        let mut doc = self.document.write().unwrap_or_else(PoisonError::into_inner);
        doc.rename_user(id, display_name)?;
        debug!(request_id = ctx.request_id(), user_id = %id, "updated user");
        Ok(())
    }

    fn delete(&self, ctx: &RequestContext, id: &UserId) -> StoreResult<()> {
        let mut doc = self.document.write().unwrap_or_else(PoisonError::into_inner);
        doc.remove_user(id)?;
        debug!(request_id = ctx.request_id(), user_id = %id, "deleted user");
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("record_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    fn ctx() -> RequestContext {
        RequestContext::with_request_id("test")
    }

    #[test]
    fn ids_start_at_one() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.create(&ctx(), "Alice", "alice@x.com").unwrap().id.as_str(), "1");
        assert_eq!(repo.create(&ctx(), "Bob", "bob@x.com").unwrap().id.as_str(), "2");
        assert_eq!(repo.snapshot().counter, 2);
    }

    #[test]
    fn get_all_on_empty_store() {
        let repo = InMemoryRepository::default();
        assert!(repo.get_all(&ctx()).unwrap().is_empty());
        assert!(repo.is_empty());
    }

    #[test]
    fn seeded_document_continues_counter() {
        let repo = InMemoryRepository::from_document(Document {
            counter: 41,
            records: UserList::new(),
        });
        assert_eq!(repo.create(&ctx(), "A", "a@x").unwrap().id.as_str(), "42");
    }

    #[test]
    fn exhausted_counter_is_corrupt() {
        let repo = InMemoryRepository::from_document(Document {
            counter: u64::MAX,
            records: UserList::new(),
        });
        let err = repo.create(&ctx(), "A", "a@x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StoreCorrupt);
        assert!(err.to_string().contains(MEMORY_ORIGIN));
    }

    #[test]
    fn lagging_counter_does_not_overwrite_records() {
        let mut seeded = Document::new();
        seeded
            .create_user(Path::new(MEMORY_ORIGIN), "Alice", "alice@x.com", Utc::now())
            .unwrap();
        seeded.counter = 0;
        let repo = InMemoryRepository::from_document(seeded);

        let err = repo.create(&ctx(), "Bob", "bob@x.com").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StoreCorrupt);
        let alice = repo.get_by_id(&ctx(), &UserId::from("1")).unwrap();
        assert_eq!(alice.display_name, "Alice");
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.snapshot().counter, 0);
    }

    #[test]
    fn delete_then_lookup_fails() {
        let repo = InMemoryRepository::new();
        let user = repo.create(&ctx(), "Alice", "alice@x.com").unwrap();
        repo.delete(&ctx(), &user.id).unwrap();
        assert!(repo.get_by_id(&ctx(), &user.id).unwrap_err().is_not_found());
        assert!(!repo.get_all(&ctx()).unwrap().contains_key(&user.id));
    }

    #[test]
    fn concurrent_creates_get_distinct_ids() {
        let repo = Arc::new(InMemoryRepository::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = Arc::clone(&repo);
                thread::spawn(move || {
                    (0..50)
                        .map(|_| repo.create(&ctx(), "x", "x@x").unwrap().id)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let ids: HashSet<UserId> = handles
            .into_iter()
            .flat_map(|h| h.join().expect("thread should not panic"))
            .collect();
        assert_eq!(ids.len(), 400);
        assert_eq!(repo.len(), 400);
    }

    #[test]
    fn debug_format() {
        let repo = InMemoryRepository::new();
        repo.create(&ctx(), "x", "x@x").unwrap();
        let debug = format!("{repo:?}");
        assert!(debug.contains("InMemoryRepository"));
        assert!(debug.contains("record_count"));
    }

    #[derive(Clone, Debug)]
    enum Op {
        Create,
        DeleteNth(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![Just(Op::Create), any::<usize>().prop_map(Op::DeleteNth)]
    }

    proptest! {
        #[test]
        fn identifiers_are_never_reused(ops in proptest::collection::vec(op(), 1..64)) {
            let repo = InMemoryRepository::new();
            let mut issued: HashSet<UserId> = HashSet::new();
            let mut last_counter = 0u64;

            for op in ops {
                match op {
                    Op::Create => {
                        let user = repo.create(&ctx(), "u", "u@x").unwrap();
                        prop_assert!(issued.insert(user.id.clone()), "id {} reused", user.id);
                    }
                    Op::DeleteNth(n) => {
                        let live: Vec<UserId> = repo.get_all(&ctx()).unwrap().into_keys().collect();
                        if !live.is_empty() {
                            let id = &live[n % live.len()];
                            repo.delete(&ctx(), id).unwrap();
                            prop_assert!(repo.get_by_id(&ctx(), id).unwrap_err().is_not_found());
                        }
                    }
                }
                let counter = repo.snapshot().counter;
                prop_assert!(counter >= last_counter);
                last_counter = counter;
            }

            prop_assert_eq!(last_counter, issued.len() as u64);
        }
    }
}
