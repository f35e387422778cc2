use std::path::Path;

use chrono::{DateTime, Utc};
use rolodex_types::{User, UserId, UserList};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// The complete on-disk dataset.
///
/// `counter` holds the last allocated identifier; `records` maps each id to
/// its record. Older documents that used `increment`/`list` as key names are
/// still accepted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(alias = "increment")]
    pub counter: u64,
    #[serde(default, alias = "list")]
    pub records: UserList,
}

impl Document {
    /// An empty document with the counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a document read from `origin`.
    ///
    /// Restores every record's `id` from its key and rejects documents whose
    /// counter is behind one of their numeric ids, since allocating from such
    /// a counter would hand out an id that is already taken.
    pub fn decode(bytes: &[u8], origin: &Path) -> StoreResult<Self> {
        let mut doc: Document =
            serde_json::from_slice(bytes).map_err(|e| StoreError::corrupt(origin, e))?;

        for (key, user) in doc.records.iter_mut() {
            user.id = key.clone();
        }

        if let Some(max) = doc.max_numeric_id() {
            if max > doc.counter {
                return Err(StoreError::corrupt(
                    origin,
                    format!("counter {} is behind issued id {max}", doc.counter),
                ));
            }
        }

        Ok(doc)
    }

    /// Encode the document for writing to `origin`.
    pub fn encode(&self, origin: &Path) -> StoreResult<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| StoreError::corrupt(origin, e))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Bump the counter and return the identifier for its new value.
    ///
    /// Returns `None` once the counter is exhausted; the counter is left
    /// unchanged in that case.
    pub fn allocate_id(&mut self) -> Option<UserId> {
        let next = self.counter.checked_add(1)?;
        self.counter = next;
        Some(UserId::from_counter(next))
    }

    /// Allocate an id and insert a new record stamped with `created_at`.
    ///
    /// Fails with `Corrupt` if the counter is exhausted or the next id is
    /// already held by a record. The document is unchanged on failure.
    pub fn create_user(
        &mut self,
        origin: &Path,
        display_name: &str,
        email: &str,
        created_at: DateTime<Utc>,
    ) -> StoreResult<User> {
        let next = self
            .counter
            .checked_add(1)
            .ok_or_else(|| StoreError::corrupt(origin, "identifier counter exhausted"))?;
        let id = UserId::from_counter(next);
        if self.records.contains_key(&id) {
            return Err(StoreError::corrupt(
                origin,
                format!("counter {} would reissue id {id}", self.counter),
            ));
        }
        self.counter = next;
        let user = User::new(id.clone(), created_at, display_name, email);
        self.records.insert(id, user.clone());
        Ok(user)
    }

    pub fn user(&self, id: &UserId) -> StoreResult<User> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    pub fn rename_user(&mut self, id: &UserId, display_name: &str) -> StoreResult<()> {
        let user = self
            .records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        user.display_name = display_name.to_string();
        Ok(())
    }

    pub fn remove_user(&mut self, id: &UserId) -> StoreResult<User> {
        self.records
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn max_numeric_id(&self) -> Option<u64> {
        self.records
            .keys()
            .filter_map(|id| id.as_str().parse::<u64>().ok())
            .max()
    }
}
