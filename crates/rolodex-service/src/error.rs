use std::fmt;

use rolodex_store::{ErrorKind, StoreError};
use rolodex_types::UserId;

/// The service operation a failure belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Create,
    GetById(UserId),
    GetAll,
    Update(UserId),
    Delete(UserId),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create user"),
            Self::GetById(id) => write!(f, "get user {id}"),
            Self::GetAll => write!(f, "list users"),
            Self::Update(id) => write!(f, "update user {id}"),
            Self::Delete(id) => write!(f, "delete user {id}"),
        }
    }
}

/// A repository failure annotated with the operation that hit it.
///
/// The store error is kept as the `source`, not flattened into the message.
#[derive(Debug, thiserror::Error)]
#[error("failed to {operation}")]
pub struct ServiceError {
    operation: Operation,
    #[source]
    source: StoreError,
}

impl ServiceError {
    pub fn new(operation: Operation, source: StoreError) -> Self {
        Self { operation, source }
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn store_error(&self) -> &StoreError {
        &self.source
    }

    /// Failure kind of the underlying store error.
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::RecordNotFound
    }

    pub fn into_store_error(self) -> StoreError {
        self.source
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
