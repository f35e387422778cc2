use std::sync::Arc;

use rolodex_store::{StoreError, UserRepository};
use rolodex_types::{RequestContext, User, UserId, UserList};
use tracing::{debug, warn};

use crate::error::{Operation, ServiceError, ServiceResult};

/// User operations exposed to transports.
///
/// Delegates straight to the repository. Cloning is cheap; clones share the
/// repository.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub fn create(
        &self,
        ctx: &RequestContext,
        display_name: &str,
        email: &str,
    ) -> ServiceResult<User> {
        self.repo
            .create(ctx, display_name, email)
            .map_err(|e| wrap(ctx, Operation::Create, e))
    }

    pub fn get_by_id(&self, ctx: &RequestContext, id: &UserId) -> ServiceResult<User> {
        self.repo
            .get_by_id(ctx, id)
            .map_err(|e| wrap(ctx, Operation::GetById(id.clone()), e))
    }

    pub fn get_all(&self, ctx: &RequestContext) -> ServiceResult<UserList> {
        self.repo
            .get_all(ctx)
            .map_err(|e| wrap(ctx, Operation::GetAll, e))
    }

    pub fn update(
        &self,
        ctx: &RequestContext,
        id: &UserId,
        display_name: &str,
    ) -> ServiceResult<()> {
        self.repo
            .update(ctx, id, display_name)
            .map_err(|e| wrap(ctx, Operation::Update(id.clone()), e))
    }

    pub fn delete(&self, ctx: &RequestContext, id: &UserId) -> ServiceResult<()> {
        self.repo
            .delete(ctx, id)
            .map_err(|e| wrap(ctx, Operation::Delete(id.clone()), e))
    }
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}

fn wrap(ctx: &RequestContext, operation: Operation, source: StoreError) -> ServiceError {
    if source.is_not_found() {
        debug!(request_id = ctx.request_id(), %operation, "user not found");
    } else {
        warn!(
            request_id = ctx.request_id(),
            %operation,
            kind = %source.kind(),
            "user operation failed"
        );
    }
    ServiceError::new(operation, source)
}
