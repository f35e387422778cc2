use std::time::Duration;

use axum::http::{HeaderValue, Request};
use axum::routing::get;
use axum::Router;
use rolodex_service::UserService;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::dto::endpoints;
use crate::handler;

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub users: UserService,
}

impl AppState {
    pub fn new(users: UserService) -> Self {
        Self { users }
    }
}

/// Fills a missing `x-request-id` with a UUID v7.
#[derive(Clone, Copy, Debug, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let value = HeaderValue::from_str(&Uuid::now_v7().to_string()).ok()?;
        Some(RequestId::new(value))
    }
}

/// Build the axum router with all rolodex endpoints and middleware.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(handler::root_handler))
        .route(endpoints::HEALTH, get(handler::health_handler))
        .route(
            endpoints::USERS,
            get(handler::list_users).post(handler::create_user),
        )
        .route(
            endpoints::USER,
            get(handler::get_user)
                .patch(handler::update_user)
                .delete(handler::delete_user),
        )
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}
