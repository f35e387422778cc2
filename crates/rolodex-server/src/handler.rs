use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use chrono::{SecondsFormat, Utc};
use rolodex_service::{RequestContext, ServiceResult, User, UserId, UserList};
use tracing::error;

use crate::dto::{CreateUserRequest, CreateUserResponse, HealthResponse, UpdateUserRequest};
use crate::error::ApiError;
use crate::router::AppState;

pub(crate) const REQUEST_ID_HEADER: &str = "x-request-id";

/// Current server time.
pub async fn root_handler() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserList>, ApiError> {
    let ctx = request_context(&headers);
    let users = blocking(move || state.users.get_all(&ctx)).await?;
    Ok(Json(users))
}

pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    let Json(req) = payload.map_err(invalid_body)?;
    let ctx = request_context(&headers);
    let user = blocking(move || state.users.create(&ctx, &req.display_name, &req.email)).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            user_id: user.id.to_string(),
        }),
    ))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<User>, ApiError> {
    let ctx = request_context(&headers);
    let id = UserId::new(id);
    let user = blocking(move || state.users.get_by_id(&ctx, &id)).await?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = payload.map_err(invalid_body)?;
    let ctx = request_context(&headers);
    let id = UserId::new(id);
    blocking(move || state.users.update(&ctx, &id, &req.display_name)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let ctx = request_context(&headers);
    let id = UserId::new(id);
    blocking(move || state.users.delete(&ctx, &id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Context for the current request, keyed by the `x-request-id` header the
/// request-id middleware guarantees.
fn request_context(headers: &HeaderMap) -> RequestContext {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(RequestContext::with_request_id)
        .unwrap_or_default()
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
    ApiError::InvalidRequest(rejection.body_text())
}

/// Run a blocking service call off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => {
            error!(error = %e, "blocking user operation did not complete");
            Err(ApiError::Internal)
        }
    }
}
