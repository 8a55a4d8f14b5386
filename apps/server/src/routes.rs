//! `/api_v1` route handlers
//!
//! - `/registrate` - Register a new user
//! - `/login` - Check email and password
//! - `/me` - Current user, authenticated with HTTP Basic
//! - `/logout` - Stateless acknowledgement

use axum::{
    extract::State,
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use tracing::{info, warn};
use user_registry::RegistryError;

use crate::{
    dto::{EmptyResponse, LoginRequest, RegisterRequest, UserResponse},
    error::{ApiError, ApiResult},
    middleware::{basic_auth_middleware, AuthenticatedUser},
    state::AppState,
};

/// Creates the `/api_v1` router
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(me).post(me))
        .route_layer(middleware::from_fn_with_state(state, basic_auth_middleware));

    Router::new()
        .route("/registrate", post(registrate))
        .route("/login", post(login))
        .route("/logout", put(logout))
        .merge(protected)
}

/// Registers a new user
pub async fn registrate(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> ApiResult<Json<EmptyResponse>> {
    let email = request.email.clone();

    state
        .registry
        .create_user(request.into())
        .await
        .inspect_err(|e| log_failure(e, &email, "User was not created"))?;

    info!(email = %email, "User created");
    Ok(Json(EmptyResponse {}))
}

/// Checks an email/password pair
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> ApiResult<Json<EmptyResponse>> {
    let email = request.email.clone();

    state
        .registry
        .authenticate(request.into())
        .await
        .inspect_err(|e| log_failure(e, &email, "User not logged in"))?;

    info!(email = %email, "User logged in");
    Ok(Json(EmptyResponse {}))
}

/// Denials are ordinary outcomes; anything else means the registry misbehaved
fn log_failure(error: &RegistryError, email: &str, message: &str) {
    if error.is_denial() {
        info!(email = %email, error = %error, "{}", message);
    } else {
        warn!(email = %email, error = %error, "{}", message);
    }
}

/// Returns the authenticated user's record, without the password
pub async fn me(
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Json<UserResponse> {
    Json(user.into())
}

/// Logs out the current user.
///
/// Authentication is stateless Basic auth, so there is nothing to invalidate.
pub async fn logout() -> Json<EmptyResponse> {
    info!("User logged out");
    Json(EmptyResponse {})
}
