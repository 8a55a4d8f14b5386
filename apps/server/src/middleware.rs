//! Basic authentication middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Basic, Authorization, HeaderMapExt};
use tracing::{debug, warn};
use user_registry::{Credentials, RegistryError, UserRecord};

use crate::{error::ApiError, state::AppState};

/// The user whose Basic credentials were accepted for this request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserRecord);

/// Extracts Basic credentials from the Authorization header, if well formed
fn extract_credentials(request: &Request) -> Option<Credentials> {
    request
        .headers()
        .typed_get::<Authorization<Basic>>()
        .map(|Authorization(basic)| Credentials::new(basic.username(), basic.password()))
}

/// Authentication middleware.
///
/// Validates the Basic credentials through the registry's authenticate
/// command, then fetches the caller's record and stores it in the request
/// extensions as [`AuthenticatedUser`]. Both steps go through the same
/// serialized processor as every other command.
pub async fn basic_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(credentials) = extract_credentials(&request) else {
        debug!("No Basic credentials provided");
        return Err(ApiError::Unauthorized);
    };

    let username = credentials.username.clone();

    match state.registry.authenticate(credentials).await {
        Ok(()) => {}
        Err(RegistryError::AuthenticationFailed) => {
            debug!(username = %username, "Basic authentication failed");
            return Err(ApiError::Unauthorized);
        }
        Err(e) => return Err(e.into()),
    }

    let user = match state.registry.lookup(username.as_str()).await? {
        Some(user) => user,
        None => {
            warn!(username = %username, "Authenticated user has no record");
            return Err(ApiError::Unauthorized);
        }
    };

    debug!(user_id = %user.id, "Authenticated user");
    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}
