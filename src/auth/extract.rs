use crate::api::models::{AppError, AppState};
use crate::auth::User;
use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap, StatusCode,
        header::{ACCEPT, AUTHORIZATION, COOKIE, LOCATION},
        request::Parts,
    },
    response::{IntoResponse, Response},
};
use tracing::debug;

/// Cookie carrying the browser session token
pub const SESSION_COOKIE: &str = "sessionid";

/// Session token from `Authorization: Bearer` or the session cookie
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Whether the client asked for JSON rather than a page
pub fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}

async fn authenticate(parts: &Parts, state: &AppState) -> Option<User> {
    let token = session_token(&parts.headers)?;
    let user_id = state.sessions.resolve(&token).await?;
    state.users.get(user_id).cloned()
}

/// Authenticated caller of an API route
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match authenticate(parts, state).await {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                debug!(path = %parts.uri.path(), "Rejected unauthenticated API request");
                Err(AppError::Unauthenticated)
            }
        }
    }
}

/// Authenticated caller of a page route.
///
/// Browsers are sent to the login page; JSON clients get a 401.
#[derive(Debug, Clone)]
pub struct LoginRequired(pub User);

pub enum LoginRejection {
    Redirect(String),
    Unauthenticated,
}

impl IntoResponse for LoginRejection {
    fn into_response(self) -> Response {
        match self {
            LoginRejection::Redirect(location) => {
                (StatusCode::FOUND, [(LOCATION, location)]).into_response()
            }
            LoginRejection::Unauthenticated => AppError::Unauthenticated.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for LoginRequired {
    type Rejection = LoginRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = authenticate(parts, state).await {
            return Ok(LoginRequired(user));
        }

        if wants_json(&parts.headers) {
            return Err(LoginRejection::Unauthenticated);
        }

        let next = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        debug!(next, "Redirecting anonymous visitor to login");
        Err(LoginRejection::Redirect(format!(
            "{}?next={}",
            state.login_url,
            urlencoding::encode(next)
        )))
    }
}
