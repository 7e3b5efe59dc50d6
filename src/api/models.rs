use crate::auth::{SessionStore, UserDirectory, UserId};
use crate::storage::{CookieStand, NewCookieStand, RecordStore, StoreError};
use axum::{
    Json,
    http::{StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::error;

pub type SharedStore = Arc<RwLock<Box<dyn RecordStore>>>;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub users: Arc<UserDirectory>,
    pub sessions: Arc<SessionStore>,
    pub login_url: Arc<str>,
}

impl AppState {
    pub fn new(
        store: Box<dyn RecordStore>,
        users: UserDirectory,
        sessions: SessionStore,
        login_url: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            users: Arc::new(users),
            sessions: Arc::new(sessions),
            login_url: login_url.into(),
        }
    }
}

/// Cookie stand as exposed over JSON
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CookieStandResponse {
    pub id: u64,
    pub name: String,
    pub rating: i32,
    pub description: String,
    pub reviewer: UserId,
    pub reviewer_username: Option<String>,
}

impl CookieStandResponse {
    pub fn from_record(record: CookieStand, users: &UserDirectory) -> Self {
        Self {
            reviewer_username: users.username_of(record.reviewer).map(str::to_string),
            id: record.id,
            name: record.name,
            rating: record.rating,
            description: record.description,
            reviewer: record.reviewer,
        }
    }
}

/// Collection payload
#[derive(Debug, Serialize, Deserialize)]
pub struct CookieStandListResponse {
    pub cookie_stands: Vec<CookieStandResponse>,
}

impl CookieStandListResponse {
    pub fn from_records(records: Vec<CookieStand>, users: &UserDirectory) -> Self {
        Self {
            cookie_stands: records
                .into_iter()
                .map(|r| CookieStandResponse::from_record(r, users))
                .collect(),
        }
    }
}

/// Body of a create or full update
#[derive(Debug, Deserialize)]
pub struct CookieStandRequest {
    /// Defaults to the caller
    pub reviewer: Option<UserId>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub rating: i32,
}

impl CookieStandRequest {
    /// Resolve the reviewer and build the store input
    pub fn into_new(self, caller: UserId, users: &UserDirectory) -> Result<NewCookieStand, AppError> {
        let reviewer = self.reviewer.unwrap_or(caller);
        if users.get(reviewer).is_none() {
            return Err(AppError::BadRequest(format!("Unknown reviewer {}", reviewer)));
        }
        Ok(NewCookieStand {
            reviewer,
            name: self.name,
            description: self.description,
            rating: self.rating,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub username: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub total_cookie_stands: usize,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Authentication credentials were not provided")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AppError::NotFound(err.to_string()),
            StoreError::Validation(msg) => AppError::BadRequest(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: self.to_string(),
        });

        if matches!(self, AppError::Unauthenticated) {
            return (status, [(WWW_AUTHENTICATE, "Bearer")], body).into_response();
        }
        (status, body).into_response()
    }
}
