use crate::api::models::*;
use crate::auth::CurrentUser;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

pub async fn list_handler(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Json<CookieStandListResponse> {
    let records = state.store.read().await.list();
    Json(CookieStandListResponse::from_records(records, &state.users))
}

pub async fn detail_handler(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<CookieStandResponse>, AppError> {
    let record = state.store.read().await.get(id)?;
    Ok(Json(CookieStandResponse::from_record(record, &state.users)))
}

pub async fn create_handler(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(request): Json<CookieStandRequest>,
) -> Result<(StatusCode, Json<CookieStandResponse>), AppError> {
    let new = request.into_new(user.id, &state.users)?;
    let record = state.store.write().await.create(new)?;

    info!(id = record.id, reviewer = record.reviewer, "Cookie stand created");

    Ok((
        StatusCode::CREATED,
        Json(CookieStandResponse::from_record(record, &state.users)),
    ))
}

pub async fn update_handler(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<CookieStandRequest>,
) -> Result<Json<CookieStandResponse>, AppError> {
    let record = {
        let mut store = state.store.write().await;
        let existing = store.get(id)?;
        if existing.reviewer != user.id {
            return Err(AppError::Forbidden(
                "Only the reviewer may change this cookie stand".to_string(),
            ));
        }
        let new = request.into_new(user.id, &state.users)?;
        store.update(id, new)?
    };

    info!(id, "Cookie stand updated");

    Ok(Json(CookieStandResponse::from_record(record, &state.users)))
}

pub async fn delete_handler(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    {
        let mut store = state.store.write().await;
        let existing = store.get(id)?;
        if existing.reviewer != user.id {
            return Err(AppError::Forbidden(
                "Only the reviewer may delete this cookie stand".to_string(),
            ));
        }
        store.delete(id)?;
    }

    info!(id, "Cookie stand deleted");

    Ok(StatusCode::NO_CONTENT)
}
