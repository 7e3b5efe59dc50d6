use crate::api::models::*;
use crate::auth::{LoginRequired, SESSION_COOKIE, session_token, wants_json};
use crate::web::templates::{Template, render};
use crate::web::views::{CookieStandDetailPage, CookieStandListPage, CookieStandView, LoginPage};
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::{
        HeaderMap, StatusCode,
        header::{LOCATION, SET_COOKIE},
    },
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

fn page<T: Template>(view: &T, username: &str) -> Html<String> {
    Html(render(view, Some(username)))
}

/// Only same-site paths are valid post-login targets.
///
/// Browsers read `\` as `/`, so `/\host` is as absolute as `//host`.
/// Control characters are refused outright; they are not valid in a
/// `Location` header either.
fn safe_next(next: Option<&str>) -> String {
    let is_local = |path: &str| {
        path.starts_with('/')
            && !path[1..].starts_with('/')
            && !path.contains('\\')
            && !path.chars().any(char::is_control)
    };
    match next {
        Some(path) if is_local(path) => path.to_string(),
        _ => "/".to_string(),
    }
}

pub async fn list_page(
    LoginRequired(user): LoginRequired,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let records = state.store.read().await.list();

    if wants_json(&headers) {
        return Json(CookieStandListResponse::from_records(records, &state.users)).into_response();
    }

    let view = CookieStandListPage::new(records, &state.users);
    page(&view, &user.username).into_response()
}

pub async fn detail_page(
    LoginRequired(user): LoginRequired,
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let record = state.store.read().await.get(id)?;

    if wants_json(&headers) {
        return Ok(Json(CookieStandResponse::from_record(record, &state.users)).into_response());
    }

    let view = CookieStandDetailPage {
        cookie_stand: CookieStandView::new(record, &state.users),
    };
    Ok(page(&view, &user.username).into_response())
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

pub async fn login_form(Query(query): Query<LoginQuery>) -> Html<String> {
    let view = LoginPage {
        next: safe_next(query.next.as_deref()),
        ..LoginPage::default()
    };
    Html(render(&view, None))
}

pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let next = safe_next(form.next.as_deref());

    let Some(user) = state.users.authenticate(&form.username, &form.password) else {
        warn!(username = %form.username, "Login failed");
        let view = LoginPage {
            next,
            username: form.username,
            error: Some("Please enter a correct username and password.".to_string()),
        };
        return (StatusCode::UNAUTHORIZED, Html(render(&view, None))).into_response();
    };

    let token = state.sessions.create(user.id).await;
    info!(username = %user.username, "User logged in");

    let cookie = format!("{}={}; HttpOnly; Path=/; SameSite=Lax", SESSION_COOKIE, token);
    ([(SET_COOKIE, cookie)], Redirect::to(&next)).into_response()
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        if state.sessions.revoke(&token).await {
            info!("User logged out");
        }
    }

    let cleared = format!("{}=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax", SESSION_COOKIE);
    (
        StatusCode::FOUND,
        [(SET_COOKIE, cleared), (LOCATION, state.login_url.to_string())],
    )
        .into_response()
}
