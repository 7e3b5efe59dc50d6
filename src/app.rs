use crate::api::{self, AppState, health_handler};
use crate::web;
use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Full application router
pub fn build_router(state: AppState, enable_cors: bool) -> Router {
    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(web::routes())
        .merge(api::cookie_stands::routes())
        .merge(api::accounts::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{CookieStandListResponse, CookieStandResponse, HealthResponse, TokenResponse};
    use crate::auth::{SessionStore, UserDirectory};
    use crate::storage::{MemoryStore, NewCookieStand, RecordStore};
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
        response::Response,
    };
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;

    struct Harness {
        router: Router,
        state: AppState,
    }

    impl Harness {
        /// "tester" (id 1) owns "pickle"; "testuser1" (id 2) owns nothing yet
        fn new() -> Self {
            let mut users = UserDirectory::new();
            let tester = users.add("tester", "pass").unwrap();
            users.add("testuser1", "pass").unwrap();

            let mut store = MemoryStore::new();
            store
                .create(NewCookieStand::new(tester, "pickle", "pickle description").with_rating(1))
                .unwrap();

            let state = AppState::new(
                Box::new(store),
                users,
                SessionStore::new(Duration::from_secs(60)),
                "/accounts/login/",
            );
            Self {
                router: build_router(state.clone(), false),
                state,
            }
        }

        async fn token_for(&self, username: &str) -> String {
            let id = self.state.users.find(username).unwrap().id;
            self.state.sessions.create(id).await
        }

        async fn send(&self, request: Request<Body>) -> Response {
            self.router.clone().oneshot(request).await.unwrap()
        }
    }

    fn get(uri: &str) -> axum::http::request::Builder {
        Request::builder().method("GET").uri(uri)
    }

    fn json_request(method: &str, uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        serde_json::from_str(&body_string(response).await).unwrap()
    }

    #[tokio::test]
    async fn list_page_renders_for_session_cookie() {
        let h = Harness::new();
        let token = h.token_for("tester").await;

        let response = h
            .send(
                get("/")
                    .header(header::COOKIE, format!("sessionid={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        assert!(html.contains("data-layout=\"base.html\""));
        assert!(html.contains("data-template=\"cookie_stands/thing_list.html\""));
        assert!(html.contains("pickle</a> rated 1 by tester"));
    }

    #[tokio::test]
    async fn list_page_redirects_anonymous_visitors() {
        let h = Harness::new();
        let response = h.send(get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/accounts/login/?next=%2F"
        );
    }

    #[tokio::test]
    async fn detail_page_renders_and_misses_404() {
        let h = Harness::new();
        let token = h.token_for("tester").await;

        let response = h
            .send(
                get("/1/")
                    .header(header::COOKIE, format!("sessionid={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("data-template=\"cookie_stands/thing_detail.html\""));
        assert!(html.contains("Reviewer: tester"));

        let missing = h
            .send(
                get("/99/")
                    .header(header::COOKIE, format!("sessionid={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn detail_page_requires_login() {
        let h = Harness::new();
        let response = h.send(get("/1/").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::FOUND);

        let json = h
            .send(
                get("/1/")
                    .header(header::ACCEPT, "application/json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(json.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn list_route_negotiates_json() {
        let h = Harness::new();
        let token = h.token_for("tester").await;

        let response = h
            .send(
                get("/")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .header(header::ACCEPT, "application/json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let list: CookieStandListResponse = body_json(response).await;
        assert_eq!(list.cookie_stands.len(), 1);
        assert_eq!(list.cookie_stands[0].name, "pickle");
        assert_eq!(list.cookie_stands[0].reviewer_username.as_deref(), Some("tester"));
    }

    #[tokio::test]
    async fn json_list_of_a_single_rake() {
        let mut users = UserDirectory::new();
        let reviewer = users.add("testuser1", "pass").unwrap();
        let mut store = MemoryStore::new();
        store
            .create(NewCookieStand::new(
                reviewer,
                "rake",
                "Better for collecting leaves than a shovel.",
            ))
            .unwrap();
        let state = AppState::new(
            Box::new(store),
            users,
            SessionStore::new(Duration::from_secs(60)),
            "/accounts/login/",
        );
        let token = state.sessions.create(reviewer).await;
        let router = build_router(state, false);

        let response = router
            .oneshot(
                get("/")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .header(header::ACCEPT, "application/json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let list: CookieStandListResponse = body_json(response).await;
        assert_eq!(list.cookie_stands.len(), 1);
        let rake = &list.cookie_stands[0];
        assert_eq!(rake.id, 1);
        assert_eq!(rake.name, "rake");
        assert_eq!(rake.rating, 0);
        assert_eq!(rake.description, "Better for collecting leaves than a shovel.");
        assert_eq!(rake.reviewer_username.as_deref(), Some("testuser1"));
    }

    #[tokio::test]
    async fn api_requires_token() {
        let h = Harness::new();
        let response = h
            .send(get("/api/v1/cookie_stands/").body(Body::empty()).unwrap())
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bogus = h
            .send(
                get("/api/v1/cookie_stands/1/")
                    .header(header::AUTHORIZATION, "Bearer nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(bogus.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn api_create_update_delete() {
        let h = Harness::new();
        let token = h.token_for("testuser1").await;

        let created = h
            .send(json_request(
                "POST",
                "/api/v1/cookie_stands/",
                &token,
                serde_json::json!({"name": "rake", "description": "Better for collecting leaves than a shovel."}),
            ))
            .await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let created: CookieStandResponse = body_json(created).await;
        assert_eq!(created.id, 2);
        assert_eq!(created.reviewer, 2);
        assert_eq!(created.rating, 0);
        assert_eq!(h.state.store.read().await.count(), 2);

        let updated = h
            .send(json_request(
                "PUT",
                "/api/v1/cookie_stands/2/",
                &token,
                serde_json::json!({"reviewer": 2, "name": "rake", "description": "pole with a crossbar toothed like a comb."}),
            ))
            .await;
        assert_eq!(updated.status(), StatusCode::OK);
        let stored = h.state.store.read().await.get(2).unwrap();
        assert_eq!(stored.description, "pole with a crossbar toothed like a comb.");

        let deleted = h
            .send(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/v1/cookie_stands/2/")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
        assert_eq!(h.state.store.read().await.count(), 1);
    }

    #[tokio::test]
    async fn api_rejects_other_reviewers_changes() {
        let h = Harness::new();
        let token = h.token_for("testuser1").await;

        let update = h
            .send(json_request(
                "PUT",
                "/api/v1/cookie_stands/1/",
                &token,
                serde_json::json!({"name": "mine now", "description": "desc"}),
            ))
            .await;
        assert_eq!(update.status(), StatusCode::FORBIDDEN);

        let delete = h
            .send(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/v1/cookie_stands/1/")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(delete.status(), StatusCode::FORBIDDEN);
        assert_eq!(h.state.store.read().await.get(1).unwrap().name, "pickle");
    }

    #[tokio::test]
    async fn api_update_checks_target_before_body() {
        let h = Harness::new();
        let token = h.token_for("testuser1").await;
        let bad_reviewer = serde_json::json!({"reviewer": 42, "name": "rake", "description": "desc"});

        let missing = h
            .send(json_request("PUT", "/api/v1/cookie_stands/99/", &token, bad_reviewer.clone()))
            .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let not_owner = h
            .send(json_request("PUT", "/api/v1/cookie_stands/1/", &token, bad_reviewer))
            .await;
        assert_eq!(not_owner.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn api_create_validates_fields() {
        let h = Harness::new();
        let token = h.token_for("tester").await;

        let blank = h
            .send(json_request(
                "POST",
                "/api/v1/cookie_stands/",
                &token,
                serde_json::json!({"name": "", "description": "desc"}),
            ))
            .await;
        assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

        let unknown_reviewer = h
            .send(json_request(
                "POST",
                "/api/v1/cookie_stands/",
                &token,
                serde_json::json!({"reviewer": 42, "name": "spoon", "description": "desc"}),
            ))
            .await;
        assert_eq!(unknown_reviewer.status(), StatusCode::BAD_REQUEST);
        assert_eq!(h.state.store.read().await.count(), 1);
    }

    #[tokio::test]
    async fn token_login_then_logout() {
        let h = Harness::new();

        let bad = h
            .send(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/auth/token")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"username":"tester","password":"wrong"}"#))
                    .unwrap(),
            )
            .await;
        assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);

        let good = h
            .send(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/auth/token")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"username":"tester","password":"pass"}"#))
                    .unwrap(),
            )
            .await;
        assert_eq!(good.status(), StatusCode::OK);
        let issued: TokenResponse = body_json(good).await;
        assert_eq!(issued.username, "tester");

        let detail = h
            .send(
                get("/api/v1/cookie_stands/1/")
                    .header(header::AUTHORIZATION, format!("Bearer {}", issued.token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(detail.status(), StatusCode::OK);
        let stand: CookieStandResponse = body_json(detail).await;
        assert_eq!(stand.name, "pickle");

        let logout = h
            .send(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/auth/logout")
                    .header(header::AUTHORIZATION, format!("Bearer {}", issued.token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(logout.status(), StatusCode::NO_CONTENT);
        assert_eq!(h.state.sessions.resolve(&issued.token).await, None);
    }

    #[tokio::test]
    async fn browser_login_sets_session_cookie() {
        let h = Harness::new();

        let form = h
            .send(get("/accounts/login/?next=/1/").body(Body::empty()).unwrap())
            .await;
        assert_eq!(form.status(), StatusCode::OK);
        let html = body_string(form).await;
        assert!(html.contains("data-template=\"registration/login.html\""));
        assert!(html.contains("value=\"/1/\""));

        let rejected = h
            .send(
                Request::builder()
                    .method("POST")
                    .uri("/accounts/login/")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("username=tester&password=nope&next=%2F1%2F"))
                    .unwrap(),
            )
            .await;
        assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);

        let accepted = h
            .send(
                Request::builder()
                    .method("POST")
                    .uri("/accounts/login/")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("username=tester&password=pass&next=%2F1%2F"))
                    .unwrap(),
            )
            .await;
        assert_eq!(accepted.status(), StatusCode::SEE_OTHER);
        assert_eq!(accepted.headers()[header::LOCATION], "/1/");

        let cookie = accepted.headers()[header::SET_COOKIE].to_str().unwrap();
        let session = cookie.split(';').next().unwrap().to_string();
        assert!(session.starts_with("sessionid="));

        let detail = h
            .send(get("/1/").header(header::COOKIE, session).body(Body::empty()).unwrap())
            .await;
        assert_eq!(detail.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn browser_login_ignores_offsite_next() {
        let h = Harness::new();

        let accepted = h
            .send(
                Request::builder()
                    .method("POST")
                    .uri("/accounts/login/")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("username=tester&password=pass&next=%2F%5Cevil.example"))
                    .unwrap(),
            )
            .await;
        assert_eq!(accepted.status(), StatusCode::SEE_OTHER);
        assert_eq!(accepted.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn browser_logout_revokes_session() {
        let h = Harness::new();
        let token = h.token_for("tester").await;

        let response = h
            .send(
                Request::builder()
                    .method("POST")
                    .uri("/accounts/logout/")
                    .header(header::COOKIE, format!("sessionid={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/accounts/login/");
        assert_eq!(h.state.sessions.resolve(&token).await, None);
    }

    #[tokio::test]
    async fn health_is_public() {
        let h = Harness::new();
        let response = h.send(get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let health: HealthResponse = body_json(response).await;
        assert_eq!(health.status, "healthy");
        assert_eq!(health.total_cookie_stands, 1);
    }
}
