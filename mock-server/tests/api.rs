use std::sync::Arc;

use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_state, AppState, Profile};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- profiles ---

#[tokio::test]
async fn create_profile_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/profiles", r#"{"display_name":"Ada"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let profile: Profile = body_json(resp).await;
    assert_eq!(profile.display_name, "Ada");
    assert!(!profile.is_verified);
}

#[tokio::test]
async fn create_profile_blank_name_returns_error_body() {
    let resp = app()
        .oneshot(json_request("POST", "/profiles", r#"{"display_name":"  "}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["message"], "display_name must not be empty");
    assert_eq!(body["user_error_message"], "Please enter a name.");
}

#[tokio::test]
async fn get_profile_not_found() {
    let resp = app()
        .oneshot(get("/profiles/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["message"], "profile not found");
}

#[tokio::test]
async fn create_then_get_profile() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/profiles",
            r#"{"display_name":"Grace","avatar_url":"/images/grace.png"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Profile = body_json(resp).await;

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/profiles/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Profile = body_json(resp).await;
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.avatar_url.as_deref(), Some("/images/grace.png"));
}

// --- status / broken ---

#[tokio::test]
async fn status_route_echoes_code() {
    for code in [401u16, 403, 418, 503] {
        let resp = app().oneshot(get(&format!("/status/{code}"))).await.unwrap();
        assert_eq!(resp.status().as_u16(), code);
        let body: serde_json::Value = body_json(resp).await;
        assert_eq!(body["message"], format!("status {code}"));
    }
}

#[tokio::test]
async fn broken_returns_html() {
    let resp = app().oneshot(get("/broken")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_bytes(resp).await;
    assert!(serde_json::from_slice::<serde_json::Value>(&body).is_err());
}

// --- echo ---

#[tokio::test]
async fn echo_reports_method_and_body() {
    let resp = app()
        .oneshot(json_request("PUT", "/echo", r#"{"a":1}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["method"], "PUT");
    assert_eq!(body["body"], r#"{"a":1}"#);
    assert_eq!(body["body_length"], 7);
}

#[tokio::test]
async fn echo_reports_repeated_headers() {
    let req = Request::builder()
        .uri("/echo")
        .header("accept", "text/plain")
        .header("accept", "application/json")
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["accept"], "text/plain,application/json");
    assert!(body["x_token"].is_null());
}

// --- images ---

#[tokio::test]
async fn image_route_serves_png_and_counts() {
    let state = Arc::new(AppState::default());
    let resp = app_with_state(state.clone())
        .oneshot(get("/images/a.png"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body_bytes(resp).await;
    assert_eq!(&bytes[..4], b"\x89PNG");
    assert_eq!(state.image_hits(), 1);

    let resp = app_with_state(state.clone())
        .oneshot(get("/images/missing.png"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(state.image_hits(), 2);
}
