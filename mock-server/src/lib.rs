use std::{
    collections::HashMap,
    io::Cursor,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use image::{ImageFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// A user profile as the backend serializes it: snake_case keys.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub is_verified: bool,
}

#[derive(Deserialize)]
pub struct CreateProfile {
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Default)]
pub struct AppState {
    profiles: RwLock<HashMap<Uuid, Profile>>,
    image_hits: AtomicUsize,
}

impl AppState {
    /// Number of requests that reached any `/images/*` route.
    pub fn image_hits(&self) -> usize {
        self.image_hits.load(Ordering::SeqCst)
    }
}

pub type Shared = Arc<AppState>;

pub fn app() -> Router {
    app_with_state(Arc::default())
}

pub fn app_with_state(state: Shared) -> Router {
    Router::new()
        .route("/profiles", post(create_profile))
        .route("/profiles/{id}", get(get_profile))
        .route("/status/{code}", get(status_with_message))
        .route("/broken", get(broken))
        .route("/echo", any(echo))
        .route("/images/{name}", get(serve_image))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_state(listener: TcpListener, state: Shared) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

fn error_body(status: StatusCode, message: &str, user_message: &str) -> Response {
    let body = json!({ "message": message, "user_error_message": user_message });
    (status, Json(body)).into_response()
}

async fn create_profile(
    State(state): State<Shared>,
    Json(input): Json<CreateProfile>,
) -> Response {
    if input.display_name.trim().is_empty() {
        return error_body(
            StatusCode::BAD_REQUEST,
            "display_name must not be empty",
            "Please enter a name.",
        );
    }
    let profile = Profile {
        id: Uuid::new_v4(),
        display_name: input.display_name,
        avatar_url: input.avatar_url,
        is_verified: false,
    };
    state.profiles.write().await.insert(profile.id, profile.clone());
    (StatusCode::CREATED, Json(profile)).into_response()
}

async fn get_profile(State(state): State<Shared>, Path(id): Path<Uuid>) -> Response {
    match state.profiles.read().await.get(&id) {
        Some(profile) => Json(profile.clone()).into_response(),
        None => error_body(
            StatusCode::NOT_FOUND,
            "profile not found",
            "This profile no longer exists.",
        ),
    }
}

/// Responds with the requested status and a JSON error body.
async fn status_with_message(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error_body(status, &format!("status {code}"), "Try again")
}

async fn broken() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/html")],
        "<html>Internal Server Error</html>",
    )
        .into_response()
}

/// Echoes back what arrived: method, selected headers, body.
async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<serde_json::Value> {
    // Every value sent under `name`, comma-joined, so duplicates stay visible.
    let header_value = |name: &str| {
        let values: Vec<&str> = headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        (!values.is_empty()).then(|| values.join(","))
    };
    Json(json!({
        "method": method.as_str(),
        "body": String::from_utf8_lossy(&body),
        "body_length": body.len(),
        "authorization": header_value("authorization"),
        "x_client": header_value("x-client"),
        "x_token": header_value("x-token"),
        "accept": header_value("accept"),
    }))
}

async fn serve_image(State(state): State<Shared>, Path(name): Path<String>) -> Response {
    state.image_hits.fetch_add(1, Ordering::SeqCst);
    match name.as_str() {
        "corrupt.png" => ([(header::CONTENT_TYPE, "image/png")], "not a png").into_response(),
        "missing.png" => StatusCode::NOT_FOUND.into_response(),
        _ => match png(4, 4) {
            Some(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
            None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        },
    }
}

pub fn png(width: u32, height: u32) -> Option<Vec<u8>> {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).ok()?;
    Some(out.into_inner())
}
