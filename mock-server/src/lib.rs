use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const APP_NAME_HEADER: &str = "x-app-name";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Device {
    #[serde(rename = "type")]
    pub kind: String,
    pub token: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub locale: Option<String>,
    pub devices: Vec<Device>,
}

#[derive(Deserialize)]
pub struct UpsertUser {
    pub locale: Option<String>,
    pub device: Option<Device>,
}

#[derive(Deserialize)]
pub struct DeviceToken {
    pub token: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Message {
    Text(String),
    Localized(BTreeMap<String, String>),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum UserIds {
    One(String),
    Many(Vec<String>),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ids: Option<UserIds>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: usize,
}

#[derive(Default)]
struct Store {
    users: HashMap<String, User>,
    messages: Vec<SendMessage>,
}

/// Shared state of one mock push service application.
#[derive(Clone)]
pub struct AppState {
    app_name: Arc<str>,
    store: Arc<RwLock<Store>>,
}

impl AppState {
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: Arc::from(app_name),
            store: Arc::default(),
        }
    }

    pub async fn user(&self, id: &str) -> Option<User> {
        self.store.read().await.users.get(id).cloned()
    }

    pub async fn user_count(&self) -> usize {
        self.store.read().await.users.len()
    }

    /// Every message accepted so far, oldest first.
    pub async fn messages(&self) -> Vec<SendMessage> {
        self.store.read().await.messages.clone()
    }
}

pub fn app(app_name: &str) -> Router {
    router(AppState::new(app_name))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/user/", post(create_user))
        .route("/user/{id}", get(get_user).put(upsert_user).delete(delete_user))
        .route("/user/{id}/device", delete(delete_device))
        .route("/message", post(send_message))
        .layer(middleware::from_fn_with_state(state.clone(), require_app_name))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}

async fn require_app_name(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let app_name = request.headers().get(APP_NAME_HEADER).and_then(|v| v.to_str().ok());
    if app_name != Some(&*state.app_name) {
        tracing::info!(?app_name, "rejecting request with unknown application name");
        return StatusCode::UNAUTHORIZED.into_response();
    }
    next.run(request).await
}

fn apply(user: &mut User, input: UpsertUser) {
    if let Some(locale) = input.locale {
        user.locale = Some(locale);
    }
    if let Some(device) = input.device {
        if !user.devices.iter().any(|d| d.token == device.token) {
            user.devices.push(device);
        }
    }
}

async fn create_user(State(state): State<AppState>, Json(input): Json<UpsertUser>) -> (StatusCode, Json<User>) {
    let mut user = User {
        id: Uuid::new_v4().to_string(),
        locale: None,
        devices: Vec::new(),
    };
    apply(&mut user, input);
    state.store.write().await.users.insert(user.id.clone(), user.clone());
    (StatusCode::CREATED, Json(user))
}

async fn upsert_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpsertUser>,
) -> Json<User> {
    let mut store = state.store.write().await;
    let user = store.users.entry(id.clone()).or_insert_with(|| User {
        id,
        locale: None,
        devices: Vec::new(),
    });
    apply(user, input);
    Json(user.clone())
}

async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<User>, StatusCode> {
    state.user(&id).await.map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn delete_user(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    match state.store.write().await.users.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

async fn delete_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<DeviceToken>,
) -> StatusCode {
    let mut store = state.store.write().await;
    let Some(user) = store.users.get_mut(&id) else {
        return StatusCode::NOT_FOUND;
    };
    let before = user.devices.len();
    user.devices.retain(|d| d.token != input.token);
    if user.devices.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn send_message(State(state): State<AppState>, Json(input): Json<SendMessage>) -> Json<Delivery> {
    let mut store = state.store.write().await;
    let delivered = match &input.user_ids {
        None => store.users.values().map(|u| u.devices.len()).sum(),
        Some(UserIds::One(id)) => store.users.get(id).map_or(0, |u| u.devices.len()),
        Some(UserIds::Many(ids)) => ids
            .iter()
            .filter_map(|id| store.users.get(id))
            .map(|u| u.devices.len())
            .sum(),
    };
    store.messages.push(input);
    Json(Delivery { delivered })
}
