use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use push_mock_server::{app, router, AppState, Delivery, Message, User, UserIds};
use tower::ServiceExt;

const APP_NAME: &str = "demo-app";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-App-Name", APP_NAME)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-App-Name", APP_NAME)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- authentication ---

#[tokio::test]
async fn missing_app_name_returns_401() {
    let resp = app(APP_NAME)
        .oneshot(Request::builder().uri("/user/u1").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_app_name_returns_401() {
    let resp = app("other-app")
        .oneshot(json_request("POST", "/message", r#"{"message":"hi"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- users ---

#[tokio::test]
async fn create_user_assigns_id() {
    let resp = app(APP_NAME)
        .oneshot(json_request(
            "POST",
            "/user/",
            r#"{"locale":"tr","device":{"type":"ios","token":"XXX"}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: User = body_json(resp).await;
    assert!(!user.id.is_empty());
    assert_eq!(user.locale.as_deref(), Some("tr"));
    assert_eq!(user.devices.len(), 1);
}

#[tokio::test]
async fn upsert_user_creates_missing_user() {
    let resp = app(APP_NAME)
        .oneshot(json_request("PUT", "/user/u1", r#"{"locale":"en"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    assert_eq!(user.id, "u1");
    assert!(user.devices.is_empty());
}

#[tokio::test]
async fn get_user_not_found() {
    let resp = app(APP_NAME).oneshot(request("GET", "/user/nobody")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_user_not_found() {
    let resp = app(APP_NAME).oneshot(request("DELETE", "/user/nobody")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_device_of_unknown_user_returns_404() {
    let resp = app(APP_NAME)
        .oneshot(json_request("DELETE", "/user/nobody/device", r#"{"token":"XXX"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- messages ---

#[tokio::test]
async fn send_message_malformed_json_returns_422() {
    let resp = app(APP_NAME)
        .oneshot(json_request("POST", "/message", r#"{"userIds":["u1"]}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- full user lifecycle ---

#[tokio::test]
async fn user_lifecycle() {
    use tower::Service;

    let state = AppState::new(APP_NAME);
    let mut app = router(state.clone()).into_service();

    // register a user with one device
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            "/user/u1",
            r#"{"locale":"en","device":{"type":"ios","token":"a"}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // upsert again: locale changes, second device is added, first one stays
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            "/user/u1",
            r#"{"locale":"tr","device":{"type":"android","token":"b"}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    assert_eq!(user.locale.as_deref(), Some("tr"));
    assert_eq!(user.devices.len(), 2);

    // send to the user
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/message",
            r#"{"message":{"en":"hi","tr":"merhaba"},"userIds":["u1","u2"]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let delivery: Delivery = body_json(resp).await;
    assert_eq!(delivery.delivered, 2);

    // remove one device
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("DELETE", "/user/u1/device", r#"{"token":"a"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let user = state.user("u1").await.unwrap();
    assert_eq!(user.devices.len(), 1);
    assert_eq!(user.devices[0].token, "b");

    // removing it again — 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("DELETE", "/user/u1/device", r#"{"token":"a"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // broadcast reaches the remaining device
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/message", r#"{"message":"hello all"}"#))
        .await
        .unwrap();
    let delivery: Delivery = body_json(resp).await;
    assert_eq!(delivery.delivered, 1);

    // delete the user
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("DELETE", "/user/u1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete — 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/user/u1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let messages = state.messages().await;
    assert_eq!(messages.len(), 2);
    assert_eq!(
        messages[0].user_ids,
        Some(UserIds::Many(vec!["u1".to_string(), "u2".to_string()]))
    );
    assert_eq!(messages[1].message, Message::Text("hello all".to_string()));
    assert!(messages[1].user_ids.is_none());
}
