//! Operation descriptors: what to call on the push service, not how.
//!
//! # Design
//! Each public push operation is a fixed mapping to a path, a method and an
//! optional JSON payload. The constructors here are pure so the mapping can
//! be checked without a transport; `PushClient` turns an `Operation` into an
//! `HttpRequest` and sends it.

use serde::Serialize;

use crate::error::PushError;
use crate::http::HttpMethod;
use crate::types::{Message, Recipients, UserData};

/// One logical call against the push service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    /// Appended to the API root; empty means `/`.
    pub path: String,
    pub method: HttpMethod,
    pub payload: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct DeviceToken<'a> {
    token: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Dispatch<'a> {
    message: &'a Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_ids: Option<&'a Recipients>,
}

impl Operation {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            payload: None,
        }
    }

    /// Attach `payload`, serialized to a JSON value.
    pub fn with_payload<P: Serialize + ?Sized>(mut self, payload: &P) -> Result<Self, PushError> {
        let value = serde_json::to_value(payload).map_err(|e| PushError::Serialization(e.to_string()))?;
        self.payload = Some(value);
        Ok(self)
    }

    /// `PUT /user/{id}` for a known user, `POST /user/` to let the service
    /// assign an id.
    pub fn upsert_user(user_id: Option<&str>, data: &UserData) -> Result<Self, PushError> {
        let op = match user_id.filter(|id| !id.is_empty()) {
            Some(id) => Operation::new(HttpMethod::Put, format!("/user/{}", path_segment(id)?)),
            None => Operation::new(HttpMethod::Post, "/user/"),
        };
        op.with_payload(data)
    }

    /// `DELETE /user/{id}`, removing the user and all of its devices.
    pub fn delete_user(user_id: &str) -> Result<Self, PushError> {
        Ok(Operation::new(HttpMethod::Delete, format!("/user/{}", path_segment(user_id)?)))
    }

    /// `DELETE /user/{id}/device` with `{ token }` in the body.
    pub fn delete_device(user_id: &str, device_token: &str) -> Result<Self, PushError> {
        Operation::new(HttpMethod::Delete, format!("/user/{}/device", path_segment(user_id)?))
            .with_payload(&DeviceToken { token: device_token })
    }

    /// `POST /message` to the given users.
    pub fn send(user_ids: &Recipients, message: &Message) -> Result<Self, PushError> {
        Operation::new(HttpMethod::Post, "/message").with_payload(&Dispatch {
            message,
            user_ids: Some(user_ids),
        })
    }

    /// `POST /message` to every user of the application.
    pub fn send_all(message: &Message) -> Result<Self, PushError> {
        Operation::new(HttpMethod::Post, "/message").with_payload(&Dispatch { message, user_ids: None })
    }
}

/// User ids go into the path verbatim, so refuse anything that would change
/// the path's shape.
fn path_segment(user_id: &str) -> Result<&str, PushError> {
    let malformed = user_id.is_empty()
        || user_id
            .chars()
            .any(|c| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace() || c.is_control());
    if malformed {
        return Err(PushError::InvalidUserId(user_id.to_string()));
    }
    Ok(user_id)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::Device;

    fn user_data() -> UserData {
        UserData {
            locale: "tr".to_string(),
            device: Some(Device::new("ios", "XXX")),
        }
    }

    #[test]
    fn upsert_without_id_posts_to_collection() {
        let op = Operation::upsert_user(None, &user_data()).unwrap();
        assert_eq!(op.method, HttpMethod::Post);
        assert_eq!(op.path, "/user/");
        assert_eq!(op.payload, Some(json!({ "locale": "tr", "device": { "type": "ios", "token": "XXX" } })));
    }

    #[test]
    fn upsert_with_empty_id_posts_to_collection() {
        let op = Operation::upsert_user(Some(""), &user_data()).unwrap();
        assert_eq!(op.method, HttpMethod::Post);
        assert_eq!(op.path, "/user/");
    }

    #[test]
    fn upsert_with_id_puts_to_user() {
        let op = Operation::upsert_user(Some("u1"), &user_data()).unwrap();
        assert_eq!(op.method, HttpMethod::Put);
        assert_eq!(op.path, "/user/u1");
    }

    #[test]
    fn delete_user_has_no_payload() {
        let op = Operation::delete_user("u1").unwrap();
        assert_eq!(op.method, HttpMethod::Delete);
        assert_eq!(op.path, "/user/u1");
        assert!(op.payload.is_none());
    }

    #[test]
    fn delete_device_sends_token() {
        let op = Operation::delete_device("u1", "tok").unwrap();
        assert_eq!(op.method, HttpMethod::Delete);
        assert_eq!(op.path, "/user/u1/device");
        assert_eq!(op.payload, Some(json!({ "token": "tok" })));
    }

    #[test]
    fn send_includes_user_ids() {
        let op = Operation::send(&Recipients::from(["u1", "u2"]), &Message::from("hi")).unwrap();
        assert_eq!(op.method, HttpMethod::Post);
        assert_eq!(op.path, "/message");
        assert_eq!(op.payload, Some(json!({ "message": "hi", "userIds": ["u1", "u2"] })));
    }

    #[test]
    fn send_all_omits_user_ids() {
        let message = Message::localized([("en", "hi"), ("tr", "merhaba")]);
        let op = Operation::send_all(&message).unwrap();
        assert_eq!(op.payload, Some(json!({ "message": { "en": "hi", "tr": "merhaba" } })));
    }

    #[test]
    fn rejects_user_ids_that_change_the_path() {
        for id in ["", "a/b", "a?b", "a#b", "a b", "%2e%2e"] {
            let err = Operation::delete_user(id).unwrap_err();
            assert!(matches!(err, PushError::InvalidUserId(_)), "{id:?}");
        }
    }

    #[test]
    fn default_operation_is_get_root() {
        let op = Operation::default();
        assert_eq!(op.method, HttpMethod::Get);
        assert!(op.path.is_empty());
    }
}
