//! Request payloads understood by the push service.
//!
//! # Design
//! `Recipients` and `Message` are untagged so they keep the wire shapes the
//! service accepts: a single user id is sent as a bare string, a message
//! that does not care about locale is sent as a bare string.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A device registered for a user, e.g. `{ "type": "ios", "token": "XXX" }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Device {
    #[serde(rename = "type")]
    pub kind: String,
    pub token: String,
}

impl Device {
    pub fn new(kind: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            token: token.into(),
        }
    }
}

/// Body of an upsert: the user's locale and, optionally, a device to add.
/// Devices already registered for the user are left alone by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserData {
    pub locale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
}

/// Target users of a message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for Recipients {
    fn from(id: &str) -> Self {
        Recipients::One(id.to_string())
    }
}

impl From<String> for Recipients {
    fn from(id: String) -> Self {
        Recipients::One(id)
    }
}

impl From<Vec<String>> for Recipients {
    fn from(ids: Vec<String>) -> Self {
        Recipients::Many(ids)
    }
}

impl From<&[&str]> for Recipients {
    fn from(ids: &[&str]) -> Self {
        Recipients::Many(ids.iter().map(|id| id.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Recipients {
    fn from(ids: [&str; N]) -> Self {
        Recipients::Many(ids.iter().map(|id| id.to_string()).collect())
    }
}

/// Notification text, either the same for everyone or keyed by locale
/// (`{ "en": "Message", "tr": "Mesaj" }`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Message {
    Text(String),
    Localized(BTreeMap<String, String>),
}

impl Message {
    pub fn localized<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Message::Localized(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Text(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}
