//! Client-side helper for a remote push notification service.
//!
//! # Overview
//! Every operation (user upsert, user deletion, device removal, message
//! dispatch) is described as an `Operation` and sent through a single
//! request path in `PushClient`, which joins the URL onto the configured
//! API root, adds the `X-App-Name` header, attaches the JSON payload and
//! classifies the response into an `Outcome`.
//!
//! # Design
//! - `Config` is an explicit, validated value instead of process-wide state.
//! - The network sits behind the `Transport` trait; `UreqTransport` is the
//!   default and tests substitute their own.
//! - `Err` is reserved for requests that could not be sent at all. Delivery
//!   failures of any kind are an `Outcome` with `is_error() == true`.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod operation;
pub mod outcome;
pub mod transport;
pub mod types;

pub use client::{Callback, PushClient};
pub use config::Config;
pub use error::{ConfigError, PushError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, APP_NAME_HEADER};
pub use operation::Operation;
pub use outcome::{Failure, Outcome};
pub use transport::{Transport, UreqTransport};
pub use types::{Device, Message, Recipients, UserData};
