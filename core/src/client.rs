//! The push service client: every operation funnels through one request path.
//!
//! # Design
//! `PushClient` owns a `Config` and a `Transport`. Each public operation
//! builds an `Operation`, `build_request` turns it into an `HttpRequest`
//! (URL join plus the `X-App-Name` header plus an optional JSON body), the
//! transport performs it exactly once, and the result is normalized into an
//! `Outcome`. No retries, no queueing.
//!
//! `configure` takes `&mut self`: configuration happens before the client
//! is shared, and clones made afterwards keep the configuration they were
//! cloned with.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn, Instrument};

use crate::config::Config;
use crate::error::{ConfigError, PushError};
use crate::http::{HttpRequest, APP_NAME_HEADER};
use crate::operation::Operation;
use crate::outcome::{Failure, Outcome};
use crate::transport::Transport;
use crate::types::{Message, Recipients, UserData};

/// Completion callback for `dispatch`: `(is_error, body)`.
pub type Callback = Box<dyn FnOnce(bool, Option<String>) + Send + 'static>;

pub struct PushClient<T> {
    transport: Arc<T>,
    config: Option<Arc<Config>>,
}

impl<T> Clone for PushClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: self.config.clone(),
        }
    }
}

impl<T> fmt::Debug for PushClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushClient").field("config", &self.config).finish_non_exhaustive()
    }
}

impl<T: Transport> PushClient<T> {
    /// An unconfigured client. Requests fail with `ConfigError::NotConfigured`
    /// until `configure` or `set_config` is called.
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            config: None,
        }
    }

    pub fn with_config(transport: T, config: Config) -> Self {
        Self {
            transport: Arc::new(transport),
            config: Some(Arc::new(config)),
        }
    }

    /// Validate and install `api_root` and `app_name`, replacing any previous
    /// configuration. On error the previous configuration is kept.
    pub fn configure(&mut self, api_root: &str, app_name: &str) -> Result<(), ConfigError> {
        let config = Config::new(api_root, app_name)?;
        self.set_config(config);
        Ok(())
    }

    pub fn set_config(&mut self, config: Config) {
        self.config = Some(Arc::new(config));
    }

    pub fn config(&self) -> Option<&Config> {
        self.config.as_deref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Turn `operation` into the request that would be sent.
    pub fn build_request(&self, operation: &Operation) -> Result<HttpRequest, PushError> {
        let config = self.config.as_deref().ok_or(ConfigError::NotConfigured)?;
        let url = config.endpoint(&operation.path)?;

        let mut headers = vec![(APP_NAME_HEADER.to_string(), config.app_name().to_string())];
        let body = match &operation.payload {
            Some(payload) => {
                headers.push(("content-type".to_string(), "application/json".to_string()));
                Some(serde_json::to_string(payload).map_err(|e| PushError::Serialization(e.to_string()))?)
            }
            None => None,
        };

        Ok(HttpRequest {
            method: operation.method,
            url,
            headers,
            body,
        })
    }

    /// Send `operation` and wait for its outcome.
    ///
    /// `Err` means the request was never sent (not configured, bad path).
    /// Transport and HTTP failures come back as an `Outcome` with
    /// `is_error() == true`.
    pub async fn request(&self, operation: Operation) -> Result<Outcome, PushError> {
        let request = self.build_request(&operation)?;
        Ok(perform(self.transport.as_ref(), request).await)
    }

    /// Send `operation` in the background on the current Tokio runtime.
    ///
    /// `callback`, when given, runs exactly once with `(is_error, body)`.
    /// Without a callback the call is fire-and-forget and failures are only
    /// visible in the logs.
    pub fn dispatch(&self, operation: Operation, callback: Option<Callback>) -> Result<JoinHandle<()>, PushError>
    where
        T: 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| PushError::NoRuntime)?;
        let request = self.build_request(&operation)?;
        let transport = Arc::clone(&self.transport);

        let task = async move {
            let outcome = perform(transport.as_ref(), request).await;
            if let Some(callback) = callback {
                let (is_error, body) = outcome.into_parts();
                callback(is_error, body);
            }
        };
        Ok(runtime.spawn(task.in_current_span()))
    }

    /// Create or update a user. With an id the user is upserted via
    /// `PUT /user/{id}`; without one the service assigns an id.
    pub async fn upsert_user(&self, user_id: Option<&str>, data: &UserData) -> Result<Outcome, PushError> {
        self.request(Operation::upsert_user(user_id, data)?).await
    }

    /// Delete a user together with all of its devices.
    pub async fn delete_user(&self, user_id: &str) -> Result<Outcome, PushError> {
        self.request(Operation::delete_user(user_id)?).await
    }

    pub async fn delete_device_from_user(&self, user_id: &str, device_token: &str) -> Result<Outcome, PushError> {
        self.request(Operation::delete_device(user_id, device_token)?).await
    }

    /// Push `message` to one or more users.
    pub async fn send(
        &self,
        user_ids: impl Into<Recipients>,
        message: impl Into<Message>,
    ) -> Result<Outcome, PushError> {
        self.request(Operation::send(&user_ids.into(), &message.into())?).await
    }

    /// Push `message` to every user of the application.
    pub async fn send_all(&self, message: impl Into<Message>) -> Result<Outcome, PushError> {
        self.request(Operation::send_all(&message.into())?).await
    }
}

async fn perform<T: Transport + ?Sized>(transport: &T, request: HttpRequest) -> Outcome {
    let method = request.method;
    let url = request.url.clone();
    debug!(%method, %url, "sending push service request");

    let outcome = match transport.perform(request).await {
        Ok(response) => Outcome::from_response(response),
        Err(error) => {
            debug!(%method, %url, %error, "push service request got no response");
            Outcome::from_transport_error(error)
        }
    };

    if outcome.failure == Some(Failure::Unauthorized) {
        warn!(
            %url,
            "push service authentication error: check the application name and whether this \
             server's IP address is on the application's IP allow-list"
        );
    }
    debug!(%method, %url, status = ?outcome.status, is_error = outcome.is_error(), "push service request finished");
    outcome
}
