//! External capabilities consumed by hooks
//!
//! The resolver never performs I/O itself. Guards and model hooks reach the
//! outside world through two injected trait objects:
//!
//! - [`AuthGate`]: who is signed in, and loading their profile
//! - [`DataSource`]: fetch-like JSON loading
//!
//! In-memory implementations ([`SessionAuthGate`], [`FixtureDataSource`]) back
//! the tests and the CLI demo; `huddle-fetch` provides an HTTP data source.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::{FetchError, HuddleError, Result};

/// HTTP-ish method for [`FetchOptions`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Request options for [`DataSource::fetch_json`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOptions {
    pub method: Method,
    pub body: Option<Value>,
}

impl FetchOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::Post,
            body: Some(body),
        }
    }

    pub fn delete() -> Self {
        Self {
            method: Method::Delete,
            body: None,
        }
    }
}

/// Fetch-like JSON loading capability
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Load `url` and decode the body as JSON
    ///
    /// # Errors
    ///
    /// `Network` for transport failures, `HttpStatus` for non-2xx responses,
    /// `Decode` for bodies that are not JSON.
    async fn fetch_json(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> std::result::Result<Value, FetchError>;
}

/// Auth-state capability consulted by guards
#[async_trait]
pub trait AuthGate: Send + Sync {
    fn is_authenticated(&self) -> bool;

    fn current_user_id(&self) -> Option<String>;

    /// Populate the ambient current-user state for later hooks
    ///
    /// # Errors
    ///
    /// Propagates data source failures.
    async fn load_current_user(&self) -> Result<()>;
}

// ========== Fixture data source ==========

/// Canned response for one URL
#[derive(Debug, Clone, PartialEq)]
pub enum FixtureResponse {
    Json(Value),
    Status { status: u16, body: String },
    NetworkFailure(String),
}

#[derive(Debug, Clone)]
struct Fixture {
    response: FixtureResponse,
    delay: Option<Duration>,
}

/// In-memory data source answering from a `url -> response` table
///
/// Unknown URLs answer 404. Every request is recorded, in order.
#[derive(Debug, Default)]
pub struct FixtureDataSource {
    fixtures: Mutex<HashMap<String, Fixture>>,
    requests: Mutex<Vec<(Method, String)>>,
}

impl FixtureDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object mapping URL to response body
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if `value` is not a JSON object.
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(HuddleError::Serialization {
                message: "fixture document must be a JSON object of url -> body".to_string(),
            });
        };
        let source = Self::new();
        for (url, body) in map {
            source.insert(url, FixtureResponse::Json(body));
        }
        Ok(source)
    }

    /// Load a fixture document from disk
    ///
    /// # Errors
    ///
    /// Returns `Io` or `Serialization` when the file cannot be used.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let value: Value = serde_json::from_str(&text)?;
        Self::from_json(value)
    }

    /// Answer `url` with `body`
    pub fn with_json(self, url: impl Into<String>, body: Value) -> Self {
        self.insert(url, FixtureResponse::Json(body));
        self
    }

    /// Answer `url` with a non-2xx status
    pub fn with_status(self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.insert(
            url,
            FixtureResponse::Status {
                status,
                body: body.into(),
            },
        );
        self
    }

    /// Fail `url` at the transport level
    pub fn with_network_failure(self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.insert(url, FixtureResponse::NetworkFailure(message.into()));
        self
    }

    /// Delay the answer for `url` (uses the tokio clock)
    pub fn with_delay(self, url: &str, delay: Duration) -> Self {
        if let Some(fixture) = self.lock_fixtures().get_mut(url) {
            fixture.delay = Some(delay);
        }
        self
    }

    /// Replace or add the response for `url`
    pub fn insert(&self, url: impl Into<String>, response: FixtureResponse) {
        self.lock_fixtures().insert(
            url.into(),
            Fixture {
                response,
                delay: None,
            },
        );
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<(Method, String)> {
        self.lock_requests().clone()
    }

    fn lock_fixtures(&self) -> std::sync::MutexGuard<'_, HashMap<String, Fixture>> {
        self.fixtures.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_requests(&self) -> std::sync::MutexGuard<'_, Vec<(Method, String)>> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DataSource for FixtureDataSource {
    async fn fetch_json(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> std::result::Result<Value, FetchError> {
        self.lock_requests()
            .push((options.method, url.to_string()));

        let fixture = self.lock_fixtures().get(url).cloned();
        let Some(fixture) = fixture else {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: 404,
                body: String::new(),
            });
        };

        if let Some(delay) = fixture.delay {
            tokio::time::sleep(delay).await;
        }

        match fixture.response {
            FixtureResponse::Json(body) => Ok(body),
            FixtureResponse::Status { status, body } => Err(FetchError::HttpStatus {
                url: url.to_string(),
                status,
                body,
            }),
            FixtureResponse::NetworkFailure(message) => Err(FetchError::Network {
                url: url.to_string(),
                message,
            }),
        }
    }
}

// ========== Session auth gate ==========

#[derive(Debug, Default)]
struct SessionState {
    user_id: Option<String>,
    current_user: Option<Value>,
}

/// In-memory auth state with profile loading through a [`DataSource`]
///
/// `load_current_user` fetches `{users_url}/{id}` and caches the result so
/// later hooks can read it via [`SessionAuthGate::current_user`].
pub struct SessionAuthGate {
    data: Arc<dyn DataSource>,
    users_url: String,
    state: Mutex<SessionState>,
}

impl SessionAuthGate {
    pub fn new(data: Arc<dyn DataSource>, users_url: impl Into<String>) -> Self {
        Self {
            data,
            users_url: users_url.into().trim_end_matches('/').to_string(),
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Mark `user_id` as signed in; drops any cached profile
    pub fn sign_in(&self, user_id: impl Into<String>) {
        let mut state = self.lock_state();
        state.user_id = Some(user_id.into());
        state.current_user = None;
    }

    pub fn sign_out(&self) {
        *self.lock_state() = SessionState::default();
    }

    /// Profile loaded by the last successful `load_current_user`
    pub fn current_user(&self) -> Option<Value> {
        self.lock_state().current_user.clone()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl AuthGate for SessionAuthGate {
    fn is_authenticated(&self) -> bool {
        self.lock_state().user_id.is_some()
    }

    fn current_user_id(&self) -> Option<String> {
        self.lock_state().user_id.clone()
    }

    async fn load_current_user(&self) -> Result<()> {
        let Some(user_id) = self.current_user_id() else {
            return Ok(());
        };
        let url = format!("{}/{}", self.users_url, user_id);
        let user = self.data.fetch_json(&url, &FetchOptions::get()).await?;

        let mut state = self.lock_state();
        // the session may have changed while the fetch was in flight
        if state.user_id.as_deref() == Some(user_id.as_str()) {
            state.current_user = Some(user);
        }
        Ok(())
    }
}
