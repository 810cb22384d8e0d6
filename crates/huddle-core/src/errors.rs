use thiserror::Error;

/// Result type alias using HuddleError
pub type Result<T> = std::result::Result<T, HuddleError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used in structured logs and by
/// rendering layers that need to pick an error state without matching on
/// message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Navigation
    RouteNotFound,
    RedirectLoop,
    HookFailed,

    // Integration/IO
    Network,
    HttpStatus,
    Timeout,
    Io,
    Serialization,

    // Construction/Configuration
    InvalidRouteTree,
    InvalidConfig,
    RuntimeUnavailable,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::RouteNotFound => "ERR_ROUTE_NOT_FOUND",
            ExErrorKind::RedirectLoop => "ERR_REDIRECT_LOOP",
            ExErrorKind::HookFailed => "ERR_HOOK_FAILED",
            ExErrorKind::Network => "ERR_NETWORK",
            ExErrorKind::HttpStatus => "ERR_HTTP_STATUS",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::InvalidRouteTree => "ERR_INVALID_ROUTE_TREE",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::RuntimeUnavailable => "ERR_RUNTIME_UNAVAILABLE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Flattened view of a [`HuddleError`] with classification fields for
/// logging and for rendering layers.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    path: Option<String>,
    route: Option<String>,
    status: Option<u16>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            route: None,
            status: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the navigation path (or request URL) involved
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add the route name whose hook failed
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Add an HTTP status code
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(route) = &self.route {
            write!(f, " (route: {})", route)?;
        }
        if let Some(status) = self.status {
            write!(f, " (status: {})", status)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Failures reported by a [`DataSource`](crate::capability::DataSource)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Transport-level failure (connection refused, DNS, reset, ...)
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// The server answered with a non-2xx status
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },

    /// The body was not valid JSON
    #[error("Invalid JSON from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Error taxonomy for navigation, notifications and configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HuddleError {
    // ===== Navigation =====
    /// No chain of routes matches the path
    #[error("No route matches path: {path}")]
    RouteNotFound { path: String },

    /// Transitive redirects exceeded the configured bound
    #[error("Redirect loop: more than {limit} redirects while navigating to {path}")]
    RedirectLoop { path: String, limit: usize },

    /// A guard or model hook reported a failure of its own
    #[error("Hook for route {route} failed: {message}")]
    Hook { route: String, message: String },

    /// A guard or model hook did not settle within the configured timeout
    #[error("Hook for route {route} timed out after {timeout_ms}ms")]
    HookTimeout { route: String, timeout_ms: u64 },

    // ===== Data source =====
    /// Transport-level failure
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// Non-2xx response
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },

    // ===== Construction / configuration =====
    /// Route tree violates a structural rule
    #[error("Invalid route tree: {reason}")]
    InvalidRouteTree { reason: String },

    /// Configuration could not be loaded or is inconsistent
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    /// Notification timers need a tokio runtime
    #[error("No tokio runtime available to schedule notification timers")]
    RuntimeUnavailable,

    // ===== Generic =====
    /// Serialization error (JSON/TOML encoding or decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Filesystem error
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl HuddleError {
    /// Shorthand for hook implementations reporting a domain failure
    pub fn hook(route: impl Into<String>, message: impl Into<String>) -> Self {
        HuddleError::Hook {
            route: route.into(),
            message: message.into(),
        }
    }

    /// True when the rendering layer should show a not-found state
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            HuddleError::RouteNotFound { .. } | HuddleError::HttpStatus { status: 404, .. }
        )
    }

    /// Stable error code of the canonical kind
    pub fn code(&self) -> &'static str {
        ExError::from(self.clone()).code()
    }
}

impl From<FetchError> for HuddleError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Network { url, message } => HuddleError::Network { url, message },
            FetchError::HttpStatus { url, status, body } => {
                HuddleError::HttpStatus { url, status, body }
            }
            FetchError::Decode { url, message } => HuddleError::Serialization {
                message: format!("{}: {}", url, message),
            },
        }
    }
}

/// Conversion from HuddleError to the canonical ExError
impl From<HuddleError> for ExError {
    fn from(err: HuddleError) -> Self {
        match err {
            HuddleError::RouteNotFound { path } => ExError::new(ExErrorKind::RouteNotFound)
                .with_op("navigate")
                .with_path(path)
                .with_message("No route matches path"),

            HuddleError::RedirectLoop { path, limit } => ExError::new(ExErrorKind::RedirectLoop)
                .with_op("navigate")
                .with_path(path)
                .with_message(format!("More than {} redirects", limit)),

            HuddleError::Hook { route, message } => ExError::new(ExErrorKind::HookFailed)
                .with_route(route)
                .with_message(message),

            HuddleError::HookTimeout { route, timeout_ms } => ExError::new(ExErrorKind::Timeout)
                .with_route(route)
                .with_message(format!("Hook did not settle within {}ms", timeout_ms)),

            HuddleError::Network { url, message } => ExError::new(ExErrorKind::Network)
                .with_op("fetch_json")
                .with_path(url)
                .with_message(message),

            HuddleError::HttpStatus { url, status, .. } => ExError::new(ExErrorKind::HttpStatus)
                .with_op("fetch_json")
                .with_path(url)
                .with_status(status)
                .with_message("Non-2xx response"),

            HuddleError::InvalidRouteTree { reason } => {
                ExError::new(ExErrorKind::InvalidRouteTree).with_message(reason)
            }

            HuddleError::Config { reason } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(reason)
            }

            HuddleError::RuntimeUnavailable => ExError::new(ExErrorKind::RuntimeUnavailable)
                .with_op("notify")
                .with_message("No tokio runtime available"),

            HuddleError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            HuddleError::Io { message } => ExError::new(ExErrorKind::Io).with_message(message),

            HuddleError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to HuddleError
impl From<serde_json::Error> for HuddleError {
    fn from(err: serde_json::Error) -> Self {
        HuddleError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for HuddleError {
    fn from(err: toml::de::Error) -> Self {
        HuddleError::Config {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for HuddleError {
    fn from(err: std::io::Error) -> Self {
        HuddleError::Io {
            message: err.to_string(),
        }
    }
}
