//! Correlation types for navigation tracking
//!
//! Every `navigate` call gets its own `RequestId`. Redirect hops spawned by that
//! call share a `TraceId`, so one user action can be followed across the whole
//! redirect chain in the logs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh time-ordered id (UUIDv7)
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            /// Get the string representation
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Wrap an existing string (e.g. an id received from a caller)
            pub fn from_string(s: String) -> Self {
                Self(s)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a single `navigate` invocation (one per Transition)
    RequestId
);

uuid_id!(
    /// Identifier shared by every Transition spawned from one user action,
    /// including redirect hops
    TraceId
);

/// Correlation context threaded through one navigation and its redirects
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub trace_id: TraceId,
}

impl RequestContext {
    /// Start a new trace for a user-initiated navigation
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            trace_id: TraceId::new(),
        }
    }

    /// Derive the context for a redirect hop: new request, same trace
    pub fn follow(&self) -> Self {
        Self {
            request_id: RequestId::new(),
            trace_id: self.trace_id.clone(),
        }
    }

    /// Replace the trace id (when the caller already has one)
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = trace_id;
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
