//! Huddle Core - navigation resolver and notification collection
//!
//! This crate provides the client-side state substrate of the Huddle chat app:
//! - Route tree with static and single-parameter segments, and path matching
//! - Guard and model hooks run root to leaf by the transition resolver
//! - Generation-based cancellation of superseded navigations, bounded redirects
//! - Time-evicted notification collection with identity-based removal
//! - Structured logging facility, error taxonomy and TOML configuration

pub mod capability;
pub mod config;
pub mod context;
pub mod errors;
pub mod hooks;
pub mod logging_facility;
pub mod notifications;
pub mod render;
pub mod resolver;
pub mod route;
pub mod transition;

// Logging macros expand to paths under this re-export
pub use huddle_core_types;

// Re-export commonly used types
pub use capability::{AuthGate, DataSource, FetchOptions, FixtureDataSource, SessionAuthGate};
pub use config::{HuddleConfig, NotificationConfig, ResolverConfig};
pub use context::NavigationContext;
pub use errors::{ExError, ExErrorKind, FetchError, HuddleError, Result};
pub use hooks::{guard_fn, model_fn, static_model, GuardHook, GuardOutcome, ModelHook, ModelOutcome};
pub use notifications::{
    Notification, NotificationCollection, NotificationHandle, NotificationId, Phase, Severity,
};
pub use render::{RecordingSink, RenderSink};
pub use resolver::Resolver;
pub use route::{RouteNode, RouteTree};
pub use transition::{Outcome, ResolvedChain, TransitionRecord, TransitionStatus};
