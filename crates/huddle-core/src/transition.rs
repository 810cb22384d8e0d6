//! Transition records and navigation outcomes

use serde::Serialize;

use crate::hooks::ModelValue;
use crate::route::Params;

/// Lifecycle of one navigation attempt
///
/// `Pending` moves to exactly one terminal status and never leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStatus {
    Pending,
    Committed,
    Redirected,
    Stale,
    Failed,
}

impl TransitionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransitionStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionStatus::Pending => "pending",
            TransitionStatus::Committed => "committed",
            TransitionStatus::Redirected => "redirected",
            TransitionStatus::Stale => "stale",
            TransitionStatus::Failed => "failed",
        }
    }
}

/// Read-only snapshot of a transition kept by the navigation context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionRecord {
    pub generation: u64,
    pub target_path: String,
    pub status: TransitionStatus,
    /// Set when the transition ended `Redirected`
    pub redirected_to: Option<String>,
    pub request_id: String,
}

/// Models of a committed transition, as handed to the rendering sink
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedChain {
    pub generation: u64,
    /// Path that was finally resolved (after any redirects)
    pub path: String,
    /// Paths abandoned by redirects on the way, in order
    pub redirected_from: Vec<String>,
    /// Route names, root to leaf
    pub routes: Vec<String>,
    /// Every parameter bound along the chain
    pub params: Params,
    /// One model per depth; `null` where a route has no model hook
    pub models: Vec<ModelValue>,
}

impl ResolvedChain {
    /// Model of the deepest route
    pub fn leaf_model(&self) -> Option<&ModelValue> {
        self.models.last()
    }
}

/// Result of a `navigate` call that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Models were delivered to the rendering sink
    Committed(ResolvedChain),
    /// A newer navigation took over; nothing was delivered
    Superseded { generation: u64 },
}

impl Outcome {
    pub fn committed(&self) -> Option<&ResolvedChain> {
        match self {
            Outcome::Committed(chain) => Some(chain),
            Outcome::Superseded { .. } => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Outcome::Superseded { .. })
    }
}
