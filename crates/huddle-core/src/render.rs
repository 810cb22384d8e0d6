//! Rendering sink: where committed models and failures are delivered

use std::sync::{Mutex, MutexGuard};

use crate::errors::HuddleError;
use crate::transition::ResolvedChain;

/// Consumer of resolver results
///
/// Called with the navigation context's delivery lock held, at most once per
/// transition. Implementations must not call back into `navigate`.
pub trait RenderSink: Send + Sync {
    fn render(&self, chain: &ResolvedChain);

    fn render_error(&self, error: &HuddleError);
}

/// One delivery received by a [`RecordingSink`]
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Chain(ResolvedChain),
    Error(HuddleError),
}

/// Sink that keeps every delivery in order
#[derive(Debug, Default)]
pub struct RecordingSink {
    deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.lock_deliveries().clone()
    }

    pub fn chains(&self) -> Vec<ResolvedChain> {
        self.deliveries()
            .into_iter()
            .filter_map(|d| match d {
                Delivery::Chain(chain) => Some(chain),
                Delivery::Error(_) => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<HuddleError> {
        self.deliveries()
            .into_iter()
            .filter_map(|d| match d {
                Delivery::Error(err) => Some(err),
                Delivery::Chain(_) => None,
            })
            .collect()
    }

    fn push(&self, delivery: Delivery) {
        self.lock_deliveries().push(delivery);
    }

    fn lock_deliveries(&self) -> MutexGuard<'_, Vec<Delivery>> {
        self.deliveries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RenderSink for RecordingSink {
    fn render(&self, chain: &ResolvedChain) {
        self.push(Delivery::Chain(chain.clone()));
    }

    fn render_error(&self, error: &HuddleError) {
        self.push(Delivery::Error(error.clone()));
    }
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn render(&self, _chain: &ResolvedChain) {}

    fn render_error(&self, _error: &HuddleError) {}
}
