//! Navigation context: generation counter and transition records
//!
//! The context is the single authority on which transition is current. Two
//! locks are involved:
//!
//! - `delivery` serializes generation bumps against commits and failures, so a
//!   delivery to the rendering sink can never interleave with a newer
//!   navigation starting.
//! - `state` guards the counter and the records. It is never held while the
//!   sink runs, so sinks may read the context.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use huddle_core_types::RequestContext;

use crate::transition::{TransitionRecord, TransitionStatus};

/// Default number of transition records kept for diagnostics
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

#[derive(Debug, Default)]
struct ContextState {
    generation: u64,
    history: VecDeque<TransitionRecord>,
}

impl ContextState {
    fn record_mut(&mut self, generation: u64) -> Option<&mut TransitionRecord> {
        self.history
            .iter_mut()
            .rev()
            .find(|r| r.generation == generation)
    }

    /// Move a record out of `Pending`; terminal records are left alone
    fn settle(&mut self, generation: u64, status: TransitionStatus, redirected_to: Option<String>) {
        if let Some(record) = self.record_mut(generation) {
            if !record.status.is_terminal() {
                record.status = status;
                record.redirected_to = redirected_to;
            }
        }
    }

    fn open(&mut self, target_path: &str, request: &RequestContext, limit: usize) -> u64 {
        let previous = self.generation;
        self.settle(previous, TransitionStatus::Stale, None);

        self.generation += 1;
        self.history.push_back(TransitionRecord {
            generation: self.generation,
            target_path: target_path.to_string(),
            status: TransitionStatus::Pending,
            redirected_to: None,
            request_id: request.request_id.to_string(),
        });
        while self.history.len() > limit {
            self.history.pop_front();
        }
        self.generation
    }
}

/// Shared navigation state handed to a [`Resolver`](crate::resolver::Resolver)
///
/// Create one per navigable surface and share it behind an `Arc`.
#[derive(Debug)]
pub struct NavigationContext {
    delivery: Mutex<()>,
    state: Mutex<ContextState>,
    history_limit: usize,
}

impl Default for NavigationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationContext {
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Keep at most `limit` records (at least one: the current transition)
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            delivery: Mutex::new(()),
            state: Mutex::new(ContextState::default()),
            history_limit: limit.max(1),
        }
    }

    /// Generation of the most recently started transition (0 before any)
    pub fn current_generation(&self) -> u64 {
        self.lock_state().generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.lock_state().generation == generation
    }

    /// Record of the most recently started transition
    pub fn current(&self) -> Option<TransitionRecord> {
        let state = self.lock_state();
        state
            .history
            .back()
            .filter(|r| r.generation == state.generation)
            .cloned()
    }

    /// Record of a given generation, if still retained
    pub fn record(&self, generation: u64) -> Option<TransitionRecord> {
        self.lock_state()
            .history
            .iter()
            .find(|r| r.generation == generation)
            .cloned()
    }

    /// Retained records, oldest first
    pub fn history(&self) -> Vec<TransitionRecord> {
        self.lock_state().history.iter().cloned().collect()
    }

    /// Start a transition: bump the generation and stale the previous one
    pub(crate) fn begin(&self, target_path: &str, request: &RequestContext) -> u64 {
        let _delivery = self.lock_delivery();
        self.lock_state()
            .open(target_path, request, self.history_limit)
    }

    /// End `generation` as `Redirected` and start the transition for `to`
    ///
    /// Returns `None` (and marks `generation` stale) if a newer navigation
    /// already took over. Both steps happen under one lock so no other
    /// navigation can slip between them.
    pub(crate) fn redirect(
        &self,
        generation: u64,
        to: &str,
        request: &RequestContext,
    ) -> Option<u64> {
        let _delivery = self.lock_delivery();
        let mut state = self.lock_state();
        if state.generation != generation {
            state.settle(generation, TransitionStatus::Stale, None);
            return None;
        }
        state.settle(generation, TransitionStatus::Redirected, Some(to.to_string()));
        Some(state.open(to, request, self.history_limit))
    }

    /// Settle `generation` with `status` and run `deliver` if it is current
    ///
    /// Returns `false` without calling `deliver` when the transition is stale.
    pub(crate) fn finish<F>(&self, generation: u64, status: TransitionStatus, deliver: F) -> bool
    where
        F: FnOnce(),
    {
        let _delivery = self.lock_delivery();
        {
            let mut state = self.lock_state();
            if state.generation != generation {
                state.settle(generation, TransitionStatus::Stale, None);
                return false;
            }
            state.settle(generation, status, None);
        }
        deliver();
        true
    }

    /// Mark `generation` stale if it is still pending
    pub(crate) fn mark_stale(&self, generation: u64) {
        self.lock_state()
            .settle(generation, TransitionStatus::Stale, None);
    }

    fn lock_state(&self) -> MutexGuard<'_, ContextState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_delivery(&self) -> MutexGuard<'_, ()> {
        self.delivery.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn begin(ctx: &NavigationContext, path: &str) -> u64 {
        ctx.begin(path, &RequestContext::new())
    }

    #[test]
    fn test_begin_bumps_generation_and_stales_previous() {
        let ctx = NavigationContext::new();
        assert_eq!(ctx.current_generation(), 0);
        assert!(ctx.current().is_none());

        let first = begin(&ctx, "/teams");
        let second = begin(&ctx, "/login");

        assert_eq!((first, second), (1, 2));
        assert!(!ctx.is_current(first));
        assert_eq!(ctx.record(first).unwrap().status, TransitionStatus::Stale);
        assert_eq!(ctx.current().unwrap().target_path, "/login");
        assert_eq!(ctx.current().unwrap().status, TransitionStatus::Pending);
    }

    #[test]
    fn test_finish_delivers_only_when_current() {
        let ctx = NavigationContext::new();
        let old = begin(&ctx, "/a");
        let new = begin(&ctx, "/b");

        let mut delivered = Vec::new();
        assert!(!ctx.finish(old, TransitionStatus::Committed, || delivered.push("a")));
        assert!(ctx.finish(new, TransitionStatus::Committed, || delivered.push("b")));

        assert_eq!(delivered, vec!["b"]);
        assert_eq!(ctx.record(old).unwrap().status, TransitionStatus::Stale);
        assert_eq!(ctx.record(new).unwrap().status, TransitionStatus::Committed);
    }

    #[test]
    fn test_terminal_status_never_changes() {
        let ctx = NavigationContext::new();
        let g = begin(&ctx, "/a");
        assert!(ctx.finish(g, TransitionStatus::Failed, || {}));

        // a later navigation must not relabel the failed transition
        begin(&ctx, "/b");
        ctx.mark_stale(g);
        assert_eq!(ctx.record(g).unwrap().status, TransitionStatus::Failed);
    }

    #[test]
    fn test_redirect_opens_next_transition() {
        let ctx = NavigationContext::new();
        let request = RequestContext::new();
        let g = ctx.begin("/teams", &request);

        let next = ctx.redirect(g, "/login", &request.follow()).unwrap();

        assert_eq!(next, g + 1);
        let record = ctx.record(g).unwrap();
        assert_eq!(record.status, TransitionStatus::Redirected);
        assert_eq!(record.redirected_to.as_deref(), Some("/login"));
        assert_eq!(ctx.current().unwrap().target_path, "/login");
    }

    #[test]
    fn test_redirect_from_stale_transition_is_refused() {
        let ctx = NavigationContext::new();
        let g = begin(&ctx, "/teams");
        begin(&ctx, "/other");

        assert!(ctx.redirect(g, "/login", &RequestContext::new()).is_none());
        assert_eq!(ctx.current().unwrap().target_path, "/other");
        assert_eq!(ctx.current_generation(), 2);
    }

    #[test]
    fn test_history_is_bounded() {
        let ctx = NavigationContext::with_history_limit(3);
        for i in 0..5 {
            begin(&ctx, &format!("/p{}", i));
        }

        let history = ctx.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].generation, 3);
        assert_eq!(history[2].generation, 5);
        assert!(ctx.record(1).is_none());
    }
}
