//! Transition resolver
//!
//! `navigate(path)` matches the path against the route tree and walks the
//! matched chain root to leaf. At each depth the guard runs, then the model
//! hook; each hook settles before the next one starts. After every await the
//! resolver asks the [`NavigationContext`] whether its generation is still
//! current and quits silently if not.
//!
//! A redirect requested by a guard or model ends the transition `Redirected`
//! and starts a fresh one for the new path, from the root of the tree. Up to
//! `max_redirects` redirects are followed per call; the next one fails the
//! call with `RedirectLoop`.
//!
//! Logging:
//! - `log_op_start!` / `log_op_end!` / `log_op_error!` per `navigate`
//! - debug events per hook, info events on redirect and on staleness

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use huddle_core_types::schema::{EVENT_REDIRECT, EVENT_STALE};
use huddle_core_types::RequestContext;
use tracing::Instrument;

use crate::capability::{AuthGate, DataSource};
use crate::config::ResolverConfig;
use crate::context::NavigationContext;
use crate::errors::{HuddleError, Result};
use crate::hooks::{GuardContext, GuardOutcome, ModelContext, ModelOutcome, ModelValue};
use crate::render::RenderSink;
use crate::route::{match_path, Params, RouteTree};
use crate::transition::{Outcome, ResolvedChain, TransitionStatus};
use crate::{log_op_end, log_op_error, log_op_start};

/// How one transition ended, as seen by the redirect loop
enum Step {
    Committed(ResolvedChain),
    Redirect(String),
    Stale,
    Failed(HuddleError),
}

/// Drives navigations over a route tree
///
/// Cheap to clone; clones share the tree, context, capabilities and sink, so
/// concurrent `navigate` calls on clones compete for the same generation.
#[derive(Clone)]
pub struct Resolver {
    tree: Arc<RouteTree>,
    context: Arc<NavigationContext>,
    auth: Arc<dyn AuthGate>,
    data: Arc<dyn DataSource>,
    sink: Arc<dyn RenderSink>,
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(
        tree: Arc<RouteTree>,
        context: Arc<NavigationContext>,
        auth: Arc<dyn AuthGate>,
        data: Arc<dyn DataSource>,
        sink: Arc<dyn RenderSink>,
    ) -> Self {
        Self {
            tree,
            context,
            auth,
            data,
            sink,
            config: ResolverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn context(&self) -> &Arc<NavigationContext> {
        &self.context
    }

    pub fn tree(&self) -> &Arc<RouteTree> {
        &self.tree
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Navigate to `path`
    ///
    /// Returns `Committed` once the models were delivered to the sink, or
    /// `Superseded` if a newer navigation took over first (nothing delivered).
    ///
    /// # Errors
    ///
    /// `RouteNotFound`, `RedirectLoop`, `HookTimeout`, or whatever a hook
    /// returned. The error has already been delivered to the sink.
    pub async fn navigate(&self, path: &str) -> Result<Outcome> {
        let request = RequestContext::new();
        let span = tracing::info_span!(
            "navigate",
            request_id = %request.request_id,
            trace_id = %request.trace_id,
        );
        self.navigate_logged(path, request).instrument(span).await
    }

    async fn navigate_logged(&self, path: &str, request: RequestContext) -> Result<Outcome> {
        log_op_start!("navigate", path = path);
        let start = Instant::now();

        let outcome = self.navigate_impl(path, request).await.map_err(|e| {
            log_op_error!(
                "navigate",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                path = path
            );
            e
        })?;

        match &outcome {
            Outcome::Committed(chain) => log_op_end!(
                "navigate",
                duration_ms = start.elapsed().as_millis() as u64,
                path = path,
                generation = chain.generation,
                chain_len = chain.models.len() as u64
            ),
            Outcome::Superseded { generation } => log_op_end!(
                "navigate",
                duration_ms = start.elapsed().as_millis() as u64,
                path = path,
                generation = *generation,
                superseded = true
            ),
        }

        Ok(outcome)
    }

    async fn navigate_impl(&self, path: &str, request: RequestContext) -> Result<Outcome> {
        let mut request = request;
        let mut generation = self.context.begin(path, &request);
        let mut target = path.to_string();
        let mut trail: Vec<String> = Vec::new();

        loop {
            let to = match self.resolve(&target, generation, &trail).await {
                Step::Committed(chain) => return Ok(Outcome::Committed(chain)),
                Step::Stale => return Ok(self.superseded(&target, generation)),
                Step::Failed(err) => return Err(err),
                Step::Redirect(to) => to,
            };

            if trail.len() >= self.config.max_redirects {
                let err = HuddleError::RedirectLoop {
                    path: path.to_string(),
                    limit: self.config.max_redirects,
                };
                return match self.fail(generation, err) {
                    Some(err) => Err(err),
                    None => Ok(self.superseded(&target, generation)),
                };
            }

            let next_request = request.follow();
            let Some(next) = self.context.redirect(generation, &to, &next_request) else {
                return Ok(self.superseded(&target, generation));
            };

            tracing::info!(
                op = "navigate",
                event = EVENT_REDIRECT,
                path = %target,
                redirect_to = %to,
                generation = next,
                request_id = %next_request.request_id,
            );

            trail.push(std::mem::replace(&mut target, to));
            generation = next;
            request = next_request;
        }
    }

    /// Run one transition: match, walk hooks root to leaf, commit
    async fn resolve(&self, target: &str, generation: u64, trail: &[String]) -> Step {
        let chain = match match_path(&self.tree, target) {
            Ok(chain) => chain,
            Err(err) => return self.fail_step(generation, err),
        };

        let mut params = Params::new();
        let mut models: Vec<ModelValue> = Vec::with_capacity(chain.len());

        for (depth, matched) in chain.iter().enumerate() {
            if !self.still_current(generation) {
                return Step::Stale;
            }
            let route = matched.node.name();
            params.extend(matched.params.clone());

            if let Some(guard) = matched.node.guard() {
                tracing::debug!(op = "navigate", route, depth, generation, "running guard");
                let ctx = GuardContext::new(
                    route,
                    params.clone(),
                    Arc::clone(&self.auth),
                    Arc::clone(&self.data),
                );
                let result = self.run_hook(route, guard.check(ctx)).await;
                if !self.still_current(generation) {
                    return Step::Stale;
                }
                match result {
                    Ok(GuardOutcome::Proceed) => {}
                    Ok(GuardOutcome::Redirect(to)) => return Step::Redirect(to),
                    Err(err) => return self.fail_step(generation, err),
                }
            }

            let model = match matched.node.model() {
                Some(hook) => {
                    tracing::debug!(op = "navigate", route, depth, generation, "loading model");
                    let ctx = ModelContext::new(
                        route,
                        matched.params.clone(),
                        models.last().cloned(),
                        Arc::clone(&self.auth),
                        Arc::clone(&self.data),
                    );
                    let result = self.run_hook(route, hook.load(ctx)).await;
                    if !self.still_current(generation) {
                        return Step::Stale;
                    }
                    match result {
                        Ok(ModelOutcome::Resolved(value)) => value,
                        Ok(ModelOutcome::Redirect(to)) => return Step::Redirect(to),
                        Err(err) => return self.fail_step(generation, err),
                    }
                }
                None => ModelValue::Null,
            };
            models.push(model);
        }

        let resolved = ResolvedChain {
            generation,
            path: target.to_string(),
            redirected_from: trail.to_vec(),
            routes: chain.iter().map(|m| m.node.name().to_string()).collect(),
            params,
            models,
        };

        if self
            .context
            .finish(generation, TransitionStatus::Committed, || {
                self.sink.render(&resolved)
            })
        {
            Step::Committed(resolved)
        } else {
            Step::Stale
        }
    }

    async fn run_hook<T, F>(&self, route: &str, hook: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.config.hook_timeout() {
            Some(limit) => tokio::time::timeout(limit, hook).await.unwrap_or_else(|_| {
                Err(HuddleError::HookTimeout {
                    route: route.to_string(),
                    timeout_ms: limit.as_millis() as u64,
                })
            }),
            None => hook.await,
        }
    }

    fn still_current(&self, generation: u64) -> bool {
        if self.context.is_current(generation) {
            return true;
        }
        self.context.mark_stale(generation);
        false
    }

    /// Fail `generation` and deliver `err`, unless it already went stale
    fn fail(&self, generation: u64, err: HuddleError) -> Option<HuddleError> {
        let delivered = self
            .context
            .finish(generation, TransitionStatus::Failed, || {
                self.sink.render_error(&err)
            });
        delivered.then_some(err)
    }

    fn fail_step(&self, generation: u64, err: HuddleError) -> Step {
        self.fail(generation, err).map_or(Step::Stale, Step::Failed)
    }

    fn superseded(&self, target: &str, generation: u64) -> Outcome {
        tracing::info!(
            op = "navigate",
            event = EVENT_STALE,
            path = %target,
            generation,
            current_generation = self.context.current_generation(),
        );
        Outcome::Superseded { generation }
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("tree", &self.tree)
            .field("context", &self.context)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
