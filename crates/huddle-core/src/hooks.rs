//! Guard and model hooks
//!
//! Hooks are explicit trait objects stored on [`RouteNode`](crate::route::RouteNode)s.
//! The resolver calls them one at a time, root to leaf; a hook at depth `d+1`
//! never starts before the guard and model at depth `d` have settled.
//!
//! Closures can be adapted with [`guard_fn`] and [`model_fn`]:
//!
//! ```
//! use huddle_core::hooks::{guard_fn, GuardOutcome};
//!
//! let require_login = guard_fn(|ctx| async move {
//!     if ctx.auth().is_authenticated() {
//!         Ok(GuardOutcome::Proceed)
//!     } else {
//!         Ok(ctx.request_redirect("/login"))
//!     }
//! });
//! # let _ = require_login;
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;

use crate::capability::{AuthGate, DataSource};
use crate::errors::Result;
use crate::route::Params;

/// Value produced by a model hook; one per depth of the resolved chain
pub type ModelValue = Value;

/// What a guard decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Continue with this route's model hook
    Proceed,
    /// Abandon this transition and navigate to the given path instead
    Redirect(String),
}

/// What a model hook produced
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutcome {
    Resolved(ModelValue),
    /// Abandon this transition and navigate to the given path instead
    Redirect(String),
}

impl From<ModelValue> for ModelOutcome {
    fn from(value: ModelValue) -> Self {
        ModelOutcome::Resolved(value)
    }
}

/// Input handed to a guard
#[derive(Clone)]
pub struct GuardContext {
    route: String,
    params: Params,
    auth: Arc<dyn AuthGate>,
    data: Arc<dyn DataSource>,
}

impl GuardContext {
    pub(crate) fn new(
        route: &str,
        params: Params,
        auth: Arc<dyn AuthGate>,
        data: Arc<dyn DataSource>,
    ) -> Self {
        Self {
            route: route.to_string(),
            params,
            auth,
            data,
        }
    }

    /// Name of the route being guarded
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Parameters bound by this route and every ancestor
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn auth(&self) -> &Arc<dyn AuthGate> {
        &self.auth
    }

    pub fn data(&self) -> &Arc<dyn DataSource> {
        &self.data
    }

    /// Ask the resolver to abandon this transition and go to `path`
    pub fn request_redirect(&self, path: impl Into<String>) -> GuardOutcome {
        GuardOutcome::Redirect(path.into())
    }
}

/// Input handed to a model hook
#[derive(Clone)]
pub struct ModelContext {
    route: String,
    params: Params,
    parent_model: Option<ModelValue>,
    auth: Arc<dyn AuthGate>,
    data: Arc<dyn DataSource>,
}

impl ModelContext {
    pub(crate) fn new(
        route: &str,
        params: Params,
        parent_model: Option<ModelValue>,
        auth: Arc<dyn AuthGate>,
        data: Arc<dyn DataSource>,
    ) -> Self {
        Self {
            route: route.to_string(),
            params,
            parent_model,
            auth,
            data,
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    /// Parameters bound by this route's own segment
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Model resolved at the previous depth
    ///
    /// `None` at depth 0; `null` when the parent route has no model hook.
    pub fn parent_model(&self) -> Option<&ModelValue> {
        self.parent_model.as_ref()
    }

    pub fn auth(&self) -> &Arc<dyn AuthGate> {
        &self.auth
    }

    pub fn data(&self) -> &Arc<dyn DataSource> {
        &self.data
    }

    /// Ask the resolver to abandon this transition and go to `path`
    pub fn request_redirect(&self, path: impl Into<String>) -> ModelOutcome {
        ModelOutcome::Redirect(path.into())
    }
}

/// Authorization check run before a route's model
#[async_trait]
pub trait GuardHook: Send + Sync {
    /// # Errors
    ///
    /// Any error fails the transition.
    async fn check(&self, ctx: GuardContext) -> Result<GuardOutcome>;
}

/// Data loading for a route
#[async_trait]
pub trait ModelHook: Send + Sync {
    /// # Errors
    ///
    /// Any error fails the transition.
    async fn load(&self, ctx: ModelContext) -> Result<ModelOutcome>;
}

type GuardFn = dyn Fn(GuardContext) -> BoxFuture<'static, Result<GuardOutcome>> + Send + Sync;
type ModelFn = dyn Fn(ModelContext) -> BoxFuture<'static, Result<ModelOutcome>> + Send + Sync;

struct FnGuard(Box<GuardFn>);

#[async_trait]
impl GuardHook for FnGuard {
    async fn check(&self, ctx: GuardContext) -> Result<GuardOutcome> {
        (self.0)(ctx).await
    }
}

struct FnModel(Box<ModelFn>);

#[async_trait]
impl ModelHook for FnModel {
    async fn load(&self, ctx: ModelContext) -> Result<ModelOutcome> {
        (self.0)(ctx).await
    }
}

/// Adapt an async closure into a [`GuardHook`]
pub fn guard_fn<F, Fut>(f: F) -> Arc<dyn GuardHook>
where
    F: Fn(GuardContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<GuardOutcome>> + Send + 'static,
{
    Arc::new(FnGuard(Box::new(move |ctx| f(ctx).boxed())))
}

/// Adapt an async closure into a [`ModelHook`]
pub fn model_fn<F, Fut>(f: F) -> Arc<dyn ModelHook>
where
    F: Fn(ModelContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ModelOutcome>> + Send + 'static,
{
    Arc::new(FnModel(Box::new(move |ctx| f(ctx).boxed())))
}

/// Model hook that always resolves to a fixed value
pub fn static_model(value: ModelValue) -> Arc<dyn ModelHook> {
    model_fn(move |_| {
        let value = value.clone();
        async move { Ok(ModelOutcome::Resolved(value)) }
    })
}
