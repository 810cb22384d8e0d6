use std::sync::{Arc, Mutex};

use huddle_core::capability::{AuthGate, DataSource, FetchOptions};
use huddle_core::hooks::{guard_fn, model_fn, GuardOutcome, ModelOutcome};
use huddle_core::{
    FixtureDataSource, HuddleError, NavigationContext, RecordingSink, ResolverConfig, Resolver,
    RouteNode, RouteTree, SessionAuthGate,
};
use serde_json::{json, Value};

/// Ordered log of hook activity shared by instrumented hooks
#[derive(Clone, Default)]
pub struct HookLog {
    log: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl HookLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.log.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries().iter().any(|e| e == entry)
    }
}

/// Everything a resolver test needs to drive and observe navigations
#[allow(dead_code)]
pub struct Harness {
    pub resolver: Resolver,
    pub sink: Arc<RecordingSink>,
    pub data: Arc<FixtureDataSource>,
    pub auth: Arc<SessionAuthGate>,
}

#[allow(dead_code)]
impl Harness {
    pub fn context(&self) -> &Arc<NavigationContext> {
        self.resolver.context()
    }
}

#[allow(dead_code)]
pub fn harness(roots: Vec<RouteNode>) -> Harness {
    harness_with(roots, FixtureDataSource::new(), ResolverConfig::default())
}

#[allow(dead_code)]
pub fn harness_with(
    roots: Vec<RouteNode>,
    data: FixtureDataSource,
    config: ResolverConfig,
) -> Harness {
    let data = Arc::new(data);
    let data_dyn: Arc<dyn DataSource> = data.clone();
    let auth = Arc::new(SessionAuthGate::new(data_dyn.clone(), "/api/users"));
    let auth_dyn: Arc<dyn AuthGate> = auth.clone();
    let sink = Arc::new(RecordingSink::new());

    let resolver = Resolver::new(
        Arc::new(RouteTree::new(roots).unwrap()),
        Arc::new(NavigationContext::with_history_limit(config.history_limit)),
        auth_dyn,
        data_dyn,
        sink.clone(),
    )
    .with_config(config);

    Harness {
        resolver,
        sink,
        data,
        auth,
    }
}

/// Backend answers for the chat app
#[allow(dead_code)]
pub fn chat_fixtures() -> FixtureDataSource {
    FixtureDataSource::new()
        .with_json("/api/users/mike", json!({"id": "mike", "name": "Mike"}))
        .with_json(
            "/api/teams",
            json!([{"id": "gh", "name": "GitHub"}, {"id": "ops", "name": "Ops"}]),
        )
        .with_json(
            "/api/teams/gh",
            json!({
                "id": "gh",
                "name": "GitHub",
                "channels": [
                    {"id": "prs", "name": "Pull requests"},
                    {"id": "ci", "name": "CI"}
                ]
            }),
        )
        .with_json(
            "/api/teams/ops",
            json!({"id": "ops", "name": "Ops", "channels": []}),
        )
}

/// `login`, `teams -> team(:teamId) -> channel(:channelId)` with every hook
/// recording `<kind>:<route>:start` and `<kind>:<route>:end` into `hook_log`
#[allow(dead_code)]
pub fn chat_routes(hook_log: &HookLog) -> Vec<RouteNode> {
    let p = hook_log.clone();
    let login_model = model_fn(move |_ctx| {
        let p = p.clone();
        async move {
            p.record("model:login:start");
            p.record("model:login:end");
            Ok(json!({"page": "login"}).into())
        }
    });

    let p = hook_log.clone();
    let teams_guard = guard_fn(move |ctx| {
        let p = p.clone();
        async move {
            p.record("guard:teams:start");
            if !ctx.auth().is_authenticated() {
                p.record("guard:teams:end");
                return Ok(ctx.request_redirect("/login"));
            }
            ctx.auth().load_current_user().await?;
            p.record("guard:teams:end");
            Ok(GuardOutcome::Proceed)
        }
    });

    let p = hook_log.clone();
    let teams_model = model_fn(move |ctx| {
        let p = p.clone();
        async move {
            p.record("model:teams:start");
            let teams = ctx.data().fetch_json("/api/teams", &FetchOptions::get()).await?;
            p.record("model:teams:end");
            Ok(ModelOutcome::Resolved(teams))
        }
    });

    let p = hook_log.clone();
    let team_model = model_fn(move |ctx| {
        let p = p.clone();
        async move {
            p.record("model:team:start");
            let team_id = ctx.param("teamId").unwrap_or_default().to_string();
            let url = format!("/api/teams/{}", team_id);
            let team = ctx.data().fetch_json(&url, &FetchOptions::get()).await?;
            p.record("model:team:end");
            Ok(ModelOutcome::Resolved(team))
        }
    });

    let p = hook_log.clone();
    let channel_model = model_fn(move |ctx| {
        let p = p.clone();
        async move {
            p.record("model:channel:start");
            let wanted = ctx.param("channelId").unwrap_or_default().to_string();
            let channel = ctx
                .parent_model()
                .and_then(|team| team["channels"].as_array())
                .and_then(|channels| channels.iter().find(|c| c["id"] == wanted.as_str()))
                .cloned()
                .ok_or_else(|| {
                    HuddleError::hook(ctx.route(), format!("no channel {}", wanted))
                })?;
            p.record("model:channel:end");
            Ok(ModelOutcome::Resolved(channel))
        }
    });

    vec![
        RouteNode::new("login", "login").with_model(login_model),
        RouteNode::new("teams", "teams")
            .with_guard(teams_guard)
            .with_model(teams_model)
            .with_child(
                RouteNode::new("team", ":teamId")
                    .with_model(team_model)
                    .with_child(RouteNode::new("channel", ":channelId").with_model(channel_model)),
            ),
    ]
}

/// Model hook that never settles
#[allow(dead_code)]
pub fn hung_model() -> Arc<dyn huddle_core::ModelHook> {
    model_fn(|_ctx| async {
        std::future::pending::<()>().await;
        Ok(ModelOutcome::Resolved(Value::Null))
    })
}
