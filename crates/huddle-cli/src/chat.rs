//! The chat app's route tree
//!
//! ```text
//! /login
//! /teams                        guard: signed in, else /login
//! /teams/:teamId
//! /teams/:teamId/:channelId
//! ```

use huddle_core::capability::FetchOptions;
use huddle_core::hooks::{guard_fn, model_fn, static_model, GuardOutcome, ModelOutcome};
use huddle_core::{HuddleError, Result, RouteNode, RouteTree};
use serde_json::json;

pub const USERS_URL: &str = "/api/users";

pub fn routes() -> Result<RouteTree> {
    let require_sign_in = guard_fn(|ctx| async move {
        if !ctx.auth().is_authenticated() {
            return Ok(ctx.request_redirect("/login"));
        }
        ctx.auth().load_current_user().await?;
        Ok(GuardOutcome::Proceed)
    });

    let teams = model_fn(|ctx| async move {
        let teams = ctx
            .data()
            .fetch_json("/api/teams", &FetchOptions::get())
            .await?;
        Ok(ModelOutcome::Resolved(teams))
    });

    let team = model_fn(|ctx| async move {
        let team_id = ctx.param("teamId").unwrap_or_default();
        let url = format!("/api/teams/{}", team_id);
        let team = ctx.data().fetch_json(&url, &FetchOptions::get()).await?;
        Ok(ModelOutcome::Resolved(team))
    });

    let channel = model_fn(|ctx| async move {
        let wanted = ctx.param("channelId").unwrap_or_default();
        ctx.parent_model()
            .and_then(|team| team["channels"].as_array())
            .and_then(|channels| channels.iter().find(|c| c["id"] == wanted))
            .cloned()
            .map(ModelOutcome::Resolved)
            .ok_or_else(|| HuddleError::hook(ctx.route(), format!("channel {} not found", wanted)))
    });

    RouteTree::new(vec![
        RouteNode::new("login", "login").with_model(static_model(json!({"page": "login"}))),
        RouteNode::new("teams", "teams")
            .with_guard(require_sign_in)
            .with_model(teams)
            .with_child(
                RouteNode::new("team", ":teamId")
                    .with_model(team)
                    .with_child(RouteNode::new("channel", ":channelId").with_model(channel)),
            ),
    ])
}
