//! Navigate command

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use huddle_core::capability::{AuthGate, DataSource};
use huddle_core::{
    FixtureDataSource, HuddleConfig, HuddleError, NavigationContext, Outcome, RenderSink,
    ResolvedChain, Resolver, SessionAuthGate,
};
use huddle_fetch::HttpDataSource;
use serde_json::json;

use crate::chat;

#[derive(Debug, Args)]
pub struct NavigateArgs {
    /// Path to resolve, e.g. /teams/gh/prs
    pub path: String,

    /// JSON file mapping URLs to response bodies
    #[arg(long, conflicts_with = "base_url")]
    pub fixtures: Option<PathBuf>,

    /// Backend base URL to fetch from instead of fixtures
    #[arg(long)]
    pub base_url: Option<String>,

    /// Bearer token for the backend
    #[arg(long, requires = "base_url")]
    pub token: Option<String>,

    /// Sign in as this user before navigating
    #[arg(long)]
    pub user: Option<String>,
}

/// Prints committed chains and errors to stdout as JSON
struct JsonSink;

impl RenderSink for JsonSink {
    fn render(&self, chain: &ResolvedChain) {
        match serde_json::to_string_pretty(chain) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Error: cannot encode chain: {}", e),
        }
    }

    fn render_error(&self, error: &HuddleError) {
        let body = json!({"error": {"code": error.code(), "message": error.to_string()}});
        println!("{}", body);
    }
}

fn data_source(args: &NavigateArgs) -> Result<Arc<dyn DataSource>, Box<dyn std::error::Error>> {
    if let Some(base_url) = &args.base_url {
        let mut source = HttpDataSource::new(base_url.as_str())?;
        if let Some(token) = &args.token {
            source = source.with_token(token.as_str());
        }
        return Ok(Arc::new(source));
    }
    match &args.fixtures {
        Some(path) => Ok(Arc::new(FixtureDataSource::from_json_file(path)?)),
        None => Err("Must specify either --fixtures or --base-url".into()),
    }
}

pub async fn execute(
    args: NavigateArgs,
    config: &HuddleConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = data_source(&args)?;
    let auth = Arc::new(SessionAuthGate::new(Arc::clone(&data), chat::USERS_URL));
    if let Some(user) = &args.user {
        auth.sign_in(user.as_str());
    }
    let auth: Arc<dyn AuthGate> = auth;

    let resolver = Resolver::new(
        Arc::new(chat::routes()?),
        Arc::new(NavigationContext::with_history_limit(
            config.resolver.history_limit,
        )),
        auth,
        data,
        Arc::new(JsonSink),
    )
    .with_config(config.resolver.clone());

    match resolver.navigate(&args.path).await? {
        Outcome::Committed(_) => Ok(()),
        Outcome::Superseded { generation } => {
            Err(format!("navigation {} was superseded", generation).into())
        }
    }
}
