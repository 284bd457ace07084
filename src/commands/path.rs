use anyhow::Result;
use clap::Args as ClapArgs;

use crate::models::{normalize_fragment, Action, LocationState};
use crate::routing;

#[derive(ClapArgs)]
pub struct Args {
    /// Current page address (path, optionally with ?query and #fragment)
    pub path: String,

    /// Tab to switch to (notes, commits, diffs, pipelines)
    #[arg(short, long)]
    pub action: Action,

    /// Query string to carry over (overrides one in the address)
    #[arg(short, long)]
    pub query: Option<String>,

    /// Fragment to carry over (overrides one in the address)
    #[arg(short, long)]
    pub fragment: Option<String>,

    /// Also print the JSON resource the panel is loaded from
    #[arg(long)]
    pub json: bool,
}

fn normalize_query(query: &str) -> String {
    if query.is_empty() || query.starts_with('?') {
        query.to_string()
    } else {
        format!("?{}", query)
    }
}

/// Address after switching to the requested tab, plus the panel's JSON
/// resource if asked for and the panel has one.
pub fn derive(args: &Args) -> (String, Option<String>) {
    let mut location = LocationState::parse(&args.path);
    if let Some(query) = &args.query {
        location.query = normalize_query(query);
    }
    if let Some(fragment) = &args.fragment {
        location.fragment = normalize_fragment(fragment);
    }

    let address = routing::derive_location(
        &location.path,
        &location.query,
        &location.fragment,
        args.action,
    );
    let json = (args.json && args.action.segment().is_some())
        .then(|| routing::json_resource(&location.path, args.action, &location.query));
    (address, json)
}

pub fn execute(args: Args) -> Result<()> {
    let (address, json) = derive(&args);
    tracing::debug!("{} -> {}", args.path, address);

    println!("{}", address);
    if let Some(json) = json {
        println!("{}", json);
    }
    Ok(())
}
