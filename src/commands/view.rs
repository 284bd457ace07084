use anyhow::{bail, Context, Result};
use clap::Args as ClapArgs;
use reqwest::Url;
use std::cell::RefCell;
use std::rc::Rc;
use tokio::task::LocalSet;
use tracing::info;

use crate::browser::{
    Browser, NoteFocus, PipelinesMount, SessionHistory, SystemOpener, ViewModeSetting,
};
use crate::config::Config;
use crate::controller::TabController;
use crate::fetch::HttpFetcher;
use crate::models::{DiffLayoutMode, LocationState};
use crate::page::Page;
use crate::routing::MergeRequestPath;
use crate::tui::ReviewApp;

#[derive(ClapArgs)]
pub struct Args {
    /// Merge request URL, or a path on the configured instance
    pub url: String,

    /// Diff view mode (inline or parallel)
    #[arg(long)]
    pub view: Option<DiffLayoutMode>,

    /// Personal access token (falls back to config, then $MRTABS_TOKEN)
    #[arg(long)]
    pub token: Option<String>,
}

/// Where the merge request lives: the instance origin and the page address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequestTarget {
    pub origin: String,
    pub location: LocationState,
}

pub fn parse_target(input: &str, base_url: &str) -> Result<MergeRequestTarget> {
    if input.starts_with('/') {
        return Ok(MergeRequestTarget {
            origin: base_url.trim_end_matches('/').to_string(),
            location: LocationState::parse(input),
        });
    }

    let url = Url::parse(input).with_context(|| format!("Invalid merge request URL: {}", input))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Unsupported URL scheme: {}", url.scheme());
    }

    let query = url.query().map(|q| format!("?{}", q)).unwrap_or_default();
    let fragment = url.fragment().map(|f| format!("#{}", f)).unwrap_or_default();
    Ok(MergeRequestTarget {
        origin: url.origin().ascii_serialization(),
        location: LocationState::new(url.path(), query, fragment),
    })
}

/// Window title for a merge request path, `Merge request !<iid>`.
pub fn page_title(path: &str) -> String {
    let parsed = MergeRequestPath::parse(path);
    match parsed.base().rsplit('/').next() {
        Some(iid) if !iid.is_empty() => format!("Merge request !{}", iid),
        _ => "Merge request".to_string(),
    }
}

pub async fn execute(args: Args, config: Config) -> Result<()> {
    let config = config
        .with_private_token(args.token)
        .with_diff_view(args.view);
    let target = parse_target(&args.url, &config.base_url)?;
    let config = config.with_base_url(target.origin.clone());

    let fetcher =
        Rc::new(HttpFetcher::from_config(&config).context("Failed to build HTTP client")?);
    info!(
        "Viewing {}{} ({} diff view)",
        target.origin,
        target.location.address(),
        config.diff_view
    );

    let page = Rc::new(RefCell::new(
        Page::new(page_title(&target.location.path), target.location).with_origin(target.origin),
    ));
    let view_mode = Rc::new(ViewModeSetting::new(config.diff_view));
    let browser = Browser {
        history: Rc::new(SessionHistory::new()),
        opener: Rc::new(SystemOpener),
        notes: Rc::new(NoteFocus::default()),
        view_mode: view_mode.clone(),
        pipelines: Rc::new(PipelinesMount::default()),
    };

    LocalSet::new()
        .run_until(async move {
            let controller = TabController::new(page, browser, fetcher);
            let mut app = ReviewApp::new(controller, view_mode);
            app.run().await
        })
        .await
}
