use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use std::path::PathBuf;

use crate::config::Config;
use crate::fetch::PanelContent;
use crate::fragment::{self, FragmentTarget};
use crate::models::DiffLayoutMode;

#[derive(ClapArgs)]
pub struct Args {
    /// Saved `diffs.json` response or raw diff HTML
    pub file: PathBuf,

    /// Fragment to resolve, with or without the leading '#'
    #[arg(short, long)]
    pub fragment: String,

    /// Diff view mode (inline or parallel); defaults to the configured one
    #[arg(short, long)]
    pub layout: Option<DiffLayoutMode>,
}

/// Diff markup from either a JSON panel response or plain HTML.
pub fn read_markup(content: &str) -> Result<String> {
    if content.trim_start().starts_with('{') {
        let panel: PanelContent =
            serde_json::from_str(content).context("Failed to parse panel JSON")?;
        Ok(panel.html)
    } else {
        Ok(content.to_string())
    }
}

pub fn describe(target: &FragmentTarget) -> String {
    match target {
        FragmentTarget::CommentMatch { element, column } => {
            format!("comment {} <{}> in {} column", element.id, element.tag, column)
        }
        FragmentTarget::NoMatch => "no match".to_string(),
    }
}

pub fn execute(args: Args, config: &Config) -> Result<()> {
    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {:?}", args.file))?;
    let markup = read_markup(&content)?;
    let mode: DiffLayoutMode = args.layout.unwrap_or(config.diff_view);

    let target = fragment::resolve(&markup, &args.fragment, mode);
    println!("{}", describe(&target));
    Ok(())
}
