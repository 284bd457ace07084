use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{path, resolve, view};

#[derive(Parser)]
#[command(name = "mrtabs")]
#[command(about = "Merge request tabs - browse the panels of a GitLab merge request")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open a merge request in the terminal viewer
    View(view::Args),

    /// Print the address a tab switch would produce
    Path(path::Args),

    /// Find the comment a fragment points at in saved diff markup
    Resolve(resolve::Args),
}
