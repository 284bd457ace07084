use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("Unknown tab action: {0:?}")]
    Unknown(String),
}

/// One of the mutually exclusive merge request panels.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[default]
    Notes,
    Commits,
    Diffs,
    Pipelines,
}

impl Action {
    pub fn all() -> [Action; 4] {
        [
            Action::Notes,
            Action::Commits,
            Action::Diffs,
            Action::Pipelines,
        ]
    }

    /// Name used for the panel element and the trailing path segment.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Notes => "notes",
            Action::Commits => "commits",
            Action::Diffs => "diffs",
            Action::Pipelines => "pipelines",
        }
    }

    /// Path segment appended to the base path. `Notes` lives on the base path itself.
    pub fn segment(&self) -> Option<&'static str> {
        match self {
            Action::Notes => None,
            other => Some(other.name()),
        }
    }

    /// Exact, case-sensitive match of a trailing path segment.
    pub fn from_segment(segment: &str) -> Option<Action> {
        match segment {
            "notes" | "show" => Some(Action::Notes),
            "commits" => Some(Action::Commits),
            "diffs" => Some(Action::Diffs),
            "pipelines" => Some(Action::Pipelines),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::Notes => "Overview",
            Action::Commits => "Commits",
            Action::Diffs => "Changes",
            Action::Pipelines => "Pipelines",
        }
    }

    pub fn next(&self) -> Action {
        match self {
            Action::Notes => Action::Commits,
            Action::Commits => Action::Diffs,
            Action::Diffs => Action::Pipelines,
            Action::Pipelines => Action::Notes,
        }
    }

    pub fn prev(&self) -> Action {
        match self {
            Action::Notes => Action::Pipelines,
            Action::Commits => Action::Notes,
            Action::Diffs => Action::Commits,
            Action::Pipelines => Action::Diffs,
        }
    }
}

impl FromStr for Action {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::from_segment(s).ok_or_else(|| ActionError::Unknown(s.to_string()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
