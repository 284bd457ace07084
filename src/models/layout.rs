use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Action;

/// Width presentation of the main content container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Expanded,
    Limited,
}

impl LayoutMode {
    pub fn for_action(action: Action) -> LayoutMode {
        match action {
            Action::Diffs | Action::Pipelines => LayoutMode::Expanded,
            Action::Notes | Action::Commits => LayoutMode::Limited,
        }
    }
}

/// How changed lines are rendered in the Changes panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DiffLayoutMode {
    #[default]
    #[serde(rename = "inline")]
    Inline,
    #[serde(rename = "parallel")]
    SideBySide,
}

impl DiffLayoutMode {
    pub fn toggle(&self) -> DiffLayoutMode {
        match self {
            DiffLayoutMode::Inline => DiffLayoutMode::SideBySide,
            DiffLayoutMode::SideBySide => DiffLayoutMode::Inline,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DiffLayoutMode::Inline => "inline",
            DiffLayoutMode::SideBySide => "parallel",
        }
    }
}

impl FromStr for DiffLayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inline" => Ok(DiffLayoutMode::Inline),
            "parallel" | "side-by-side" => Ok(DiffLayoutMode::SideBySide),
            other => Err(format!("unknown diff view mode: {}", other)),
        }
    }
}

impl fmt::Display for DiffLayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_mode_is_expanded_for_diffs_and_pipelines() {
        assert_eq!(LayoutMode::for_action(Action::Diffs), LayoutMode::Expanded);
        assert_eq!(
            LayoutMode::for_action(Action::Pipelines),
            LayoutMode::Expanded
        );
    }

    #[test]
    fn layout_mode_is_limited_for_notes_and_commits() {
        assert_eq!(LayoutMode::for_action(Action::Notes), LayoutMode::Limited);
        assert_eq!(LayoutMode::for_action(Action::Commits), LayoutMode::Limited);
    }

    #[test]
    fn diff_layout_mode_parses_wire_names() {
        assert_eq!("inline".parse(), Ok(DiffLayoutMode::Inline));
        assert_eq!("parallel".parse(), Ok(DiffLayoutMode::SideBySide));
        assert!("columns".parse::<DiffLayoutMode>().is_err());
    }

    #[test]
    fn diff_layout_mode_toggle_round_trips() {
        let mode = DiffLayoutMode::Inline;
        assert_eq!(mode.toggle(), DiffLayoutMode::SideBySide);
        assert_eq!(mode.toggle().toggle(), mode);
    }

    #[test]
    fn diff_layout_mode_deserializes_from_yaml() {
        let mode: DiffLayoutMode = serde_yaml::from_str("parallel").unwrap();
        assert_eq!(mode, DiffLayoutMode::SideBySide);
    }
}
