//! Collaborators the tab controller talks to: history, window opening, note
//! visibility, the diff view-mode setting and the pipelines view.
//!
//! Each seam is a trait. The in-memory implementations below back the
//! terminal front-end and the tests.

use anyhow::{bail, Result};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::process::{Command, Stdio};
use std::rc::Rc;

use crate::fragment::RevealRequest;
use crate::models::DiffLayoutMode;

pub const BLANK_TARGET: &str = "_blank";

/// State object stored with each history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryState {
    pub url: String,
}

pub trait History {
    /// Replace the current entry. Never grows history depth.
    fn replace_state(&self, state: HistoryState, title: &str, url: &str);
}

pub trait WindowOpener {
    fn open(&self, url: &str, target: &str) -> Result<()>;
}

pub trait NoteVisibility {
    fn toggle_diff_note(&self, request: RevealRequest);
}

pub trait DiffViewMode {
    fn diff_view_type(&self) -> DiffLayoutMode;
}

pub trait PipelinesView {
    fn mount(&self);
    fn destroy(&self);
}

/// The set of collaborators handed to the controller.
#[derive(Clone)]
pub struct Browser {
    pub history: Rc<dyn History>,
    pub opener: Rc<dyn WindowOpener>,
    pub notes: Rc<dyn NoteVisibility>,
    pub view_mode: Rc<dyn DiffViewMode>,
    pub pipelines: Rc<dyn PipelinesView>,
}

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub state: HistoryState,
    pub title: String,
    pub url: String,
}

/// History that keeps every replace call it received.
#[derive(Default)]
pub struct SessionHistory {
    replaced: RefCell<Vec<HistoryEntry>>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.replaced.borrow().clone()
    }

    #[cfg(test)]
    pub fn replace_count(&self) -> usize {
        self.replaced.borrow().len()
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<HistoryEntry> {
        self.replaced.borrow().last().cloned()
    }
}

impl History for SessionHistory {
    fn replace_state(&self, state: HistoryState, title: &str, url: &str) {
        tracing::debug!("history.replaceState url={}", url);
        self.replaced.borrow_mut().push(HistoryEntry {
            state,
            title: title.to_string(),
            url: url.to_string(),
        });
    }
}

/// Hands URLs to the platform's default browser.
pub struct SystemOpener;

impl WindowOpener for SystemOpener {
    fn open(&self, url: &str, target: &str) -> Result<()> {
        tracing::info!("Opening {} in {}", url, target);

        #[cfg(target_os = "macos")]
        let mut command = {
            let mut cmd = Command::new("open");
            cmd.arg(url);
            cmd
        };

        #[cfg(all(unix, not(target_os = "macos")))]
        let mut command = {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(url);
            cmd
        };

        #[cfg(target_os = "windows")]
        let mut command = {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]).arg(url);
            cmd
        };

        let status = command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if !status.success() {
            bail!("system open command failed with status {}", status);
        }
        Ok(())
    }
}

/// Records open requests instead of launching anything.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingOpener {
    opened: RefCell<Vec<(String, String)>>,
}

#[cfg(test)]
impl RecordingOpener {
    pub fn opened(&self) -> Vec<(String, String)> {
        self.opened.borrow().clone()
    }
}

#[cfg(test)]
impl WindowOpener for RecordingOpener {
    fn open(&self, url: &str, target: &str) -> Result<()> {
        self.opened
            .borrow_mut()
            .push((url.to_string(), target.to_string()));
        Ok(())
    }
}

/// Remembers which comment was last forced visible.
#[derive(Default)]
pub struct NoteFocus {
    requests: RefCell<Vec<RevealRequest>>,
}

impl NoteFocus {
    #[cfg(test)]
    pub fn requests(&self) -> Vec<RevealRequest> {
        self.requests.borrow().clone()
    }

    #[cfg(test)]
    pub fn focused(&self) -> Option<RevealRequest> {
        self.requests.borrow().last().cloned()
    }
}

impl NoteVisibility for NoteFocus {
    fn toggle_diff_note(&self, request: RevealRequest) {
        tracing::debug!(
            "Revealing note {} <{}> on {} side (force: {})",
            request.target.id,
            request.target.tag,
            request.line_type,
            request.force_show
        );
        self.requests.borrow_mut().push(request);
    }
}

/// The user's diff view setting.
#[derive(Default)]
pub struct ViewModeSetting {
    mode: Cell<DiffLayoutMode>,
}

impl ViewModeSetting {
    pub fn new(mode: DiffLayoutMode) -> Self {
        Self {
            mode: Cell::new(mode),
        }
    }

    pub fn set(&self, mode: DiffLayoutMode) {
        self.mode.set(mode);
    }

    pub fn toggle(&self) -> DiffLayoutMode {
        let next = self.mode.get().toggle();
        self.set(next);
        next
    }
}

impl DiffViewMode for ViewModeSetting {
    fn diff_view_type(&self) -> DiffLayoutMode {
        self.mode.get()
    }
}

/// Tracks whether the pipelines table is mounted.
#[derive(Default)]
pub struct PipelinesMount {
    mounted: Cell<bool>,
    mounts: Cell<usize>,
}

impl PipelinesMount {
    #[cfg(test)]
    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    #[cfg(test)]
    pub fn mount_count(&self) -> usize {
        self.mounts.get()
    }
}

impl PipelinesView for PipelinesMount {
    fn mount(&self) {
        self.mounted.set(true);
        self.mounts.set(self.mounts.get() + 1);
    }

    fn destroy(&self) {
        self.mounted.set(false);
    }
}
