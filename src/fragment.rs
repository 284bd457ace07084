use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use std::sync::LazyLock;

use crate::browser::NoteVisibility;
use crate::models::DiffLayoutMode;

static COMMENT_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^note_[A-Za-z0-9_-]+$").expect("comment anchor pattern"));

const NOTE_SELECTOR: &str = ".note[id]";

/// Side of the diff a comment is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Old,
    New,
}

impl Column {
    pub fn for_layout(mode: DiffLayoutMode) -> Column {
        match mode {
            DiffLayoutMode::Inline => Column::Old,
            DiffLayoutMode::SideBySide => Column::New,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Old => f.write_str("old"),
            Column::New => f.write_str("new"),
        }
    }
}

/// A comment element located in panel markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteElement {
    pub id: String,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentTarget {
    CommentMatch { element: NoteElement, column: Column },
    NoMatch,
}

/// Ask the note layer to show a comment even if its thread is collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealRequest {
    pub target: NoteElement,
    pub line_type: Column,
    pub force_show: bool,
}

/// Whether `id` is shaped like a comment anchor. Line anchors (`L35`,
/// `<sha>_35_35`) are deliberately not.
pub fn is_comment_anchor(id: &str) -> bool {
    COMMENT_ANCHOR.is_match(id)
}

pub fn resolve(markup: &str, fragment_id: &str, mode: DiffLayoutMode) -> FragmentTarget {
    let id = fragment_id.strip_prefix('#').unwrap_or(fragment_id);
    if id.is_empty() || !is_comment_anchor(id) {
        tracing::trace!("Fragment {:?} is not a comment anchor", id);
        return FragmentTarget::NoMatch;
    }

    match find_note(markup, id) {
        Some(element) => FragmentTarget::CommentMatch {
            element,
            column: Column::for_layout(mode),
        },
        None => {
            tracing::debug!("No note element with id {:?} in loaded markup", id);
            FragmentTarget::NoMatch
        }
    }
}

/// Forward a match to the note layer. Returns whether a request was sent.
pub fn reveal(target: &FragmentTarget, notes: &dyn NoteVisibility) -> bool {
    match target {
        FragmentTarget::CommentMatch { element, column } => {
            notes.toggle_diff_note(RevealRequest {
                target: element.clone(),
                line_type: *column,
                force_show: true,
            });
            true
        }
        FragmentTarget::NoMatch => false,
    }
}

/// First element carrying both `id` and the `note` class.
pub fn find_note(markup: &str, id: &str) -> Option<NoteElement> {
    let selector = format!(r#".note[id="{}"]"#, id);
    let selector = match Selector::parse(&selector) {
        Ok(selector) => selector,
        Err(e) => {
            tracing::debug!("Cannot build note selector for {:?}: {:?}", id, e);
            return None;
        }
    };

    let document = Html::parse_fragment(markup);
    let element = document.select(&selector).next()?;
    note_element(element)
}

/// Ids of every comment in the markup, in document order.
pub fn note_ids(markup: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(NOTE_SELECTOR) else {
        return Vec::new();
    };

    let document = Html::parse_fragment(markup);
    document
        .select(&selector)
        .filter_map(note_element)
        .map(|element| element.id)
        .collect()
}

fn note_element(element: ElementRef<'_>) -> Option<NoteElement> {
    let value = element.value();
    Some(NoteElement {
        id: value.id()?.to_string(),
        tag: value.name().to_string(),
    })
}
