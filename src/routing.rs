use crate::models::Action;

const HTML_SUFFIX: &str = ".html";
const JSON_SUFFIX: &str = ".json";

/// A merge request path decomposed as `base [ "/" action ] [ ".html" ] [ "/" ]`.
///
/// Parsing is total: anything that does not end in a known action segment is
/// taken to be the base path already.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequestPath {
    base: String,
    action: Option<Action>,
}

impl MergeRequestPath {
    pub fn parse(path: &str) -> Self {
        let trimmed = strip_decorations(path);

        match trimmed.rsplit_once('/') {
            Some((head, last)) => match Action::from_segment(last) {
                Some(action) => Self {
                    base: head.trim_end_matches('/').to_string(),
                    action: Some(action),
                },
                None => Self {
                    base: trimmed.to_string(),
                    action: None,
                },
            },
            None => Self {
                base: trimmed.to_string(),
                action: None,
            },
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Action named by the trailing segment, `Notes` when there is none.
    pub fn action(&self) -> Action {
        self.action.unwrap_or_default()
    }

    pub fn to_path(&self, action: Action) -> String {
        match action.segment() {
            Some(segment) => format!("{}/{}", self.base, segment),
            None if self.base.is_empty() => "/".to_string(),
            None => self.base.clone(),
        }
    }

    pub fn json_resource(&self, action: Action) -> String {
        match action.segment() {
            Some(segment) => format!("{}/{}{}", self.base, segment, JSON_SUFFIX),
            None => format!("{}{}", self.base, JSON_SUFFIX),
        }
    }
}

fn strip_decorations(path: &str) -> &str {
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(HTML_SUFFIX).unwrap_or(path);
    path.trim_end_matches('/')
}

/// Path for `target` derived from the current address. Query and fragment are
/// carried over unchanged.
pub fn derive_location(current_path: &str, query: &str, fragment: &str, target: Action) -> String {
    let path = MergeRequestPath::parse(current_path).to_path(target);
    format!("{}{}{}", path, query, fragment)
}

/// Content endpoint for `action`, e.g. `/group/project/merge_requests/1/diffs.json`.
pub fn json_resource(current_path: &str, action: Action, query: &str) -> String {
    let resource = MergeRequestPath::parse(current_path).json_resource(action);
    format!("{}{}", resource, query)
}
