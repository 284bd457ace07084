/// The externally observable address of the merge request page.
///
/// `query` keeps its leading `?` and `fragment` its leading `#`, the way a
/// browser location reports them. Either may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationState {
    pub path: String,
    pub query: String,
    pub fragment: String,
}

impl LocationState {
    pub fn new(
        path: impl Into<String>,
        query: impl Into<String>,
        fragment: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            query: query.into(),
            fragment: fragment.into(),
        }
    }

    /// Split an address of the form `path[?query][#fragment]`.
    pub fn parse(address: &str) -> Self {
        let (rest, fragment) = match address.find('#') {
            Some(i) => (&address[..i], &address[i..]),
            None => (address, ""),
        };
        let (path, query) = match rest.find('?') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, ""),
        };
        Self::new(path, query, fragment)
    }

    /// Fragment identifier without the leading `#`.
    pub fn fragment_id(&self) -> &str {
        self.fragment.strip_prefix('#').unwrap_or(&self.fragment)
    }

    pub fn with_fragment(mut self, fragment: &str) -> Self {
        self.fragment = normalize_fragment(fragment);
        self
    }

    pub fn address(&self) -> String {
        format!("{}{}{}", self.path, self.query, self.fragment)
    }
}

/// Ensure a non-empty fragment carries its leading `#`.
pub fn normalize_fragment(fragment: &str) -> String {
    if fragment.is_empty() || fragment.starts_with('#') {
        fragment.to_string()
    } else {
        format!("#{}", fragment)
    }
}
