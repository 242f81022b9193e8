use regex::Regex;

/// The bracket tag embedded in change-execution issue titles, e.g.
/// `[JIRA>DB-42]`. It is the only thing relating an execution-side issue back
/// to its intake ticket, so rendering and extraction must stay inverse of
/// each other for any key without a `]`.
#[derive(Debug, Clone)]
pub struct CorrelationTag {
    prefix: String,
    pattern: Regex,
}

impl CorrelationTag {
    pub fn new(prefix: &str) -> Self {
        let pattern = Regex::new(&format!(r"\[{}>([^\]]+)\]", regex::escape(prefix)))
            .expect("escaped prefix always forms a valid pattern");
        Self {
            prefix: prefix.to_owned(),
            pattern,
        }
    }

    /// Render the title for a change-execution issue tracking `key`.
    pub fn issue_title(&self, key: &str, summary: &str) -> String {
        format!("[{}>{}] {}", self.prefix, key, summary)
    }

    /// Pull the correlation key back out of a rendered title. `None` means
    /// the issue did not originate from this bridge.
    pub fn extract_key<'t>(&self, title: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(title)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
    }
}

impl Default for CorrelationTag {
    fn default() -> Self {
        Self::new("JIRA")
    }
}
