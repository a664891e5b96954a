use regex::Regex;
use crate::core::error::Result;

/// Glob-style pattern: `*` matches zero or more characters, `?` exactly one
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    pattern: String,
    prefix: String,
    regex: Regex,     // Anchored translation of the glob
}

impl WildcardPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let prefix: String = pattern
            .chars()
            .take_while(|&c| c != '*' && c != '?')
            .collect();

        // (?s) lets `?` and `*` span newlines in exact values
        let mut source = String::with_capacity(pattern.len() + 8);
        source.push_str("(?s)^");
        let mut literal = String::new();
        for c in pattern.chars() {
            match c {
                '*' | '?' => {
                    source.push_str(&regex::escape(&literal));
                    literal.clear();
                    source.push_str(if c == '*' { ".*" } else { "." });
                }
                _ => literal.push(c),
            }
        }
        source.push_str(&regex::escape(&literal));
        source.push('$');

        Ok(WildcardPattern {
            pattern: pattern.to_string(),
            prefix,
            regex: Regex::new(&source)?,
        })
    }

    /// Longest literal run before the first wildcard
    pub fn literal_prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    pub fn has_wildcards(&self) -> bool {
        self.pattern.contains(['*', '?'])
    }

    /// A pattern that must scan the whole dictionary
    pub fn has_leading_wildcard(&self) -> bool {
        self.pattern.starts_with(['*', '?'])
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}
