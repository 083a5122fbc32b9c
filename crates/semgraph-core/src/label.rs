//! Node label helpers: core/category splitting and placeholder handling.
//!
//! A node label may carry a category after a delimiter (`name|person`), and
//! may contain placeholders such as `<w>` that are only resolved once the
//! node's terminals are known.

/// Default delimiter between a label's core part and its category.
pub const DEFAULT_DELIMITER: char = '|';

/// Placeholder replaced by the text of the node's first terminal.
pub const WORD_PLACEHOLDER: &str = "<w>";

/// A node label split into its core part and optional category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeLabel {
    pub core: String,
    pub category: Option<String>,
}

impl NodeLabel {
    /// Splits `label` on the first `delimiter`. An empty category is `None`.
    pub fn parse(label: &str, delimiter: char) -> Self {
        match label.split_once(delimiter) {
            Some((core, category)) if !category.is_empty() => NodeLabel {
                core: core.to_string(),
                category: Some(category.to_string()),
            },
            Some((core, _)) => NodeLabel {
                core: core.to_string(),
                category: None,
            },
            None => NodeLabel {
                core: label.to_string(),
                category: None,
            },
        }
    }

    /// Re-joins core and category with `delimiter`.
    pub fn joined(&self, delimiter: char) -> String {
        match &self.category {
            Some(category) => format!("{}{}{}", self.core, delimiter, category),
            None => self.core.clone(),
        }
    }
}

/// Returns `true` if `value` still contains an unresolved `<...>` placeholder.
pub fn has_placeholder(value: &str) -> bool {
    match value.find('<') {
        Some(start) => value[start + 1..].contains('>'),
        None => false,
    }
}

/// Substitutes `<w>` with `word`. Other placeholders are left untouched.
pub fn resolve_placeholders(value: &str, word: Option<&str>) -> String {
    match word {
        Some(word) if value.contains(WORD_PLACEHOLDER) => value.replace(WORD_PLACEHOLDER, word),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_category() {
        let label = NodeLabel::parse("name|person", DEFAULT_DELIMITER);
        assert_eq!(label.core, "name");
        assert_eq!(label.category.as_deref(), Some("person"));
        assert_eq!(label.joined(DEFAULT_DELIMITER), "name|person");
    }

    #[test]
    fn parse_without_delimiter() {
        let label = NodeLabel::parse("arrive-01", DEFAULT_DELIMITER);
        assert_eq!(label.core, "arrive-01");
        assert!(label.category.is_none());
    }

    #[test]
    fn trailing_delimiter_gives_no_category() {
        let label = NodeLabel::parse("thing|", DEFAULT_DELIMITER);
        assert_eq!(label.core, "thing");
        assert!(label.category.is_none());
    }

    #[test]
    fn placeholder_detection() {
        assert!(has_placeholder("<w>-01"));
        assert!(has_placeholder("x<lemma>"));
        assert!(!has_placeholder("date-entity"));
        assert!(!has_placeholder("a<b"));
        assert!(!has_placeholder("a>b<"));
    }

    #[test]
    fn resolve_word_placeholder() {
        assert_eq!(resolve_placeholders("<w>-01", Some("arrive")), "arrive-01");
        assert_eq!(resolve_placeholders("<w>-01", None), "<w>-01");
        assert_eq!(resolve_placeholders("<l>", Some("x")), "<l>");
    }
}
