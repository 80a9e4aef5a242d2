use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use itertools::Itertools;

/// One term of a full-text query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextTerm {
    /// `word`
    Exact(String),
    /// `pre*`
    Prefix(String),
    /// `*suf`
    Suffix(String),
    /// `*mid*`
    Contains(String),
}

impl TextTerm {
    /// Checks a single lowercase token against this term.
    pub fn matches(&self, token: &str) -> bool {
        match self {
            TextTerm::Exact(word) => token == word,
            TextTerm::Prefix(word) => token.starts_with(word.as_str()),
            TextTerm::Suffix(word) => token.ends_with(word.as_str()),
            TextTerm::Contains(word) => token.contains(word.as_str()),
        }
    }
}

/// Splits text into distinct lowercase words, in order of first appearance.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_lowercase())
        .unique()
        .collect()
}

/// Parses a full-text query.
///
/// A query without wildcards matches any of its words. A query with a
/// leading or trailing `*` is a single wildcard term and cannot contain
/// more than one word.
pub fn parse_text_query(query: &str) -> NitriteResult<Vec<TextTerm>> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        log::error!("Text search query cannot be empty");
        return Err(NitriteError::new(
            "Text search query cannot be empty",
            ErrorKind::FilterError,
        ));
    }

    if !trimmed.starts_with('*') && !trimmed.ends_with('*') {
        let terms: Vec<TextTerm> = tokenize(trimmed).into_iter().map(TextTerm::Exact).collect();
        if terms.is_empty() {
            log::error!("Text search query {} has no searchable words", query);
            return Err(NitriteError::new(
                &format!("Text search query {} has no searchable words", query),
                ErrorKind::FilterError,
            ));
        }
        return Ok(terms);
    }

    if trimmed.chars().all(|c| c == '*') {
        log::error!("{} is not a valid search string", trimmed);
        return Err(NitriteError::new(
            &format!("{} is not a valid search string", trimmed),
            ErrorKind::FilterError,
        ));
    }

    if trimmed.contains(char::is_whitespace) {
        log::error!("Multiple words with wildcard is not supported");
        return Err(NitriteError::new(
            "Multiple words with wildcard is not supported",
            ErrorKind::FilterError,
        ));
    }

    let leading = trimmed.starts_with('*');
    let trailing = trimmed.len() > 1 && trimmed.ends_with('*');
    let word = trimmed.trim_matches('*').to_lowercase();
    if word.contains('*') {
        log::error!("Wildcard is only supported at the start or end of {}", trimmed);
        return Err(NitriteError::new(
            &format!("Wildcard is only supported at the start or end of {}", trimmed),
            ErrorKind::FilterError,
        ));
    }

    let term = match (leading, trailing) {
        (true, true) => TextTerm::Contains(word),
        (true, false) => TextTerm::Suffix(word),
        _ => TextTerm::Prefix(word),
    };
    Ok(vec![term])
}

/// Checks if `text` contains a word matching any of `terms`.
pub fn text_matches(text: &str, terms: &[TextTerm]) -> bool {
    tokenize(text)
        .iter()
        .any(|token| terms.iter().any(|term| term.matches(token)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_dedups() {
        assert_eq!(
            tokenize("Hello, hello WORLD! rust-lang"),
            vec!["hello", "world", "rust", "lang"]
        );
        assert!(tokenize("  ,,, ").is_empty());
    }

    #[test]
    fn parse_exact_words() {
        let terms = parse_text_query("Quick Fox").unwrap();
        assert_eq!(
            terms,
            vec![TextTerm::Exact("quick".into()), TextTerm::Exact("fox".into())]
        );
    }

    #[test]
    fn parse_wildcards() {
        assert_eq!(parse_text_query("qui*").unwrap(), vec![TextTerm::Prefix("qui".into())]);
        assert_eq!(parse_text_query("*ick").unwrap(), vec![TextTerm::Suffix("ick".into())]);
        assert_eq!(parse_text_query("*uic*").unwrap(), vec![TextTerm::Contains("uic".into())]);
    }

    #[test]
    fn invalid_queries() {
        for query in ["*", "**", "", "a* b", "a*b*"] {
            let err = parse_text_query(query).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::FilterError, "query {:?}", query);
        }
    }

    #[test]
    fn matching() {
        let text = "The quick brown fox";
        assert!(text_matches(text, &parse_text_query("QUICK").unwrap()));
        assert!(text_matches(text, &parse_text_query("cat fox").unwrap()));
        assert!(text_matches(text, &parse_text_query("bro*").unwrap()));
        assert!(text_matches(text, &parse_text_query("*own").unwrap()));
        assert!(text_matches(text, &parse_text_query("*ui*").unwrap()));
        assert!(!text_matches(text, &parse_text_query("dog").unwrap()));
        assert!(!text_matches(text, &parse_text_query("rown*").unwrap()));
    }
}
