//! Raw page-text cleanup ahead of semantic chunking.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static HYPHEN_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w+)-\r?\n(\w+)").expect("hyphen-break pattern is valid")
});
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// No page produced any usable text after cleaning.
#[derive(Debug, Error)]
#[error("No readable text found in the document")]
pub struct EmptyDocumentError;

/// Clean one page of extracted text.
///
/// Re-joins words hyphenated across line breaks, collapses whitespace runs to
/// single spaces, and trims the result.
pub fn clean_page(raw: &str) -> String {
    let dehyphenated = HYPHEN_BREAK.replace_all(raw, "$1$2");
    WHITESPACE_RUN
        .replace_all(&dehyphenated, " ")
        .trim()
        .to_string()
}

/// Clean every page and concatenate them into one ordered text stream.
///
/// Pages that normalize to empty are dropped. Fails when nothing survives
/// cleaning, so the caller never indexes an empty document.
pub fn normalize_pages(pages: &[String]) -> Result<String, EmptyDocumentError> {
    let cleaned: Vec<String> = pages
        .iter()
        .map(|page| clean_page(page))
        .filter(|page| !page.is_empty())
        .collect();

    if cleaned.is_empty() {
        return Err(EmptyDocumentError);
    }

    tracing::debug!(
        pages_in = pages.len(),
        pages_kept = cleaned.len(),
        "Normalized document pages"
    );
    Ok(cleaned.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_page_rejoins_hyphenated_words() {
        assert_eq!(clean_page("seman-\ntic chunking"), "semantic chunking");
        assert_eq!(clean_page("seman-\r\ntic"), "semantic");
    }

    #[test]
    fn clean_page_collapses_whitespace() {
        assert_eq!(clean_page("  a \n\n b\t\tc  "), "a b c");
    }

    #[test]
    fn normalize_preserves_page_order() {
        let pages = vec!["first page".to_string(), "second page".to_string()];
        assert_eq!(normalize_pages(&pages).unwrap(), "first page second page");
    }

    #[test]
    fn normalize_drops_empty_pages() {
        let pages = vec!["  \n ".to_string(), "content".to_string()];
        assert_eq!(normalize_pages(&pages).unwrap(), "content");
    }

    #[test]
    fn normalize_fails_when_nothing_survives() {
        let pages = vec!["  ".to_string(), "\n\n".to_string()];
        assert!(normalize_pages(&pages).is_err());
        assert!(normalize_pages(&[]).is_err());
    }
}
