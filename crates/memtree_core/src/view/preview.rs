//! Markdown-derived preview for memory documents.
//!
//! # Invariants
//! - `summary` has markdown symbols removed and at most 100 characters.
//! - `title` is the first ATX heading, when present.

use once_cell::sync::Lazy;
use regex::Regex;

const SUMMARY_MAX_CHARS: usize = 100;

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s{0,3}#{1,6}\s+(.+?)\s*#*\s*$").expect("valid heading regex"));
static MARKDOWN_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\(([^)]+)\)").expect("valid image regex"));
static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\*_`#>~\-\[\]\(\)!]+"#).expect("valid markdown symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Short plain-text view of a markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPreview {
    pub title: Option<String>,
    pub summary: Option<String>,
}

/// Derives title and summary from markdown `content`.
pub fn derive_preview(content: &str) -> DocumentPreview {
    let title = HEADING_RE
        .captures(content)
        .and_then(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .filter(|value| !value.is_empty());

    let without_images = MARKDOWN_IMAGE_RE.replace_all(content, " ");
    let without_links = MARKDOWN_LINK_RE.replace_all(&without_images, "$1");
    let without_symbols = MARKDOWN_SYMBOL_RE.replace_all(&without_links, " ");
    let collapsed = WHITESPACE_RE.replace_all(&without_symbols, " ");
    let trimmed = collapsed.trim();
    let summary = if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(SUMMARY_MAX_CHARS).collect())
    };

    DocumentPreview { title, summary }
}
