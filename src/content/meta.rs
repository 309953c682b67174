//! Page metadata: title and reading time

use serde::Serialize;

use super::frontmatter::FrontMatter;
use crate::error::SiteError;

/// Metadata extracted from a page's front-matter and body text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub title: String,
    /// Estimated reading time in minutes (minimum 1)
    pub read_time_mins: usize,
}

/// Extract title and reading time from an MDX document
///
/// Reading time counts body words only; the front-matter block is excluded.
pub fn extract_meta(
    source: &str,
    content: &str,
    words_per_minute: usize,
) -> Result<PageMeta, SiteError> {
    let (fm, body) = FrontMatter::parse(content)?;
    let title = fm.require_title(source)?.to_string();

    Ok(PageMeta {
        title,
        read_time_mins: read_time(body, words_per_minute),
    })
}

/// Whole minutes needed to read `body`, never less than one
pub fn read_time(body: &str, words_per_minute: usize) -> usize {
    let word_count = body.split_whitespace().count();
    // 400 words at 200 wpm -> 2; anything under 200 -> 1
    (word_count / words_per_minute.max(1)).max(1)
}
