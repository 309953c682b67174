//! Query filtering and result rendering

use super::index::{SearchEntry, SearchIndex};
use super::{MAX_RESULTS, NO_RESULTS_HTML};
use crate::helpers::html_escape;

/// What the results list shows for a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome<'a> {
    /// Empty query: the list is emptied
    Cleared,
    /// Non-empty query with no match: the placeholder is shown
    NoResults,
    /// Matches in index order, at most the configured limit
    Matches(Vec<&'a SearchEntry>),
}

impl SearchOutcome<'_> {
    /// Inner HTML of the results list
    pub fn to_html(&self) -> String {
        match self {
            SearchOutcome::Cleared => String::new(),
            SearchOutcome::NoResults => NO_RESULTS_HTML.to_string(),
            SearchOutcome::Matches(entries) => entries.iter().map(|e| render_entry(e)).collect(),
        }
    }
}

/// Trim and lower-case a raw query
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// First [`MAX_RESULTS`] entries matching `query`
pub fn filter<'a>(index: &'a SearchIndex, query: &str) -> Vec<&'a SearchEntry> {
    filter_with_limit(index, query, MAX_RESULTS)
}

/// First `limit` entries whose title, description or body contain `query`
///
/// An empty query matches nothing.
pub fn filter_with_limit<'a>(
    index: &'a SearchIndex,
    query: &str,
    limit: usize,
) -> Vec<&'a SearchEntry> {
    let query = normalize_query(query);
    if query.is_empty() {
        return Vec::new();
    }

    index
        .entries()
        .iter()
        .filter(|entry| entry.haystack().contains(&query))
        .take(limit)
        .collect()
}

/// Run a query and decide what the results list shows
pub fn search<'a>(index: &'a SearchIndex, query: &str, limit: usize) -> SearchOutcome<'a> {
    if normalize_query(query).is_empty() {
        return SearchOutcome::Cleared;
    }

    let matches = filter_with_limit(index, query, limit);
    if matches.is_empty() {
        SearchOutcome::NoResults
    } else {
        SearchOutcome::Matches(matches)
    }
}

/// One result list item: linked title, then date and description when present
pub fn render_entry(entry: &SearchEntry) -> String {
    let date = entry
        .date
        .as_deref()
        .map(|d| format!(r#"<span class="search-date">{}</span>"#, html_escape(d)))
        .unwrap_or_default();
    let description = entry
        .description
        .as_deref()
        .map(|d| format!(r#"<span class="search-desc">{}</span>"#, html_escape(d)))
        .unwrap_or_default();

    format!(
        r#"<li class="search-result"><a href="{}"><span class="search-title">{}</span>{}{}</a></li>"#,
        html_escape(&entry.url),
        html_escape(&entry.title),
        date,
        description
    )
}
