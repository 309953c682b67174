//! Search index records and their in-page serialization

use serde::{Deserialize, Serialize};

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::{plain_text, post_url};

/// Name of the global variable holding the index in the browser
pub const GLOBAL_VAR: &str = "__SEARCH_INDEX__";

/// Summary of one post, immutable once loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Plain text of the rendered post
    pub body: String,
    pub slug: String,
    /// Site-relative link to the post
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl SearchEntry {
    /// Build the entry for a rendered post
    pub fn from_post(post: &Post, config: &SiteConfig) -> Self {
        Self {
            title: post.listing.title.clone(),
            description: post.listing.description.clone(),
            body: plain_text(&post.page.html),
            slug: post.listing.slug.clone(),
            url: post_url(config, &post.listing.slug),
            date: post.listing.date.clone(),
        }
    }

    /// Lower-cased text a query is matched against
    pub(crate) fn haystack(&self) -> String {
        let description = self.description.as_deref().unwrap_or("");
        format!("{} {} {}", self.title, description, self.body).to_lowercase()
    }
}

/// Ordered collection of post summaries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchIndex {
    entries: Vec<SearchEntry>,
}

impl SearchIndex {
    pub fn new(entries: Vec<SearchEntry>) -> Self {
        Self { entries }
    }

    /// Index the given posts, keeping their order
    pub fn from_posts(posts: &[Post], config: &SiteConfig) -> Self {
        Self::new(
            posts
                .iter()
                .map(|post| SearchEntry::from_post(post, config))
                .collect(),
        )
    }

    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize as a JSON array, as written to `search.json`
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.entries)
    }

    /// JSON safe to embed inside a `<script>` element
    ///
    /// `<`, `>` and `&` only occur inside JSON strings, where the unicode
    /// escapes decode to the same text.
    pub fn to_script_json(&self) -> serde_json::Result<String> {
        Ok(self
            .to_json()?
            .replace('<', "\\u003c")
            .replace('>', "\\u003e")
            .replace('&', "\\u0026")
            .replace('\u{2028}', "\\u2028")
            .replace('\u{2029}', "\\u2029"))
    }

    /// Inline script assigning the index to the global variable
    pub fn script_tag(&self) -> serde_json::Result<String> {
        Ok(format!(
            "<script>window.{} = {};</script>",
            GLOBAL_VAR,
            self.to_script_json()?
        ))
    }
}
