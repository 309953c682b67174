//! Front-matter parsing

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::SiteError;

/// Front-matter data from a page or post
///
/// Unknown keys are kept in `extra` rather than rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    /// Drafts are left out of listings, the search index and the build
    pub draft: bool,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    ///
    /// Content without a leading `---` fence has no front-matter and is
    /// returned whole.
    pub fn parse(content: &str) -> Result<(Self, &str), SiteError> {
        let Some((yaml, body)) = split_frontmatter(content) else {
            return Ok((FrontMatter::default(), content));
        };

        if yaml.trim().is_empty() {
            return Ok((FrontMatter::default(), body));
        }

        let fm: FrontMatter =
            serde_yaml::from_str(yaml).map_err(|e| SiteError::Parse(e.to_string()))?;
        Ok((fm, body))
    }

    /// Title, or a parse error naming `source` when it is missing
    pub fn require_title(&self, source: &str) -> Result<&str, SiteError> {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SiteError::Parse(format!("{source}: missing field `title`")))
    }
}

/// Whether the front-matter sets `draft: true`
///
/// Looks at top-level lines only, so it still answers for a block that is
/// not valid YAML.
pub fn declares_draft(content: &str) -> bool {
    let Some((yaml, _)) = split_frontmatter(content) else {
        return false;
    };

    yaml.lines().any(|line| {
        let Some(value) = line.strip_prefix("draft:") else {
            return false;
        };
        let value = value.split(" #").next().unwrap_or(value).trim();
        matches!(value, "true" | "True" | "TRUE")
    })
}

/// Remove the leading front-matter block from `content`
///
/// If the content does not begin with `---`, or the block is never closed,
/// it is returned unchanged.
pub fn strip_frontmatter(content: &str) -> &str {
    split_frontmatter(content)
        .map(|(_, body)| body)
        .unwrap_or(content)
}

/// Split `---\n<yaml>\n---\n<body>` into its YAML and body parts
fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    // The fence must open at the very first byte
    let rest = content.strip_prefix("---")?;
    // The closing fence begins on its own line
    let idx = rest.find("\n---")?;
    let yaml = rest[..idx].trim_start_matches(['\n', '\r']);
    let body = rest[idx + 4..].trim_start_matches(['\n', '\r']);
    Some((yaml, body))
}
