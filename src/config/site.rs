//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::theme::Theme;

/// Name of the configuration file in the site root
pub const CONFIG_FILE: &str = "_config.yml";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub pages_dir: String,
    pub public_dir: String,
    pub blog_dir: String,

    // Writing
    pub words_per_minute: usize,
    pub date_format: String,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Layout
    pub default_theme: Theme,
    /// Header navigation, label -> path (order preserved)
    pub menu: IndexMap<String, String>,
    /// Footer links, label -> URL (order preserved)
    pub social: IndexMap<String, String>,

    #[serde(default)]
    pub search: SearchConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let mut menu = IndexMap::new();
        menu.insert("About Me".to_string(), "/".to_string());
        menu.insert("Posts".to_string(), "/blog".to_string());

        let mut social = IndexMap::new();
        social.insert(
            "LinkedIn".to_string(),
            "https://www.linkedin.com/in/alexanderreyeswainwright".to_string(),
        );
        social.insert(
            "GitHub".to_string(),
            "https://github.com/alexander-rw".to_string(),
        );

        Self {
            title: "Blog".to_string(),
            description: String::new(),
            author: "Alexander Reyes-Wainwright".to_string(),
            language: "en".to_string(),

            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),

            pages_dir: "pages".to_string(),
            public_dir: "public".to_string(),
            blog_dir: "blog".to_string(),

            words_per_minute: 200,
            date_format: "YYYY-MM-DD".to_string(),
            highlight: HighlightConfig::default(),

            default_theme: Theme::Light,
            menu,
            social,

            search: SearchConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    /// syntect theme name
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Client-side search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub enable: bool,
    /// Maximum number of results shown in the dialog
    pub max_results: usize,
    /// Key that opens the dialog together with Ctrl or Cmd
    pub shortcut_key: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enable: true,
            max_results: crate::search::MAX_RESULTS,
            shortcut_key: "k".to_string(),
        }
    }
}

impl SearchConfig {
    /// Result cap actually applied; `0` means the default
    pub fn limit(&self) -> usize {
        if self.max_results == 0 {
            crate::search::MAX_RESULTS
        } else {
            self.max_results
        }
    }
}
