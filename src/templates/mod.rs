//! Built-in site templates using the Tera template engine
//!
//! The layout, page and post list templates and the static assets are
//! embedded in the binary, so a site needs nothing but its `pages/`
//! directory and an optional `_config.yml`.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::{SearchConfig, SiteConfig};
use crate::content::{PageMeta, PostListing};
use crate::helpers::{format_date, html_escape, meta_generator, post_url, url_for};
use crate::search::SearchIndex;

/// Stylesheet served at `assets/styles.css`
pub const STYLES: &str = include_str!("../../assets/styles.css");

/// Theme toggle script served at `assets/theme.js`
pub const THEME_SCRIPT: &str = include_str!("../../assets/theme.js");

/// Search dialog script served at `assets/search.js`
pub const SEARCH_SCRIPT: &str = include_str!("../../assets/search.js");

/// Embedded asset names, in the order they are written out
pub const ASSET_NAMES: [&str; 3] = ["styles.css", "theme.js", "search.js"];

/// Look up an embedded asset, returning its content and MIME type
pub fn asset(name: &str) -> Option<(&'static str, &'static str)> {
    match name {
        "styles.css" => Some((STYLES, "text/css; charset=utf-8")),
        "theme.js" => Some((THEME_SCRIPT, "application/javascript; charset=utf-8")),
        "search.js" => Some((SEARCH_SCRIPT, "application/javascript; charset=utf-8")),
        _ => None,
    }
}

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
    site: ShellData,
    config: SiteConfig,
}

impl TemplateRenderer {
    /// Create a new renderer for the given site configuration
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        // Rendered MDX and the index script are inserted verbatim; text
        // values go through `escape_html` explicitly
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("page.html", include_str!("site/page.html")),
            ("post_list.html", include_str!("site/post_list.html")),
            (
                "partials/search.html",
                include_str!("site/partials/search.html"),
            ),
        ])?;

        tera.register_filter("escape_html", escape_html_filter);

        Ok(Self {
            tera,
            site: ShellData::from_config(config),
            config: config.clone(),
        })
    }

    /// Render a standalone page or a blog post
    pub fn render_page(&self, meta: &PageMeta, html: &str, index: &SearchIndex) -> Result<String> {
        let mut context = self.shell_context(index)?;
        context.insert("page_title", &format!("{} | {}", meta.title, self.config.title));
        context.insert("page", meta);
        context.insert("content", html);
        self.render("page.html", &context)
    }

    /// Render the blog post list
    pub fn render_post_list(&self, posts: &[PostListing], index: &SearchIndex) -> Result<String> {
        let items: Vec<PostItem> = posts
            .iter()
            .map(|post| PostItem {
                title: &post.title,
                href: post_url(&self.config, &post.slug),
                date: post
                    .date
                    .as_deref()
                    .map(|d| format_date(d, &self.config.date_format)),
                description: post.description.as_deref(),
            })
            .collect();

        let mut context = self.shell_context(index)?;
        context.insert("page_title", &format!("Posts | {}", self.config.title));
        context.insert("posts", &items);
        self.render("post_list.html", &context)
    }

    fn shell_context(&self, index: &SearchIndex) -> Result<Context> {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("search_index", &index.script_tag()?);
        Ok(context)
    }

    fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: escape text for HTML content and attributes
fn escape_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("escape_html", "value", String, value);
    Ok(tera::Value::String(html_escape(&s)))
}

/// Site-wide values used by the layout
#[derive(Debug, Clone, Serialize)]
struct ShellData {
    language: String,
    description: String,
    default_theme: String,
    toggle_label: &'static str,
    generator: String,
    assets: String,
    menu: Vec<MenuItem>,
    social: Vec<MenuItem>,
    search: SearchConfig,
}

impl ShellData {
    fn from_config(config: &SiteConfig) -> Self {
        Self {
            language: html_escape(&config.language),
            description: config.description.clone(),
            default_theme: config.default_theme.to_string(),
            toggle_label: config.default_theme.toggle_label(),
            generator: meta_generator(),
            assets: url_for(config, "assets/"),
            menu: MenuItem::list(config, &config.menu),
            social: MenuItem::list(config, &config.social),
            search: SearchConfig {
                max_results: config.search.limit(),
                ..config.search.clone()
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct MenuItem {
    name: String,
    path: String,
}

impl MenuItem {
    /// Site-relative paths get the configured root; absolute URLs are kept
    fn list(config: &SiteConfig, links: &indexmap::IndexMap<String, String>) -> Vec<Self> {
        links
            .iter()
            .map(|(name, path)| MenuItem {
                name: name.clone(),
                path: if path.starts_with('/') {
                    url_for(config, path)
                } else {
                    path.clone()
                },
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
struct PostItem<'a> {
    title: &'a str,
    href: String,
    date: Option<String>,
    description: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchEntry;
    use crate::theme::Theme;

    fn meta(title: &str) -> PageMeta {
        PageMeta {
            title: title.to_string(),
            read_time_mins: 3,
        }
    }

    fn index() -> SearchIndex {
        SearchIndex::new(vec![SearchEntry {
            title: "Closing </script> tags".to_string(),
            description: None,
            body: "body".to_string(),
            slug: "tags".to_string(),
            url: "/blog/tags".to_string(),
            date: None,
        }])
    }

    #[test]
    fn test_render_page() {
        let renderer = TemplateRenderer::new(&SiteConfig::default()).unwrap();
        let html = renderer
            .render_page(&meta("Tom & Jerry"), "<p>Hello</p>", &index())
            .unwrap();

        assert!(html.contains(r#"<h1 class="page-title">Tom &amp; Jerry</h1>"#));
        assert!(html.contains("3 min read"));
        assert!(html.contains("<p>Hello</p>"));
        assert!(html.contains(r#"data-theme="light""#));
        assert!(html.contains(r#"<button id="theme-toggle" type="button" aria-label="Toggle theme">Dark</button>"#));
        assert!(html.contains("window.__SEARCH_INDEX__ = "));
        // The index cannot terminate its own script element
        assert!(!html.contains("Closing </script>"));
        assert!(html.contains(r#"<a href="https://github.com/"#));
    }

    #[test]
    fn test_search_markup() {
        let renderer = TemplateRenderer::new(&SiteConfig::default()).unwrap();
        let html = renderer.render_page(&meta("x"), "", &index()).unwrap();
        assert!(html.contains(r#"id="search-button""#));
        assert!(html.contains(r#"<dialog id="search-dialog""#));
        assert!(html.contains(r#"data-max-results="8""#));
        assert!(html.contains(r#"id="search-close""#));
        assert!(html.contains(r#"<ul id="search-results""#));
        assert!(html.contains("/assets/search.js"));
    }

    #[test]
    fn test_search_disabled() {
        let mut config = SiteConfig::default();
        config.search.enable = false;
        let renderer = TemplateRenderer::new(&config).unwrap();
        let html = renderer.render_page(&meta("x"), "", &index()).unwrap();
        assert!(!html.contains("search-dialog"));
        assert!(!html.contains("__SEARCH_INDEX__"));
        assert!(html.contains("/assets/theme.js"));
    }

    #[test]
    fn test_dark_default_theme() {
        let config = SiteConfig {
            default_theme: Theme::Dark,
            ..SiteConfig::default()
        };
        let renderer = TemplateRenderer::new(&config).unwrap();
        let html = renderer.render_page(&meta("x"), "", &index()).unwrap();
        assert!(html.contains(r#"data-theme="dark""#));
        assert!(html.contains(">Light</button>"));
    }

    #[test]
    fn test_render_post_list() {
        let renderer = TemplateRenderer::new(&SiteConfig::default()).unwrap();
        let posts = vec![
            PostListing {
                title: "A <b>bold</b> claim".to_string(),
                slug: "bold".to_string(),
                date: Some("2024-06-01".to_string()),
                description: Some("Why & how".to_string()),
            },
            PostListing {
                title: "Undated".to_string(),
                slug: "undated".to_string(),
                date: None,
                description: None,
            },
        ];
        let html = renderer.render_post_list(&posts, &index()).unwrap();

        assert!(html.contains("<title>Posts | Blog</title>"));
        assert!(html.contains(r#"<a href="/blog/bold">A &lt;b&gt;bold&lt;/b&gt; claim</a>"#));
        assert!(html.contains(r#"<p class="post-meta">2024-06-01</p>"#));
        assert!(html.contains(r#"<p class="post-desc">Why &amp; how</p>"#));
        assert_eq!(html.matches(r#"class="post-meta""#).count(), 1);
    }

    #[test]
    fn test_links_under_site_root() {
        let config = SiteConfig {
            root: "/notes/".to_string(),
            ..SiteConfig::default()
        };
        let renderer = TemplateRenderer::new(&config).unwrap();
        let posts = vec![PostListing {
            title: "T".to_string(),
            slug: "t".to_string(),
            date: None,
            description: None,
        }];
        let html = renderer.render_post_list(&posts, &index()).unwrap();

        assert!(html.contains(r#"href="/notes/assets/styles.css""#));
        assert!(html.contains(r#"<a href="/notes/blog">Posts</a>"#));
        assert!(html.contains(r#"<li><a href="/notes/blog/t">T</a></li>"#));
    }

    #[test]
    fn test_zero_max_results_uses_default() {
        let mut config = SiteConfig::default();
        config.search.max_results = 0;
        let renderer = TemplateRenderer::new(&config).unwrap();
        let html = renderer.render_page(&meta("x"), "", &index()).unwrap();
        assert!(html.contains(r#"data-max-results="8""#));
    }

    #[test]
    fn test_assets() {
        let (css, mime) = asset("styles.css").unwrap();
        assert!(css.contains("--accent"));
        assert!(mime.starts_with("text/css"));
        assert!(asset("theme.js").unwrap().0.contains("localStorage"));
        assert!(asset("search.js").unwrap().0.contains("__SEARCH_INDEX__"));
        assert!(asset("missing.js").is_none());
    }
}
