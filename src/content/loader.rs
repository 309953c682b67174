//! Content loader - loads pages and posts from the pages directory
//!
//! Layout:
//! - `pages/index.mdx` is the home page
//! - `pages/<name>.mdx` and `pages/<name>/page.mdx` are standalone pages
//! - `pages/blog/<slug>/page.mdx` is a blog post

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::frontmatter::{declares_draft, FrontMatter};
use super::meta::{extract_meta, PageMeta};
use super::post::{compare_listings, Post, PostListing, RenderedPage};
use super::MdxRenderer;
use crate::error::SiteError;
use crate::helpers::page_segments;
use crate::Blog;

/// File name of a page that owns its directory
pub const PAGE_FILE: &str = "page.mdx";

/// Home page file name
pub const INDEX_FILE: &str = "index.mdx";

/// Loads content from the pages directory
pub struct ContentLoader {
    base_dir: PathBuf,
    pages_dir: PathBuf,
    blog_dir: PathBuf,
    words_per_minute: usize,
    renderer: MdxRenderer,
}

/// A post read from disk, not yet rendered
struct PostSource {
    listing: PostListing,
    path: PathBuf,
    content: String,
}

impl ContentLoader {
    /// Create a new content loader
    pub fn new(blog: &Blog) -> Self {
        Self {
            base_dir: blog.base_dir.clone(),
            pages_dir: blog.pages_dir.clone(),
            blog_dir: blog.blog_dir(),
            words_per_minute: blog.config.words_per_minute,
            renderer: MdxRenderer::with_options(&blog.config.highlight),
        }
    }

    /// List all published blog posts, newest first
    ///
    /// Drafts are excluded; directories without a `page.mdx` are skipped.
    pub fn list_posts(&self) -> Result<Vec<PostListing>, SiteError> {
        Ok(self
            .read_posts()?
            .into_iter()
            .map(|source| source.listing)
            .collect())
    }

    /// Load and render all published blog posts, newest first
    pub fn load_posts(&self) -> Result<Vec<Post>, SiteError> {
        self.read_posts()?
            .into_iter()
            .map(|source| {
                let page = self.render_source(&source.path, &source.content)?;
                Ok(Post {
                    listing: source.listing,
                    page,
                })
            })
            .collect()
    }

    fn read_posts(&self) -> Result<Vec<PostSource>, SiteError> {
        let entries = fs::read_dir(&self.blog_dir).map_err(|e| {
            SiteError::NotFound(format!("{}: {e}", self.display_path(&self.blog_dir)))
        })?;

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            // Skip entries whose names are not valid UTF-8
            match entry.file_name().into_string() {
                Ok(slug) => dirs.push((slug, entry.path())),
                Err(name) => tracing::debug!("Skipping non UTF-8 post directory {:?}", name),
            }
        }
        dirs.sort();

        let mut sources = Vec::new();
        for (slug, dir) in dirs {
            let path = dir.join(PAGE_FILE);
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(_) => {
                    tracing::debug!("No {} in {:?}, skipping", PAGE_FILE, dir);
                    continue;
                }
            };

            let fm = match FrontMatter::parse(&content) {
                Ok((fm, _)) => fm,
                Err(e) if declares_draft(&content) => {
                    tracing::warn!(
                        "Skipping draft post {} with invalid front-matter: {}",
                        slug,
                        e
                    );
                    continue;
                }
                Err(e) => return Err(with_source(&slug, e)),
            };

            if fm.draft {
                tracing::debug!("Skipping draft post {}", slug);
                continue;
            }

            let title = fm.require_title(&slug)?.to_string();
            sources.push(PostSource {
                listing: PostListing {
                    title,
                    slug,
                    date: fm.date,
                    description: fm.description,
                },
                path,
                content,
            });
        }

        sources.sort_by(|a, b| compare_listings(&a.listing, &b.listing));
        Ok(sources)
    }

    /// Map a request path to the MDX file that serves it
    ///
    /// `pages/<path>/page.mdx` wins over `pages/<path>.mdx`; the empty path
    /// is the home page. Paths escaping the pages directory are not found.
    pub fn resolve_page(&self, request_path: &str) -> Result<PathBuf, SiteError> {
        let segments = page_segments(request_path)
            .ok_or_else(|| SiteError::NotFound(request_path.to_string()))?;

        let Some((last, parents)) = segments.split_last() else {
            return Ok(self.pages_dir.join(INDEX_FILE));
        };

        let dir: PathBuf = segments.iter().fold(self.pages_dir.clone(), |p, s| p.join(s));
        let nested = dir.join(PAGE_FILE);
        if nested.is_file() {
            return Ok(nested);
        }

        let parent: PathBuf = parents.iter().fold(self.pages_dir.clone(), |p, s| p.join(s));
        Ok(parent.join(format!("{last}.mdx")))
    }

    /// Read, parse and render a single MDX file
    ///
    /// Drafts are reported as not found.
    pub fn load_page(&self, path: &Path) -> Result<RenderedPage, SiteError> {
        let content = fs::read_to_string(path)
            .map_err(|_| SiteError::NotFound(self.display_path(path)))?;
        self.render_source(path, &content)
    }

    fn render_source(&self, path: &Path, content: &str) -> Result<RenderedPage, SiteError> {
        let source = self.display_path(path);
        let fm = match FrontMatter::parse(content) {
            Ok((fm, _)) => fm,
            Err(_) if declares_draft(content) => return Err(SiteError::NotFound(source)),
            Err(e) => return Err(with_source(&source, e)),
        };
        if fm.draft {
            return Err(SiteError::NotFound(source));
        }

        let meta: PageMeta = extract_meta(&source, content, self.words_per_minute)?;
        let html = self.renderer.render_document(content)?;
        tracing::debug!("Rendered {}", source);

        Ok(RenderedPage {
            meta,
            html,
            source: path.to_path_buf(),
        })
    }

    /// Load all standalone pages (everything outside the blog directory)
    ///
    /// Returns `(route, page)` pairs where the route has no leading or
    /// trailing slash; the home page has the empty route.
    pub fn load_pages(&self) -> Result<Vec<(String, RenderedPage)>, SiteError> {
        let mut pages = Vec::new();

        for entry in WalkDir::new(&self.pages_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_mdx_file(path) || path.starts_with(&self.blog_dir) {
                continue;
            }

            let Some(route) = self.route_for(path) else {
                continue;
            };

            match self.load_page(path) {
                Ok(page) => pages.push((route, page)),
                Err(SiteError::NotFound(source)) => {
                    tracing::debug!("Skipping unpublished page {}", source);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(pages)
    }

    /// Route of a page file relative to the pages directory
    fn route_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.pages_dir).ok()?;
        let relative = relative.to_str()?.replace('\\', "/");
        let without_ext = relative.strip_suffix(".mdx")?;

        let route = if without_ext == "index" {
            ""
        } else if let Some(dir) = without_ext.strip_suffix("/page") {
            dir
        } else if without_ext == "page" {
            ""
        } else {
            without_ext
        };

        Some(route.to_string())
    }

    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.base_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

/// Prefix a parse error with the file or slug it came from
fn with_source(source: &str, err: SiteError) -> SiteError {
    match err {
        SiteError::Parse(msg) => SiteError::Parse(format!("{source}: {msg}")),
        other => other,
    }
}

/// Check if a file is an MDX file
pub fn is_mdx_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "mdx")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    fn write(base: &Path, rel: &str, content: &str) {
        let path = base.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture() -> (tempfile::TempDir, Blog) {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        write(base, "pages/index.mdx", "---\ntitle: About Me\n---\n\nHello there.");
        write(base, "pages/uses.mdx", "---\ntitle: Uses\n---\n\nTools.");
        write(base, "pages/now/page.mdx", "---\ntitle: Now\n---\n\nCurrently.");
        write(
            base,
            "pages/blog/first/page.mdx",
            "---\ntitle: First\ndate: 2024-01-01\ndescription: The first one\n---\n\nFirst body.",
        );
        write(
            base,
            "pages/blog/second/page.mdx",
            "---\ntitle: Second\ndate: 2024-06-01\n---\n\nSecond body.",
        );
        write(base, "pages/blog/undated/page.mdx", "---\ntitle: Undated\n---\n\nNo date.");
        write(
            base,
            "pages/blog/wip/page.mdx",
            "---\ntitle: WIP\ndate: 2025-01-01\ndraft: true\n---\n\nSecret.",
        );
        fs::create_dir_all(base.join("pages/blog/empty")).unwrap();
        write(base, "pages/blog/notes.txt", "not a post");

        let blog = Blog::with_config(base, SiteConfig::default());
        (dir, blog)
    }

    #[test]
    fn test_list_posts() {
        let (_dir, blog) = fixture();
        let loader = ContentLoader::new(&blog);
        let posts = loader.list_posts().unwrap();
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["second", "first", "undated"]);
        assert_eq!(posts[1].description.as_deref(), Some("The first one"));
    }

    #[test]
    fn test_load_posts_renders_bodies() {
        let (_dir, blog) = fixture();
        let loader = ContentLoader::new(&blog);
        let posts = loader.load_posts().unwrap();
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].listing.slug, "second");
        assert!(posts[0].page.html.contains("<p>Second body.</p>"));
        assert_eq!(posts[0].page.meta.read_time_mins, 1);
    }

    #[test]
    fn test_missing_blog_dir_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::with_config(dir.path(), SiteConfig::default());
        let err = ContentLoader::new(&blog).list_posts().unwrap_err();
        assert!(matches!(err, SiteError::NotFound(_)));
    }

    #[test]
    fn test_malformed_post_names_slug() {
        let (dir, blog) = fixture();
        write(dir.path(), "pages/blog/broken/page.mdx", "---\ntitle: [oops\n---\n");
        let err = ContentLoader::new(&blog).list_posts().unwrap_err();
        match err {
            SiteError::Parse(msg) => assert!(msg.starts_with("broken:")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_draft_is_skipped() {
        let (dir, blog) = fixture();
        write(
            dir.path(),
            "pages/blog/later/page.mdx",
            "---\ntitle: [half written\ndraft: true\n---\n\nNot yet.",
        );
        write(dir.path(), "pages/scratch.mdx", "---\ntitle: [oops\ndraft: true\n---\n");

        let loader = ContentLoader::new(&blog);
        let slugs: Vec<_> = loader
            .list_posts()
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, vec!["second", "first", "undated"]);

        let path = loader.resolve_page("/blog/later").unwrap();
        assert!(matches!(loader.load_page(&path), Err(SiteError::NotFound(_))));
        let routes: Vec<_> = loader.load_pages().unwrap().into_iter().map(|(r, _)| r).collect();
        assert!(!routes.contains(&"scratch".to_string()));
    }

    #[test]
    fn test_resolve_page() {
        let (_dir, blog) = fixture();
        let loader = ContentLoader::new(&blog);
        assert_eq!(
            loader.resolve_page("/").unwrap(),
            blog.pages_dir.join("index.mdx")
        );
        assert_eq!(
            loader.resolve_page("blog/first").unwrap(),
            blog.pages_dir.join("blog/first/page.mdx")
        );
        assert_eq!(
            loader.resolve_page("uses").unwrap(),
            blog.pages_dir.join("uses.mdx")
        );
        assert!(matches!(
            loader.resolve_page("../secret"),
            Err(SiteError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_page_errors() {
        let (_dir, blog) = fixture();
        let loader = ContentLoader::new(&blog);

        let missing = loader.resolve_page("missing").unwrap();
        match loader.load_page(&missing) {
            Err(SiteError::NotFound(path)) => assert_eq!(path, "pages/missing.mdx"),
            other => panic!("unexpected result: {other:?}"),
        }

        let draft = loader.resolve_page("blog/wip").unwrap();
        assert!(matches!(
            loader.load_page(&draft),
            Err(SiteError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_pages_routes() {
        let (_dir, blog) = fixture();
        let loader = ContentLoader::new(&blog);
        let pages = loader.load_pages().unwrap();
        let routes: Vec<_> = pages.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(routes, vec!["", "now", "uses"]);
        assert_eq!(pages[0].1.meta.title, "About Me");
    }
}
