//! Generator module - writes the static site using the built-in templates

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::content::{is_mdx_file, Post, PostListing, RenderedPage};
use crate::search::SearchIndex;
use crate::templates::{asset, TemplateRenderer, ASSET_NAMES};
use crate::Blog;

/// Static site generator
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            renderer: TemplateRenderer::new(&blog.config)?,
        })
    }

    /// Generate the entire site
    ///
    /// `posts` are expected newest first, as the content loader returns them.
    pub fn generate(&self, posts: &[Post], pages: &[(String, RenderedPage)]) -> Result<()> {
        fs::create_dir_all(&self.blog.public_dir)
            .with_context(|| format!("Failed to create {:?}", self.blog.public_dir))?;

        // Copy images and other files living next to the MDX sources
        self.copy_page_assets()?;

        let index = SearchIndex::from_posts(posts, &self.blog.config);

        self.generate_pages(pages, &index)?;
        self.generate_post_list(posts, &index)?;
        self.generate_post_pages(posts, &index)?;
        self.generate_search_index(&index)?;
        self.write_assets()?;

        Ok(())
    }

    /// Standalone pages, including the home page
    fn generate_pages(&self, pages: &[(String, RenderedPage)], index: &SearchIndex) -> Result<()> {
        if !pages.iter().any(|(route, _)| route.is_empty()) {
            tracing::warn!("No home page found, index.html will not be generated");
        }

        for (route, page) in pages {
            let html = self.renderer.render_page(&page.meta, &page.html, index)?;
            self.write_html(route, &html)?;
            tracing::debug!("Generated page: /{}", route);
        }

        Ok(())
    }

    /// The blog listing at `blog/index.html`
    fn generate_post_list(&self, posts: &[Post], index: &SearchIndex) -> Result<()> {
        let listings: Vec<PostListing> = posts.iter().map(|p| p.listing.clone()).collect();
        let html = self.renderer.render_post_list(&listings, index)?;
        self.write_html(&self.blog.config.blog_dir, &html)
    }

    fn generate_post_pages(&self, posts: &[Post], index: &SearchIndex) -> Result<()> {
        let blog_dir = self.blog.config.blog_dir.trim_matches('/');

        for post in posts {
            let html = self
                .renderer
                .render_page(&post.page.meta, &post.page.html, index)?;
            self.write_html(&format!("{}/{}", blog_dir, post.listing.slug), &html)?;
            tracing::debug!("Generated post: {}", post.listing.slug);
        }

        Ok(())
    }

    /// Search index (JSON), for clients that fetch it instead of the inline copy
    fn generate_search_index(&self, index: &SearchIndex) -> Result<()> {
        let output_path = self.blog.public_dir.join("search.json");
        fs::write(&output_path, index.to_json()?)
            .with_context(|| format!("Failed to write {:?}", output_path))?;
        tracing::info!("Generated search.json ({} posts)", index.len());
        Ok(())
    }

    /// Embedded stylesheet and scripts
    fn write_assets(&self) -> Result<()> {
        let assets_dir = self.blog.public_dir.join("assets");
        fs::create_dir_all(&assets_dir)?;

        for name in ASSET_NAMES {
            if let Some((content, _)) = asset(name) {
                fs::write(assets_dir.join(name), content)?;
            }
        }

        Ok(())
    }

    /// Copy non-MDX files from the pages directory to the public directory
    fn copy_page_assets(&self) -> Result<()> {
        let pages_dir = &self.blog.pages_dir;
        if !pages_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(pages_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || is_mdx_file(path) {
                continue;
            }

            let relative = path.strip_prefix(pages_dir)?;
            let dest = self.blog.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::copy(path, &dest).with_context(|| format!("Failed to copy {:?}", path))?;
            tracing::debug!("Copied: {:?}", relative);
        }

        Ok(())
    }

    /// Write `html` to `<route>/index.html` under the public directory
    fn write_html(&self, route: &str, html: &str) -> Result<()> {
        let route = route.trim_matches('/');
        let output_path = if route.is_empty() {
            self.blog.public_dir.join("index.html")
        } else {
            self.blog.public_dir.join(route).join("index.html")
        };

        write_file(&output_path, html)
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))
}
