//! Build the static site

use anyhow::{Context, Result};

use crate::content::ContentLoader;
use crate::generator::Generator;
use crate::Blog;

/// Load every published page and post and write the site to the public directory
pub fn run(blog: &Blog) -> Result<()> {
    let start = std::time::Instant::now();

    let loader = ContentLoader::new(blog);
    let posts = loader
        .load_posts()
        .with_context(|| format!("Failed to load posts from {:?}", blog.blog_dir()))?;
    let pages = loader
        .load_pages()
        .with_context(|| format!("Failed to load pages from {:?}", blog.pages_dir))?;

    tracing::info!("Loaded {} posts and {} pages", posts.len(), pages.len());

    let generator = Generator::new(blog)?;
    generator.generate(&posts, &pages)?;

    let duration = start.elapsed();
    tracing::info!(
        "Generated {:?} in {:.2}s",
        blog.public_dir,
        duration.as_secs_f64()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::fs;

    #[test]
    fn test_build_requires_blog_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pages")).unwrap();
        fs::write(dir.path().join("pages/index.mdx"), "---\ntitle: Home\n---\n").unwrap();

        let blog = Blog::with_config(dir.path(), SiteConfig::default());
        let err = run(&blog).unwrap_err();
        assert!(err.to_string().contains("Failed to load posts"));
    }

    #[test]
    fn test_build_writes_site() {
        let dir = tempfile::tempdir().unwrap();
        let post = dir.path().join("pages/blog/hello/page.mdx");
        fs::create_dir_all(post.parent().unwrap()).unwrap();
        fs::write(dir.path().join("pages/index.mdx"), "---\ntitle: Home\n---\n").unwrap();
        fs::write(&post, "---\ntitle: Hello\ndate: 2024-01-01\n---\n\nHi.").unwrap();

        let blog = Blog::with_config(dir.path(), SiteConfig::default());
        blog.build().unwrap();
        assert!(blog.public_dir.join("index.html").is_file());
        assert!(blog.public_dir.join("blog/hello/index.html").is_file());
    }
}
