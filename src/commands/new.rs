//! Create a new post

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::content::loader::PAGE_FILE;
use crate::Blog;

/// Create `pages/blog/<slug>/page.mdx` for a new draft post
///
/// Fails if a post with the same slug already exists.
pub fn create_post(blog: &Blog, title: &str) -> Result<PathBuf> {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a post slug from title {:?}", title);
    }

    let post_dir = blog.blog_dir().join(&slug);
    let file_path = post_dir.join(PAGE_FILE);

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    fs::create_dir_all(&post_dir)
        .with_context(|| format!("Failed to create {:?}", post_dir))?;

    let now = chrono::Local::now();
    let content = scaffold(title, &now.format("%Y-%m-%d").to_string());
    fs::write(&file_path, content).with_context(|| format!("Failed to write {:?}", file_path))?;

    tracing::info!("Created: {:?}", file_path);
    Ok(file_path)
}

/// Front-matter scaffold; new posts start as drafts
fn scaffold(title: &str, date: &str) -> String {
    // Quote the title so colons and the like survive YAML parsing
    let title = serde_yaml::to_string(title).unwrap_or_else(|_| format!("{title:?}\n"));
    format!("---\ntitle: {title}date: {date}\ndescription: \"\"\ndraft: true\n---\n\n")
}
