//! List published posts

use anyhow::Result;

use crate::content::{ContentLoader, PostListing};
use crate::helpers::{format_date, post_url};
use crate::Blog;

/// Print every published post, newest first
pub fn run(blog: &Blog) -> Result<()> {
    let posts = ContentLoader::new(blog).list_posts()?;

    println!("Posts ({}):", posts.len());
    for post in &posts {
        println!("  {}", format_listing(blog, post));
    }

    Ok(())
}

fn format_listing(blog: &Blog, post: &PostListing) -> String {
    let date = post
        .date
        .as_deref()
        .map(|d| format_date(d, &blog.config.date_format))
        .unwrap_or_else(|| "----------".to_string());
    format!(
        "{} - {} [{}]",
        date,
        post.title,
        post_url(&blog.config, &post.slug)
    )
}
