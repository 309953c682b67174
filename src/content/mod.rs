//! Content module - handles pages, posts and MDX processing

mod frontmatter;
pub mod loader;
mod markdown;
mod meta;
mod post;

pub use frontmatter::{strip_frontmatter, FrontMatter};
pub use loader::{is_mdx_file, ContentLoader};
pub use markdown::{strip_esm, MdxRenderer};
pub use meta::{extract_meta, read_time, PageMeta};
pub use post::{sort_listings, Post, PostListing, RenderedPage};
