//! Client-side search
//!
//! Every page embeds the search index as a global script variable. The
//! browser script (`assets/search.js`) filters it as the reader types; the
//! functions here implement the same filter and rendering so the generator,
//! the server and the tests agree with what the browser shows.
//!
//! The filter is a linear, case-insensitive substring scan over title,
//! description and body, in index order, capped at [`MAX_RESULTS`].

mod filter;
mod index;
mod modal;

pub use filter::{filter, filter_with_limit, normalize_query, render_entry, search, SearchOutcome};
pub use index::{SearchEntry, SearchIndex, GLOBAL_VAR};
pub use modal::{is_open_shortcut, ModalEvent, SearchModal};

/// Maximum number of results rendered for a query
pub const MAX_RESULTS: usize = 8;

/// Placeholder rendered when a query matches nothing
pub const NO_RESULTS_HTML: &str = r#"<li class="search-empty">No results</li>"#;
