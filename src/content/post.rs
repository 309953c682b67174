//! Post and page models

use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;
use std::path::PathBuf;

use super::meta::PageMeta;
use crate::helpers::parse_date;

/// Summary data for a single blog post, used in the post listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostListing {
    pub title: String,
    /// URL-safe directory name under the blog directory
    pub slug: String,
    pub date: Option<String>,
    pub description: Option<String>,
}

/// A rendered page
#[derive(Debug, Clone, Serialize)]
pub struct RenderedPage {
    pub meta: PageMeta,
    /// Rendered HTML content
    pub html: String,
    /// Full source file path
    pub source: PathBuf,
}

/// A published blog post with its rendered body
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub listing: PostListing,
    pub page: RenderedPage,
}

/// Sort posts by date, newest first; undated posts sink to the bottom
///
/// Dates that parse come first, compared chronologically. Dates that do not
/// parse follow in reverse string order. The sort is stable, so equal dates
/// keep directory order.
pub fn sort_listings(posts: &mut [PostListing]) {
    posts.sort_by(compare_listings);
}

/// Listing order used by [`sort_listings`]
pub(crate) fn compare_listings(a: &PostListing, b: &PostListing) -> Ordering {
    compare_dates(a.date.as_deref(), b.date.as_deref())
}

/// Sort key of a post date: parsed dates, then other strings, then none
enum DateKey<'a> {
    Parsed(NaiveDateTime),
    Text(&'a str),
    Missing,
}

impl<'a> DateKey<'a> {
    fn of(date: Option<&'a str>) -> Self {
        match date {
            Some(s) => parse_date(s).map_or(DateKey::Text(s), DateKey::Parsed),
            None => DateKey::Missing,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            DateKey::Parsed(_) => 0,
            DateKey::Text(_) => 1,
            DateKey::Missing => 2,
        }
    }
}

fn compare_dates(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (DateKey::of(a), DateKey::of(b)) {
        (DateKey::Parsed(a), DateKey::Parsed(b)) => b.cmp(&a),
        (DateKey::Text(a), DateKey::Text(b)) => b.cmp(a),
        (a, b) => a.rank().cmp(&b.rank()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(slug: &str, date: Option<&str>) -> PostListing {
        PostListing {
            title: slug.to_uppercase(),
            slug: slug.to_string(),
            date: date.map(str::to_string),
            description: None,
        }
    }

    #[test]
    fn test_sort_newest_first_undated_last() {
        let mut posts = vec![
            listing("undated", None),
            listing("old", Some("2023-02-01")),
            listing("new", Some("2024-11-30")),
            listing("mid", Some("2024/03/05")),
        ];
        sort_listings(&mut posts);
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "mid", "old", "undated"]);
    }

    #[test]
    fn test_unparseable_dates_compare_as_strings() {
        let mut posts = vec![listing("a", Some("spring")), listing("b", Some("winter"))];
        sort_listings(&mut posts);
        assert_eq!(posts[0].slug, "b");
    }

    #[test]
    fn test_mixed_dates_sort_consistently() {
        let dates = [
            Some("2024-01-01"),
            Some("spring"),
            Some("2023-12-31"),
            Some("2025-06-01"),
            Some("1st of May"),
            None,
        ];

        // Every input order gives the same result
        let mut expected = None;
        for start in 0..dates.len() {
            let mut posts: Vec<_> = dates
                .iter()
                .cycle()
                .skip(start)
                .take(dates.len())
                .map(|d| listing(d.unwrap_or("none"), *d))
                .collect();
            sort_listings(&mut posts);
            let slugs: Vec<_> = posts.iter().map(|p| p.slug.clone()).collect();
            match &expected {
                None => expected = Some(slugs),
                Some(expected) => assert_eq!(&slugs, expected),
            }
        }

        assert_eq!(
            expected.unwrap(),
            vec!["2025-06-01", "2024-01-01", "2023-12-31", "spring", "1st of May", "none"]
        );

        for (a, b, c) in [(0, 1, 2), (1, 2, 4), (3, 4, 5)] {
            let (a, b, c) = (dates[a], dates[b], dates[c]);
            if compare_dates(a, b) == Ordering::Less && compare_dates(b, c) == Ordering::Less {
                assert_eq!(compare_dates(a, c), Ordering::Less);
            }
        }
    }
}
