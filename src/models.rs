use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct FrontMatter {
    pub title: String,
    pub date: String,
    pub slug: Option<String>,
    pub author: Option<String>,
    pub author_image: Option<String>,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Front matter of standalone pages such as `home.md`. Only the body is used.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct PageMatter {}

/// A normalized blog entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub date: String,
    /// Keeps the author's offset: compares by instant, formats as written.
    pub published: Option<DateTime<FixedOffset>>,
    pub author: String,
    pub author_image: Option<String>,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub body: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Project {
    pub title: String,
    pub desc: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: String,
    pub img: String,
    pub link: String,
}

/// Anything that can be scoped by a tag filter.
pub trait Tagged {
    fn tags(&self) -> &[String];
}

impl Tagged for Post {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Tagged for Project {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Accepts `YYYY-MM-DD`, RFC 3339 and `YYYY-MM-DDTHH:MM:SS` without offset.
/// Values without an offset are taken as UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc().fixed_offset());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().fixed_offset())
}

/// Newest first; undated posts sink to the end.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.published.cmp(&a.published));
}
