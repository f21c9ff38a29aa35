use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::locale::Locale;

/// One post as it appears in the content index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub author: String,
    pub tags: Vec<String>,
    pub excerpt: String,
    pub filename: String,
    pub locale: Locale,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Flattened per-locale entry written to `<locale>/posts.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalePostEntry {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub author: String,
    pub tags: Vec<String>,
    pub excerpt: String,
    pub filename: String,
}

impl From<&PostSummary> for LocalePostEntry {
    fn from(post: &PostSummary) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            date: post.date.clone(),
            author: post.author.clone(),
            tags: post.tags.clone(),
            excerpt: post.excerpt.clone(),
            filename: post.filename.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentIndex {
    pub total_posts: usize,
    pub locales: Vec<Locale>,
    pub years: BTreeMap<String, YearBucket>,
    pub posts: Vec<PostSummary>,
    pub tags: BTreeMap<String, TagBucket>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearBucket {
    pub months: BTreeMap<String, MonthBucket>,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthBucket {
    pub days: BTreeMap<String, DayBucket>,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    pub count: usize,
    pub posts: Vec<PostSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagBucket {
    pub count: usize,
    pub posts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub has_next: bool,
    pub has_prev: bool,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<'a> {
    pub data: Vec<&'a PostSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveEntry {
    pub year: i32,
    pub month: u32,
    pub count: usize,
    pub month_name: String,
}

/// Neighbours of a post in the newest-first list of its locale.
/// `prev` is the newer post, `next` the older one.
#[derive(Debug, Clone, Serialize)]
pub struct Adjacent<'a> {
    pub prev: Option<&'a PostSummary>,
    pub next: Option<&'a PostSummary>,
}

/// A full post loaded from the store, body rendered to HTML.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub content_html: String,
}
