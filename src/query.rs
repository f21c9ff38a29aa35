//! Read-only queries over a loaded [`ContentIndex`].
//!
//! The index is loaded once and handed to [`ContentQuery`]; every query
//! borrows from it and nothing here mutates it.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;

use anyhow::Context as _;

use crate::formats::{
    Adjacent, ArchiveEntry, ContentIndex, Paginated, Pagination, PostSummary, TagCount,
};
use crate::locale::Locale;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("limit must be greater than zero")]
    InvalidLimit,
}

/// Filters for [`ContentQuery::paginate`]. Mirrors the blog list URL
/// parameters (`page`, `tag`, `search`, `year`, `month`, `day`).
/// `month` needs `year`, and `day` needs both.
#[derive(Debug, Clone)]
pub struct PaginateOptions {
    pub page: i64,
    pub limit: usize,
    pub locale: Option<Locale>,
    pub tag: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub search: Option<String>,
}

impl Default for PaginateOptions {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            locale: None,
            tag: None,
            year: None,
            month: None,
            day: None,
            search: None,
        }
    }
}

impl ContentIndex {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read content index: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parse content index: {}", path.display()))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ContentQuery<'a> {
    index: &'a ContentIndex,
}

impl<'a> ContentQuery<'a> {
    pub fn new(index: &'a ContentIndex) -> Self {
        Self { index }
    }

    pub fn paginate(&self, options: &PaginateOptions) -> Result<Paginated<'a>, QueryError> {
        if options.limit == 0 {
            return Err(QueryError::InvalidLimit);
        }

        let tag = options.tag.as_deref().filter(|t| !t.is_empty());
        let search = options
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let month = options.year.and(options.month);
        let day = month.and(options.day);

        let filtered = self
            .posts_in(options.locale)
            .filter(|p| tag.is_none_or(|t| p.tags.iter().any(|pt| pt == t)))
            .filter(|p| options.year.is_none_or(|y| p.year == y))
            .filter(|p| month.is_none_or(|m| p.month == m))
            .filter(|p| day.is_none_or(|d| p.day == d))
            .filter(|p| search.as_deref().is_none_or(|q| matches_search(p, q)))
            .collect::<Vec<_>>();

        let limit = options.limit;
        let total_items = filtered.len();
        let total_pages = total_items.div_ceil(limit);
        let requested = usize::try_from(options.page.max(1)).unwrap_or(usize::MAX);
        let current_page = requested.min(total_pages.max(1));

        let start = (current_page - 1) * limit;
        let data = filtered
            .into_iter()
            .skip(start)
            .take(limit)
            .collect::<Vec<_>>();

        Ok(Paginated {
            data,
            pagination: Pagination {
                current_page,
                total_pages,
                total_items,
                has_next: current_page < total_pages,
                has_prev: current_page > 1,
                limit,
            },
        })
    }

    pub fn tags_for(&self, locale: Option<Locale>) -> Vec<TagCount> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for post in self.posts_in(locale) {
            for tag in &post.tags {
                *counts.entry(tag.as_str()).or_default() += 1;
            }
        }

        let mut tags = counts
            .into_iter()
            .map(|(tag, count)| TagCount {
                tag: tag.to_owned(),
                count,
            })
            .collect::<Vec<_>>();
        tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
        tags
    }

    pub fn archive_for(&self, locale: Option<Locale>) -> Vec<ArchiveEntry> {
        let mut buckets: BTreeMap<(i32, u32), usize> = BTreeMap::new();
        for post in self.posts_in(locale) {
            *buckets.entry((post.year, post.month)).or_default() += 1;
        }

        let names = locale.unwrap_or(Locale::En);
        buckets
            .into_iter()
            .rev()
            .map(|((year, month), count)| ArchiveEntry {
                year,
                month,
                count,
                month_name: names.month_name(month).unwrap_or_default().to_owned(),
            })
            .collect()
    }

    pub fn get_by_slug(&self, slug: &str, locale: Locale) -> Option<&'a PostSummary> {
        self.index
            .posts
            .iter()
            .find(|p| p.slug == slug && p.locale == locale)
    }

    pub fn search(&self, query: &str, locale: Locale, limit: usize) -> Vec<&'a PostSummary> {
        let query = query.to_lowercase();
        self.posts_in(Some(locale))
            .filter(|p| matches_search(p, &query))
            .take(limit)
            .collect()
    }

    pub fn adjacent(&self, slug: &str, locale: Locale) -> Option<Adjacent<'a>> {
        let posts = self.posts_by_locale(locale);
        let idx = posts.iter().position(|p| p.slug == slug)?;
        Some(Adjacent {
            prev: idx.checked_sub(1).map(|i| posts[i]),
            next: posts.get(idx + 1).copied(),
        })
    }

    /// Newest-first posts of one locale.
    pub fn posts_by_locale(&self, locale: Locale) -> Vec<&'a PostSummary> {
        self.posts_in(Some(locale)).collect()
    }

    fn posts_in(&self, locale: Option<Locale>) -> impl Iterator<Item = &'a PostSummary> + use<'a> {
        let index: &'a ContentIndex = self.index;
        index
            .posts
            .iter()
            .filter(move |p| locale.is_none_or(|l| p.locale == l))
    }
}

/// `query` must already be lowercase.
fn matches_search(post: &PostSummary, query: &str) -> bool {
    post.title.to_lowercase().contains(query)
        || post.excerpt.to_lowercase().contains(query)
        || post.tags.iter().any(|t| t.to_lowercase().contains(query))
}
