//! Content indexer.
//!
//! Scans `<content>/<locale>/*.md`, validates every post and builds the
//! [`ContentIndex`] in one pass. Nothing is written until the whole index has
//! been built, so a malformed post never leaves a partial index behind.

use std::collections::{BTreeMap, HashSet};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::Datelike as _;

use crate::cli::IndexArgs;
use crate::config::BlogConfig;
use crate::formats::{ContentIndex, LocalePostEntry, PostSummary, TagBucket, YearBucket};
use crate::front_matter;
use crate::locale::Locale;
use crate::slug;

pub fn run(args: IndexArgs, config: &BlogConfig) -> anyhow::Result<()> {
    let content_dir = args
        .content_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| config.content.dir.clone());
    let index_path = args
        .out
        .map(PathBuf::from)
        .unwrap_or_else(|| content_dir.join(&config.content.index_file));

    let index = build_index(&content_dir, &config.content.locales).context("build index")?;
    write_artifacts(&index, &content_dir, &index_path).context("write index artifacts")?;

    tracing::info!(
        index = %index_path.display(),
        total_posts = index.total_posts,
        locales = ?index.locales,
        years = ?index.years.keys().collect::<Vec<_>>(),
        tags = index.tags.len(),
        "content index generated"
    );
    Ok(())
}

/// Reads every configured locale directory and builds the index.
pub fn build_index(content_dir: &Path, locales: &[Locale]) -> anyhow::Result<ContentIndex> {
    let mut posts = Vec::new();
    let mut present = Vec::new();

    for (i, &locale) in locales.iter().enumerate() {
        if locales[..i].contains(&locale) {
            tracing::warn!(locale = %locale, "locale listed twice; skipping repeat");
            continue;
        }
        let locale_dir = content_dir.join(locale.code());
        let Some(files) = list_markdown_files(&locale_dir) else {
            continue;
        };
        present.push(locale);

        let mut seen = HashSet::new();
        for path in files {
            let post = read_post(&path, locale)
                .with_context(|| format!("index post: {}", path.display()))?;
            if !seen.insert(post.slug.clone()) {
                anyhow::bail!(
                    "duplicate slug {:?} in locale {locale}: {}",
                    post.slug,
                    path.display()
                );
            }
            tracing::debug!(locale = %locale, slug = %post.slug, "indexed post");
            posts.push(post);
        }
    }

    Ok(index_posts(posts, present))
}

/// `None` when the directory is missing or unreadable; the locale then
/// simply has no posts.
fn list_markdown_files(dir: &Path) -> Option<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(dir = %dir.display(), error = %err, "locale directory unavailable; skipping");
            return None;
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(dir = %dir.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("md") {
            files.push(path);
        }
    }
    // read_dir order is platform dependent
    files.sort();
    Some(files)
}

pub fn read_post(path: &Path, locale: Locale) -> anyhow::Result<PostSummary> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read post: {}", path.display()))?;
    let (front, _body) = front_matter::parse(&contents).context("parse front matter")?;

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("post file name is not valid UTF-8: {}", path.display()))?
        .to_owned();
    let post_slug = match front.slug {
        Some(explicit) => explicit,
        None => slug::from_filename(path)
            .ok_or_else(|| anyhow::anyhow!("cannot derive slug from {}", path.display()))?,
    };
    if !slug::is_url_safe(&post_slug) {
        anyhow::bail!("slug {post_slug:?} is not URL-safe (lowercase letters, digits and single hyphens)");
    }

    Ok(PostSummary {
        slug: post_slug,
        title: front.title,
        date: front.date.format("%Y-%m-%d").to_string(),
        author: front.author,
        tags: front.tags,
        excerpt: front.excerpt,
        filename,
        locale,
        year: front.date.year(),
        month: front.date.month(),
        day: front.date.day(),
    })
}

/// Assembles the index from already-parsed posts. Posts are stably sorted
/// newest-first, so equal dates keep their input order.
pub fn index_posts(mut posts: Vec<PostSummary>, locales: Vec<Locale>) -> ContentIndex {
    posts.sort_by(|a, b| b.date.cmp(&a.date));

    let mut years: BTreeMap<String, YearBucket> = BTreeMap::new();
    let mut tags: BTreeMap<String, TagBucket> = BTreeMap::new();

    for post in &posts {
        let year = years.entry(post.year.to_string()).or_default();
        year.count += 1;
        let month = year
            .months
            .entry(format!("{:02}", post.month))
            .or_default();
        month.count += 1;
        let day = month.days.entry(format!("{:02}", post.day)).or_default();
        day.count += 1;
        day.posts.push(post.clone());

        for tag in &post.tags {
            let bucket = tags.entry(tag.clone()).or_default();
            bucket.count += 1;
            bucket.posts.push(post.slug.clone());
        }
    }

    ContentIndex {
        total_posts: posts.len(),
        locales,
        years,
        posts,
        tags,
    }
}

/// Writes `index_path` and one `<content>/<locale>/posts.json` per locale.
pub fn write_artifacts(
    index: &ContentIndex,
    content_dir: &Path,
    index_path: &Path,
) -> anyhow::Result<()> {
    write_json_atomic(index_path, index)?;

    for &locale in &index.locales {
        let entries = index
            .posts
            .iter()
            .filter(|p| p.locale == locale)
            .map(LocalePostEntry::from)
            .collect::<Vec<_>>();
        let path = content_dir.join(locale.code()).join("posts.json");
        write_json_atomic(&path, &entries)?;
        tracing::info!(path = %path.display(), posts = entries.len(), "locale posts generated");
    }
    Ok(())
}

pub fn write_json_atomic<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).with_context(|| format!("create dir: {}", dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    serde_json::to_writer_pretty(&mut tmp, value)
        .with_context(|| format!("serialize json: {}", path.display()))?;
    tmp.write_all(b"\n").context("write trailing newline")?;
    tmp.flush().context("flush json")?;
    tmp.persist(path)
        .with_context(|| format!("persist json: {}", path.display()))?;
    Ok(())
}
