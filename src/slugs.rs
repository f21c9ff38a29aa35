//! Friendly slug assignment.
//!
//! Posts without a `slug` key are addressed by their file name, which carries
//! the date prefix. This pass writes a slug derived from the title into the
//! front matter so URLs stay readable and related posts can share one slug
//! across locales.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::cli::SlugsArgs;
use crate::config::BlogConfig;
use crate::front_matter;
use crate::locale::Locale;
use crate::slug::slugify;

/// Known long titles folded into one short slug shared by both locales.
const TOPIC_ALIASES: [(&str, &str); 8] = [
    ("ai-coders-copilot-chatgpt-claude-code-amazon-q", "ai-coding-assistants"),
    (
        "ai-coding-assistants-revolution-complete-guide-to-copilot-chatgpt-claude-and-amazon-q",
        "ai-coding-assistants",
    ),
    ("claude-code-e-ai-assistants", "claude-code-ai-assistants"),
    (
        "design-patterns-o-guia-completo-para-revolucionar-seu-desenvolvimento-de-software",
        "design-patterns-guide",
    ),
    (
        "design-patterns-o-guia-definitivo-para-padroes-de-projeto-em-desenvolvimento-de-software",
        "design-patterns-guide",
    ),
    (
        "big-data-e-analytics-como-transformar-dados-em-decisoes-estrategicas-para-o-seu-negocio",
        "big-data-analytics-business",
    ),
    (
        "big-data-e-analytics-como-transformar-dados-em-vantagem-competitiva-em-2024",
        "big-data-analytics-business",
    ),
    (
        "automated-testing-the-complete-guide-to-building-bulletproof-software-in-2024",
        "automated-testing-guide",
    ),
];

const ALIAS_PREFIX_LEN: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub path: PathBuf,
    pub locale: Locale,
    pub slug: String,
}

pub fn run(args: SlugsArgs, config: &BlogConfig) -> anyhow::Result<()> {
    let assigned = assign_slugs(&config.content.dir, &config.content.locales, args.dry_run)?;
    tracing::info!(
        assigned = assigned.len(),
        dry_run = args.dry_run,
        "friendly slug pass finished"
    );
    Ok(())
}

/// Slug for a title: the slugified title, or a shared alias when the title is
/// one of the known long variants.
pub fn friendly_slug(title: &str) -> String {
    let generated = slugify(title);
    if generated.is_empty() {
        return generated;
    }
    let prefix: String = generated.chars().take(ALIAS_PREFIX_LEN).collect();
    TOPIC_ALIASES
        .iter()
        .find(|(key, _)| generated.contains(key) || key.contains(prefix.as_str()))
        .map(|(_, alias)| (*alias).to_owned())
        .unwrap_or(generated)
}

/// Adds a `slug` to every post of `locales` that lacks one. Slugs stay unique
/// per locale: an alias already taken falls back to the plain title slug, and
/// a taken title slug gets a numeric suffix.
pub fn assign_slugs(
    content_dir: &Path,
    locales: &[Locale],
    dry_run: bool,
) -> anyhow::Result<Vec<Assignment>> {
    let mut assigned = Vec::new();
    for &locale in locales {
        let dir = content_dir.join(locale.code());
        let Some(files) = markdown_files(&dir)? else {
            tracing::warn!(dir = %dir.display(), "locale directory missing; skipping");
            continue;
        };

        let mut pending = Vec::new();
        let mut taken = HashSet::new();
        for path in files {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("read post: {}", path.display()))?;
            let (mapping, _) = front_matter::parse_mapping(&contents)
                .with_context(|| format!("parse front matter: {}", path.display()))?;

            match string_field(&mapping, "slug") {
                Some(existing) => {
                    tracing::debug!(path = %path.display(), slug = existing, "post already has a slug");
                    taken.insert(existing.to_owned());
                }
                None => {
                    let title = string_field(&mapping, "title")
                        .ok_or_else(|| anyhow::anyhow!("post has no title: {}", path.display()))?
                        .to_owned();
                    pending.push((path, contents, title));
                }
            }
        }

        for (path, contents, title) in pending {
            let Some(slug) = pick_slug(&title, &taken) else {
                tracing::warn!(path = %path.display(), title, "title yields an empty slug; skipping");
                continue;
            };
            taken.insert(slug.clone());

            if dry_run {
                tracing::info!(path = %path.display(), slug, "would add slug");
            } else {
                write_slug(&path, &contents, &slug)?;
                tracing::info!(path = %path.display(), slug, "added slug");
            }
            assigned.push(Assignment { path, locale, slug });
        }
    }
    Ok(assigned)
}

fn pick_slug(title: &str, taken: &HashSet<String>) -> Option<String> {
    let friendly = friendly_slug(title);
    if friendly.is_empty() {
        return None;
    }
    if !taken.contains(&friendly) {
        return Some(friendly);
    }

    let base = slugify(title);
    if !taken.contains(&base) {
        return Some(base);
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate))
}

fn write_slug(path: &Path, contents: &str, slug: &str) -> anyhow::Result<()> {
    let (mut mapping, body) = front_matter::parse_mapping(contents)
        .with_context(|| format!("parse front matter: {}", path.display()))?;
    mapping.insert("slug".into(), slug.into());
    let updated = front_matter::compose(&mapping, body)?;
    std::fs::write(path, updated).with_context(|| format!("write post: {}", path.display()))
}

fn string_field<'m>(mapping: &'m serde_yaml::Mapping, key: &str) -> Option<&'m str> {
    mapping
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn markdown_files(dir: &Path) -> anyhow::Result<Option<Vec<PathBuf>>> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("read dir: {}", dir.display()))? {
        let path = entry
            .with_context(|| format!("read dir entry: {}", dir.display()))?
            .path();
        if path.extension().is_some_and(|ext| ext == "md") {
            files.push(path);
        }
    }
    files.sort();
    Ok(Some(files))
}
