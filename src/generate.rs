//! LLM-assisted post drafting.
//!
//! One draft is written in the source locale and then translated into every
//! other configured locale. All files share `<date>-<topic slug>.md`, so the
//! posts resolve to each other by exact slug. Nothing is written until every
//! locale has a valid document.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use chrono::{Datelike as _, NaiveDate};

use crate::cli::{ContentType, GenerateArgs, LlmEngine};
use crate::config::BlogConfig;
use crate::front_matter;
use crate::locale::Locale;
use crate::openai::OpenaiConfig;
use crate::slug::slugify;

const INSTRUCTIONS: &str = "You are a technology writer for a bilingual tech blog. \
Reply with a single Markdown document that starts with YAML front matter. \
Do not add explanations before or after the document.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPost {
    pub locale: Locale,
    pub path: PathBuf,
    pub title: String,
}

pub async fn run(args: GenerateArgs, config: &BlogConfig) -> anyhow::Result<Vec<GeneratedPost>> {
    let date = match args.date.as_deref() {
        Some(raw) => front_matter::parse_date(raw).with_context(|| format!("--date {raw}"))?,
        None => chrono::Utc::now().date_naive(),
    };
    let topic = pick_topic(args.topic.as_deref(), &config.generate.topics, date)?;
    let content_dir = args
        .content_dir
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.content.dir.clone());

    let drafter = match args.engine {
        LlmEngine::Noop => Drafter::Noop,
        LlmEngine::Openai => Drafter::Openai(OpenaiConfig::from_env(
            &args.openai_base_url,
            &args.openai_model,
            args.openai_temperature,
            Duration::from_secs(args.timeout_secs),
        )?),
    };

    let job = Job {
        topic,
        content_type: args.content_type,
        date,
        source: config.generate.source_locale,
        locales: config.content.locales.clone(),
        author: config.generate.author.clone(),
        content_dir,
        force: args.force,
    };
    let posts = job.run(&drafter).await?;

    for post in &posts {
        tracing::info!(locale = %post.locale, path = %post.path.display(), title = %post.title, "post generated");
    }
    Ok(posts)
}

/// `explicit` when given, otherwise the configured topic for the date's
/// ordinal day.
pub fn pick_topic(explicit: Option<&str>, topics: &[String], date: NaiveDate) -> anyhow::Result<String> {
    let topic = match explicit.map(str::trim).filter(|t| !t.is_empty()) {
        Some(topic) => topic.to_owned(),
        None => {
            if topics.is_empty() {
                anyhow::bail!("no --topic given and generate.topics is empty");
            }
            let idx = date.ordinal0() as usize % topics.len();
            topics[idx].trim().to_owned()
        }
    };

    if topic.is_empty() || topic.contains('<') || topic.contains('>') {
        anyhow::bail!("invalid topic {topic:?}: empty or contains markup");
    }
    Ok(topic)
}

#[derive(Debug)]
pub enum Drafter {
    /// Offline skeleton; translations keep the source text.
    Noop,
    Openai(OpenaiConfig),
}

impl Drafter {
    async fn draft(
        &self,
        topic: &str,
        content_type: ContentType,
        locale: Locale,
        date: NaiveDate,
        author: &str,
    ) -> anyhow::Result<String> {
        match self {
            Self::Noop => skeleton(topic, content_type, date, author),
            Self::Openai(openai) => {
                let prompt = draft_prompt(topic, content_type, locale, author);
                tracing::info!(engine = "openai", model = %openai.model, locale = %locale, "drafting post");
                openai.complete(INSTRUCTIONS, &prompt).await
            }
        }
    }

    async fn translate(&self, document: &str, from: Locale, to: Locale) -> anyhow::Result<String> {
        match self {
            Self::Noop => Ok(document.to_owned()),
            Self::Openai(openai) => {
                let prompt = translate_prompt(document, from, to);
                tracing::info!(engine = "openai", model = %openai.model, from = %from, to = %to, "translating post");
                openai.complete(INSTRUCTIONS, &prompt).await
            }
        }
    }
}

pub struct Job {
    pub topic: String,
    pub content_type: ContentType,
    pub date: NaiveDate,
    pub source: Locale,
    pub locales: Vec<Locale>,
    pub author: String,
    pub content_dir: PathBuf,
    pub force: bool,
}

impl Job {
    pub fn slug(&self) -> anyhow::Result<String> {
        let slug = slugify(&self.topic);
        if slug.is_empty() {
            anyhow::bail!("topic {:?} does not yield a slug", self.topic);
        }
        Ok(slug)
    }

    pub async fn run(&self, drafter: &Drafter) -> anyhow::Result<Vec<GeneratedPost>> {
        if !self.locales.contains(&self.source) {
            anyhow::bail!(
                "source locale {} is not one of the configured locales",
                self.source
            );
        }
        let slug = self.slug()?;
        let filename = format!("{}-{slug}.md", self.date.format("%Y-%m-%d"));

        // source first, then the rest in configured order
        let targets: Vec<Locale> = std::iter::once(self.source)
            .chain(self.locales.iter().copied().filter(|l| *l != self.source))
            .collect();
        let paths: Vec<PathBuf> = targets
            .iter()
            .map(|l| self.content_dir.join(l.code()).join(&filename))
            .collect();
        if !self.force
            && let Some(existing) = paths.iter().find(|p| p.exists())
        {
            anyhow::bail!("post already exists: {} (use --force)", existing.display());
        }

        tracing::info!(topic = %self.topic, slug, date = %self.date, "generating post");
        let draft = drafter
            .draft(&self.topic, self.content_type, self.source, self.date, &self.author)
            .await
            .context("draft post")?;
        let base = normalize(&draft, self.date, &self.author)
            .with_context(|| format!("normalize {} draft", self.source))?;

        let mut documents = vec![base.clone()];
        for &target in &targets[1..] {
            let translated = drafter
                .translate(&base.text, self.source, target)
                .await
                .with_context(|| format!("translate post to {target}"))?;
            let doc = normalize(&translated, self.date, &self.author)
                .with_context(|| format!("normalize {target} translation"))?;
            documents.push(doc);
        }

        let mut posts = Vec::with_capacity(targets.len());
        for ((locale, path), doc) in targets.into_iter().zip(paths).zip(documents) {
            write_post(&path, &doc.text, self.force)?;
            posts.push(GeneratedPost {
                locale,
                path,
                title: doc.title,
            });
        }
        Ok(posts)
    }
}

#[derive(Debug, Clone)]
struct Document {
    title: String,
    text: String,
}

/// Turns a model reply into a post the indexer accepts: fences are stripped,
/// the title is required, `date` is forced and `author` defaulted. A `slug`
/// key is dropped since the shared file name provides it.
fn normalize(reply: &str, date: NaiveDate, default_author: &str) -> anyhow::Result<Document> {
    let text = strip_code_fences(reply);
    let (mut mapping, body) = front_matter::parse_mapping(text).context("parse front matter")?;

    let has_title = mapping
        .get("title")
        .and_then(|v| v.as_str())
        .is_some_and(|t| !t.trim().is_empty());
    if !has_title {
        anyhow::bail!("generated post has no title");
    }

    mapping.insert("date".into(), date.format("%Y-%m-%d").to_string().into());
    let has_author = mapping
        .get("author")
        .and_then(|v| v.as_str())
        .is_some_and(|a| !a.trim().is_empty());
    if !has_author {
        mapping.insert("author".into(), default_author.into());
    }
    mapping.remove("slug");

    let text = front_matter::compose(&mapping, body)?;
    let (front, _) = front_matter::parse(&text).context("validate generated post")?;
    Ok(Document {
        title: front.title,
        text,
    })
}

fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(rest) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // drop the info string (```markdown)
    match rest.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => trimmed,
    }
}

fn skeleton(
    topic: &str,
    content_type: ContentType,
    date: NaiveDate,
    author: &str,
) -> anyhow::Result<String> {
    let mut mapping = serde_yaml::Mapping::new();
    mapping.insert("title".into(), topic.into());
    mapping.insert("date".into(), date.format("%Y-%m-%d").to_string().into());
    mapping.insert("author".into(), author.into());
    mapping.insert(
        "tags".into(),
        serde_yaml::Value::Sequence(vec!["draft".into(), content_type.tag().into()]),
    );
    mapping.insert("excerpt".into(), format!("Draft about {topic}.").into());

    let sections = content_type
        .outline()
        .iter()
        .map(|section| format!("## {section}\n\n_To be written._\n"))
        .collect::<Vec<_>>()
        .join("\n");
    front_matter::compose(&mapping, &format!("\n# {topic}\n\n{sections}"))
}

impl ContentType {
    fn tag(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Tutorial => "tutorial",
            Self::Review => "review",
            Self::NewsAnalysis => "news-analysis",
        }
    }

    /// Sections the post must cover, in order.
    fn outline(self) -> &'static [&'static str] {
        match self {
            Self::Article => &[
                "An attractive, SEO-friendly title",
                "An introduction that sets the context",
                "At least three main sections with subheadings",
                "Accurate but accessible technical information",
                "Practical examples or use cases",
                "A conclusion summarizing the key points",
                "3-5 relevant tags",
            ],
            Self::Tutorial => &[
                "A clear title saying it is a tutorial",
                "Prerequisites",
                "Required tools and materials",
                "Numbered, detailed steps",
                "Code samples or commands where applicable",
                "Common problems and their solutions",
                "Next steps or further resources",
            ],
            Self::Review => &[
                "A title saying it is a review",
                "Overview of the subject",
                "Detailed pros and cons",
                "Comparison with alternatives where applicable",
                "Recommended use cases",
                "A conclusion with a final recommendation",
                "A rating when appropriate",
            ],
            Self::NewsAnalysis => &[
                "A catchy title about the news",
                "Summary of the main developments",
                "Impact on the industry or community",
                "Expert opinions or market data",
                "Future implications",
                "A conclusion on why the news matters",
            ],
        }
    }

    fn role(self) -> &'static str {
        match self {
            Self::Article => "As a technology expert and blog writer, write a complete article",
            Self::Tutorial => "As an experienced instructor, write a step-by-step tutorial",
            Self::Review => "As a technology analyst, write a complete review",
            Self::NewsAnalysis => "As a technology journalist, write an analysis of the latest news",
        }
    }
}

fn draft_prompt(topic: &str, content_type: ContentType, locale: Locale, author: &str) -> String {
    let mut prompt = format!("{} about \"{topic}\".\n\nThe post must contain:\n", content_type.role());
    for (n, section) in content_type.outline().iter().enumerate() {
        prompt.push_str(&format!("{}. {section}\n", n + 1));
    }
    prompt.push_str(&format!(
        "\nReply in Markdown with front matter:\n\
---\n\
title: \"Post title\"\n\
date: \"YYYY-MM-DD\"\n\
author: \"{author}\"\n\
tags: [\"tag1\", \"tag2\", \"tag3\"]\n\
excerpt: \"Short description of the post\"\n\
---\n\n\
# Post title\n\n\
Markdown content...\n\n\
The post should be 800-1200 words, informative, current and engaging.\n\
Write in {}.\n\
List research sources and relevant links at the end of the post.\n",
        locale.language_name()
    ));
    prompt
}

fn translate_prompt(document: &str, from: Locale, to: Locale) -> String {
    format!(
        "Translate the following blog post from {from} to {to}, keeping EXACTLY the same \
structure, Markdown formatting and front matter.\n\n\
IMPORTANT:\n\
- Keep the same front matter keys\n\
- Translate title, tags and excerpt\n\
- Keep author and date unchanged\n\
- Translate all Markdown content, keeping the formatting\n\
- Keep the original links and references\n\
- Translate section headings, keeping the hierarchy (# ## ###)\n\n\
BEGIN_POST\n{document}\nEND_POST\n\n\
Reply ONLY with the complete translated post, without explanations.\n",
        from = from.language_name(),
        to = to.language_name(),
    )
}

fn write_post(path: &Path, contents: &str, force: bool) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create post dir: {}", parent.display()))?;
    }

    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let mut file = options
        .open(path)
        .with_context(|| format!("open post: {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("write post: {}", path.display()))?;
    file.flush()
        .with_context(|| format!("flush post: {}", path.display()))?;
    Ok(())
}
