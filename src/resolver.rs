//! Cross-locale slug equivalence.
//!
//! Posts are not guaranteed to be 1:1 translations, so finding "the same
//! post" in another locale is best-effort. Strategies run in a fixed order and
//! the first hit wins; the last resort hands the original slug back and lets
//! the page lookup decide whether it exists.
//!
//! Topic keywords are literal substrings and run before the index lookups.
//! Topic regexes are loose (`ai.*cod` also matches `email-encoding`), so they
//! only run once the index had nothing better to offer.

use std::collections::HashMap;

use regex::Regex;
use serde::Serialize;

use crate::config::ResolverConfig;
use crate::formats::{ContentIndex, PostSummary};
use crate::locale::Locale;
use crate::query::ContentQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    ExactMapping,
    SharedSlug,
    TopicKeywordMatch,
    ExactSlug,
    TagSimilarity,
    TopicPatternMatch,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub slug: String,
    pub strategy: Strategy,
}

/// A family of posts about the same subject, with the slug it uses in each
/// locale.
#[derive(Debug, Clone)]
pub struct TopicPattern {
    pub keywords: Vec<String>,
    pub pattern: Option<Regex>,
    pub pt_slug: String,
    pub en_slug: String,
}

impl TopicPattern {
    fn matches_keyword(&self, slug: &str) -> bool {
        self.keywords.iter().any(|k| slug.contains(k.as_str()))
    }

    fn matches_pattern(&self, slug: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(slug))
    }

    fn slug_for(&self, locale: Locale) -> &str {
        match locale {
            Locale::Pt => &self.pt_slug,
            Locale::En => &self.en_slug,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SlugTable {
    pub mappings: HashMap<String, String>,
    pub shared_slugs: Vec<String>,
    pub topics: Vec<TopicPattern>,
    pub tag_synonyms: HashMap<String, Vec<String>>,
}

const AI_CODERS_PT: &str = "ai-coders-como-github-copilot-chatgpt-claude-e-amazon-q-estao-revolucionando-o-desenvolvimento-de-software";
const AI_CODERS_EN: &str = "ai-coders-how-github-copilot-chatgpt-claude-and-amazon-q-are-revolutionizing-software-development";
const CLAUDE_CODE_PT: &str =
    "claude-code-revolucionando-o-desenvolvimento-com-ia-guia-completo-dos-ai-assistants";
const CLAUDE_CODE_EN: &str =
    "claude-code-revolutionizing-development-with-ai-complete-guide-to-ai-assistants";

const SHARED_SLUGS: [&str; 4] = [
    "design-patterns-guide",
    "big-data-analytics-business",
    "ai-coding-assistants",
    "automated-testing-guide",
];

const TAG_SYNONYMS: [(&str, &[&str]); 12] = [
    ("artificial-intelligence", &["inteligencia-artificial", "ai", "ia"]),
    ("inteligencia-artificial", &["artificial-intelligence", "ai", "ia"]),
    ("software-development", &["desenvolvimento-software", "desenvolvimento"]),
    ("desenvolvimento-software", &["software-development", "development"]),
    ("programming", &["programacao"]),
    ("programacao", &["programming"]),
    ("design-patterns", &["padroes-projeto", "patterns"]),
    ("big-data", &["dados", "data"]),
    ("analytics", &["analitica"]),
    ("chatgpt", &["gpt", "openai"]),
    ("copilot", &["github-copilot"]),
    ("claude", &["anthropic"]),
];

impl Default for SlugTable {
    fn default() -> Self {
        let mut mappings = HashMap::new();
        for (a, b) in [(AI_CODERS_PT, AI_CODERS_EN), (CLAUDE_CODE_PT, CLAUDE_CODE_EN)] {
            mappings.insert(a.to_owned(), b.to_owned());
            mappings.insert(b.to_owned(), a.to_owned());
        }

        let topics = vec![
            topic(
                &["ai-coders", "copilot", "chatgpt", "claude", "amazon-q", "ai-coding"],
                Some(r"(?i)ai.*cod|copilot|chatgpt|claude.*code"),
                AI_CODERS_PT,
                AI_CODERS_EN,
            ),
            topic(
                &["design-patterns", "patterns", "padroes"],
                Some(r"(?i)design.*pattern|pattern.*design"),
                "design-patterns-guide",
                "design-patterns-guide",
            ),
            topic(
                &["big-data", "analytics", "dados"],
                Some(r"(?i)big.*data|analytics|dados"),
                "big-data-analytics-business",
                "big-data-analytics-business",
            ),
            topic(
                &["automated-testing", "testing", "testes"],
                None,
                "automated-testing-guide",
                "automated-testing-guide",
            ),
            topic(
                &["claude-code", "claude", "ai-assistants"],
                None,
                CLAUDE_CODE_PT,
                CLAUDE_CODE_EN,
            ),
        ];

        let tag_synonyms = TAG_SYNONYMS
            .iter()
            .map(|(tag, synonyms)| {
                (
                    (*tag).to_owned(),
                    synonyms.iter().map(|s| (*s).to_owned()).collect(),
                )
            })
            .collect();

        Self {
            mappings,
            shared_slugs: SHARED_SLUGS.iter().map(|s| (*s).to_owned()).collect(),
            topics,
            tag_synonyms,
        }
    }
}

fn topic(keywords: &[&str], pattern: Option<&str>, pt: &str, en: &str) -> TopicPattern {
    TopicPattern {
        keywords: keywords.iter().map(|k| (*k).to_owned()).collect(),
        // built-in patterns are literals that always compile
        pattern: pattern.and_then(|p| Regex::new(p).ok()),
        pt_slug: pt.to_owned(),
        en_slug: en.to_owned(),
    }
}

impl SlugTable {
    /// Built-in table extended with configured mappings and shared slugs.
    pub fn with_config(config: &ResolverConfig) -> Self {
        let mut table = Self::default();
        for (from, to) in &config.mappings {
            table.mappings.insert(from.clone(), to.clone());
        }
        for slug in &config.shared_slugs {
            if !table.shared_slugs.contains(slug) {
                table.shared_slugs.push(slug.clone());
            }
        }
        table
    }

    fn tag_similarity(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return 1.0;
        }
        let synonyms = |tag: &str, other: &str| {
            self.tag_synonyms
                .get(tag)
                .is_some_and(|list| list.iter().any(|s| s == other))
        };
        if synonyms(a, b) || synonyms(b, a) {
            return 0.9;
        }

        let na = a.to_lowercase().replace('-', "");
        let nb = b.to_lowercase().replace('-', "");
        if na.contains(&nb) || nb.contains(&na) {
            return 0.6;
        }
        0.0
    }

    fn has_common_tags(&self, a: &[String], b: &[String]) -> bool {
        a.iter().any(|t| b.contains(t))
            || a.iter()
                .any(|t| b.iter().any(|o| self.tag_similarity(t, o) > 0.7))
    }

    /// Mean pairwise similarity between two tag lists.
    fn tags_score(&self, a: &[String], b: &[String]) -> f64 {
        let pairs = a.len() * b.len();
        if pairs == 0 {
            return 0.0;
        }
        let total: f64 = a
            .iter()
            .flat_map(|x| b.iter().map(move |y| (x, y)))
            .map(|(x, y)| self.tag_similarity(x, y))
            .sum();
        total / pairs as f64
    }
}

pub struct SlugResolver<'a> {
    table: &'a SlugTable,
    index: Option<&'a ContentIndex>,
}

impl<'a> SlugResolver<'a> {
    pub fn new(table: &'a SlugTable, index: Option<&'a ContentIndex>) -> Self {
        Self { table, index }
    }

    pub fn resolve(&self, slug: &str, from: Locale, to: Locale) -> Resolution {
        let hit = |slug: &str, strategy: Strategy| Resolution {
            slug: slug.to_owned(),
            strategy,
        };

        if let Some(mapped) = self.table.mappings.get(slug) {
            return hit(mapped.as_str(), Strategy::ExactMapping);
        }
        if self.table.shared_slugs.iter().any(|s| s == slug) {
            return hit(slug, Strategy::SharedSlug);
        }
        // first matching topic wins, even when several overlap
        if let Some(topic) = self.table.topics.iter().find(|t| t.matches_keyword(slug)) {
            return hit(topic.slug_for(to), Strategy::TopicKeywordMatch);
        }

        if let Some(index) = self.index {
            let query = ContentQuery::new(index);
            if query.get_by_slug(slug, to).is_some() {
                return hit(slug, Strategy::ExactSlug);
            }
            if let Some(current) = query.get_by_slug(slug, from)
                && let Some(similar) = self.most_similar(&query, current, to)
            {
                return hit(similar.slug.as_str(), Strategy::TagSimilarity);
            }
        }

        if let Some(topic) = self.table.topics.iter().find(|t| t.matches_pattern(slug)) {
            return hit(topic.slug_for(to), Strategy::TopicPatternMatch);
        }

        tracing::debug!(slug, from = %from, to = %to, "no equivalent slug; falling back");
        hit(slug, Strategy::Fallback)
    }

    fn most_similar(
        &self,
        query: &ContentQuery<'a>,
        current: &PostSummary,
        to: Locale,
    ) -> Option<&'a PostSummary> {
        let mut best: Option<(&'a PostSummary, f64)> = None;
        for candidate in query.posts_by_locale(to) {
            if candidate.date != current.date
                || !self.table.has_common_tags(&candidate.tags, &current.tags)
            {
                continue;
            }
            let score = self.table.tags_score(&candidate.tags, &current.tags);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((candidate, score)),
            }
        }
        best.map(|(post, _)| post)
    }
}
