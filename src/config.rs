use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

use crate::locale::Locale;

/// Contents of `blog.toml`. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlogConfig {
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub generate: GenerateConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_content_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_locales")]
    pub locales: Vec<Locale>,
    #[serde(default = "default_index_file")]
    pub index_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_title")]
    pub title: String,
    #[serde(default = "default_site_url")]
    pub url: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_out_dir")]
    pub out_dir: PathBuf,
    #[serde(default)]
    pub copyright: Option<String>,
    /// Channel description per locale code.
    #[serde(default = "default_feed_descriptions")]
    pub descriptions: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateConfig {
    #[serde(default = "default_source_locale")]
    pub source_locale: Locale,
    #[serde(default = "default_generate_author")]
    pub author: String,
    #[serde(default = "default_topics")]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub mappings: BTreeMap<String, String>,
    #[serde(default)]
    pub shared_slugs: Vec<String>,
}

impl BlogConfig {
    /// Loads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(config = %path.display(), "config file not found; using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config: {}", path.display()))?;
        let config: Self =
            toml::from_str(&raw).with_context(|| format!("parse config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.content.locales.is_empty() {
            anyhow::bail!("content.locales must list at least one locale");
        }
        for (i, locale) in self.content.locales.iter().enumerate() {
            if self.content.locales[..i].contains(locale) {
                anyhow::bail!("content.locales lists {locale} more than once");
            }
        }
        if self.content.index_file.trim().is_empty() {
            anyhow::bail!("content.index_file must not be empty");
        }
        url::Url::parse(&self.site.url)
            .with_context(|| format!("site.url is not a valid URL: {}", self.site.url))?;
        Ok(())
    }

    pub fn index_path(&self) -> PathBuf {
        self.content.dir.join(&self.content.index_file)
    }

    pub fn feed_description(&self, locale: Locale) -> String {
        self.feed
            .descriptions
            .get(locale.code())
            .cloned()
            .unwrap_or_else(|| self.site.title.clone())
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: default_content_dir(),
            locales: default_locales(),
            index_file: default_index_file(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_site_title(),
            url: default_site_url(),
            author_name: String::new(),
            author_email: String::new(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            out_dir: default_feed_out_dir(),
            copyright: None,
            descriptions: default_feed_descriptions(),
        }
    }
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            source_locale: default_source_locale(),
            author: default_generate_author(),
            topics: default_topics(),
        }
    }
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("src/contents")
}

fn default_locales() -> Vec<Locale> {
    Locale::ALL.to_vec()
}

fn default_index_file() -> String {
    "content-index.json".to_owned()
}

fn default_site_title() -> String {
    "Tech Blog".to_owned()
}

fn default_site_url() -> String {
    "http://localhost:3000".to_owned()
}

fn default_feed_out_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_feed_descriptions() -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "pt".to_owned(),
            "Um blog de tecnologia com o conteúdo mais atual discutido no meio tech.".to_owned(),
        ),
        (
            "en".to_owned(),
            "A tech blog with the most current content being discussed in the tech world."
                .to_owned(),
        ),
    ])
}

fn default_source_locale() -> Locale {
    Locale::Pt
}

fn default_generate_author() -> String {
    "Tech Blog Bot".to_owned()
}

fn default_topics() -> Vec<String> {
    [
        "Inteligência Artificial e Machine Learning",
        "Testes Automatizados",
        "React e JavaScript",
        "Patterns de Design",
        "Inovações em IA",
        "Claude Code e AI Assistants",
        "AI Coders: Copilot, ChatGPT, Claude Code, Amazon Q",
        "Desenvolvimento Web e Frameworks",
        "DevOps e Cloud Computing",
        "Big Data e Analytics",
        "Automação de Desenvolvimento de Software",
        "Microserviços e Arquitetura",
        "Segurança em Desenvolvimento",
        "Performance Web e Otimização",
        "TypeScript e JavaScript Moderno",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}
