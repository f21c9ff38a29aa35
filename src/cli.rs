use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::locale::Locale;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Blog configuration file (missing file means defaults).
    #[arg(long, global = true, default_value = "blog.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan the content store and write the JSON index artifacts.
    Index(IndexArgs),
    Query {
        #[command(subcommand)]
        command: QueryCommand,
    },
    Post {
        #[command(subcommand)]
        command: PostCommand,
    },
    /// Find the equivalent slug of a post in another locale.
    Resolve(ResolveArgs),
    /// Write per-locale and combined RSS feeds.
    Rss(RssArgs),
    /// Add friendly slugs to posts that lack one.
    Slugs(SlugsArgs),
    /// Draft a new post in every configured locale.
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
pub struct IndexArgs {
    /// Content store root (default: `content.dir` from config).
    #[arg(long)]
    pub content_dir: Option<String>,

    /// Output path for the index (default: `<content-dir>/<content.index_file>`).
    #[arg(long)]
    pub out: Option<String>,
}

#[derive(Debug, Args)]
pub struct IndexSource {
    /// Index file written by `index` (default: from config).
    #[arg(long)]
    pub index: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum QueryCommand {
    /// One page of posts, newest first.
    Page(QueryPageArgs),
    /// Tag counts.
    Tags(QueryLocaleArgs),
    /// Year/month post counts.
    Archive(QueryLocaleArgs),
    /// Summary of one post.
    Get(SlugArgs),
    Search(QuerySearchArgs),
    /// Newer and older neighbours of a post.
    Adjacent(SlugArgs),
}

#[derive(Debug, Args)]
pub struct QueryPageArgs {
    #[command(flatten)]
    pub source: IndexSource,

    #[arg(long)]
    pub locale: Option<Locale>,

    /// 1-based page number; out-of-range values are clamped.
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub page: i64,

    /// Posts per page.
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Exact tag match.
    #[arg(long)]
    pub tag: Option<String>,

    #[arg(long)]
    pub year: Option<i32>,

    /// Month 1-12; ignored without `--year`.
    #[arg(long)]
    pub month: Option<u32>,

    /// Day of month 1-31; ignored without `--year` and `--month`.
    #[arg(long)]
    pub day: Option<u32>,

    /// Case-insensitive match on title, excerpt or tags.
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct QueryLocaleArgs {
    #[command(flatten)]
    pub source: IndexSource,

    /// Restrict to one locale (default: all).
    #[arg(long)]
    pub locale: Option<Locale>,
}

#[derive(Debug, Args)]
pub struct SlugArgs {
    #[command(flatten)]
    pub source: IndexSource,

    #[arg(long)]
    pub slug: String,

    #[arg(long)]
    pub locale: Locale,
}

#[derive(Debug, Args)]
pub struct QuerySearchArgs {
    #[command(flatten)]
    pub source: IndexSource,

    #[arg(long)]
    pub query: String,

    #[arg(long)]
    pub locale: Locale,

    /// Maximum number of results.
    #[arg(long, default_value_t = 5)]
    pub limit: usize,
}

#[derive(Debug, Subcommand)]
pub enum PostCommand {
    /// Full post with its body rendered to HTML.
    Show(PostShowArgs),
}

#[derive(Debug, Args)]
pub struct PostShowArgs {
    #[command(flatten)]
    pub post: SlugArgs,

    /// Content store root (default: `content.dir` from config).
    #[arg(long)]
    pub content_dir: Option<String>,
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub source: IndexSource,

    #[arg(long)]
    pub slug: String,

    #[arg(long)]
    pub from: Locale,

    #[arg(long)]
    pub to: Locale,

    /// Skip the index-backed strategies.
    #[arg(long, default_value_t = false)]
    pub no_index: bool,
}

#[derive(Debug, Args)]
pub struct RssArgs {
    /// Output directory for feeds (default: `feed.out_dir` from config).
    #[arg(long)]
    pub out: Option<String>,
}

#[derive(Debug, Args)]
pub struct SlugsArgs {
    /// Log the slugs that would be added without touching any file.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LlmEngine {
    /// Offline skeleton post; no network access.
    Noop,
    Openai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContentType {
    Article,
    Tutorial,
    Review,
    NewsAnalysis,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Topic to write about (default: picked from `generate.topics` by date).
    #[arg(long)]
    pub topic: Option<String>,

    #[arg(long, value_enum, default_value_t = ContentType::Article)]
    pub content_type: ContentType,

    #[arg(long, value_enum, default_value_t = LlmEngine::Openai)]
    pub engine: LlmEngine,

    /// Publication date `YYYY-MM-DD` (default: today, UTC).
    #[arg(long)]
    pub date: Option<String>,

    /// Content store root (default: `content.dir` from config).
    #[arg(long)]
    pub content_dir: Option<String>,

    /// Overwrite posts that already exist.
    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// OpenAI API base URL (default: https://api.openai.com/v1).
    #[arg(long, default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    /// OpenAI model name.
    #[arg(long, default_value = "gpt-4.1-mini")]
    pub openai_model: String,

    /// Sampling temperature (omitted for the gpt-5 family).
    #[arg(long, default_value_t = 0.7)]
    pub openai_temperature: f32,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,
}
