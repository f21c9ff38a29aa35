use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

use blogfolio::cli::{Command, IndexSource, PostCommand, QueryCommand};
use blogfolio::config::BlogConfig;
use blogfolio::formats::ContentIndex;
use blogfolio::query::{ContentQuery, PaginateOptions};
use blogfolio::resolver::{SlugResolver, SlugTable};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    blogfolio::logging::init().context("init logging")?;

    let cli = blogfolio::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let config = BlogConfig::load(Path::new(&cli.config)).context("load config")?;

    match cli.command {
        Command::Index(args) => {
            blogfolio::indexer::run(args, &config).context("index")?;
        }
        Command::Query { command } => query(command, &config).context("query")?,
        Command::Post {
            command: PostCommand::Show(args),
        } => {
            let index = load_index(&args.post.source, &config)?;
            let content_dir = args
                .content_dir
                .map(PathBuf::from)
                .unwrap_or_else(|| config.content.dir.clone());
            let view = ContentQuery::new(&index)
                .get_by_slug(&args.post.slug, args.post.locale)
                .map(|summary| blogfolio::render::load_post(&content_dir, summary))
                .transpose()
                .context("post show")?;
            print_json(&view)?;
        }
        Command::Resolve(args) => {
            let table = SlugTable::with_config(&config.resolver);
            let index = if args.no_index {
                None
            } else {
                load_index_if_present(&args.source, &config)?
            };
            let resolution =
                SlugResolver::new(&table, index.as_ref()).resolve(&args.slug, args.from, args.to);
            print_json(&resolution)?;
        }
        Command::Rss(args) => {
            blogfolio::feed::run(args, &config).context("rss")?;
        }
        Command::Slugs(args) => {
            blogfolio::slugs::run(args, &config).context("slugs")?;
        }
        Command::Generate(args) => {
            blogfolio::generate::run(args, &config)
                .await
                .context("generate")?;
        }
    }

    Ok(())
}

fn query(command: QueryCommand, config: &BlogConfig) -> anyhow::Result<()> {
    match command {
        QueryCommand::Page(args) => {
            let index = load_index(&args.source, config)?;
            let options = PaginateOptions {
                page: args.page,
                limit: args.limit,
                locale: args.locale,
                tag: args.tag,
                year: args.year,
                month: args.month,
                day: args.day,
                search: args.search,
            };
            let page = ContentQuery::new(&index).paginate(&options)?;
            print_json(&page)
        }
        QueryCommand::Tags(args) => {
            let index = load_index(&args.source, config)?;
            print_json(&ContentQuery::new(&index).tags_for(args.locale))
        }
        QueryCommand::Archive(args) => {
            let index = load_index(&args.source, config)?;
            print_json(&ContentQuery::new(&index).archive_for(args.locale))
        }
        QueryCommand::Get(args) => {
            let index = load_index(&args.source, config)?;
            print_json(&ContentQuery::new(&index).get_by_slug(&args.slug, args.locale))
        }
        QueryCommand::Search(args) => {
            let index = load_index(&args.source, config)?;
            print_json(&ContentQuery::new(&index).search(&args.query, args.locale, args.limit))
        }
        QueryCommand::Adjacent(args) => {
            let index = load_index(&args.source, config)?;
            print_json(&ContentQuery::new(&index).adjacent(&args.slug, args.locale))
        }
    }
}

fn index_path(source: &IndexSource, config: &BlogConfig) -> PathBuf {
    source
        .index
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.index_path())
}

fn load_index(source: &IndexSource, config: &BlogConfig) -> anyhow::Result<ContentIndex> {
    ContentIndex::load(&index_path(source, config))
}

/// The resolver still answers without an index, using only its static table.
fn load_index_if_present(
    source: &IndexSource,
    config: &BlogConfig,
) -> anyhow::Result<Option<ContentIndex>> {
    let path = index_path(source, config);
    if !path.exists() {
        tracing::debug!(index = %path.display(), "index not found; resolving without it");
        return Ok(None);
    }
    ContentIndex::load(&path).map(Some)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{json}");
    Ok(())
}
