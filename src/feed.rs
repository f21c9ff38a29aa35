use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::NaiveDate;
use rss::validation::Validate as _;
use rss::{CategoryBuilder, ChannelBuilder, GuidBuilder, ItemBuilder};

use crate::cli::RssArgs;
use crate::config::BlogConfig;
use crate::formats::{ContentIndex, PostSummary};
use crate::indexer;
use crate::locale::Locale;

pub fn run(args: RssArgs, config: &BlogConfig) -> anyhow::Result<()> {
    let out_dir = args
        .out
        .map(PathBuf::from)
        .unwrap_or_else(|| config.feed.out_dir.clone());

    let index = indexer::build_index(&config.content.dir, &config.content.locales)
        .context("build index for feeds")?;
    let written = write_feeds(&index, config, &out_dir)?;

    tracing::info!(out = %out_dir.display(), feeds = written.len(), "rss feeds generated");
    Ok(())
}

/// Writes `rss-<locale>.xml` for each configured locale plus the combined
/// `rss.xml`. Returns the written paths.
pub fn write_feeds(
    index: &ContentIndex,
    config: &BlogConfig,
    out_dir: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create feed dir: {}", out_dir.display()))?;

    let mut written = Vec::new();
    for &locale in &config.content.locales {
        let posts: Vec<&PostSummary> = index.posts.iter().filter(|p| p.locale == locale).collect();
        let xml = channel_xml(config, Some(locale), &posts)?;
        let path = out_dir.join(format!("rss-{}.xml", locale.code()));
        write_xml(&path, &xml)?;
        tracing::info!(path = %path.display(), locale = %locale, posts = posts.len(), "rss feed written");
        written.push(path);
    }

    let all: Vec<&PostSummary> = index.posts.iter().collect();
    let xml = channel_xml(config, None, &all)?;
    let path = out_dir.join("rss.xml");
    write_xml(&path, &xml)?;
    written.push(path);

    Ok(written)
}

/// Renders one RSS 2.0 channel. `locale == None` is the combined feed, which
/// takes its language and description from the first configured locale.
/// `posts` must already be newest-first.
pub fn channel_xml(
    config: &BlogConfig,
    locale: Option<Locale>,
    posts: &[&PostSummary],
) -> anyhow::Result<String> {
    let site_url = config.site.url.trim_end_matches('/');
    let channel_locale = locale.unwrap_or_else(|| {
        config
            .content
            .locales
            .first()
            .copied()
            .unwrap_or(Locale::Pt)
    });
    let link = match locale {
        Some(locale) => format!("{site_url}/{}", locale.code()),
        None => site_url.to_owned(),
    };

    let items = posts
        .iter()
        .map(|post| item(config, site_url, post))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let last_build_date = posts
        .first()
        .map(|post| rfc2822(&post.date))
        .transpose()?;

    let channel = ChannelBuilder::default()
        .title(config.site.title.clone())
        .link(link)
        .description(config.feed_description(channel_locale))
        .language(Some(channel_locale.language_tag().to_owned()))
        .copyright(config.feed.copyright.clone())
        .managing_editor(author(config))
        .last_build_date(last_build_date)
        .generator(Some(format!("blogfolio {}", env!("CARGO_PKG_VERSION"))))
        .items(items)
        .build();

    channel
        .validate()
        .map_err(|err| anyhow::anyhow!("rss validation failed: {err}"))?;
    Ok(channel.to_string())
}

fn item(config: &BlogConfig, site_url: &str, post: &PostSummary) -> anyhow::Result<rss::Item> {
    let link = format!("{site_url}/{}/blog/{}", post.locale.code(), post.slug);
    let categories = post
        .tags
        .iter()
        .map(|tag| CategoryBuilder::default().name(tag.clone()).build())
        .collect::<Vec<_>>();
    let description = (!post.excerpt.is_empty()).then(|| post.excerpt.clone());

    Ok(ItemBuilder::default()
        .title(Some(post.title.clone()))
        .link(Some(link.clone()))
        .guid(Some(GuidBuilder::default().permalink(true).value(link).build()))
        .description(description)
        .pub_date(Some(rfc2822(&post.date)?))
        .author(author(config))
        .categories(categories)
        .build())
}

/// RSS wants `email (Name)`; nothing is emitted without an email.
fn author(config: &BlogConfig) -> Option<String> {
    let email = config.site.author_email.trim();
    if email.is_empty() {
        return None;
    }
    let name = config.site.author_name.trim();
    if name.is_empty() {
        Some(email.to_owned())
    } else {
        Some(format!("{email} ({name})"))
    }
}

fn rfc2822(date: &str) -> anyhow::Result<String> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("invalid post date: {date}"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("invalid post date: {date}"))?;
    Ok(midnight.and_utc().to_rfc2822())
}

fn write_xml(path: &Path, xml: &str) -> anyhow::Result<()> {
    std::fs::write(path, xml).with_context(|| format!("write feed: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::index_posts;
    use chrono::Datelike as _;

    fn post(slug: &str, locale: Locale, date: &str, tags: &[&str]) -> PostSummary {
        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        PostSummary {
            slug: slug.to_owned(),
            title: format!("Title {slug}"),
            date: date.to_owned(),
            author: "Ana".to_owned(),
            tags: tags.iter().map(|t| (*t).to_owned()).collect(),
            excerpt: format!("About {slug}"),
            filename: format!("{slug}.md"),
            locale,
            year: parsed.year(),
            month: parsed.month(),
            day: parsed.day(),
        }
    }

    fn config() -> BlogConfig {
        let mut config = BlogConfig::default();
        config.site.url = "https://example.github.io/portfolio/".to_owned();
        config.site.author_name = "Ana".to_owned();
        config.site.author_email = "ana@example.com".to_owned();
        config
    }

    fn sample_index() -> ContentIndex {
        index_posts(
            vec![
                post("old-pt", Locale::Pt, "2023-12-01", &["rust"]),
                post("new-pt", Locale::Pt, "2024-02-10", &["ia", "rust"]),
                post("mid-en", Locale::En, "2024-01-15", &["ai"]),
            ],
            vec![Locale::Pt, Locale::En],
        )
    }

    #[test]
    fn locale_channel_lists_posts_newest_first() -> anyhow::Result<()> {
        let index = sample_index();
        let config = config();
        let posts: Vec<&PostSummary> = index.posts.iter().filter(|p| p.locale == Locale::Pt).collect();
        let xml = channel_xml(&config, Some(Locale::Pt), &posts)?;
        let channel = rss::Channel::read_from(xml.as_bytes())?;

        assert_eq!(channel.language(), Some("pt-BR"));
        assert_eq!(channel.link(), "https://example.github.io/portfolio/pt");
        assert_eq!(channel.last_build_date(), Some("Sat, 10 Feb 2024 00:00:00 +0000"));

        let items = channel.items();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].link(),
            Some("https://example.github.io/portfolio/pt/blog/new-pt")
        );
        assert_eq!(items[0].description(), Some("About new-pt"));
        assert_eq!(items[0].author(), Some("ana@example.com (Ana)"));
        let tags: Vec<&str> = items[0].categories().iter().map(|c| c.name()).collect();
        assert_eq!(tags, vec!["ia", "rust"]);
        assert_eq!(items[1].link(), Some("https://example.github.io/portfolio/pt/blog/old-pt"));
        Ok(())
    }

    #[test]
    fn writes_locale_and_combined_feeds() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let index = sample_index();
        let written = write_feeds(&index, &config(), temp.path())?;
        assert_eq!(written.len(), 3);

        let combined = std::fs::read_to_string(temp.path().join("rss.xml"))?;
        let channel = rss::Channel::read_from(combined.as_bytes())?;
        let links: Vec<&str> = channel.items().iter().filter_map(|i| i.link()).collect();
        assert_eq!(
            links,
            vec![
                "https://example.github.io/portfolio/pt/blog/new-pt",
                "https://example.github.io/portfolio/en/blog/mid-en",
                "https://example.github.io/portfolio/pt/blog/old-pt",
            ]
        );

        let en = std::fs::read_to_string(temp.path().join("rss-en.xml"))?;
        let channel = rss::Channel::read_from(en.as_bytes())?;
        assert_eq!(channel.language(), Some("en-US"));
        assert_eq!(channel.items().len(), 1);
        Ok(())
    }

    #[test]
    fn empty_locale_has_no_build_date() -> anyhow::Result<()> {
        let xml = channel_xml(&config(), Some(Locale::En), &[])?;
        let channel = rss::Channel::read_from(xml.as_bytes())?;
        assert!(channel.items().is_empty());
        assert_eq!(channel.last_build_date(), None);
        Ok(())
    }
}
