use std::path::{Path, PathBuf};

use anyhow::Context as _;
use pulldown_cmark::{Options, Parser};

use crate::formats::{PostSummary, PostView};
use crate::front_matter;

pub fn markdown_to_html(md: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(md, options);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

/// Location of an indexed post in the store: `<content>/<locale>/<filename>`.
pub fn post_path(content_dir: &Path, summary: &PostSummary) -> PathBuf {
    content_dir
        .join(summary.locale.code())
        .join(&summary.filename)
}

/// Reads the post behind an index entry and renders its body. The summary
/// fields come from the index so the view matches what listings show.
pub fn load_post(content_dir: &Path, summary: &PostSummary) -> anyhow::Result<PostView> {
    let path = post_path(content_dir, summary);
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("read post: {}", path.display()))?;
    let (_, body) = front_matter::split(&contents)
        .with_context(|| format!("parse front matter: {}", path.display()))?;

    Ok(PostView {
        summary: summary.clone(),
        content_html: markdown_to_html(body),
    })
}
