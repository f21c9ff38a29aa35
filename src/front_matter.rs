//! YAML front matter of Markdown posts.
//!
//! Posts start with a `---` fenced YAML block. Parsing is typed and validated
//! up front: a post without `title` or `date` is rejected instead of flowing
//! through the index with empty fields.

use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    #[error("document is empty")]
    Empty,
    #[error("document must start with YAML front matter ('---')")]
    MissingOpening,
    #[error("front matter is not terminated by '---'")]
    Unterminated,
    #[error("invalid YAML front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("missing required front matter field `{0}`")]
    MissingField(&'static str),
    #[error("invalid date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

/// Validated front matter of one post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: String,
    pub date: NaiveDate,
    pub author: String,
    pub tags: Vec<String>,
    pub excerpt: String,
    pub slug: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFrontMatter {
    title: Option<String>,
    date: Option<String>,
    author: Option<String>,
    tags: Option<Vec<String>>,
    excerpt: Option<String>,
    slug: Option<String>,
}

/// Splits a document into its YAML block and the Markdown body.
pub fn split(contents: &str) -> Result<(&str, &str), FrontMatterError> {
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);
    let mut lines = contents.split_inclusive('\n');
    let first = lines.next().ok_or(FrontMatterError::Empty)?;
    if first.trim_end() != "---" {
        return Err(FrontMatterError::MissingOpening);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if line.trim_end() == "---" {
            let yaml = &contents[yaml_start..offset];
            let body = &contents[offset + line.len()..];
            return Ok((yaml, body));
        }
        offset += line.len();
    }

    Err(FrontMatterError::Unterminated)
}

pub fn parse(contents: &str) -> Result<(FrontMatter, &str), FrontMatterError> {
    let (yaml, body) = split(contents)?;
    let raw: RawFrontMatter = if yaml.trim().is_empty() {
        RawFrontMatter::default()
    } else {
        serde_yaml::from_str(yaml)?
    };

    let title = raw
        .title
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .ok_or(FrontMatterError::MissingField("title"))?;
    let date = raw
        .date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or(FrontMatterError::MissingField("date"))?;
    let date = parse_date(date)?;

    let mut tags: Vec<String> = Vec::new();
    for tag in raw.tags.unwrap_or_default() {
        let tag = tag.trim();
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_owned());
        }
    }

    let front = FrontMatter {
        title,
        date,
        author: raw.author.unwrap_or_default().trim().to_owned(),
        tags,
        excerpt: raw.excerpt.unwrap_or_default().trim().to_owned(),
        slug: raw
            .slug
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty()),
    };
    Ok((front, body))
}

/// Accepts `YYYY-MM-DD`, or an RFC 3339 / space separated timestamp whose
/// first ten characters are the calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, FrontMatterError> {
    let invalid = || FrontMatterError::InvalidDate(raw.to_owned());
    let head = raw.get(..10).ok_or_else(invalid)?;
    let rest = &raw[10..];
    if !(rest.is_empty() || rest.starts_with('T') || rest.starts_with(' ')) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(head, "%Y-%m-%d").map_err(|_| invalid())
}

/// Front matter as an untyped mapping, for passes that rewrite a post while
/// keeping keys they do not know about.
pub fn parse_mapping(contents: &str) -> Result<(serde_yaml::Mapping, &str), FrontMatterError> {
    let (yaml, body) = split(contents)?;
    if yaml.trim().is_empty() {
        return Ok((serde_yaml::Mapping::new(), body));
    }
    let mapping = serde_yaml::from_str(yaml)?;
    Ok((mapping, body))
}

pub fn compose(mapping: &serde_yaml::Mapping, body: &str) -> anyhow::Result<String> {
    let yaml = serde_yaml::to_string(mapping)?;
    let mut out = String::with_capacity(yaml.len() + body.len() + 16);
    out.push_str("---\n");
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("---\n");
    if !body.starts_with('\n') {
        out.push('\n');
    }
    out.push_str(body);
    Ok(out)
}
