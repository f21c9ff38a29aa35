use std::fs;
use std::path::Path;

use predicates::prelude::*;

fn write_post(dir: &Path, name: &str, front: &str, body: &str) -> anyhow::Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join(name), format!("---\n{front}---\n\n{body}\n"))?;
    Ok(())
}

/// Two pt posts, one en post, plus a `blog.toml` pointing at the store.
fn sample_site(root: &Path) -> anyhow::Result<()> {
    let content = root.join("contents");
    write_post(
        &content.join("pt"),
        "2024-01-10-ola.md",
        "title: Olá Rust\ndate: 2024-01-10\ntags: [rust, intro]\nexcerpt: Primeiro post\n",
        "# Olá\n\nTexto com **negrito**.",
    )?;
    write_post(
        &content.join("pt"),
        "2024-03-05-webassembly.md",
        "title: WebAssembly na prática\ndate: 2024-03-05\ntags: [rust, wasm]\n",
        "Conteúdo.",
    )?;
    write_post(
        &content.join("en"),
        "2024-03-05-webassembly.md",
        "title: WebAssembly in practice\ndate: 2024-03-05\ntags: [rust, wasm]\nexcerpt: Hands-on\n",
        "Content.",
    )?;
    fs::write(
        root.join("blog.toml"),
        format!(
            "[content]\ndir = {:?}\n\n[site]\nurl = \"https://example.github.io/portfolio\"\nauthor_name = \"Ana\"\nauthor_email = \"ana@example.com\"\n\n[feed]\nout_dir = {:?}\n",
            content.to_str().unwrap(),
            root.join("public").to_str().unwrap(),
        ),
    )?;
    Ok(())
}

fn blogfolio(root: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("blogfolio");
    cmd.arg("--config").arg(root.join("blog.toml"));
    cmd
}

fn stdout_json(cmd: &mut assert_cmd::Command) -> anyhow::Result<serde_json::Value> {
    let output = cmd.assert().success().get_output().stdout.clone();
    Ok(serde_json::from_slice(&output)?)
}

#[test]
fn index_writes_artifacts() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    sample_site(temp.path())?;

    blogfolio(temp.path())
        .arg("index")
        .assert()
        .success()
        .stderr(predicate::str::contains("content index generated"));

    let content = temp.path().join("contents");
    let index: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(content.join("content-index.json"))?)?;
    assert_eq!(index["totalPosts"], 3);
    assert_eq!(index["years"]["2024"]["count"], 3);
    assert_eq!(index["years"]["2024"]["months"]["03"]["count"], 2);
    assert_eq!(index["tags"]["rust"]["count"], 3);
    assert_eq!(index["posts"][0]["date"], "2024-03-05");

    let pt: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(content.join("pt").join("posts.json"))?)?;
    assert_eq!(pt.as_array().map(Vec::len), Some(2));
    Ok(())
}

#[test]
fn query_commands_print_json() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    sample_site(temp.path())?;
    blogfolio(temp.path()).arg("index").assert().success();

    let page = stdout_json(blogfolio(temp.path()).args([
        "query", "page", "--locale", "pt", "--limit", "1", "--page", "9",
    ]))?;
    assert_eq!(page["pagination"]["currentPage"], 2);
    assert_eq!(page["pagination"]["totalPages"], 2);
    assert_eq!(page["pagination"]["hasNext"], false);
    assert_eq!(page["data"][0]["slug"], "2024-01-10-ola");

    let by_day = stdout_json(blogfolio(temp.path()).args([
        "query", "page", "--year", "2024", "--month", "3", "--day", "5",
    ]))?;
    assert_eq!(by_day["pagination"]["totalItems"], 2);
    let other_day = stdout_json(blogfolio(temp.path()).args([
        "query", "page", "--year", "2024", "--month", "3", "--day", "6",
    ]))?;
    assert_eq!(other_day["pagination"]["totalItems"], 0);

    let tags = stdout_json(blogfolio(temp.path()).args(["query", "tags"]))?;
    assert_eq!(tags[0]["tag"], "rust");
    assert_eq!(tags[0]["count"], 3);

    let archive = stdout_json(blogfolio(temp.path()).args(["query", "archive", "--locale", "pt"]))?;
    assert_eq!(archive[0]["monthName"], "Março");

    let found = stdout_json(blogfolio(temp.path()).args([
        "query", "search", "--query", "WEBASSEMBLY", "--locale", "en",
    ]))?;
    assert_eq!(found.as_array().map(Vec::len), Some(1));

    let adjacent = stdout_json(blogfolio(temp.path()).args([
        "query", "adjacent", "--slug", "2024-01-10-ola", "--locale", "pt",
    ]))?;
    assert_eq!(adjacent["prev"]["slug"], "2024-03-05-webassembly");
    assert!(adjacent["next"].is_null());
    Ok(())
}

#[test]
fn lookup_miss_prints_null() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    sample_site(temp.path())?;
    blogfolio(temp.path()).arg("index").assert().success();

    blogfolio(temp.path())
        .args(["query", "get", "--slug", "2024-01-10-ola", "--locale", "en"])
        .assert()
        .success()
        .stdout("null\n");
    blogfolio(temp.path())
        .args(["post", "show", "--slug", "missing", "--locale", "pt"])
        .assert()
        .success()
        .stdout("null\n");
    Ok(())
}

#[test]
fn post_show_renders_html() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    sample_site(temp.path())?;
    blogfolio(temp.path()).arg("index").assert().success();

    let post = stdout_json(blogfolio(temp.path()).args([
        "post", "show", "--slug", "2024-01-10-ola", "--locale", "pt",
    ]))?;
    assert_eq!(post["title"], "Olá Rust");
    let html = post["contentHtml"].as_str().unwrap_or_default();
    assert!(html.contains("<strong>negrito</strong>"));
    Ok(())
}

#[test]
fn resolve_uses_the_index() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    sample_site(temp.path())?;
    blogfolio(temp.path()).arg("index").assert().success();

    let res = stdout_json(blogfolio(temp.path()).args([
        "resolve", "--slug", "2024-03-05-webassembly", "--from", "pt", "--to", "en",
    ]))?;
    assert_eq!(res["strategy"], "exact-slug");

    let res = stdout_json(blogfolio(temp.path()).args([
        "resolve", "--slug", "2024-01-10-ola", "--from", "pt", "--to", "en",
    ]))?;
    assert_eq!(res["strategy"], "fallback");
    assert_eq!(res["slug"], "2024-01-10-ola");
    Ok(())
}

#[test]
fn rss_writes_feeds() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    sample_site(temp.path())?;

    blogfolio(temp.path()).arg("rss").assert().success();

    let public = temp.path().join("public");
    let pt = fs::read_to_string(public.join("rss-pt.xml"))?;
    assert!(pt.contains("https://example.github.io/portfolio/pt/blog/2024-01-10-ola"));
    assert!(pt.contains("<language>pt-BR</language>"));
    assert!(public.join("rss-en.xml").exists());
    let combined = fs::read_to_string(public.join("rss.xml"))?;
    assert_eq!(combined.matches("<item>").count(), 3);
    Ok(())
}

#[test]
fn malformed_post_fails_without_writing_index() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    sample_site(temp.path())?;
    write_post(
        &temp.path().join("contents").join("en"),
        "2024-04-01-broken.md",
        "date: 2024-04-01\n",
        "No title.",
    )?;

    blogfolio(temp.path())
        .arg("index")
        .assert()
        .failure()
        .stderr(predicate::str::contains("2024-04-01-broken.md"));
    assert!(!temp.path().join("contents").join("content-index.json").exists());
    Ok(())
}

#[test]
fn rust_log_debug_emits_debug_line_to_stderr() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    sample_site(temp.path())?;
    blogfolio(temp.path())
        .env("RUST_LOG", "debug")
        .args(["resolve", "--slug", "x", "--from", "pt", "--to", "en", "--no-index"])
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed cli"));
    Ok(())
}
