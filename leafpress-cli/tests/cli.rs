use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_site(root: &Path, extra_yaml: &str, posts: &[(&str, &str)]) -> std::io::Result<()> {
    fs::create_dir_all(root.join("posts"))?;
    fs::write(
        root.join("leafpress.yml"),
        format!(
            "site:\n  title: \"Test Blog\"\n  author: \"Tester\"\nbase_url: \"/\"\n{}",
            extra_yaml
        ),
    )?;
    for (name, content) in posts {
        fs::write(root.join("posts").join(name), content)?;
    }
    Ok(())
}

fn sample_posts() -> Vec<(&'static str, &'static str)> {
    vec![
        ("a.md", "---\ntitle: First\ndate: 2024-01-01\ntags: [foo, bar]\n---\n# A\n"),
        ("b.md", "---\ntitle: Second\ndate: 2024-06-01\ntags: [bar]\n---\n# B\n"),
        ("c.md", "---\ntitle: Hidden\ndate: 2024-07-01\ndraft: true\n---\n# C\n"),
    ]
}

#[allow(deprecated)]
fn leafpress() -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("leafpress")?;
    cmd.env_remove("LEAFPRESS_CONFIG")
        .env_remove("LEAFPRESS_COMMENTS_APP_ID")
        .env_remove("LEAFPRESS_COMMENTS_APP_KEY");
    Ok(cmd)
}

#[test]
fn init_then_build_writes_every_page() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let site = dir.path().join("site");

    leafpress()?
        .arg("init")
        .arg(&site)
        .assert()
        .success()
        .stdout(predicate::str::contains("leafpress initialized"));

    leafpress()?.current_dir(&site).arg("build").assert().success();

    let dist = site.join("dist");
    for page in [
        "index.html",
        "blog/index.html",
        "blog/hello-world.html",
        "blog/tags/leafpress.html",
        "covers.html",
        "links.html",
        "photos.html",
        "404.html",
        "posts.json",
        "css/syntax.css",
    ] {
        assert!(dist.join(page).exists(), "missing {}", page);
    }

    let post = fs::read_to_string(dist.join("blog/hello-world.html"))?;
    assert!(post.contains("<h1 id=\"hello\">"));
    assert!(post.contains("math math-display"));
    assert!(post.contains("class=\"hl-"));

    let links = fs::read_to_string(dist.join("links.html"))?;
    assert!(links.contains("https://github.com/Ma3h1r0/leafpress"));

    let posts: Value = serde_json::from_str(&fs::read_to_string(dist.join("posts.json"))?)?;
    assert_eq!(posts[0]["slug"], "hello-world");
    assert_eq!(posts[0]["date"], "2025-01-01T00:00:00.000Z");
    Ok(())
}

#[test]
fn build_skips_drafts_and_copies_static_files() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_site(dir.path(), "paths:\n  static: public\n", &sample_posts())?;
    fs::create_dir_all(dir.path().join("public/img"))?;
    fs::write(dir.path().join("public/img/logo.txt"), "logo")?;

    leafpress()?.current_dir(dir.path()).arg("build").assert().success();

    let dist = dir.path().join("dist");
    assert!(dist.join("blog/a.html").exists());
    assert!(dist.join("blog/b.html").exists());
    assert!(!dist.join("blog/c.html").exists());
    assert_eq!(fs::read_to_string(dist.join("img/logo.txt"))?, "logo");

    let index = fs::read_to_string(dist.join("blog/index.html"))?;
    assert!(index.find("Second").unwrap() < index.find("First").unwrap());
    assert!(!index.contains("Hidden"));
    Ok(())
}

#[test]
fn rebuild_removes_pages_of_unpublished_posts() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_site(dir.path(), "paths:\n  static: public\n", &sample_posts())?;
    fs::create_dir_all(dir.path().join("public"))?;
    fs::write(dir.path().join("public/about.html"), "<p>about</p>")?;

    leafpress()?.current_dir(dir.path()).arg("build").assert().success();
    let dist = dir.path().join("dist");
    assert!(dist.join("blog/b.html").exists());

    fs::write(
        dir.path().join("posts/b.md"),
        "---\ntitle: Second\ndate: 2024-06-01\ntags: [bar]\ndraft: true\n---\n# B\n",
    )?;
    leafpress()?.current_dir(dir.path()).arg("build").assert().success();

    assert!(!dist.join("blog/b.html").exists());
    assert!(dist.join("blog/a.html").exists());
    assert!(dist.join(".render_cache.json").exists());
    assert!(dist.join("css/syntax.css").exists());
    assert_eq!(fs::read_to_string(dist.join("about.html"))?, "<p>about</p>");
    Ok(())
}

#[test]
fn build_fails_without_writing_on_unterminated_math() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let mut posts = sample_posts();
    posts.push(("broken.md", "---\ndate: 2024-01-01\n---\nOpen $$ never closed\n"));
    write_site(dir.path(), "", &posts)?;

    leafpress()?
        .current_dir(dir.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken"));

    assert!(!dir.path().join("dist").exists());
    Ok(())
}

#[test]
fn list_filters_by_tag() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_site(dir.path(), "", &sample_posts())?;

    let slugs = |tag: &str| -> Result<Vec<String>, Box<dyn std::error::Error>> {
        let output = leafpress()?
            .current_dir(dir.path())
            .args(["list", "--json", "--tag", tag])
            .output()?;
        assert!(output.status.success());
        let payload: Value = serde_json::from_slice(&output.stdout)?;
        assert_eq!(payload["kind"], "posts.list");
        Ok(payload["data"]["posts"]
            .as_array()
            .map(|posts| {
                posts
                    .iter()
                    .filter_map(|p| p["slug"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default())
    };

    assert_eq!(slugs("bar")?, vec!["b", "a"]);
    assert_eq!(slugs("foo")?, vec!["a"]);
    assert!(slugs("Foo")?.is_empty());

    leafpress()?
        .current_dir(dir.path())
        .args(["list", "--limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Second").and(predicate::str::contains("First").not()));
    Ok(())
}

#[test]
fn show_respects_draft_policy() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_site(dir.path(), "", &sample_posts())?;

    leafpress()?
        .current_dir(dir.path())
        .args(["show", "c"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No post with slug 'c'"));

    let unlisted = dir.path().join("unlisted.yml");
    fs::write(
        &unlisted,
        "site:\n  title: Test\nbuild:\n  draft_pages: unlisted\n",
    )?;
    let output = leafpress()?
        .current_dir(dir.path())
        .args(["--config", "unlisted.yml", "show", "/blog/c.html"])
        .output()?;
    assert!(output.status.success());
    let payload: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(payload["kind"], "post.full");
    assert_eq!(payload["data"]["draft"], true);
    assert_eq!(payload["data"]["toc"][0]["id"], "c");
    Ok(())
}

#[test]
fn show_frontmatter_normalizes_date() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_site(dir.path(), "", &sample_posts())?;

    leafpress()?
        .current_dir(dir.path())
        .args(["show", "a", "--format", "frontmatter"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("title: First")
                .and(predicate::str::contains("2024-01-01T00:00:00.000Z")),
        );
    Ok(())
}

#[test]
fn verify_reports_invalid_dates() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let mut posts = sample_posts();
    posts.push(("odd.md", "---\ndate: someday\n---\nText\n"));
    write_site(dir.path(), "", &posts)?;

    let output = leafpress()?
        .current_dir(dir.path())
        .args(["verify", "--json"])
        .output()?;
    assert!(output.status.success());
    let summary: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(summary["posts"], 4);
    assert_eq!(summary["errors"], 0);
    let codes: Vec<&str> = summary["diagnostics"]
        .as_array()
        .map(|d| d.iter().filter_map(|d| d["code"].as_str()).collect())
        .unwrap_or_default();
    assert!(codes.contains(&"date.invalid"));
    assert!(codes.contains(&"draft.unlisted"));
    Ok(())
}

#[test]
fn config_prints_dotted_values() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_site(dir.path(), "", &[])?;

    leafpress()?
        .current_dir(dir.path())
        .args(["config", "site.title"])
        .assert()
        .success()
        .stdout("Test Blog\n");

    leafpress()?
        .current_dir(dir.path())
        .args(["config", "site.nope"])
        .assert()
        .failure();
    Ok(())
}
