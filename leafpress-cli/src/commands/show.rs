//! Fetch a single post in structured form.

use crate::{schema, ShowFormat};
use anyhow::{Context, Result};
use leafpress_core::assembly;
use leafpress_core::{Config, HtmlWriter, SiteBuilder};
use std::path::Path;

/// Render one post in the requested format.
///
/// Drafts are found only when `build.draft_pages` makes them addressable.
pub fn show_post(config_path: &Path, slug: &str, format: ShowFormat) -> Result<()> {
    let config = Config::from_file(config_path).context("Failed to load configuration")?;
    let base_url = config.normalized_base_url();
    let policy = config.build.draft_pages;

    let builder = SiteBuilder::new(config).without_cache();
    let site = builder.load().context("Failed to load content")?;

    let slug = normalize_slugish(slug);
    let item = assembly::find_post(&site.items, slug, policy)?;

    match format {
        ShowFormat::Json => {
            let document = builder.render_item(item)?;
            let html = document.to_html(&HtmlWriter::site_default());
            let payload = schema::envelope(
                "post.full",
                schema::PostData::new(item, &base_url, html, &document.headings),
            );
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        ShowFormat::Html => {
            let document = builder.render_item(item)?;
            println!("{}", document.to_html(&HtmlWriter::site_default()));
        }
        ShowFormat::Markdown => {
            let fm = item.frontmatter.to_yaml()?;
            println!("---\n{}---\n{}", fm, item.body);
        }
        ShowFormat::Frontmatter => {
            let fm = item.frontmatter.to_yaml()?;
            println!("---\n{}---", fm);
        }
        ShowFormat::Raw => {
            println!("{}", item.body);
        }
    }

    Ok(())
}

/// Accept `hello`, `/blog/hello`, `blog/hello.html` for the same post
fn normalize_slugish(s: &str) -> &str {
    let trimmed = s.trim().trim_matches('/');
    let without_html = trimmed.strip_suffix(".html").unwrap_or(trimmed);
    without_html.strip_prefix("blog/").unwrap_or(without_html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_slugish() {
        assert_eq!(normalize_slugish("hello"), "hello");
        assert_eq!(normalize_slugish("/blog/hello"), "hello");
        assert_eq!(normalize_slugish("blog/hello.html"), "hello");
        assert_eq!(normalize_slugish(" Hello-World "), "Hello-World");
    }
}
