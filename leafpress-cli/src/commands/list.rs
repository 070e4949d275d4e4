//! List published posts.

use crate::schema::{self, PostEntry, PostListData};
use anyhow::{Context, Result};
use leafpress_core::assembly::{self, ListQuery};
use leafpress_core::{Config, SiteBuilder};
use std::path::Path;

pub struct ListOptions {
    pub tag: Option<String>,
    pub limit: Option<usize>,
    pub json: bool,
}

pub fn list_posts(config_path: &Path, opts: ListOptions) -> Result<()> {
    let config = Config::from_file(config_path).context("Failed to load configuration")?;
    let base_url = config.normalized_base_url();

    let mut query = ListQuery::new(config.build.excerpt_length);
    if let Some(tag) = &opts.tag {
        query = query.with_tag(tag.clone());
    }
    if let Some(limit) = opts.limit {
        query = query.with_limit(limit);
    }

    let builder = SiteBuilder::new(config).without_cache();
    let site = builder.load().context("Failed to load content")?;
    let posts = assembly::list_posts(&site.items, &query);

    if opts.json {
        let data = PostListData {
            tag: opts.tag,
            total: posts.len(),
            posts: posts
                .into_iter()
                .map(|post| PostEntry::from_summary(post, &base_url))
                .collect(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&schema::envelope("posts.list", data))?
        );
        return Ok(());
    }

    if posts.is_empty() {
        println!("No posts found");
        return Ok(());
    }

    for post in &posts {
        let tags = if post.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", post.tags.join(", "))
        };
        println!("{}  {} ({}){}", post.date.display(), post.title, post.slug, tags);
    }
    Ok(())
}
