//! Build command implementation.

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use leafpress_core::assembly::{self, ListQuery};
use leafpress_core::markdown::highlight;
use leafpress_core::{Config, Site, SiteBuilder};
use leafpress_render::{PageRenderer, SiteContext};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Build the static site into the configured output directory
pub fn build_site(config_path: &Path) -> Result<()> {
    tracing::info!("Loading config from {:?}", config_path);
    let config = Config::from_file(config_path).context("Failed to load configuration")?;
    build_site_with_config(config)
}

/// Build from an already loaded config.
///
/// Every post is parsed and rendered before the first file is written, so a
/// failing post leaves the previous output untouched.
pub fn build_site_with_config(config: Config) -> Result<()> {
    tracing::info!("Building site: {}", config.site.title);

    let builder = SiteBuilder::new(config);
    let site = builder.load().context("Failed to load content")?;
    let pages = builder.assemble(&site).context("Failed to build site")?;

    let config = builder.config();
    let context = SiteContext::from_config(config, Utc::now().year());
    let rendered = PageRenderer::new(context, &pages)
        .render_all()
        .context("Failed to render pages")?;

    let output_dir = config.output_dir();
    fs::create_dir_all(&output_dir).context("Failed to create output directory")?;

    for page in &rendered {
        write_file(&output_dir.join(&page.path), &page.html)?;
        tracing::debug!("Wrote {}", page.path);
    }

    let written: HashSet<PathBuf> = rendered
        .iter()
        .map(|page| output_dir.join(&page.path))
        .collect();
    let removed = remove_stale_pages(&output_dir, &written)?;
    if removed > 0 {
        tracing::info!("Removed {} stale pages", removed);
    }

    generate_posts_json(config, &site, &output_dir)?;
    generate_stylesheet(config, &output_dir)?;
    copy_static(config, &output_dir)?;

    if let Err(err) = builder.save_cache() {
        tracing::warn!("Failed to write render cache: {}", err);
    }

    tracing::info!("✓ Built {} pages ({} posts)", rendered.len(), pages.posts.len());
    tracing::info!("✓ Output written to {:?}", output_dir);
    Ok(())
}

/// Delete `.html` files left in the output by earlier builds. Static files are
/// copied afterwards, so HTML shipped from the static dir is restored.
fn remove_stale_pages(output_dir: &Path, written: &HashSet<PathBuf>) -> Result<usize> {
    let mut removed = 0;
    for entry in WalkDir::new(output_dir) {
        let entry = entry.with_context(|| format!("Failed to read {:?}", output_dir))?;
        let path = entry.path();
        let is_html = path.extension().is_some_and(|ext| ext == "html");
        if !entry.file_type().is_file() || !is_html || written.contains(path) {
            continue;
        }
        fs::remove_file(path).with_context(|| format!("Failed to remove {:?}", path))?;
        tracing::debug!("Removed stale {:?}", path);
        removed += 1;
    }
    Ok(removed)
}

/// List view model for client-side hydration
fn generate_posts_json(config: &Config, site: &Site, output_dir: &Path) -> Result<()> {
    let posts = assembly::list_posts(&site.items, &ListQuery::new(config.build.excerpt_length));
    let json = serde_json::to_string_pretty(&posts).context("Failed to serialize posts.json")?;
    write_file(&output_dir.join("posts.json"), &json)
}

fn generate_stylesheet(config: &Config, output_dir: &Path) -> Result<()> {
    let css = highlight::stylesheet(&config.render.highlight_theme)
        .context("Failed to generate highlight stylesheet")?;
    write_file(&output_dir.join("css").join("syntax.css"), &css)
}

fn copy_static(config: &Config, output_dir: &Path) -> Result<()> {
    let Some(static_dir) = config.static_dir() else {
        return Ok(());
    };
    if !static_dir.exists() {
        tracing::warn!("Configured static path {:?} does not exist", static_dir);
        return Ok(());
    }

    let copied = copy_dir(&static_dir, output_dir)?;
    tracing::info!("Copied {} static files from {:?}", copied, static_dir);
    Ok(())
}

fn copy_dir(src: &Path, dest: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src) {
        let entry = entry.with_context(|| format!("Failed to read {:?}", src))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dest.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)
            .with_context(|| format!("Failed to copy {:?} to {:?}", entry.path(), target))?;
        copied += 1;
    }
    Ok(copied)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))
}
