//! Init command implementation.

use anyhow::{Context, Result};
use leafpress_core::catalog::{COVERS_FILE, LINKS_FILE, PHOTOS_FILE};
use leafpress_core::config::DEFAULT_CONFIG_FILE;
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = include_str!("../../../leafpress.yml.example");

const SAMPLE_POST: &str = r#"---
title: Hello, leafpress
date: 2025-01-01
tags: [leafpress, intro]
---

# Hello

This is your first post. Edit `leafpress.yml` to update site metadata, then run:

```bash
leafpress build
```

Inline math like $e^{i\pi} + 1 = 0$ and display math work too:

$$\int_0^1 x^2 \, dx = \frac{1}{3}$$

Set `draft: true` in the front matter to keep a post out of every list.
"#;

const SAMPLE_LINKS: &str = r#"{
  "friendLinks": [],
  "otherLinks": [
    { "name": "leafpress", "url": "https://github.com/Ma3h1r0/leafpress", "description": "Site generator" }
  ],
  "specialThanks": []
}
"#;

/// Initialize a new leafpress site
pub fn init_site(path: Option<&Path>) -> Result<()> {
    let root = path.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(root).with_context(|| format!("Failed to create {:?}", root))?;

    write_if_missing(&root.join(DEFAULT_CONFIG_FILE), DEFAULT_CONFIG)?;
    scaffold_content(root)?;

    println!("✓ leafpress initialized in {:?}", root);
    println!("  - Edit {} to customize site metadata", DEFAULT_CONFIG_FILE);
    println!("  - Write posts in posts/ and catalogs in data/");
    Ok(())
}

fn scaffold_content(root: &Path) -> Result<()> {
    let posts = root.join("posts");
    let data = root.join("data");
    let public = root.join("public");

    for dir in [&posts, &data, &public] {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    }

    write_if_missing(&posts.join("hello-world.md"), SAMPLE_POST)?;
    write_if_missing(&data.join(COVERS_FILE), "[]\n")?;
    write_if_missing(&data.join(LINKS_FILE), SAMPLE_LINKS)?;
    write_if_missing(&data.join(PHOTOS_FILE), "[]\n")?;
    Ok(())
}

fn write_if_missing(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        println!("{:?} already exists, leaving it alone", path);
        return Ok(());
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    println!("Created {:?}", path);
    Ok(())
}
