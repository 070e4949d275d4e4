//! Content discovery: enumerate `.md` / `.mdx` files in the content root.

use crate::models::ContentFormat;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Content root {0:?} does not exist or is not a directory")]
    MissingRoot(PathBuf),

    #[error("Failed to read content root: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A candidate content file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub slug: String,
    pub path: PathBuf,
    pub format: ContentFormat,
}

/// Result of scanning the content root
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Files in file-name order, one per slug
    pub files: Vec<DiscoveredFile>,

    /// Files skipped because an earlier file already claimed their slug
    pub shadowed: Vec<DiscoveredFile>,
}

/// Enumerate content files directly inside `root`.
///
/// Entries are visited in file-name order; when two files share a stem
/// (`a.md` and `a.mdx`) the first one keeps the slug.
pub fn discover(root: &Path, ignore_patterns: &[String]) -> Result<Discovery, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::MissingRoot(root.to_path_buf()));
    }

    let ignores = compile_ignore_patterns(ignore_patterns);
    let mut discovery = Discovery::default();
    let mut claimed: HashSet<String> = HashSet::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(format) = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ContentFormat::from_extension)
        else {
            continue;
        };

        let rel = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();
        if should_ignore(&rel, &ignores) {
            tracing::debug!("Ignoring {} due to ignore_patterns", rel);
            continue;
        }

        let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
            tracing::warn!("Skipping {:?}: file name is not valid UTF-8", path);
            continue;
        };

        let file = DiscoveredFile {
            slug: slug.to_string(),
            path: path.to_path_buf(),
            format,
        };

        if claimed.insert(file.slug.clone()) {
            discovery.files.push(file);
        } else {
            tracing::warn!(
                "Duplicate slug '{}': {:?} is shadowed by an earlier file",
                file.slug,
                file.path
            );
            discovery.shadowed.push(file);
        }
    }

    tracing::debug!(
        "Discovered {} content files in {:?}",
        discovery.files.len(),
        root
    );

    Ok(discovery)
}

fn compile_ignore_patterns(patterns: &[String]) -> Vec<Regex> {
    let mut compiled = Vec::new();
    for pat in patterns {
        match Regex::new(pat) {
            Ok(re) => compiled.push(re),
            Err(err) => tracing::warn!("Invalid ignore pattern '{}': {}", pat, err),
        }
    }
    compiled
}

fn should_ignore(path: &str, ignores: &[Regex]) -> bool {
    ignores.iter().any(|re| re.is_match(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_filters_by_extension_and_strips_it() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.mdx"), "b").unwrap();
        fs::write(dir.path().join("a.md"), "a").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("README"), "x").unwrap();
        fs::create_dir(dir.path().join("nested.md")).unwrap();

        let found = discover(dir.path(), &[]).unwrap();
        let slugs: Vec<_> = found.files.iter().map(|f| f.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "b"]);
        assert_eq!(found.files[0].format, ContentFormat::Markdown);
        assert_eq!(found.files[1].format, ContentFormat::Mdx);
        assert!(found.shadowed.is_empty());
    }

    #[test]
    fn test_subdirectories_are_not_scanned() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("drafts")).unwrap();
        fs::write(dir.path().join("drafts/hidden.md"), "x").unwrap();
        fs::write(dir.path().join("top.md"), "x").unwrap();

        let found = discover(dir.path(), &[]).unwrap();
        assert_eq!(found.files.len(), 1);
        assert_eq!(found.files[0].slug, "top");
    }

    #[test]
    fn test_same_stem_first_wins() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("post.mdx"), "mdx").unwrap();
        fs::write(dir.path().join("post.md"), "md").unwrap();

        let found = discover(dir.path(), &[]).unwrap();
        assert_eq!(found.files.len(), 1);
        assert_eq!(found.files[0].format, ContentFormat::Markdown);
        assert_eq!(found.shadowed.len(), 1);
        assert_eq!(found.shadowed[0].format, ContentFormat::Mdx);
    }

    #[test]
    fn test_ignore_patterns() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("keep.md"), "x").unwrap();
        fs::write(dir.path().join("_scratch.md"), "x").unwrap();

        let found = discover(dir.path(), &["^_".to_string(), "[".to_string()]).unwrap();
        let slugs: Vec<_> = found.files.iter().map(|f| f.slug.as_str()).collect();
        assert_eq!(slugs, vec!["keep"]);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = tempdir().unwrap();
        let err = discover(&dir.path().join("posts"), &[]).unwrap_err();
        assert!(matches!(err, DiscoveryError::MissingRoot(_)));
    }
}
