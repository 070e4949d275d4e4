//! Read-only JSON catalogs: covers, links and photos.

use crate::frontmatter::parse_date_str;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const COVERS_FILE: &str = "covers.json";
pub const LINKS_FILE: &str = "links.json";
pub const PHOTOS_FILE: &str = "photos.json";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed catalog {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A recorded song cover
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cover {
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub audio_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Cover {
    /// Parsed `date`, if present and readable. Accepts the same forms as a
    /// post's front matter date.
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(parse_date_str)
    }

    /// Calendar date for display, empty when missing
    pub fn display_date(&self) -> String {
        match (self.parsed_date(), &self.date) {
            (Some(dt), _) => dt.format("%Y-%m-%d").to_string(),
            (None, Some(raw)) => raw.clone(),
            (None, None) => String::new(),
        }
    }
}

/// One outbound link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// Fixed link groups, in page order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkCategory {
    FriendLinks,
    OtherLinks,
    SpecialThanks,
}

impl LinkCategory {
    pub const ALL: [LinkCategory; 3] = [
        LinkCategory::FriendLinks,
        LinkCategory::OtherLinks,
        LinkCategory::SpecialThanks,
    ];

    pub fn heading(&self) -> &'static str {
        match self {
            LinkCategory::FriendLinks => "Friends",
            LinkCategory::OtherLinks => "Other Links",
            LinkCategory::SpecialThanks => "Special Thanks",
        }
    }

    pub fn anchor(&self) -> &'static str {
        match self {
            LinkCategory::FriendLinks => "friend-links",
            LinkCategory::OtherLinks => "other-links",
            LinkCategory::SpecialThanks => "special-thanks",
        }
    }
}

/// `links.json`: one list per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCatalog {
    #[serde(default)]
    pub friend_links: Vec<LinkEntry>,
    #[serde(default)]
    pub other_links: Vec<LinkEntry>,
    #[serde(default)]
    pub special_thanks: Vec<LinkEntry>,
}

impl LinkCatalog {
    pub fn entries(&self, category: LinkCategory) -> &[LinkEntry] {
        match category {
            LinkCategory::FriendLinks => &self.friend_links,
            LinkCategory::OtherLinks => &self.other_links,
            LinkCategory::SpecialThanks => &self.special_thanks,
        }
    }

    pub fn is_empty(&self) -> bool {
        LinkCategory::ALL
            .iter()
            .all(|category| self.entries(*category).is_empty())
    }
}

/// A gallery photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub description: String,
}

/// Every catalog the site reads
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub covers: Vec<Cover>,
    pub links: LinkCatalog,
    pub photos: Vec<Photo>,
}

impl Catalogs {
    /// Load all catalogs from `data_dir`. Missing files yield empty catalogs.
    pub fn load(data_dir: &Path) -> Result<Self, CatalogError> {
        let catalogs = Self {
            covers: load_json(&data_dir.join(COVERS_FILE))?.unwrap_or_default(),
            links: load_json(&data_dir.join(LINKS_FILE))?.unwrap_or_default(),
            photos: load_json(&data_dir.join(PHOTOS_FILE))?.unwrap_or_default(),
        };
        tracing::debug!(
            "Loaded catalogs: {} covers, {} photos",
            catalogs.covers.len(),
            catalogs.photos.len()
        );
        Ok(catalogs)
    }

    /// Covers, most recent first; missing or unreadable dates last
    pub fn covers_by_date(&self) -> Vec<&Cover> {
        let mut covers: Vec<&Cover> = self.covers.iter().collect();
        covers.sort_by(|a, b| match (a.parsed_date(), b.parsed_date()) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        covers
    }
}

fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, CatalogError> {
    if !path.exists() {
        tracing::debug!("Catalog {:?} not found, treating as empty", path);
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&content).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(value))
}
