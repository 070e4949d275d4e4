//! Configuration parsing and management.

use crate::assembly::DraftPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "leafpress.yml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Main configuration struct matching the leafpress.yml schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub site: SiteConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub comments: Option<CommentsConfig>,

    #[serde(default)]
    pub cache: CacheConfig,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_base_url() -> String {
    String::from("/")
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub title: String,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub url: String,

    /// Short text shown on the home page
    #[serde(default)]
    pub intro: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding `.md` / `.mdx` posts
    #[serde(default = "default_content_dir")]
    pub content: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output: PathBuf,

    /// Directory holding the JSON catalogs
    #[serde(default = "default_data_dir")]
    pub data: PathBuf,

    /// Copied verbatim into the output
    #[serde(default, rename = "static")]
    pub static_dir: Option<PathBuf>,
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("posts")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            content: default_content_dir(),
            output: default_output_dir(),
            data: default_data_dir(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    pub draft_pages: DraftPolicy,

    #[serde(default = "default_preview_count")]
    pub home_preview_count: usize,

    #[serde(default = "default_preview_count")]
    pub cover_preview_count: usize,

    #[serde(default = "default_excerpt_length")]
    pub excerpt_length: usize,
}

fn default_preview_count() -> usize {
    3
}

fn default_excerpt_length() -> usize {
    150
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            draft_pages: DraftPolicy::default(),
            home_preview_count: default_preview_count(),
            cover_preview_count: default_preview_count(),
            excerpt_length: default_excerpt_length(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub allow_raw_html: bool,

    #[serde(default = "default_highlight_theme")]
    pub highlight_theme: String,
}

fn default_highlight_theme() -> String {
    crate::markdown::highlight::DEFAULT_THEME.to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            allow_raw_html: false,
            highlight_theme: default_highlight_theme(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentsConfig {
    #[serde(default)]
    pub app_id: String,

    #[serde(default)]
    pub app_key: String,

    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_comment_lang")]
    pub lang: String,
}

fn default_placeholder() -> String {
    String::from("在这里写下你的想法...")
}

fn default_comment_lang() -> String {
    String::from("zh-CN")
}

fn default_page_size() -> u32 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

fn default_cache_capacity() -> usize {
    256
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: default_cache_capacity(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&contents)?;

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Parse configuration text; paths stay relative to the working directory
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.enabled && self.cache.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.capacity".into(),
                message: "must be greater than zero when the cache is enabled".into(),
            });
        }
        Ok(())
    }

    /// Content directory, resolved relative to config file
    pub fn content_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.content)
    }

    /// Output directory, resolved relative to config file
    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.output)
    }

    /// Catalog directory, resolved relative to config file
    pub fn data_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.data)
    }

    /// Static asset directory, if configured
    pub fn static_dir(&self) -> Option<PathBuf> {
        self.paths.static_dir.as_ref().map(|p| self.resolve_path(p))
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(parent) = self.config_path.as_deref().and_then(Path::parent) {
            parent.join(path)
        } else {
            path.to_path_buf()
        }
    }

    /// Get a nested config value using dotted path (e.g., "site.title")
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["site", "title"] => Some(self.site.title.clone()),
            ["site", "author"] => Some(self.site.author.clone()),
            ["site", "description"] => Some(self.site.description.clone()),
            ["site", "url"] => Some(self.site.url.clone()),
            ["site", "intro"] => self.site.intro.clone(),
            ["paths", "content"] => Some(self.content_dir().display().to_string()),
            ["paths", "output"] => Some(self.output_dir().display().to_string()),
            ["paths", "data"] => Some(self.data_dir().display().to_string()),
            ["base_url"] => Some(self.normalized_base_url()),
            ["build", "excerpt_length"] => Some(self.build.excerpt_length.to_string()),
            ["build", "home_preview_count"] => Some(self.build.home_preview_count.to_string()),
            ["build", "cover_preview_count"] => {
                Some(self.build.cover_preview_count.to_string())
            }
            ["render", "highlight_theme"] => Some(self.render.highlight_theme.clone()),
            ["cache", "capacity"] => Some(self.cache.capacity.to_string()),
            _ => None,
        }
    }

    /// Normalized base URL with leading and trailing slash ("/foo/" or "/")
    pub fn normalized_base_url(&self) -> String {
        normalize_base_url(&self.base_url)
    }
}

/// Ensure base URLs have a leading and trailing slash
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "/".to_string();
    }

    let mut s = String::with_capacity(trimmed.len() + 2);
    s.push('/');
    for segment in trimmed.split('/').filter(|seg| !seg.is_empty()) {
        s.push_str(segment);
        s.push('/');
    }
    s
}
