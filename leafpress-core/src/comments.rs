//! Embed contract for the third-party comment widget.
//!
//! The pipeline only describes where a thread lives and how the widget is
//! configured; comment content is never read.

use crate::config::CommentsConfig;
use serde::Serialize;

pub const APP_ID_ENV: &str = "LEAFPRESS_COMMENTS_APP_ID";
pub const APP_KEY_ENV: &str = "LEAFPRESS_COMMENTS_APP_KEY";

/// Id of the element the widget mounts into
pub const MOUNT_ID: &str = "comments";

/// Options handed to the widget script as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentEmbed {
    pub mount_id: String,
    pub app_id: String,
    pub app_key: String,
    /// Thread key: `/` for the home page, `/blog/<slug>` for posts
    pub path: String,
    pub placeholder: String,
    pub page_size: u32,
    pub lang: String,
    pub avatar: String,
    pub meta: Vec<String>,
}

impl CommentEmbed {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Comment settings after environment overrides
#[derive(Debug, Clone)]
pub struct CommentSettings {
    config: CommentsConfig,
}

impl CommentSettings {
    /// Apply `LEAFPRESS_COMMENTS_APP_ID` / `LEAFPRESS_COMMENTS_APP_KEY`
    pub fn from_env(config: &CommentsConfig) -> Self {
        Self::with_overrides(
            config,
            std::env::var(APP_ID_ENV).ok(),
            std::env::var(APP_KEY_ENV).ok(),
        )
    }

    pub fn with_overrides(
        config: &CommentsConfig,
        app_id: Option<String>,
        app_key: Option<String>,
    ) -> Self {
        let mut config = config.clone();
        if let Some(id) = app_id.filter(|v| !v.is_empty()) {
            config.app_id = id;
        }
        if let Some(key) = app_key.filter(|v| !v.is_empty()) {
            config.app_key = key;
        }
        if config.app_id.is_empty() || config.app_key.is_empty() {
            tracing::warn!("Comment widget is configured without app_id/app_key");
        }
        Self { config }
    }

    pub fn embed(&self, path: &str) -> CommentEmbed {
        CommentEmbed {
            mount_id: MOUNT_ID.to_string(),
            app_id: self.config.app_id.clone(),
            app_key: self.config.app_key.clone(),
            path: path.to_string(),
            placeholder: self.config.placeholder.clone(),
            page_size: self.config.page_size,
            lang: self.config.lang.clone(),
            avatar: "mp".to_string(),
            meta: vec!["nick".into(), "mail".into(), "link".into()],
        }
    }

    pub fn home(&self) -> CommentEmbed {
        self.embed("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CommentsConfig {
        serde_yaml::from_str("app_id: file-id\napp_key: file-key\n").unwrap()
    }

    #[test]
    fn test_embed_paths() {
        let settings = CommentSettings::with_overrides(&config(), None, None);
        assert_eq!(settings.home().path, "/");
        let post = settings.embed("/blog/hello");
        assert_eq!(post.path, "/blog/hello");
        assert_eq!(post.mount_id, "comments");
        assert_eq!(post.page_size, 10);
        assert_eq!(post.app_id, "file-id");
    }

    #[test]
    fn test_overrides_win_unless_empty() {
        let settings =
            CommentSettings::with_overrides(&config(), Some("env-id".into()), Some(String::new()));
        let embed = settings.home();
        assert_eq!(embed.app_id, "env-id");
        assert_eq!(embed.app_key, "file-key");
    }

    #[test]
    fn test_json_uses_widget_option_names() {
        let settings = CommentSettings::with_overrides(&config(), None, None);
        let json = settings.home().to_json().unwrap();
        assert!(json.contains("\"appId\":\"file-id\""));
        assert!(json.contains("\"pageSize\":10"));
        assert!(json.contains("\"mountId\":\"comments\""));
    }
}
