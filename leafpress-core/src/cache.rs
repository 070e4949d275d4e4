//! Content-addressed render cache.
//!
//! Rendered documents are keyed by slug plus the blake3 hash of the source
//! file, so an edited post never hits a stale entry.

use crate::markdown::RenderedDocument;
use crate::models::ContentItem;
use chrono::Utc;
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

const CACHE_VERSION: &str = "1";
pub const CACHE_FILENAME: &str = ".render_cache.json";

/// Identifies the renderer settings a cached document was produced under.
///
/// A persisted cache is only reused when this matches the current build.
pub fn render_fingerprint(allow_raw_html: bool) -> String {
    format!(
        "v{}/{}/raw-html={}",
        CACHE_VERSION,
        env!("CARGO_PKG_VERSION"),
        allow_raw_html
    )
}

/// Hex blake3 digest of a source file's bytes
pub fn content_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub slug: String,
    pub content_hash: String,
}

impl CacheKey {
    pub fn for_item(item: &ContentItem) -> Self {
        Self {
            slug: item.slug.clone(),
            content_hash: item.content_hash.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct CachedEntry {
    key: CacheKey,
    document: RenderedDocument,
}

#[derive(Serialize, Deserialize)]
struct CacheFile {
    version: String,
    #[serde(default)]
    fingerprint: String,
    generated_at: String,
    entries: Vec<CachedEntry>,
}

/// Hit/miss counters for a build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

/// In-memory LRU of rendered documents, shareable across threads
pub struct RenderCache {
    entries: Mutex<LruCache<CacheKey, RenderedDocument>>,
    stats: Mutex<CacheStats>,
    fingerprint: String,
}

impl RenderCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            stats: Mutex::new(CacheStats::default()),
            fingerprint: String::new(),
        }
    }

    /// Tag the cache with the settings its documents are rendered under
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = fingerprint.into();
        self
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn get(&self, key: &CacheKey) -> Option<RenderedDocument> {
        let found = self.entries.lock().get(key).cloned();
        let mut stats = self.stats.lock();
        if found.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        found
    }

    pub fn insert(&self, key: CacheKey, document: RenderedDocument) {
        self.entries.lock().put(key, document);
    }

    /// Cached document for `key`, rendering and storing it on a miss
    pub fn get_or_render<E>(
        &self,
        key: CacheKey,
        render: impl FnOnce() -> Result<RenderedDocument, E>,
    ) -> Result<RenderedDocument, E> {
        if let Some(document) = self.get(&key) {
            tracing::debug!("Render cache hit for '{}'", key.slug);
            return Ok(document);
        }
        let document = render()?;
        self.insert(key, document.clone());
        Ok(document)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        *self.stats.lock()
    }

    pub fn cache_path(output_dir: &Path) -> PathBuf {
        output_dir.join(CACHE_FILENAME)
    }

    /// Load a persisted cache. A missing, incompatible or corrupt file, or
    /// one written under a different `fingerprint`, yields an empty cache.
    pub fn load(path: &Path, capacity: NonZeroUsize, fingerprint: &str) -> Self {
        let cache = Self::new(capacity).with_fingerprint(fingerprint);
        if !path.exists() {
            return cache;
        }

        let data = match fs::read(path) {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!("Failed to read render cache {:?}: {}", path, err);
                return cache;
            }
        };

        match serde_json::from_slice::<CacheFile>(&data) {
            Ok(file) if file.version == CACHE_VERSION && file.fingerprint == fingerprint => {
                // Stored most recent first; insert oldest first to keep recency
                for entry in file.entries.into_iter().rev() {
                    cache.insert(entry.key, entry.document);
                }
                tracing::debug!("Loaded {} cached renders from {:?}", cache.len(), path);
            }
            Ok(file) => {
                tracing::info!(
                    "Discarding render cache {:?} (written as {} / {}, now {})",
                    path,
                    file.version,
                    file.fingerprint,
                    fingerprint
                );
            }
            Err(err) => {
                tracing::warn!("Failed to parse render cache {:?}: {}", path, err);
            }
        }
        cache
    }

    /// Persist every entry, most recently used first
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let entries = self
            .entries
            .lock()
            .iter()
            .map(|(key, document)| CachedEntry {
                key: key.clone(),
                document: document.clone(),
            })
            .collect();

        let file = CacheFile {
            version: CACHE_VERSION.to_string(),
            fingerprint: self.fingerprint.clone(),
            generated_at: Utc::now().to_rfc3339(),
            entries,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec(&file)?;
        fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::MarkdownProcessor;
    use std::convert::Infallible;
    use tempfile::tempdir;

    fn doc(md: &str) -> RenderedDocument {
        MarkdownProcessor::new().render(md).unwrap()
    }

    fn key(slug: &str, source: &str) -> CacheKey {
        CacheKey {
            slug: slug.into(),
            content_hash: content_hash(source.as_bytes()),
        }
    }

    fn capacity(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_changed_source_misses() {
        let cache = RenderCache::new(capacity(4));
        cache.insert(key("a", "# One"), doc("# One"));

        assert!(cache.get(&key("a", "# One")).is_some());
        assert!(cache.get(&key("a", "# Two")).is_none());
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_get_or_render_only_renders_once() {
        let cache = RenderCache::new(capacity(4));
        let mut renders = 0;
        for _ in 0..3 {
            cache
                .get_or_render(key("a", "x"), || {
                    renders += 1;
                    Ok::<_, Infallible>(doc("x"))
                })
                .unwrap();
        }
        assert_eq!(renders, 1);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = RenderCache::new(capacity(2));
        cache.insert(key("a", "a"), doc("a"));
        cache.insert(key("b", "b"), doc("b"));
        cache.get(&key("a", "a"));
        cache.insert(key("c", "c"), doc("c"));

        assert!(cache.get(&key("a", "a")).is_some());
        assert!(cache.get(&key("b", "b")).is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = RenderCache::cache_path(dir.path());

        let fingerprint = render_fingerprint(false);
        let cache = RenderCache::new(capacity(4)).with_fingerprint(fingerprint.clone());
        cache.insert(key("a", "# A"), doc("# A"));
        cache.save(&path).unwrap();

        let loaded = RenderCache::load(&path, capacity(4), &fingerprint);
        assert_eq!(loaded.get(&key("a", "# A")), Some(doc("# A")));
    }

    #[test]
    fn test_cache_from_other_render_settings_is_discarded() {
        let dir = tempdir().unwrap();
        let path = RenderCache::cache_path(dir.path());
        let source = "<script>alert(1)</script>\n";

        let raw = MarkdownProcessor::new().with_raw_html(true).render(source).unwrap();
        let cache = RenderCache::new(capacity(4)).with_fingerprint(render_fingerprint(true));
        cache.insert(key("x", source), raw);
        cache.save(&path).unwrap();

        let loaded = RenderCache::load(&path, capacity(4), &render_fingerprint(false));
        assert!(loaded.is_empty());
        assert_eq!(loaded.fingerprint(), render_fingerprint(false));
        assert_ne!(render_fingerprint(true), render_fingerprint(false));
    }

    #[test]
    fn test_corrupt_file_is_ignored() {
        let dir = tempdir().unwrap();
        let path = RenderCache::cache_path(dir.path());
        fs::write(&path, "{not json").unwrap();

        let loaded = RenderCache::load(&path, capacity(4), &render_fingerprint(false));
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_hash_is_stable_hex() {
        let hash = content_hash(b"hello");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, content_hash(b"hello"));
        assert_ne!(hash, content_hash(b"hello!"));
    }
}
