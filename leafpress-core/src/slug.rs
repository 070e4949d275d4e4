//! Slug generation for heading anchors and tag pages.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

static HYPHEN_RUNS: OnceLock<Regex> = OnceLock::new();

fn hyphen_runs() -> &'static Regex {
    HYPHEN_RUNS.get_or_init(|| Regex::new(r"-+").unwrap())
}

/// Convert a string to a URL-safe slug
///
/// Rules:
/// - Lowercase
/// - Replace whitespace and underscores with hyphens
/// - Drop punctuation and symbols, keep unicode letters and digits
/// - Collapse multiple hyphens
/// - Trim leading/trailing hyphens
///
/// # Examples
///
/// ```
/// use leafpress_core::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("Rust & Safety"), "rust-safety");
/// assert_eq!(slugify("随便写写"), "随便写写");
/// ```
pub fn slugify(input: &str) -> String {
    let lowercased = input.to_lowercase();

    let cleaned = lowercased
        .graphemes(true)
        .filter_map(|g| {
            let c = g.chars().next()?;
            if c.is_whitespace() || c == '_' || c == '-' {
                Some("-")
            } else if c.is_alphanumeric() {
                Some(g)
            } else {
                None
            }
        })
        .collect::<String>();

    let collapsed = hyphen_runs().replace_all(&cleaned, "-");
    collapsed.trim_matches('-').to_string()
}

/// Hands out document-unique slugs.
///
/// The first occurrence of a slug is returned as-is, later ones get a
/// numeric suffix (`intro`, `intro-1`, `intro-2`). Text that slugifies to
/// nothing falls back to `section`.
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unique slug for `text`.
    pub fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let base = if base.is_empty() {
            "section".to_string()
        } else {
            base
        };
        self.claim(base)
    }

    /// Reserve an id that was set explicitly (e.g. `# Title {#custom}`),
    /// returning a unique variant if it is already taken.
    pub fn claim(&mut self, base: String) -> String {
        let Some(&previous) = self.seen.get(&base) else {
            self.seen.insert(base.clone(), 0);
            return base;
        };

        let mut count = previous;
        let candidate = loop {
            count += 1;
            let candidate = format!("{}-{}", base, count);
            if !self.seen.contains_key(&candidate) {
                break candidate;
            }
        };
        self.seen.insert(base, count);
        self.seen.insert(candidate.clone(), 0);
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Rust Programming"), "rust-programming");
    }

    #[test]
    fn test_special_characters() {
        assert_eq!(slugify("Rust & Safety"), "rust-safety");
        assert_eq!(slugify("C++ Programming"), "c-programming");
        assert_eq!(slugify("Node.js Tips"), "nodejs-tips");
        assert_eq!(slugify("What's new?"), "whats-new");
    }

    #[test]
    fn test_unicode() {
        assert_eq!(slugify("Café"), "café");
        assert_eq!(slugify("我的 翻唱"), "我的-翻唱");
    }

    #[test]
    fn test_whitespace_and_underscores() {
        assert_eq!(slugify("  Hello    World  "), "hello-world");
        assert_eq!(slugify("rust_lang_basics"), "rust-lang-basics");
        assert_eq!(slugify("-Leading Hyphen"), "leading-hyphen");
    }

    #[test]
    fn test_empty_and_special_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugger_dedupes() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slug("Intro"), "intro");
        assert_eq!(slugger.slug("Intro"), "intro-1");
        assert_eq!(slugger.slug("intro"), "intro-2");
        assert_eq!(slugger.slug("Other"), "other");
    }

    #[test]
    fn test_slugger_suffix_collision() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slug("Intro 1"), "intro-1");
        assert_eq!(slugger.slug("Intro"), "intro");
        // "intro-1" is taken by the first heading
        assert_eq!(slugger.slug("Intro"), "intro-2");
    }

    #[test]
    fn test_slugger_empty_falls_back() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slug("???"), "section");
        assert_eq!(slugger.slug(""), "section-1");
    }
}
