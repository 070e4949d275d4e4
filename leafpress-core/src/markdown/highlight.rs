//! Code syntax highlighting using syntect.
//!
//! Highlighted blocks carry CSS classes rather than inline colors; the
//! matching stylesheet comes from [`stylesheet`].

use super::node::{walk_mut, Node};
use super::RenderError;
use std::sync::OnceLock;
use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

pub const DEFAULT_THEME: &str = "InspiredGitHub";

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

fn find_syntax(lang: &str) -> Option<&'static SyntaxReference> {
    let ss = syntax_set();
    ss.find_syntax_by_token(lang)
        .or_else(|| ss.find_syntax_by_extension(lang))
}

/// Fill in `highlighted` for every fenced code block with a known language.
///
/// Unknown languages are left unhighlighted and render as escaped text.
pub fn highlight_code_blocks(nodes: &mut [Node]) -> Result<(), RenderError> {
    let mut failure = None;
    walk_mut(nodes, &mut |node| {
        if failure.is_some() {
            return;
        }
        if let Node::CodeBlock {
            lang: Some(lang),
            code,
            highlighted,
        } = node
        {
            match highlight(code, lang) {
                Ok(html) => *highlighted = html,
                Err(err) => failure = Some(err),
            }
        }
    });

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Classed HTML for `code`, or `None` when `lang` is not recognized.
pub fn highlight(code: &str, lang: &str) -> Result<Option<String>, RenderError> {
    let Some(syntax) = find_syntax(lang) else {
        tracing::debug!("No syntax for code block language '{}'", lang);
        return Ok(None);
    };

    let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set(), CLASS_STYLE);
    for line in LinesWithEndings::from(code) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .map_err(|source| RenderError::Highlight {
                lang: lang.to_string(),
                source,
            })?;
    }
    Ok(Some(generator.finalize()))
}

/// CSS for the highlight classes under the named theme.
///
/// Falls back to [`DEFAULT_THEME`] when `theme` is not a bundled theme.
pub fn stylesheet(theme: &str) -> Result<String, syntect::Error> {
    let themes = &theme_set().themes;
    let selected = match themes.get(theme) {
        Some(found) => found,
        None => {
            tracing::warn!(
                "Unknown highlight theme '{}', using {}",
                theme,
                DEFAULT_THEME
            );
            match themes.get(DEFAULT_THEME) {
                Some(fallback) => fallback,
                None => return Ok(String::new()),
            }
        }
    };
    css_for_theme_with_class_style(selected, CLASS_STYLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_language_gets_classes() {
        let html = highlight("fn main() {}\n", "rust").unwrap().unwrap();
        assert!(html.contains("class=\"hl-"));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_unknown_language_is_tolerated() {
        assert!(highlight("whatever\n", "not-a-language").unwrap().is_none());
    }

    #[test]
    fn test_walks_nested_blocks() {
        let mut nodes = vec![Node::BlockQuote {
            children: vec![Node::CodeBlock {
                lang: Some("python".into()),
                code: "print('hi')\n".into(),
                highlighted: None,
            }],
        }];
        highlight_code_blocks(&mut nodes).unwrap();
        let Node::CodeBlock { highlighted, .. } = &nodes[0].children()[0] else {
            panic!("expected code block");
        };
        assert!(highlighted.is_some());
    }

    #[test]
    fn test_stylesheet_falls_back_to_default_theme() {
        let css = stylesheet("no-such-theme").unwrap();
        assert!(css.contains(".hl-"));
    }
}
