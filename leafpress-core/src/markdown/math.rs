//! Math notation: detect unterminated display math and wrap math nodes in
//! markup a client-side typesetter (MathJax/KaTeX auto-render) picks up.

use super::html::escape_html;
use super::node::{walk_mut, Node};
use super::RenderError;
use pulldown_cmark::{Event, Tag, TagEnd};

/// Fail when a `$$` survives parsing as plain text.
///
/// With math parsing enabled, a closed `$$…$$` pair becomes a math event;
/// a leftover `$$` means display math was opened and never closed.
pub fn check_unterminated(events: &[Event<'_>]) -> Result<(), RenderError> {
    let mut run = String::new();
    let mut in_code_block = false;

    for event in events {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(text) if !in_code_block => {
                run.push_str(text);
                continue;
            }
            _ => {}
        }
        check_run(&run)?;
        run.clear();
    }
    check_run(&run)
}

fn check_run(text: &str) -> Result<(), RenderError> {
    match text.find("$$") {
        Some(pos) => {
            let snippet: String = text[pos..].chars().take(40).collect();
            Err(RenderError::UnterminatedMath(snippet))
        }
        None => Ok(()),
    }
}

/// Replace every math node's `rendered` with its presentational markup.
///
/// A paragraph holding nothing but display math is replaced by the math
/// node so the block-level wrapper does not end up inside `<p>`.
pub fn render_math(nodes: &mut [Node]) {
    walk_mut(nodes, &mut |node| {
        if let Some(math) = sole_display_math(node) {
            *node = math;
        }
        if let Node::Math {
            display,
            tex,
            rendered,
        } = node
        {
            *rendered = Some(if *display {
                wrap_display_math(tex)
            } else {
                wrap_inline_math(tex)
            });
        }
    });
}

fn sole_display_math(node: &Node) -> Option<Node> {
    let Node::Paragraph { children } = node else {
        return None;
    };
    let mut meaningful = children.iter().filter(|child| match child {
        Node::SoftBreak => false,
        Node::Text { text } => !text.trim().is_empty(),
        _ => true,
    });
    match (meaningful.next(), meaningful.next()) {
        (Some(math @ Node::Math { display: true, .. }), None) => Some(math.clone()),
        _ => None,
    }
}

pub fn wrap_inline_math(tex: &str) -> String {
    format!(
        r#"<span class="math math-inline">\({}\)</span>"#,
        escape_html(tex)
    )
}

pub fn wrap_display_math(tex: &str) -> String {
    format!(
        r#"<div class="math math-display">\[{}\]</div>"#,
        escape_html(tex)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::{Options, Parser};

    fn events(md: &str) -> Vec<Event<'_>> {
        Parser::new_ext(md, Options::ENABLE_MATH).collect()
    }

    #[test]
    fn test_inline_math_wrapping() {
        let html = wrap_inline_math("x^2 + y^2");
        assert!(html.contains(r"\(x^2 + y^2\)"));
        assert!(html.contains("math-inline"));
    }

    #[test]
    fn test_display_math_wrapping() {
        let html = wrap_display_math(r"\sum_{i=0}^n i");
        assert!(html.contains(r"\[\sum_{i=0}^n i\]"));
        assert!(html.contains("math-display"));
    }

    #[test]
    fn test_escapes_special_chars() {
        let html = wrap_inline_math("x < y & z > w");
        assert!(html.contains("x &lt; y &amp; z &gt; w"));
    }

    #[test]
    fn test_closed_math_passes() {
        assert!(check_unterminated(&events("Inline $a+b$ and\n\n$$\nc = d\n$$\n")).is_ok());
    }

    #[test]
    fn test_unclosed_display_math_fails() {
        let err = check_unterminated(&events("Before\n\n$$ x = 1\n\nno closing here\n")).unwrap_err();
        assert!(matches!(err, RenderError::UnterminatedMath(_)));
    }

    #[test]
    fn test_dollars_in_code_are_ignored() {
        assert!(check_unterminated(&events("```sh\necho $$\n```\n\nand `$$` inline\n")).is_ok());
    }

    #[test]
    fn test_display_math_paragraph_is_unwrapped() {
        let mut nodes = vec![Node::Paragraph {
            children: vec![Node::Math {
                display: true,
                tex: "a".into(),
                rendered: None,
            }],
        }];
        render_math(&mut nodes);
        assert_eq!(
            nodes[0],
            Node::Math {
                display: true,
                tex: "a".into(),
                rendered: Some(r#"<div class="math math-display">\[a\]</div>"#.into()),
            }
        );
    }

    #[test]
    fn test_render_math_fills_nodes() {
        let mut nodes = vec![Node::Paragraph {
            children: vec![Node::Math {
                display: false,
                tex: "e".into(),
                rendered: None,
            }],
        }];
        render_math(&mut nodes);
        assert_eq!(
            nodes[0].children()[0],
            Node::Math {
                display: false,
                tex: "e".into(),
                rendered: Some(r#"<span class="math math-inline">\(e\)</span>"#.into()),
            }
        );
    }
}
