//! HTML to prose extraction.

use dom_query::{Document, Selection};

use autoquizzer_core::error::FetchError;
use autoquizzer_core::traits::TextExtractor;

/// Elements that never carry article prose.
const CHROME: &str = "script, style, noscript, template, iframe, svg, canvas, nav, header, \
                      footer, aside, form, button, select";

/// Elements treated as text blocks.
const BLOCKS: &str = "p, h1, h2, h3, h4, h5, h6, li, blockquote, pre, td, th, dd, dt, figcaption";

/// Content roots, most specific first.
const ROOTS: [&str; 3] = ["article", "main", "body"];

/// Extracts readable text from an HTML page.
///
/// Page chrome is dropped, the most specific content root is chosen and the
/// innermost text blocks are collected one per line with whitespace collapsed.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlTextExtractor;

impl HtmlTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn content_root(doc: &Document) -> Option<Selection<'_>> {
    ROOTS.iter().find_map(|selector| {
        doc.select(selector)
            .nodes()
            .first()
            .map(|node| Selection::from(*node))
    })
}

impl TextExtractor for HtmlTextExtractor {
    fn extract_text(&self, html: &[u8]) -> Result<String, FetchError> {
        let html = String::from_utf8_lossy(html);
        let doc = Document::from(html.as_ref());
        doc.select(CHROME).remove();

        let Some(root) = content_root(&doc) else {
            return Err(FetchError::NoContent("document has no body".into()));
        };

        let mut lines = Vec::new();
        for node in root.select(BLOCKS).nodes() {
            let block = Selection::from(*node);
            // Only the innermost blocks, so nested text is not repeated.
            if block.select(BLOCKS).length() > 0 {
                continue;
            }
            let line = normalize_whitespace(&block.text());
            if !line.is_empty() {
                lines.push(line);
            }
        }

        if lines.is_empty() {
            let text = normalize_whitespace(&root.text());
            if !text.is_empty() {
                lines.push(text);
            }
        }

        if lines.is_empty() {
            return Err(FetchError::NoContent("page has no readable text".into()));
        }
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> Result<String, FetchError> {
        HtmlTextExtractor::new().extract_text(html.as_bytes())
    }

    #[test]
    fn prefers_article_and_drops_chrome() {
        let html = r#"<html><head><title>Capybara</title><style>p { color: red }</style></head>
            <body>
              <nav><ul><li>Home</li><li>About</li></ul></nav>
              <article>
                <h1>Capybara</h1>
                <p>The capybara is the   largest living
                   rodent.</p>
                <script>var tracking = 1;</script>
                <ul><li><p>Semi-aquatic</p></li><li>Social</li></ul>
              </article>
              <footer><p>Copyright</p></footer>
            </body></html>"#;

        let text = extract(html).unwrap();
        assert_eq!(
            text,
            "Capybara\nThe capybara is the largest living rodent.\nSemi-aquatic\nSocial"
        );
    }

    #[test]
    fn falls_back_to_body_text() {
        let text = extract("<html><body><div>Just a   div</div></body></html>").unwrap();
        assert_eq!(text, "Just a div");
    }

    #[test]
    fn empty_page_has_no_content() {
        let err = extract("<html><body><script>x()</script></body></html>").unwrap_err();
        assert!(matches!(err, FetchError::NoContent(_)));
    }
}
