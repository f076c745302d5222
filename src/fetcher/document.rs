//! Typed HTML document and the two queries the crawler runs over it
//!
//! A [`Document`] is parsed once and keeps only what the crawler reads back:
//! the anchor targets and the visible text. It holds no parse tree, so it is
//! `Send` and can cross the concurrent fetch boundary.

use scraper::{Html, Node, Selector};
use std::collections::HashMap;

/// Elements whose text content never renders
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Parsed page content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// `href` values of every `<a>` element that has one, in document order
    hrefs: Vec<String>,

    /// Visible text nodes joined with single spaces
    text: String,
}

impl Document {
    /// Parses an HTML string
    ///
    /// HTML parsing is error-tolerant; malformed markup still yields a
    /// document.
    ///
    /// # Example
    ///
    /// ```
    /// use spidey::fetcher::{extract_keywords, extract_links, Document};
    ///
    /// let doc = Document::parse(r#"<p>hello hello world</p><a href="https://example.com/">x</a>"#);
    /// assert_eq!(extract_links(&doc), vec!["https://example.com/"]);
    /// assert_eq!(extract_keywords(&doc, 1), vec!["hello"]);
    /// ```
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        Self {
            hrefs: collect_hrefs(&document),
            text: collect_visible_text(&document),
        }
    }

    /// Builds a document from already extracted parts
    pub fn from_parts(hrefs: Vec<String>, text: impl Into<String>) -> Self {
        Self {
            hrefs,
            text: text.into(),
        }
    }

    /// The visible text of the page
    pub fn text(&self) -> &str {
        &self.text
    }
}

fn collect_hrefs(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

fn collect_visible_text(document: &Html) -> String {
    let mut chunks: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|element| INVISIBLE_ELEMENTS.contains(&element.name()))
                .unwrap_or(false)
        });

        if !hidden {
            chunks.push(&**text);
        }
    }

    chunks.join(" ")
}

/// Collects outbound links from a document
///
/// Keeps every anchor target that starts with `http` at position zero
/// (case-sensitive, so `https` passes and `HTTP://` does not). Relative links
/// are not resolved and duplicates are kept; deduplication belongs to the
/// frontier.
pub fn extract_links(doc: &Document) -> Vec<String> {
    doc.hrefs
        .iter()
        .filter(|href| href.starts_with("http"))
        .cloned()
        .collect()
}

/// Returns the `k` most frequent whitespace-separated tokens of the visible text
///
/// Counting is exact and case-sensitive. Higher counts come first; equal
/// counts keep the order in which the tokens first appeared.
pub fn extract_keywords(doc: &Document, k: usize) -> Vec<String> {
    if k == 0 {
        return Vec::new();
    }

    // token -> (count, first position)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, token) in doc.text.split_whitespace().enumerate() {
        counts
            .entry(token)
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, position));
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(token, (count, first))| (token, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(k)
        .map(|(token, _, _)| token.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_doc(text: &str) -> Document {
        Document::from_parts(Vec::new(), text)
    }

    #[test]
    fn test_keywords_by_frequency() {
        let doc = text_doc("a a b b b c");
        assert_eq!(extract_keywords(&doc, 2), vec!["b", "a"]);
    }

    #[test]
    fn test_keyword_ties_keep_first_seen_order() {
        let doc = text_doc("delta alpha charlie alpha delta charlie bravo");
        assert_eq!(
            extract_keywords(&doc, 4),
            vec!["delta", "alpha", "charlie", "bravo"]
        );
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        let doc = text_doc("Rust rust rust RUST");
        assert_eq!(extract_keywords(&doc, 3), vec!["rust", "Rust", "RUST"]);
    }

    #[test]
    fn test_keywords_split_on_whitespace_runs() {
        let doc = text_doc("  one\t\ttwo\n\n one   ");
        assert_eq!(extract_keywords(&doc, 10), vec!["one", "two"]);
    }

    #[test]
    fn test_keywords_k_larger_than_vocabulary() {
        let doc = text_doc("x y");
        assert_eq!(extract_keywords(&doc, 10), vec!["x", "y"]);
    }

    #[test]
    fn test_keywords_zero_k_and_empty_text() {
        assert!(extract_keywords(&text_doc("a b c"), 0).is_empty());
        assert!(extract_keywords(&text_doc(""), 5).is_empty());
    }

    #[test]
    fn test_links_require_http_prefix() {
        let doc = Document::parse(
            r#"<html><body>
                <a href="https://a.example/">a</a>
                <a href="http://b.example/">b</a>
                <a href="/relative">rel</a>
                <a href="mailto:x@example.com">mail</a>
                <a href="HTTP://upper.example/">upper</a>
                <a href=" https://leading-space.example/">space</a>
            </body></html>"#,
        );
        assert_eq!(
            extract_links(&doc),
            vec!["https://a.example/", "http://b.example/"]
        );
    }

    #[test]
    fn test_anchors_without_href_are_skipped() {
        let doc = Document::parse(
            r#"<a name="top">no href</a><a href="https://example.com/x">x</a>"#,
        );
        assert_eq!(extract_links(&doc), vec!["https://example.com/x"]);
    }

    #[test]
    fn test_links_keep_duplicates_in_order() {
        let doc = Document::parse(
            r#"<a href="https://e.com/2">2</a><a href="https://e.com/1">1</a><a href="https://e.com/2">2</a>"#,
        );
        assert_eq!(
            extract_links(&doc),
            vec!["https://e.com/2", "https://e.com/1", "https://e.com/2"]
        );
    }

    #[test]
    fn test_link_tags_are_not_anchors() {
        let doc = Document::parse(
            r#"<head><link rel="canonical" href="https://e.com/c"></head><body></body>"#,
        );
        assert!(extract_links(&doc).is_empty());
    }

    #[test]
    fn test_visible_text_skips_scripts_and_styles() {
        let doc = Document::parse(
            r#"<html><head><title>Title</title><style>body { color: red }</style></head>
            <body><script>var hidden = 1;</script><p>shown text</p></body></html>"#,
        );
        let words: Vec<&str> = doc.text().split_whitespace().collect();
        assert!(words.contains(&"Title"));
        assert!(words.contains(&"shown"));
        assert!(!words.contains(&"hidden"));
        assert!(!words.contains(&"color:"));
    }

    #[test]
    fn test_adjacent_elements_do_not_merge_tokens() {
        let doc = Document::parse("<p>alpha</p><p>beta</p>");
        assert_eq!(extract_keywords(&doc, 5), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_parse_never_fails_on_malformed_markup() {
        let doc = Document::parse("<div><p>unclosed <a href='https://e.com/'>link");
        assert_eq!(extract_links(&doc), vec!["https://e.com/"]);
    }
}
