use crate::dom::text::rendered_text;
use scraper::{ElementRef, Html};

/// Parsed snapshot of a page, or of one card cut out of a page
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
    url: Option<String>,
}

impl Document {
    /// Parse a complete HTML document
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
            url: None,
        }
    }

    /// Parse an HTML fragment, such as the outer HTML of a result card
    pub fn fragment(html: &str) -> Self {
        Self {
            html: Html::parse_fragment(html),
            url: None,
        }
    }

    /// Builder method: record the URL this snapshot was taken from
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// URL the snapshot was taken from, if known
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Root element; every query is evaluated beneath it
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// Rendered text of the whole snapshot
    pub fn text(&self) -> String {
        rendered_text(self.root())
    }

    /// Serialized HTML of the whole snapshot
    pub fn to_html(&self) -> String {
        self.html.html()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn test_parse_document() {
        let doc = Document::parse("<html><head><title>T</title></head><body><h1>Hello</h1></body></html>");
        let h1 = Selector::parse("h1").unwrap();
        assert_eq!(doc.root().select(&h1).count(), 1);
        assert!(doc.url().is_none());
    }

    #[test]
    fn test_fragment_keeps_outer_element() {
        let doc = Document::fragment(r#"<div class="card"><a href="/x">X</a></div>"#);
        let card = Selector::parse("div.card").unwrap();
        assert_eq!(doc.root().select(&card).count(), 1);
    }

    #[test]
    fn test_with_url() {
        let doc = Document::parse("<p>x</p>").with_url("https://example.com/a");
        assert_eq!(doc.url(), Some("https://example.com/a"));
    }

    #[test]
    fn test_text_skips_head() {
        let doc = Document::parse("<html><head><title>Title</title></head><body><p>Body</p></body></html>");
        assert_eq!(doc.text(), "Body");
    }
}
