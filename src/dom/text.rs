use scraper::ElementRef;

/// Elements whose boundaries start a new line in rendered text
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "div", "dl", "dt", "fieldset", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p",
    "pre", "section", "summary", "table", "tr", "ul",
];

/// Elements that never contribute visible text
const HIDDEN_TAGS: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Visible text of an element, approximating a browser's `innerText`.
///
/// Block elements and `<br>` break lines, runs of whitespace collapse to a
/// single space, and every line is trimmed. Blank lines are dropped.
pub fn rendered_text(element: ElementRef<'_>) -> String {
    let mut buffer = LineBuffer::default();
    walk(element, &mut buffer);
    buffer.finish()
}

fn walk(element: ElementRef<'_>, buffer: &mut LineBuffer) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            buffer.push_text(text);
            continue;
        }

        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };

        let name = child.value().name();
        if HIDDEN_TAGS.contains(&name) {
            continue;
        }
        if name == "br" {
            buffer.break_line();
            continue;
        }

        let block = BLOCK_TAGS.contains(&name);
        if block {
            buffer.break_line();
        }
        walk(child, buffer);
        if block {
            buffer.break_line();
        }
    }
}

#[derive(Default)]
struct LineBuffer {
    lines: Vec<String>,
    current: String,
}

impl LineBuffer {
    fn push_text(&mut self, text: &str) {
        let mut words = text.split_whitespace().peekable();
        if words.peek().is_none() {
            if !text.is_empty() {
                self.push_space();
            }
            return;
        }

        if text.starts_with(char::is_whitespace) {
            self.push_space();
        }
        let mut first = true;
        for word in words {
            if !first {
                self.current.push(' ');
            }
            self.current.push_str(word);
            first = false;
        }
        if text.ends_with(char::is_whitespace) {
            self.push_space();
        }
    }

    fn push_space(&mut self) {
        if !self.current.is_empty() && !self.current.ends_with(' ') {
            self.current.push(' ');
        }
    }

    fn break_line(&mut self) {
        let line = self.current.trim();
        if !line.is_empty() {
            self.lines.push(line.to_string());
        }
        self.current.clear();
    }

    fn finish(mut self) -> String {
        self.break_line();
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use scraper::Selector;

    fn text_of(html: &str, css: &str) -> String {
        let doc = Document::fragment(html);
        let selector = Selector::parse(css).unwrap();
        let element = doc.root().select(&selector).next().unwrap();
        rendered_text(element)
    }

    #[test]
    fn test_br_breaks_lines() {
        let text = text_of(r#"<div id="a">12 Rue Exemple<br>75015 Paris</div>"#, "#a");
        assert_eq!(text, "12 Rue Exemple\n75015 Paris");
    }

    #[test]
    fn test_block_children_break_lines() {
        let text = text_of(r#"<div id="a"><div>12 Rue Exemple</div><div>75015 Paris</div></div>"#, "#a");
        assert_eq!(text, "12 Rue Exemple\n75015 Paris");
    }

    #[test]
    fn test_inline_children_stay_on_line() {
        let text = text_of(r#"<p id="a">Consultation <span>45</span> <b>€</b></p>"#, "#a");
        assert_eq!(text, "Consultation 45 €");
    }

    #[test]
    fn test_whitespace_collapses() {
        let text = text_of("<p id=\"a\">\n   Dr   Jane\n\t Doe  </p>", "#a");
        assert_eq!(text, "Dr Jane Doe");
    }

    #[test]
    fn test_adjacent_inline_text_is_not_split() {
        let text = text_of(r#"<span id="a">45<sup>€</sup></span>"#, "#a");
        assert_eq!(text, "45€");
    }

    #[test]
    fn test_hidden_elements_skipped() {
        let text = text_of(
            r#"<div id="a">Visible<script>var x = "téléconsultation";</script><style>.a{}</style></div>"#,
            "#a",
        );
        assert_eq!(text, "Visible");
    }

    #[test]
    fn test_empty_element() {
        assert_eq!(text_of(r#"<div id="a">   </div>"#, "#a"), "");
    }
}
