use crate::dom::rendered_text;
use scraper::{ElementRef, Selector};
use std::fmt;

/// One locator attempt within a fallback chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// CSS selector keyed on attribute patterns, e.g. `div[data-testid='address']`
    Attribute(String),

    /// Every element with the given tag name
    Tag(String),

    /// Elements picked by their relationship to other elements or text
    Structural(Relation),
}

/// Structural relationships understood by [`Strategy::Structural`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    /// `outer` elements containing at least one `inner` element (an anchor wrapping a heading)
    Wrapping { outer: String, inner: String },

    /// Innermost `tag` elements whose rendered text contains any of `needles`
    ContainingText { tag: String, needles: Vec<String> },
}

/// How a strategy is expressed to a live browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveQuery {
    Css(String),
    XPath(String),
}

impl Strategy {
    pub fn attribute(css: impl Into<String>) -> Self {
        Self::Attribute(css.into())
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self::Tag(name.into())
    }

    pub fn wrapping(outer: impl Into<String>, inner: impl Into<String>) -> Self {
        Self::Structural(Relation::Wrapping {
            outer: outer.into(),
            inner: inner.into(),
        })
    }

    pub fn containing_text<I, S>(tag: impl Into<String>, needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Structural(Relation::ContainingText {
            tag: tag.into(),
            needles: needles.into_iter().map(Into::into).collect(),
        })
    }

    /// All elements under `scope` matched by this strategy, in document order.
    ///
    /// A selector that does not parse matches nothing.
    pub fn select<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        match self {
            Self::Attribute(css) | Self::Tag(css) => match parse_selector(css) {
                Some(selector) => scope.select(&selector).collect(),
                None => Vec::new(),
            },
            Self::Structural(Relation::Wrapping { outer, inner }) => {
                let (Some(outer), Some(inner)) = (parse_selector(outer), parse_selector(inner)) else {
                    return Vec::new();
                };
                scope
                    .select(&outer)
                    .filter(|candidate| candidate.select(&inner).next().is_some())
                    .collect()
            }
            Self::Structural(Relation::ContainingText { tag, needles }) => {
                let Some(selector) = parse_selector(tag) else {
                    return Vec::new();
                };
                let contains = |element: &ElementRef<'_>| {
                    let text = rendered_text(*element);
                    needles.iter().any(|needle| text.contains(needle.as_str()))
                };
                scope
                    .select(&selector)
                    .filter(|candidate| contains(candidate))
                    .filter(|candidate| !candidate.select(&selector).any(|nested| contains(&nested)))
                    .collect()
            }
        }
    }

    /// First matching element under `scope`
    pub fn first<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.select(scope).into_iter().next()
    }

    /// Translate this strategy into something a live browser can evaluate
    pub fn live_query(&self) -> LiveQuery {
        match self {
            Self::Attribute(css) | Self::Tag(css) => LiveQuery::Css(css.clone()),
            Self::Structural(Relation::Wrapping { outer, inner }) => LiveQuery::Css(format!("{}:has({})", outer, inner)),
            Self::Structural(Relation::ContainingText { tag, needles }) => {
                let conditions: Vec<String> = needles
                    .iter()
                    .map(|needle| format!("contains(., {})", xpath_literal(needle)))
                    .collect();
                LiveQuery::XPath(format!("//{}[{}]", tag, conditions.join(" or ")))
            }
        }
    }

    /// Whether every selector inside this strategy parses
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Attribute(css) | Self::Tag(css) => Selector::parse(css).is_ok(),
            Self::Structural(Relation::Wrapping { outer, inner }) => {
                Selector::parse(outer).is_ok() && Selector::parse(inner).is_ok()
            }
            Self::Structural(Relation::ContainingText { tag, needles }) => {
                Selector::parse(tag).is_ok() && !needles.is_empty()
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(css) => write!(f, "{}", css),
            Self::Tag(name) => write!(f, "<{}>", name),
            Self::Structural(Relation::Wrapping { outer, inner }) => write!(f, "{} wrapping {}", outer, inner),
            Self::Structural(Relation::ContainingText { tag, needles }) => {
                write!(f, "{} containing {:?}", tag, needles)
            }
        }
    }
}

fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            log::warn!("Ignoring unparsable selector '{}': {}", css, e);
            None
        }
    }
}

/// Quote a string for use inside an XPath expression
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value.split('\'').map(|part| format!("'{}'", part)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// Ordered, non-empty list of strategies tried strictly in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    label: &'static str,
    strategies: Vec<Strategy>,
}

impl Chain {
    /// Start a chain; a chain always holds at least one strategy
    pub fn new(label: &'static str, first: Strategy) -> Self {
        Self {
            label,
            strategies: vec![first],
        }
    }

    /// Builder method: append a fallback strategy
    pub fn or(mut self, next: Strategy) -> Self {
        self.strategies.push(next);
        self
    }

    /// Builder method: append several attribute-pattern fallbacks
    pub fn or_attributes<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strategies.extend(selectors.into_iter().map(Strategy::attribute));
        self
    }

    /// Chain of attribute-pattern strategies; `None` when `selectors` is empty
    pub fn of_attributes<I, S>(label: &'static str, selectors: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut iter = selectors.into_iter();
        let first = iter.next()?;
        Some(Self::new(label, Strategy::attribute(first)).or_attributes(iter))
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn iter(&self) -> impl Iterator<Item = &Strategy> {
        self.strategies.iter()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Strategies whose selectors fail to parse
    pub fn invalid_strategies(&self) -> Vec<&Strategy> {
        self.strategies.iter().filter(|s| !s.is_valid()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    const CARD: &str = r#"
        <div class="card">
            <a class="plain" href="/plain">Plain</a>
            <a class="title" href="/medecin/dr-a"><h2>Dr A</h2></a>
            <div class="outer"><div class="availability">Prochaine disponibilité demain</div></div>
        </div>
    "#;

    #[test]
    fn test_attribute_select() {
        let doc = Document::fragment(CARD);
        let found = Strategy::attribute("a[href*='/medecin/']").select(doc.root());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value().attr("href"), Some("/medecin/dr-a"));
    }

    #[test]
    fn test_tag_select_document_order() {
        let doc = Document::fragment(CARD);
        let found = Strategy::tag("a").select(doc.root());
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].value().attr("class"), Some("plain"));
    }

    #[test]
    fn test_wrapping_select() {
        let doc = Document::fragment(CARD);
        let found = Strategy::wrapping("a", "h1, h2, h3").select(doc.root());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value().attr("class"), Some("title"));
    }

    #[test]
    fn test_containing_text_prefers_innermost() {
        let doc = Document::fragment(CARD);
        let found = Strategy::containing_text("div", ["Prochaine", "Prochain"]).select(doc.root());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value().attr("class"), Some("availability"));
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let doc = Document::fragment(CARD);
        let strategy = Strategy::attribute("a[href=");
        assert!(strategy.select(doc.root()).is_empty());
        assert!(!strategy.is_valid());
    }

    #[test]
    fn test_live_query() {
        assert_eq!(Strategy::attribute("div.x").live_query(), LiveQuery::Css("div.x".to_string()));
        assert_eq!(Strategy::wrapping("a", "h2").live_query(), LiveQuery::Css("a:has(h2)".to_string()));
        assert_eq!(
            Strategy::containing_text("span", ["Secteur 1"]).live_query(),
            LiveQuery::XPath("//span[contains(., 'Secteur 1')]".to_string())
        );
    }

    #[test]
    fn test_xpath_literal_quotes() {
        assert_eq!(xpath_literal("plain"), "'plain'");
        assert_eq!(xpath_literal("l'avis"), "\"l'avis\"");
        assert_eq!(xpath_literal(r#"a'b"c"#), r#"concat('a', "'", 'b"c')"#);
    }

    #[test]
    fn test_chain_builder() {
        let chain = Chain::new("name", Strategy::tag("h1"))
            .or(Strategy::attribute("h1[itemprop='name']"))
            .or_attributes(["p.name"]);
        assert_eq!(chain.label(), "name");
        assert_eq!(chain.len(), 3);
        assert!(!chain.is_empty());
        assert!(chain.invalid_strategies().is_empty());
    }

    #[test]
    fn test_chain_of_attributes_requires_one() {
        assert!(Chain::of_attributes("empty", Vec::<String>::new()).is_none());
        let chain = Chain::of_attributes("cards", ["div.a", "div.b"]).unwrap();
        assert_eq!(chain.strategies()[1], Strategy::attribute("div.b"));
    }
}
