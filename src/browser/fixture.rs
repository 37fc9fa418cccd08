use crate::browser::{BrowserControl, ContextHandle};
use crate::dom::Document;
use crate::error::{BrowserError, Result};
use crate::locate::Strategy;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Attribute on a fixture input naming the page that pressing Enter in it loads
pub const SUBMIT_ATTRIBUTE: &str = "data-fixture-submit";

const BLANK_URL: &str = "about:blank";

/// Interaction recorded by a [`FixtureBrowser`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Navigated(String),
    Typed { target: String, text: String },
    Pressed { target: String, key: String },
    Clicked(String),
    Opened(String),
    Closed(ContextHandle),
}

/// In-memory browser serving canned pages.
///
/// Starts with a single blank context. Opening a context on a URL without a
/// registered page yields an empty document, so its readiness marker never
/// appears.
#[derive(Debug, Clone)]
pub struct FixtureBrowser {
    pages: HashMap<String, String>,
    broken: HashSet<String>,
    contexts: IndexMap<ContextHandle, String>,
    focused: ContextHandle,
    next_id: usize,
    max_open: usize,
    interactions: Vec<Interaction>,
}

impl Default for FixtureBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureBrowser {
    pub fn new() -> Self {
        let origin = ContextHandle::new("ctx-0");
        let mut contexts = IndexMap::new();
        contexts.insert(origin.clone(), BLANK_URL.to_string());
        Self {
            pages: HashMap::new(),
            broken: HashSet::new(),
            contexts,
            focused: origin,
            next_id: 1,
            max_open: 1,
            interactions: Vec::new(),
        }
    }

    /// Builder method: serve `html` at `url`
    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(normalize(url), html.into());
        self
    }

    /// Builder method: opening a context on `url` creates the context, then fails
    pub fn broken_context(mut self, url: &str) -> Self {
        self.broken.insert(normalize(url));
        self
    }

    /// Everything done to this browser so far
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Highest number of simultaneously open contexts seen
    pub fn max_open_contexts(&self) -> usize {
        self.max_open
    }

    /// URL loaded in the focused context
    pub fn current_url(&self) -> Option<&str> {
        self.contexts.get(&self.focused).map(String::as_str)
    }

    fn focused_document(&self) -> Result<Document> {
        let url = self
            .contexts
            .get(&self.focused)
            .ok_or_else(|| BrowserError::TabOperationFailed(format!("Context {} is closed", self.focused)))?;
        let html = self.pages.get(url).map(String::as_str).unwrap_or_default();
        Ok(Document::parse(html).with_url(url.clone()))
    }

    /// Look up the interaction target; returns the value of `attribute` on it
    fn target_attribute(&self, target: &Strategy, attribute: &str) -> Result<Option<String>> {
        let document = self.focused_document()?;
        let element = target
            .first(document.root())
            .ok_or_else(|| BrowserError::ElementNotFound(target.to_string()))?;
        Ok(element.value().attr(attribute).map(str::to_string))
    }

    fn require(&self, target: &Strategy) -> Result<()> {
        self.target_attribute(target, "id").map(|_| ())
    }

    fn load(&mut self, url: &str) {
        let url = normalize(url);
        self.interactions.push(Interaction::Navigated(url.clone()));
        if let Some(current) = self.contexts.get_mut(&self.focused) {
            *current = url;
        }
    }
}

impl BrowserControl for FixtureBrowser {
    fn navigate(&mut self, url: &str) -> Result<()> {
        if !self.pages.contains_key(&normalize(url)) {
            return Err(BrowserError::NavigationFailed(format!("No fixture page for {}", url)));
        }
        self.load(url);
        Ok(())
    }

    fn snapshot(&self) -> Result<Document> {
        self.focused_document()
    }

    fn is_live(&self) -> bool {
        false
    }

    fn type_text(&mut self, target: &Strategy, text: &str) -> Result<()> {
        self.require(target)?;
        self.interactions.push(Interaction::Typed {
            target: target.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    fn press_key(&mut self, target: &Strategy, key: &str) -> Result<()> {
        let submit_to = self.target_attribute(target, SUBMIT_ATTRIBUTE)?;
        self.interactions.push(Interaction::Pressed {
            target: target.to_string(),
            key: key.to_string(),
        });
        if key == "Enter" {
            if let Some(next) = submit_to {
                let base = self.current_url().unwrap_or(BLANK_URL).to_string();
                let next = url::Url::parse(&base)
                    .and_then(|base| base.join(&next))
                    .map(String::from)
                    .unwrap_or(next);
                self.load(&next);
            }
        }
        Ok(())
    }

    fn click(&mut self, target: &Strategy) -> Result<()> {
        self.require(target)?;
        self.interactions.push(Interaction::Clicked(target.to_string()));
        Ok(())
    }

    fn open_context(&mut self, url: &str) -> Result<ContextHandle> {
        let handle = ContextHandle::new(format!("ctx-{}", self.next_id));
        self.next_id += 1;
        let url = normalize(url);
        self.contexts.insert(handle.clone(), url.clone());
        self.max_open = self.max_open.max(self.contexts.len());
        self.interactions.push(Interaction::Opened(url.clone()));

        if self.broken.contains(&url) {
            return Err(BrowserError::NavigationFailed(format!("Fixture refuses to load {}", url)));
        }
        Ok(handle)
    }

    fn switch_focus(&mut self, handle: &ContextHandle) -> Result<()> {
        if !self.contexts.contains_key(handle) {
            return Err(BrowserError::TabOperationFailed(format!("No context {}", handle)));
        }
        self.focused = handle.clone();
        Ok(())
    }

    fn close_context(&mut self, handle: &ContextHandle) -> Result<()> {
        if self.contexts.shift_remove(handle).is_none() {
            return Err(BrowserError::TabOperationFailed(format!("No context {}", handle)));
        }
        self.interactions.push(Interaction::Closed(handle.clone()));
        Ok(())
    }

    fn contexts(&self) -> Result<Vec<ContextHandle>> {
        Ok(self.contexts.keys().cloned().collect())
    }

    fn focused(&self) -> Result<ContextHandle> {
        if self.contexts.contains_key(&self.focused) {
            Ok(self.focused.clone())
        } else {
            Err(BrowserError::TabOperationFailed(format!("Focused context {} is closed", self.focused)))
        }
    }
}

fn normalize(url: &str) -> String {
    url::Url::parse(url.trim())
        .map(String::from)
        .unwrap_or_else(|_| url.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: &str = "https://example.test/";

    fn browser() -> FixtureBrowser {
        FixtureBrowser::new()
            .page(
                HOME,
                r#"<html><body><input id="q" data-fixture-submit="/results"><button id="ok">OK</button></body></html>"#,
            )
            .page("https://example.test/results", "<html><body><h1>Results</h1></body></html>")
    }

    #[test]
    fn test_starts_with_one_context() {
        let browser = browser();
        assert_eq!(browser.contexts().unwrap().len(), 1);
        assert_eq!(browser.current_url(), Some(BLANK_URL));
    }

    #[test]
    fn test_navigate_known_and_unknown() {
        let mut browser = browser();
        browser.navigate("https://example.test").unwrap();
        assert_eq!(browser.current_url(), Some(HOME));
        assert!(browser.navigate("https://example.test/missing").is_err());
    }

    #[test]
    fn test_enter_submits() {
        let mut browser = browser();
        browser.navigate(HOME).unwrap();
        let input = Strategy::attribute("#q");
        browser.type_text(&input, "dermatologue").unwrap();
        browser.press_key(&input, "Enter").unwrap();
        assert_eq!(browser.current_url(), Some("https://example.test/results"));
        assert_eq!(browser.snapshot().unwrap().text(), "Results");
    }

    #[test]
    fn test_interaction_on_missing_element_fails() {
        let mut browser = browser();
        browser.navigate(HOME).unwrap();
        let err = browser.click(&Strategy::attribute("#absent")).unwrap_err();
        assert!(matches!(err, BrowserError::ElementNotFound(_)));
    }

    #[test]
    fn test_contexts_lifecycle() {
        let mut browser = browser();
        let origin = browser.focused().unwrap();
        let detail = browser.open_context("https://example.test/results").unwrap();
        assert_eq!(browser.contexts().unwrap(), vec![origin.clone(), detail.clone()]);

        browser.switch_focus(&detail).unwrap();
        assert_eq!(browser.snapshot().unwrap().text(), "Results");

        browser.close_context(&detail).unwrap();
        assert!(browser.focused().is_err());
        browser.switch_focus(&origin).unwrap();
        assert_eq!(browser.contexts().unwrap(), vec![origin]);
        assert_eq!(browser.max_open_contexts(), 2);
    }

    #[test]
    fn test_broken_context_still_opens() {
        let mut browser = browser().broken_context("https://example.test/broken");
        assert!(browser.open_context("https://example.test/broken").is_err());
        assert_eq!(browser.contexts().unwrap().len(), 2);
    }
}
