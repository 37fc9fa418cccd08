//! Browser control
//!
//! The pipeline drives a browser only through [`BrowserControl`]. Two
//! implementations ship with the crate:
//! - [`BrowserSession`]: a Chrome/Chromium instance over CDP (headless_chrome)
//! - [`FixtureBrowser`]: canned in-memory pages, for tests and offline replay

pub mod config;
pub mod fixture;
pub mod session;

pub use config::{ConnectionOptions, LaunchOptions};
pub use fixture::FixtureBrowser;
pub use session::BrowserSession;

use crate::dom::Document;
use crate::error::Result;
use crate::locate::{Strategy, Surface};
use std::fmt;

/// Opaque identifier of one browsing context (tab)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextHandle(String);

impl ContextHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Primitives the extraction engine needs from a browser.
///
/// Page reads go through [`BrowserControl::snapshot`] of the focused context;
/// interactions target the first element matched by a strategy.
pub trait BrowserControl {
    /// Load `url` in the focused context and wait for the navigation to settle
    fn navigate(&mut self, url: &str) -> Result<()>;

    /// Snapshot of the focused context's current document
    fn snapshot(&self) -> Result<Document>;

    /// Whether snapshots can change between two calls without an interaction
    fn is_live(&self) -> bool {
        true
    }

    /// Clear the targeted input and type `text` into it
    fn type_text(&mut self, target: &Strategy, text: &str) -> Result<()>;

    /// Focus the targeted element and press a named key ("Enter", "ArrowDown")
    fn press_key(&mut self, target: &Strategy, key: &str) -> Result<()>;

    fn click(&mut self, target: &Strategy) -> Result<()>;

    /// Open `url` in a new context. Focus does not move.
    fn open_context(&mut self, url: &str) -> Result<ContextHandle>;

    fn switch_focus(&mut self, handle: &ContextHandle) -> Result<()>;

    fn close_context(&mut self, handle: &ContextHandle) -> Result<()>;

    /// Open contexts in opening order
    fn contexts(&self) -> Result<Vec<ContextHandle>>;

    fn focused(&self) -> Result<ContextHandle>;
}

/// The focused context of a browser, seen as a pollable [`Surface`]
pub struct Focused<'a, B: ?Sized>(pub &'a B);

impl<B: BrowserControl + ?Sized> Surface for Focused<'_, B> {
    fn snapshot(&self) -> Result<Document> {
        self.0.snapshot()
    }

    fn is_live(&self) -> bool {
        self.0.is_live()
    }
}
