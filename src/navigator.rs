//! Detail navigation
//!
//! Turns a result card into an open, ready detail page and guarantees the
//! page is closed again, focus back on the listing, whatever happens while it
//! is open.

use crate::browser::{BrowserControl, ContextHandle};
use crate::discovery::CandidateEntry;
use crate::dom::Document;
use crate::error::{BrowserError, CandidateError, Result};
use crate::locate::{Chain, Surface, WaitPolicy, resolve};
use crate::site::SiteProfile;
use scraper::ElementRef;
use url::Url;

/// Find the detail-page reference carried by a card.
///
/// Tried in order: the profile's link chain (`href`, else `data-href`), an
/// anchor wrapping a heading, then any anchor whose reference contains an
/// allow-listed path. Script pseudo-links are never returned.
pub fn resolve_reference(candidate: &CandidateEntry, profile: &SiteProfile) -> Option<String> {
    let root = candidate.card.root();

    for (position, strategy) in profile.reference_links.iter().enumerate() {
        if let Some(reference) = strategy.select(root).into_iter().find_map(|anchor| usable_reference(&anchor)) {
            log::debug!("Candidate {}: reference from link strategy #{}", candidate.position, position);
            return Some(reference);
        }
    }

    if let Some(reference) = profile
        .reference_heading
        .select(root)
        .into_iter()
        .find_map(|anchor| usable_reference(&anchor))
    {
        log::debug!("Candidate {}: reference from heading anchor", candidate.position);
        return Some(reference);
    }

    root.descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "a")
        .filter_map(|anchor| anchor.value().attr("href").map(str::trim))
        .find(|href| {
            !href.is_empty()
                && !is_script(href)
                && profile.reference_allow_list.iter().any(|path| href.contains(path.as_str()))
        })
        .map(str::to_string)
}

fn usable_reference(anchor: &ElementRef<'_>) -> Option<String> {
    let element = anchor.value();
    let reference = [element.attr("href"), element.attr("data-href")]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|reference| !reference.is_empty())?;
    (!is_script(reference)).then(|| reference.to_string())
}

fn is_script(reference: &str) -> bool {
    reference.to_ascii_lowercase().starts_with("javascript")
}

/// Resolve `reference` against `base`; absolute references are kept as they are
pub fn join_reference(base: &str, reference: &str) -> std::result::Result<String, CandidateError> {
    let invalid = |reason: String| CandidateError::InvalidReference {
        reference: reference.to_string(),
        reason,
    };
    let base = Url::parse(base).map_err(|e| invalid(format!("bad base URL '{}': {}", base, e)))?;
    let joined = base.join(reference).map_err(|e| invalid(e.to_string()))?;
    match joined.scheme() {
        "http" | "https" | "data" | "file" => Ok(joined.into()),
        scheme => Err(invalid(format!("unsupported scheme '{}'", scheme))),
    }
}

/// An open detail page.
///
/// Holds the browser until it is closed; closing (explicitly or on drop)
/// closes the page's context and focuses the origin context again.
pub struct DetailContext<'b, B: BrowserControl + ?Sized> {
    browser: &'b mut B,
    origin: ContextHandle,
    handle: ContextHandle,
    url: String,
    released: bool,
}

impl<'b, B: BrowserControl + ?Sized> DetailContext<'b, B> {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn handle(&self) -> &ContextHandle {
        &self.handle
    }

    /// Close the page and refocus the origin, reporting the first failure
    pub fn close(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        let closed = self.browser.close_context(&self.handle);
        let refocused = self.browser.switch_focus(&self.origin);
        log::debug!("Closed detail context {} ({})", self.handle, self.url);
        closed.and(refocused)
    }
}

impl<B: BrowserControl + ?Sized> Drop for DetailContext<'_, B> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::warn!("Failed to release detail context {}: {}", self.handle, e);
        }
    }
}

impl<B: BrowserControl + ?Sized> Surface for DetailContext<'_, B> {
    fn snapshot(&self) -> Result<Document> {
        self.browser.snapshot()
    }

    fn is_live(&self) -> bool {
        self.browser.is_live()
    }
}

/// Open `url` in a new context, focus it and wait for `ready` to appear.
///
/// On any failure the new context is closed and the origin refocused before
/// returning.
pub fn open_detail<'b, B: BrowserControl + ?Sized>(
    browser: &'b mut B,
    url: &str,
    ready: &Chain,
    policy: WaitPolicy,
) -> std::result::Result<DetailContext<'b, B>, CandidateError> {
    let origin = browser.focused()?;
    let handle = browser.open_context(url).map_err(|e| {
        log::debug!("Opening {} failed: {}", url, e);
        CandidateError::OpenFailed { url: url.to_string() }
    })?;

    let context = DetailContext {
        browser,
        origin,
        handle,
        url: url.to_string(),
        released: false,
    };
    context.browser.switch_focus(&context.handle)?;

    if resolve(&context, ready, policy).is_none() {
        return Err(CandidateError::OpenFailed { url: url.to_string() });
    }
    Ok(context)
}

/// Close every context missing from `baseline` and focus `origin`.
///
/// Returns how many stray contexts were closed.
pub fn restore_contexts<B: BrowserControl + ?Sized>(
    browser: &mut B,
    origin: &ContextHandle,
    baseline: &[ContextHandle],
) -> Result<usize> {
    let strays: Vec<ContextHandle> = browser
        .contexts()?
        .into_iter()
        .filter(|handle| !baseline.contains(handle))
        .collect();

    for stray in &strays {
        log::warn!("Closing stray context {}", stray);
        if let Err(e) = browser.close_context(stray) {
            log::warn!("Failed to close stray context {}: {}", stray, e);
        }
    }

    if browser.focused().ok().as_ref() != Some(origin) {
        browser
            .switch_focus(origin)
            .map_err(|e| BrowserError::TabOperationFailed(format!("Cannot refocus origin {}: {}", origin, e)))?;
    }
    Ok(strays.len())
}
