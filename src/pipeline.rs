//! The sequential run loop
//!
//! search → discovery → per candidate (reference, detail page, extraction,
//! filter) → ordered result set. One candidate failing never stops the run;
//! cancellation stops it between steps and keeps what was gathered.

use crate::browser::{BrowserControl, Focused};
use crate::config::{ExtractionMode, ScrapeOptions};
use crate::criteria::SearchCriteria;
use crate::discovery::{CandidateEntry, discover};
use crate::error::{CandidateError, Result};
use crate::extract::{Extraction, FieldExtractor, ResultSet};
use crate::filter::include;
use crate::navigator::{join_reference, open_detail, resolve_reference, restore_contexts};
use crate::search::SearchDriver;
use crate::site::SiteProfile;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared stop request, set from another thread (e.g. a Ctrl-C handler)
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Counters describing one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Cards found on the listing
    pub discovered: usize,
    /// Candidates whose processing started
    pub processed: usize,
    pub kept: usize,
    /// Extracted but rejected by the address keyword
    pub filtered_out: usize,
    /// No usable detail reference on the card
    pub reference_missing: usize,
    /// Detail page never became ready
    pub open_failed: usize,
    pub browser_errors: usize,
    /// Stopped by cancellation before every candidate was processed
    pub interrupted: bool,
}

/// Records kept by a run and how the run went
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub results: ResultSet,
    pub summary: RunSummary,
}

/// Runs a search and extracts the practitioners it lists
pub struct Scraper<'p> {
    profile: &'p SiteProfile,
    options: &'p ScrapeOptions,
    cancel: CancelFlag,
}

impl<'p> Scraper<'p> {
    pub fn new(profile: &'p SiteProfile, options: &'p ScrapeOptions) -> Self {
        Self {
            profile,
            options,
            cancel: CancelFlag::new(),
        }
    }

    /// Builder method: observe an externally owned cancel flag
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the whole search.
    ///
    /// Fails only when the search root cannot be loaded or the origin context
    /// cannot be identified; everything later degrades to skipped candidates.
    pub fn run<B: BrowserControl + ?Sized>(&self, browser: &mut B, criteria: &SearchCriteria) -> Result<RunReport> {
        let mut report = RunReport::default();
        if criteria.price_range.is_some() {
            log::warn!("Price range accepted but not enforced; records are not filtered by price");
        }
        if criteria.date_range.is_some() {
            log::warn!("Date range accepted but not enforced; records are not filtered by availability date");
        }
        if self.cancel.is_cancelled() {
            report.summary.interrupted = true;
            return Ok(report);
        }

        let policy = self.options.wait_policy();
        SearchDriver::new(self.profile, policy, self.options.settle()).submit(browser, &self.options.base_url, criteria)?;

        let origin = browser.focused()?;
        let baseline = browser.contexts()?;

        let candidates = discover(&Focused(&*browser), &self.profile.cards, policy);
        report.summary.discovered = candidates.len();
        let total = candidates.len().min(criteria.max_results.get());

        for candidate in candidates.into_iter().take(total) {
            if self.cancel.is_cancelled() {
                report.summary.interrupted = true;
                break;
            }
            report.summary.processed += 1;
            log::info!("Processing result {}/{}", candidate.position + 1, total);

            let outcome = match self.options.mode {
                ExtractionMode::Detail => self.process_detail(browser, &candidate),
                ExtractionMode::Listing => Ok(Some(self.process_card(&candidate))),
            };

            match outcome {
                Ok(Some(extraction)) => {
                    if include(&extraction.record, criteria) {
                        report.results.push(extraction.record);
                        report.summary.kept += 1;
                    } else {
                        log::info!("Filtered out {:?} (address keyword)", extraction.record.name);
                        report.summary.filtered_out += 1;
                    }
                }
                Ok(None) => report.summary.interrupted = true,
                Err(e) => self.record_skip(&mut report.summary, &candidate, e),
            }

            if self.options.mode == ExtractionMode::Detail {
                if let Err(e) = restore_contexts(browser, &origin, &baseline) {
                    log::error!("Lost the results page ({}); stopping with partial results", e);
                    break;
                }
            }
            if report.summary.interrupted {
                break;
            }
        }

        let summary = &report.summary;
        log::info!(
            "Run finished: {} kept, {} filtered out, {} without reference, {} failed to open, {} browser errors (of {} discovered){}",
            summary.kept,
            summary.filtered_out,
            summary.reference_missing,
            summary.open_failed,
            summary.browser_errors,
            summary.discovered,
            if summary.interrupted { ", interrupted" } else { "" }
        );
        Ok(report)
    }

    /// Open the candidate's detail page and extract it; `None` when cancelled midway
    fn process_detail<B: BrowserControl + ?Sized>(
        &self,
        browser: &mut B,
        candidate: &CandidateEntry,
    ) -> std::result::Result<Option<Extraction>, CandidateError> {
        let reference = resolve_reference(candidate, self.profile).ok_or(CandidateError::ReferenceMissing)?;
        let url = join_reference(&self.options.base_url, &reference)?;
        log::debug!("Candidate {} from {:?} links to {}", candidate.position, candidate.listing_url(), url);

        if self.cancel.is_cancelled() {
            return Ok(None);
        }
        let detail = open_detail(browser, &url, &self.profile.detail_ready, self.options.wait_policy())?;

        if self.cancel.is_cancelled() {
            if let Err(e) = detail.close() {
                log::warn!("Failed to close detail page {}: {}", url, e);
            }
            return Ok(None);
        }
        let extraction = FieldExtractor::new(&self.profile.detail_fields, &self.profile.vocabulary, self.options.field_policy())
            .extract(&detail);
        if let Err(e) = detail.close() {
            log::warn!("Failed to close detail page {}: {}", url, e);
        }
        Ok(Some(extraction))
    }

    /// Extract straight from the result card
    fn process_card(&self, candidate: &CandidateEntry) -> Extraction {
        FieldExtractor::new(&self.profile.listing_fields, &self.profile.vocabulary, self.options.field_policy())
            .extract(&candidate.card)
    }

    fn record_skip(&self, summary: &mut RunSummary, candidate: &CandidateEntry, error: CandidateError) {
        log::warn!("Skipping result {}: {}", candidate.position + 1, error);
        match error {
            CandidateError::ReferenceMissing => {
                log::debug!("Card without reference: {}", candidate.card.to_html());
                summary.reference_missing += 1;
            }
            CandidateError::InvalidReference { .. } => summary.reference_missing += 1,
            CandidateError::OpenFailed { .. } => summary.open_failed += 1,
            CandidateError::Browser(_) => summary.browser_errors += 1,
        }
    }
}
