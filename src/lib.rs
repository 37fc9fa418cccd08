//! # practitioner-scrape
//!
//! Extracts practitioner records (name, next availability, consultation mode,
//! reimbursement sector, price, address) from a medical search site through
//! Chrome DevTools Protocol (CDP), and writes them to CSV.
//!
//! The site's markup changes often. Every element is therefore located through
//! an ordered chain of fallback strategies, each field is extracted on its own,
//! and a record is kept even when most of its fields are missing.
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use practitioner_scrape::{BrowserSession, LaunchOptions, Scraper, ScrapeOptions, SearchCriteria, SiteProfile};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut browser = BrowserSession::launch(LaunchOptions::default())?;
//! let profile = SiteProfile::default();
//! let options = ScrapeOptions::default();
//!
//! let criteria = SearchCriteria::new("dermatologue", "75015").address_keyword("Paris");
//! let report = Scraper::new(&profile, &options).run(&mut browser, &criteria)?;
//!
//! practitioner_scrape::export::export(&options.output, &report.results)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`locate`]: fallback chains and the resolver that polls them
//! - [`dom`]: parsed page snapshots and rendered text
//! - [`site`]: every site-specific selector and keyword
//! - [`browser`]: the browser-control trait, Chrome session and in-memory fixture
//! - [`search`], [`discovery`], [`navigator`], [`extract`], [`filter`]: the pipeline stages
//! - [`pipeline`]: the run loop, cancellation and run summary
//! - [`export`]: CSV output
//! - [`error`]: Error types and result aliases

pub mod browser;
pub mod config;
pub mod criteria;
pub mod discovery;
pub mod dom;
pub mod error;
pub mod export;
pub mod extract;
pub mod filter;
pub mod locate;
pub mod navigator;
pub mod pipeline;
pub mod search;
pub mod site;

pub use browser::{BrowserControl, BrowserSession, ConnectionOptions, ContextHandle, FixtureBrowser, LaunchOptions};
pub use config::{ExtractionMode, ScrapeOptions};
pub use criteria::{ConsultationMode, DateRange, PriceRange, SearchCriteria, Sector};
pub use dom::Document;
pub use error::{BrowserError, CandidateError, ConfigError, ExportError, MalformedDate, Result};
pub use extract::{PractitionerRecord, ResultSet};
pub use locate::{Chain, Strategy, WaitPolicy};
pub use pipeline::{CancelFlag, RunReport, RunSummary, Scraper};
pub use site::SiteProfile;
