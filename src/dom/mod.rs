//! Document snapshots
//!
//! Every lookup in this crate runs against an owned, parsed snapshot of a page
//! or of a single result card:
//! - Document: a parsed HTML snapshot, optionally tagged with the URL it came from
//! - rendered_text: browser-like visible text of an element

pub mod document;
pub mod text;

pub use document::Document;
pub use text::rendered_text;
