//! Selector resolution
//!
//! Ordered fallback chains of locator strategies and the single generic
//! resolver that evaluates them:
//! - Strategy / Relation: one locator attempt and its match kind
//! - Chain: an ordered, non-empty list of strategies
//! - resolve / resolve_where: poll a surface strategy by strategy until one matches

pub mod resolver;
pub mod strategy;

pub use resolver::{Located, Surface, WaitPolicy, resolve, resolve_where};
pub use strategy::{Chain, LiveQuery, Relation, Strategy};
