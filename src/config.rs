use crate::browser::LaunchOptions;
use crate::error::ConfigError;
use crate::locate::WaitPolicy;
use crate::site::DEFAULT_BASE_URL;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Where field values are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Open every candidate's detail page
    #[default]
    Detail,
    /// Read the result card only; no navigation
    Listing,
}

impl FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "detail" => Ok(Self::Detail),
            "listing" => Ok(Self::Listing),
            other => Err(format!("unknown extraction mode '{}' (expected detail or listing)", other)),
        }
    }
}

/// Run options; every field has a default and may be set from a JSON file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeOptions {
    /// Search root; detail references are joined against it
    pub base_url: String,

    pub mode: ExtractionMode,

    /// Bound on each locator strategy's wait, in milliseconds
    pub timeout_ms: u64,

    /// Bound on each strategy of a field once the detail page is ready, in milliseconds
    pub field_timeout_ms: u64,

    /// Delay between two polls of a live page, in milliseconds
    pub poll_interval_ms: u64,

    /// Pause after submitting the search or toggling a filter, in milliseconds
    pub settle_ms: u64,

    /// CSV file written at the end of the run
    pub output: PathBuf,

    /// DevTools WebSocket URL of a running browser; a new one is launched when absent
    pub ws_url: Option<String>,

    pub launch: LaunchOptions,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            mode: ExtractionMode::default(),
            timeout_ms: 10_000,
            field_timeout_ms: 2_000,
            poll_interval_ms: 250,
            settle_ms: 1_500,
            output: PathBuf::from("practitioners.csv"),
            ws_url: None,
            launch: LaunchOptions::default(),
        }
    }
}

impl ScrapeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON file; absent keys keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let options: Self = serde_json::from_str(&raw)?;
        log::debug!("Loaded options from {}", path.display());
        Ok(options)
    }

    /// Builder method: set search root
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder method: set extraction mode
    pub fn mode(mut self, mode: ExtractionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder method: set per-strategy timeout in milliseconds
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Builder method: set settle pause in milliseconds
    pub fn settle_ms(mut self, settle_ms: u64) -> Self {
        self.settle_ms = settle_ms;
        self
    }

    /// Builder method: set output path
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::new(Duration::from_millis(self.timeout_ms)).interval(Duration::from_millis(self.poll_interval_ms))
    }

    /// Wait applied to field chains; never longer than the general wait
    pub fn field_policy(&self) -> WaitPolicy {
        WaitPolicy::new(Duration::from_millis(self.field_timeout_ms.min(self.timeout_ms)))
            .interval(Duration::from_millis(self.poll_interval_ms))
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}
