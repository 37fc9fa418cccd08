//! practitioner-scrape
//!
//! Searches the practitioner site, extracts every listed practitioner and
//! writes the results to CSV. Ctrl-C stops after the current step and still
//! saves what was gathered.

use anyhow::{Context, bail};
use clap::Parser;
use practitioner_scrape::export::export;
use practitioner_scrape::{
    BrowserSession, CancelFlag, ConnectionOptions, ConsultationMode, ExtractionMode, RunReport, ScrapeOptions,
    Scraper, SearchCriteria, Sector, SiteProfile,
};
use std::io::{self, BufRead, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "practitioner-scrape")]
#[command(version)]
#[command(about = "Extract practitioner records from a medical search site to CSV", long_about = None)]
struct Cli {
    /// Medical query, e.g. "dermatologue"
    #[arg(long, short = 'q')]
    query: Option<String>,

    /// Postal code or city
    #[arg(long, short = 'l')]
    location: Option<String>,

    /// Maximum number of results to process
    #[arg(long, short = 'n')]
    max_results: Option<NonZeroUsize>,

    /// "secteur 1", "secteur 2" or "non conventionné"
    #[arg(long)]
    sector: Option<String>,

    /// "en visio" or "sur place"
    #[arg(long)]
    consultation: Option<String>,

    /// Keep only practitioners whose street or city contains this text
    #[arg(long, value_name = "KEYWORD")]
    address: Option<String>,

    /// Minimum price in euros (accepted, not enforced)
    #[arg(long)]
    price_min: Option<String>,

    /// Maximum price in euros (accepted, not enforced)
    #[arg(long)]
    price_max: Option<String>,

    /// Start date, DD/MM/YYYY (accepted, not enforced)
    #[arg(long)]
    date_start: Option<String>,

    /// End date, DD/MM/YYYY (accepted, not enforced)
    #[arg(long)]
    date_end: Option<String>,

    /// Ask on stdin for every criterion not given as a flag
    #[arg(long, short = 'i')]
    interactive: bool,

    /// JSON options file
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,

    /// "detail" (open each profile page) or "listing" (read result cards only)
    #[arg(long)]
    mode: Option<ExtractionMode>,

    /// CSV output path
    #[arg(long, short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,

    /// Search root URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Per-strategy wait in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<PathBuf>,

    /// Persistent browser profile directory
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// WebSocket endpoint URL for remote browser connection
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,
}

impl Cli {
    fn options(&self) -> anyhow::Result<ScrapeOptions> {
        let mut options = match &self.config {
            Some(path) => ScrapeOptions::from_json_file(path)
                .with_context(|| format!("Failed to load options from {}", path.display()))?,
            None => ScrapeOptions::default(),
        };

        if let Some(mode) = self.mode {
            options.mode = mode;
        }
        if let Some(output) = &self.output {
            options.output = output.clone();
        }
        if let Some(base_url) = &self.base_url {
            options.base_url = base_url.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            options.timeout_ms = timeout_ms;
        }
        if self.headed {
            options.launch.headless = false;
        }
        if let Some(path) = &self.executable_path {
            options.launch.chrome_path = Some(path.clone());
        }
        if let Some(dir) = &self.user_data_dir {
            options.launch.user_data_dir = Some(dir.clone());
        }
        if let Some(ws) = &self.ws_endpoint {
            options.ws_url = Some(ws.clone());
        }
        Ok(options)
    }

    fn criteria(&self) -> anyhow::Result<SearchCriteria> {
        let mut prompter = Prompter::new(self.interactive);

        let query = prompter.value(&self.query, "Medical query (e.g. dermatologue, généraliste)")?;
        if query.is_empty() {
            bail!("A query is required (--query, or --interactive to be asked)");
        }
        let location = prompter.value(&self.location, "Location (postal code or city, e.g. 75001)")?;

        let max_results = match self.max_results {
            Some(n) => n,
            None => {
                let raw = prompter.value(&None, "Maximum number of results")?;
                if raw.is_empty() {
                    SearchCriteria::DEFAULT_MAX_RESULTS
                } else {
                    raw.parse().with_context(|| format!("'{}' is not a positive number", raw))?
                }
            }
        };

        let sector = prompter.value(&self.sector, "Sector (secteur 1, secteur 2, non conventionné)")?;
        let consultation = prompter.value(&self.consultation, "Consultation (en visio or sur place)")?;
        let address = prompter.value(&self.address, "Address keyword")?;
        let price_min = prompter.value(&self.price_min, "Minimum price (€)")?;
        let price_max = prompter.value(&self.price_max, "Maximum price (€)")?;
        let date_start = prompter.value(&self.date_start, "Start date (DD/MM/YYYY)")?;
        let date_end = prompter.value(&self.date_end, "End date (DD/MM/YYYY)")?;

        Ok(SearchCriteria::new(query, location)
            .max_results(max_results)
            .sector(Sector::parse_loose(&sector))
            .consultation(ConsultationMode::parse_loose(&consultation))
            .address_keyword(address)
            .price_range(&price_min, &price_max)
            .date_range(&date_start, &date_end))
    }
}

/// Reads missing values from stdin when interactive; blank otherwise
struct Prompter {
    interactive: bool,
    stdin: io::StdinLock<'static>,
}

impl Prompter {
    fn new(interactive: bool) -> Self {
        Self {
            interactive,
            stdin: io::stdin().lock(),
        }
    }

    fn value(&mut self, given: &Option<String>, label: &str) -> anyhow::Result<String> {
        if let Some(value) = given {
            return Ok(value.trim().to_string());
        }
        if !self.interactive {
            return Ok(String::new());
        }
        eprint!("{}: ", label);
        io::stderr().flush()?;
        let mut line = String::new();
        self.stdin.read_line(&mut line).context("Failed to read from stdin")?;
        Ok(line.trim().to_string())
    }
}

fn run(options: &ScrapeOptions, criteria: &SearchCriteria, cancel: CancelFlag) -> anyhow::Result<RunReport> {
    let mut browser = match &options.ws_url {
        Some(ws) => BrowserSession::connect(ConnectionOptions::new(ws.clone()))?,
        None => BrowserSession::launch(options.launch.clone())?,
    };
    let profile = SiteProfile::default();
    let report = Scraper::new(&profile, options)
        .with_cancel(cancel)
        .run(&mut browser, criteria)
        .context("Search failed")?;
    Ok(report)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let options = cli.options()?;
    let criteria = cli.criteria()?;
    log::debug!("Criteria: {:?}", criteria);

    let cancel = CancelFlag::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted; stopping after the current step and saving partial results");
            on_signal.cancel();
        }
    });

    let output = options.output.clone();
    let report = tokio::task::spawn_blocking(move || run(&options, &criteria, cancel)).await??;

    export(&output, &report.results).with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "{} practitioners saved to {}{}",
        report.results.len(),
        output.display(),
        if report.summary.interrupted { " (interrupted)" } else { "" }
    );
    Ok(())
}
