use crate::error::MalformedDate;
use chrono::NaiveDate;
use std::fmt;
use std::num::NonZeroUsize;

/// Date format accepted for date criteria (day/month/year)
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Reimbursement sector requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sector {
    One,
    Two,
    NonContracted,
    #[default]
    Unspecified,
}

impl Sector {
    /// Lenient parse of free text: "secteur 1", "sector 2", "1", "non conventionné", ...
    pub fn parse_loose(input: &str) -> Self {
        let normalized = input.trim().to_lowercase();
        if normalized.is_empty() {
            return Self::Unspecified;
        }
        if normalized.contains("non") {
            return Self::NonContracted;
        }
        match normalized.trim_start_matches("secteur").trim_start_matches("sector").trim() {
            "1" => Self::One,
            "2" => Self::Two,
            _ => Self::Unspecified,
        }
    }

    /// Value written to the sector column for this sector
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::One => Some("1"),
            Self::Two => Some("2"),
            Self::NonContracted => Some("non-contracted"),
            Self::Unspecified => None,
        }
    }
}

/// Consultation mode requested by the user, or derived from a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsultationMode {
    Remote,
    InPerson,
    #[default]
    Unspecified,
}

impl ConsultationMode {
    /// Lenient parse of free text: "en visio", "remote", "sur place", "in-person", ...
    pub fn parse_loose(input: &str) -> Self {
        let normalized = input.trim().to_lowercase();
        const REMOTE: &[&str] = &["visio", "remote", "téléconsult", "teleconsult", "video"];
        const IN_PERSON: &[&str] = &["sur place", "in-person", "in person", "cabinet", "on site"];
        if REMOTE.iter().any(|k| normalized.contains(k)) {
            Self::Remote
        } else if IN_PERSON.iter().any(|k| normalized.contains(k)) {
            Self::InPerson
        } else {
            Self::Unspecified
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::InPerson => "in-person",
            Self::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for ConsultationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Price bounds in euros; either side may be open
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    /// Build from raw user text; blank bounds are open, unparsable bounds are dropped.
    /// Returns `None` when both bounds end up open.
    pub fn parse(min: &str, max: &str) -> Option<Self> {
        let range = Self {
            min: parse_amount(min),
            max: parse_amount(max),
        };
        (range.min.is_some() || range.max.is_some()).then_some(range)
    }
}

fn parse_amount(input: &str) -> Option<f64> {
    let trimmed = input.trim().trim_end_matches('€').trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.replace(',', ".").parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Some(value),
        _ => {
            log::warn!("Ignoring unparsable price bound '{}'", input.trim());
            None
        }
    }
}

/// Inclusive date window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Parse both bounds as DD/MM/YYYY. Both blank means no range.
    pub fn parse(start: &str, end: &str) -> Result<Option<Self>, MalformedDate> {
        let (start, end) = (start.trim(), end.trim());
        if start.is_empty() && end.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self {
            start: parse_date(start)?,
            end: parse_date(end)?,
        }))
    }
}

fn parse_date(input: &str) -> Result<NaiveDate, MalformedDate> {
    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| MalformedDate {
        input: input.to_string(),
    })
}

/// What to search for and how to narrow the results
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    pub query: String,
    pub location: String,
    pub max_results: NonZeroUsize,
    pub sector: Sector,
    pub consultation: ConsultationMode,
    pub address_keyword: Option<String>,
    /// Accepted but not enforced against extracted records
    pub price_range: Option<PriceRange>,
    /// Accepted but not enforced against extracted records
    pub date_range: Option<DateRange>,
}

impl SearchCriteria {
    pub const DEFAULT_MAX_RESULTS: NonZeroUsize = match NonZeroUsize::new(10) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// Create criteria with default narrowing options
    pub fn new(query: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            location: location.into(),
            max_results: Self::DEFAULT_MAX_RESULTS,
            sector: Sector::Unspecified,
            consultation: ConsultationMode::Unspecified,
            address_keyword: None,
            price_range: None,
            date_range: None,
        }
    }

    /// Builder method: cap the number of candidates processed
    pub fn max_results(mut self, max: NonZeroUsize) -> Self {
        self.max_results = max;
        self
    }

    /// Builder method: set sector
    pub fn sector(mut self, sector: Sector) -> Self {
        self.sector = sector;
        self
    }

    /// Builder method: set consultation mode
    pub fn consultation(mut self, mode: ConsultationMode) -> Self {
        self.consultation = mode;
        self
    }

    /// Builder method: set address keyword; blank text clears it
    pub fn address_keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        let keyword = keyword.trim();
        self.address_keyword = (!keyword.is_empty()).then(|| keyword.to_string());
        self
    }

    /// Builder method: set price range from raw text
    pub fn price_range(mut self, min: &str, max: &str) -> Self {
        self.price_range = PriceRange::parse(min, max);
        self
    }

    /// Builder method: set date range from raw DD/MM/YYYY text.
    ///
    /// A malformed bound disables date filtering for the whole run.
    pub fn date_range(mut self, start: &str, end: &str) -> Self {
        self.date_range = match DateRange::parse(start, end) {
            Ok(range) => range,
            Err(e) => {
                log::warn!("{}; date filtering disabled", e);
                None
            }
        };
        self
    }
}
