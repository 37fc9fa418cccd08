//! Locator chains for the practitioner search site.
//!
//! Everything that depends on the site's markup or wording lives here. When the
//! site changes, capture a sample page, update the chains below and add a
//! fixture test; the rest of the pipeline stays untouched.

use crate::criteria::{ConsultationMode, Sector};
use crate::locate::{Chain, Strategy};

pub const DEFAULT_BASE_URL: &str = "https://www.doctolib.fr";

/// Search form on the landing page
#[derive(Debug, Clone)]
pub struct SearchForm {
    /// Cookie banner buttons; every one present is clicked
    pub cookie_buttons: Vec<Strategy>,
    pub location_input: Chain,
    pub query_input: Chain,
}

/// Fields of a practitioner page or card
#[derive(Debug, Clone)]
pub struct FieldChains {
    pub name: Chain,
    pub availability: Chain,
    pub specialty: Chain,
    pub address: Chain,
    /// Text-bearing elements scanned for a price, in document order
    pub price: Chain,
}

/// Wording the extractor classifies on
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Lowercase markers of a remote consultation
    pub remote_keywords: Vec<String>,
    pub sector_one: String,
    pub sector_two: String,
    /// Lowercase, hyphens replaced by spaces
    pub non_contracted: String,
    pub currency_symbol: char,
}

/// Every site-specific locator and marker
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub search_form: SearchForm,
    /// Result cards on the listing page
    pub cards: Chain,
    /// Detail links inside a card, tried before the structural fallbacks
    pub reference_links: Chain,
    /// Anchor wrapping a heading inside a card
    pub reference_heading: Strategy,
    /// Path fragments accepted by the last-resort anchor scan
    pub reference_allow_list: Vec<String>,
    /// Marker that a detail page has rendered
    pub detail_ready: Chain,
    pub detail_fields: FieldChains,
    pub listing_fields: FieldChains,
    pub vocabulary: Vocabulary,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            search_form: SearchForm {
                cookie_buttons: vec![
                    Strategy::attribute("#didomi-notice-disagree-button"),
                    Strategy::attribute("#didomi-notice-agree-button"),
                    Strategy::attribute("button[aria-label='close']"),
                ],
                location_input: Chain::new(
                    "location input",
                    Strategy::attribute("input[data-testid='search-bar-location-input']"),
                )
                .or_attributes([
                    "input[aria-label*='localisation']",
                    "input[placeholder*='Votre ville']",
                    "input[placeholder*='Code postal']",
                    "input[placeholder*='Où ?']",
                ]),
                query_input: Chain::new(
                    "search input",
                    Strategy::attribute("input[placeholder*='Nom, spécialité, établissement']"),
                )
                .or_attributes(["#search-bar-main", "input[aria-label*='Rechercher']"])
                .or(Strategy::tag("input")),
            },
            cards: Chain::new("result cards", Strategy::attribute("div[data-test-id='search-result-card']")).or_attributes([
                "div[data-testid='search-result-card']",
                "div[data-test-id*='search-result']",
                "div[data-testid*='search-result']",
                "div.dl-card",
                "li.search-result",
                "div.search-result-card",
            ]),
            reference_links: Chain::new("detail link", Strategy::attribute("a[data-testid='practitioner-name']")).or_attributes([
                "a[data-test-id='search-result-card-practitioner-name']",
                "a[href*='/medecin/']",
                "a[href*='/medecin-generaliste/']",
                "a[href*='/praticien/']",
                "a[href*='/sante/']",
                "a[href^='/']",
            ]),
            reference_heading: Strategy::wrapping("a", "h1, h2, h3, h4"),
            reference_allow_list: ["/medecin/", "/praticien/", "/sante/"].into_iter().map(String::from).collect(),
            detail_ready: Chain::new("detail heading", Strategy::tag("h1")),
            detail_fields: FieldChains {
                name: Chain::new("name", Strategy::tag("h1"))
                    .or_attributes(["h1[data-testid='practitioner-name']", "h1[itemprop='name']"]),
                availability: Chain::new("availability", Strategy::attribute("div[data-testid='next-availability']"))
                    .or_attributes(["div[data-test-id='search-result-availability']", "div.availability"])
                    .or(Strategy::containing_text("div", ["Prochaine", "Prochain"])),
                specialty: Chain::new("specialty", Strategy::attribute("div[data-testid='speciality']"))
                    .or_attributes(["div[data-test-id='search-result-card-content']", "div.speciality", "p.speciality"]),
                address: Chain::new("address", Strategy::attribute("div[data-testid='address']"))
                    .or_attributes(["div[data-test-id='search-result-card-address']", "address", "p.address"]),
                price: Chain::new("price", Strategy::tag("span, p, div")),
            },
            listing_fields: FieldChains {
                name: Chain::new("name", Strategy::attribute("a[data-testid='practitioner-name']"))
                    .or_attributes(["a[data-test-id='search-result-card-practitioner-name']"])
                    .or(Strategy::tag("h2"))
                    .or(Strategy::tag("h3")),
                availability: Chain::new("availability", Strategy::attribute("div[data-testid='next-availability']"))
                    .or_attributes(["div[data-test-id='search-result-availability']", "div.availability"]),
                specialty: Chain::new("specialty", Strategy::attribute("div[data-testid='speciality']"))
                    .or_attributes(["div[data-test-id='search-result-card-content']"]),
                address: Chain::new("address", Strategy::attribute("div[data-testid='address']"))
                    .or_attributes(["div[data-test-id='search-result-card-address']"]),
                price: Chain::new("price", Strategy::tag("span")),
            },
            vocabulary: Vocabulary {
                remote_keywords: vec!["téléconsult".to_string()],
                sector_one: "Secteur 1".to_string(),
                sector_two: "Secteur 2".to_string(),
                non_contracted: "non conventionné".to_string(),
                currency_symbol: '€',
            },
        }
    }
}

impl SiteProfile {
    /// On-page toggle narrowing results to a sector, if the criterion asks for one
    pub fn sector_toggle(&self, sector: Sector) -> Option<Strategy> {
        let label = match sector {
            Sector::One => "Secteur 1",
            Sector::Two => "Secteur 2",
            Sector::NonContracted => "Non conventionné",
            Sector::Unspecified => return None,
        };
        Some(Strategy::containing_text("span", [label]))
    }

    /// On-page toggle narrowing results to a consultation mode
    pub fn consultation_toggle(&self, mode: ConsultationMode) -> Option<Strategy> {
        let label = match mode {
            ConsultationMode::Remote => "Téléconsultation",
            ConsultationMode::InPerson => "En cabinet",
            ConsultationMode::Unspecified => return None,
        };
        Some(Strategy::containing_text("span", [label]))
    }

    /// Every chain in the profile, for validation
    pub fn chains(&self) -> Vec<&Chain> {
        let mut chains = vec![
            &self.search_form.location_input,
            &self.search_form.query_input,
            &self.cards,
            &self.reference_links,
            &self.detail_ready,
        ];
        for fields in [&self.detail_fields, &self.listing_fields] {
            chains.extend([&fields.name, &fields.availability, &fields.specialty, &fields.address, &fields.price]);
        }
        chains
    }
}
