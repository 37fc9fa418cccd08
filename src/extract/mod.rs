//! Field extraction
//!
//! Each output field is resolved on its own: a field whose chain is exhausted
//! comes back empty while the remaining fields are still extracted.

pub mod normalize;
pub mod record;

pub use normalize::{Address, classify_sector, consultation_mode, is_price, split_address};
pub use record::{PractitionerRecord, ResultSet, UNAVAILABLE};

use crate::dom::rendered_text;
use crate::locate::{Chain, Surface, WaitPolicy, resolve, resolve_where};
use crate::site::{FieldChains, Vocabulary};
use scraper::ElementRef;

/// Where a field's value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// Strategy at this position of the field's chain
    Strategy(usize),
    /// Computed from the whole scope
    Derived,
    /// Chain exhausted; a default value was used
    Defaulted,
    /// Chain exhausted; no value
    Exhausted,
}

/// A field value together with its provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted<T> {
    pub value: Option<T>,
    pub source: FieldSource,
}

impl<T> Extracted<T> {
    fn found(value: Option<T>, position: usize) -> Self {
        Self {
            value,
            source: FieldSource::Strategy(position),
        }
    }

    fn exhausted() -> Self {
        Self {
            value: None,
            source: FieldSource::Exhausted,
        }
    }
}

/// Provenance of every field of one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldReport {
    pub name: FieldSource,
    pub availability: FieldSource,
    pub consultation: FieldSource,
    pub sector: FieldSource,
    pub price: FieldSource,
    pub address: FieldSource,
}

impl FieldReport {
    /// Number of fields located through a strategy
    pub fn located_count(&self) -> usize {
        [self.name, self.availability, self.sector, self.price, self.address]
            .iter()
            .filter(|source| matches!(source, FieldSource::Strategy(_)))
            .count()
    }
}

/// A record and the diagnostics gathered while building it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub record: PractitionerRecord,
    pub report: FieldReport,
}

/// Extracts practitioner fields from a page or card using one set of chains
#[derive(Debug, Clone, Copy)]
pub struct FieldExtractor<'p> {
    chains: &'p FieldChains,
    vocabulary: &'p Vocabulary,
    policy: WaitPolicy,
}

impl<'p> FieldExtractor<'p> {
    /// `policy` bounds the wait on each strategy of each field
    pub fn new(chains: &'p FieldChains, vocabulary: &'p Vocabulary, policy: WaitPolicy) -> Self {
        Self {
            chains,
            vocabulary,
            policy,
        }
    }

    /// Extract every field; never fails, absent fields stay empty
    pub fn extract<S: Surface + ?Sized>(&self, surface: &S) -> Extraction {
        let name = self.name(surface);
        let availability = self.availability(surface);
        let consultation = self.consultation(surface);
        let sector = self.sector(surface);
        let price = self.price(surface);
        let address = self.address(surface);

        let report = FieldReport {
            name: name.source,
            availability: availability.source,
            consultation: consultation.source,
            sector: sector.source,
            price: price.source,
            address: address.source,
        };

        let address_value = address.value.unwrap_or_default();
        let record = PractitionerRecord {
            name: name.value,
            next_availability: availability.value.unwrap_or_else(|| UNAVAILABLE.to_string()),
            consultation: consultation.value.unwrap_or_default(),
            sector: sector.value,
            price: price.value,
            street: address_value.street,
            postal_code: address_value.postal_code,
            city: address_value.city,
        };

        log::debug!("Extracted {:?} ({} fields located)", record.name, report.located_count());
        Extraction { record, report }
    }

    /// First non-empty heading text
    pub fn name<S: Surface + ?Sized>(&self, surface: &S) -> Extracted<String> {
        self.first_text(surface, &self.chains.name)
    }

    /// First non-empty availability text, "unavailable" when none
    pub fn availability<S: Surface + ?Sized>(&self, surface: &S) -> Extracted<String> {
        let found = self.first_text(surface, &self.chains.availability);
        if found.value.is_some() {
            return found;
        }
        Extracted {
            value: Some(UNAVAILABLE.to_string()),
            source: FieldSource::Defaulted,
        }
    }

    /// Derived from the scope's whole text; always has a value
    pub fn consultation<S: Surface + ?Sized>(&self, surface: &S) -> Extracted<String> {
        let text = match surface.snapshot() {
            Ok(snapshot) => snapshot.text(),
            Err(e) => {
                log::debug!("No snapshot for consultation mode: {}", e);
                String::new()
            }
        };
        Extracted {
            value: Some(consultation_mode(&text, self.vocabulary).label().to_string()),
            source: FieldSource::Derived,
        }
    }

    /// Sector classified from the specialty block
    pub fn sector<S: Surface + ?Sized>(&self, surface: &S) -> Extracted<String> {
        match resolve(surface, &self.chains.specialty, self.policy) {
            Some(located) => {
                let sector = classify_sector(&located.text(), self.vocabulary)
                    .and_then(|sector| sector.label())
                    .map(str::to_string);
                Extracted::found(sector, located.position())
            }
            None => Extracted::exhausted(),
        }
    }

    /// First text carrying a currency symbol and a digit, in document order.
    ///
    /// A wrapper whose scanned descendants already carry a price is skipped,
    /// so the innermost element wins.
    pub fn price<S: Surface + ?Sized>(&self, surface: &S) -> Extracted<String> {
        let symbol = self.vocabulary.currency_symbol;
        let carries_price = |element: ElementRef<'_>| is_price(&rendered_text(element), symbol);
        let amount = |element: ElementRef<'_>| {
            carries_price(element)
                && !self
                    .chains
                    .price
                    .iter()
                    .any(|strategy| strategy.select(element).into_iter().any(|nested| carries_price(nested)))
        };
        match resolve_where(surface, &self.chains.price, self.policy, amount) {
            Some(located) => Extracted::found(Some(located.text()), located.position()),
            None => Extracted::exhausted(),
        }
    }

    /// Address block split into street, postal code and city
    pub fn address<S: Surface + ?Sized>(&self, surface: &S) -> Extracted<Address> {
        match resolve(surface, &self.chains.address, self.policy) {
            Some(located) => Extracted::found(Some(split_address(&located.text())), located.position()),
            None => Extracted::exhausted(),
        }
    }

    fn first_text<S: Surface + ?Sized>(&self, surface: &S, chain: &Chain) -> Extracted<String> {
        let not_blank = |element: ElementRef<'_>| !rendered_text(element).is_empty();
        match resolve_where(surface, chain, self.policy, not_blank) {
            Some(located) => Extracted::found(Some(located.text()), located.position()),
            None => Extracted::exhausted(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::site::SiteProfile;

    fn extract(html: &str) -> Extraction {
        let profile = SiteProfile::default();
        let extractor = FieldExtractor::new(&profile.detail_fields, &profile.vocabulary, WaitPolicy::immediate());
        extractor.extract(&Document::parse(html))
    }

    const FULL_PAGE: &str = r#"
        <html><body>
            <h1>Dr Jeanne Martin</h1>
            <div data-testid="speciality">Dermatologue · Conventionné Secteur 2</div>
            <div data-testid="next-availability">Prochaine disponibilité : mardi 4 mars</div>
            <div data-testid="address">12 Rue Exemple<br>75015 Paris</div>
            <section><span>€</span><span>Consultation 45€</span></section>
            <p>Téléconsultation disponible</p>
        </body></html>
    "#;

    #[test]
    fn test_full_page() {
        let extraction = extract(FULL_PAGE);
        let record = extraction.record;
        assert_eq!(record.name.as_deref(), Some("Dr Jeanne Martin"));
        assert_eq!(record.next_availability, "Prochaine disponibilité : mardi 4 mars");
        assert_eq!(record.consultation, "remote");
        assert_eq!(record.sector.as_deref(), Some("2"));
        assert_eq!(record.price.as_deref(), Some("Consultation 45€"));
        assert_eq!(record.street.as_deref(), Some("12 Rue Exemple"));
        assert_eq!(record.postal_code.as_deref(), Some("75015"));
        assert_eq!(record.city.as_deref(), Some("Paris"));
        assert_eq!(extraction.report.located_count(), 5);
    }

    #[test]
    fn test_missing_address_keeps_name() {
        let extraction = extract("<html><body><h1>Dr Solo</h1></body></html>");
        let record = extraction.record;
        assert_eq!(record.name.as_deref(), Some("Dr Solo"));
        assert_eq!(record.street, None);
        assert_eq!(record.city, None);
        assert_eq!(extraction.report.address, FieldSource::Exhausted);
        assert_eq!(extraction.report.name, FieldSource::Strategy(0));
    }

    #[test]
    fn test_consultation_never_empty() {
        let extraction = extract("<html><body><p>Nothing here</p></body></html>");
        assert_eq!(extraction.record.consultation, "in-person");
        assert_eq!(extraction.report.consultation, FieldSource::Derived);

        let empty = extract("");
        assert!(["remote", "in-person"].contains(&empty.record.consultation.as_str()));
    }

    #[test]
    fn test_availability_defaults() {
        let extraction = extract("<html><body><h1>Dr A</h1></body></html>");
        assert_eq!(extraction.record.next_availability, UNAVAILABLE);
        assert_eq!(extraction.report.availability, FieldSource::Defaulted);
    }

    #[test]
    fn test_availability_text_fallback() {
        let extraction = extract(
            r#"<html><body><div class="wrap"><div class="slot">Prochain rendez-vous le 12 mai</div></div></body></html>"#,
        );
        assert_eq!(extraction.record.next_availability, "Prochain rendez-vous le 12 mai");
        assert_eq!(extraction.report.availability, FieldSource::Strategy(3));
    }

    #[test]
    fn test_price_skips_decorative_symbol() {
        let extraction = extract("<html><body><span>€</span><span>45€</span></body></html>");
        assert_eq!(extraction.record.price.as_deref(), Some("45€"));
    }

    #[test]
    fn test_price_follows_document_order_across_tags() {
        let extraction = extract(
            r#"<html><body><div class="tarifs"><p>Consultation 30 €</p><span>Dépassement 70 €</span></div></body></html>"#,
        );
        assert_eq!(extraction.record.price.as_deref(), Some("Consultation 30 €"));
    }

    #[test]
    fn test_price_prefers_innermost_element() {
        let extraction = extract(r#"<html><body><div><div>Tarif <span>Secteur 1 : 25 €</span></div></div></body></html>"#);
        assert_eq!(extraction.record.price.as_deref(), Some("Secteur 1 : 25 €"));
    }

    #[test]
    fn test_price_absent() {
        let extraction = extract("<html><body><span>Tarifs en €</span><p>Remboursé</p></body></html>");
        assert_eq!(extraction.record.price, None);
        assert_eq!(extraction.report.price, FieldSource::Exhausted);
    }

    #[test]
    fn test_blank_heading_falls_back() {
        let extraction = extract(
            r#"<html><body><h1> </h1><h1 itemprop="name">Dr Fallback</h1></body></html>"#,
        );
        assert_eq!(extraction.record.name.as_deref(), Some("Dr Fallback"));
    }

    #[test]
    fn test_sector_block_without_marker() {
        let extraction = extract(r#"<html><body><div data-testid="speciality">Pédiatre</div></body></html>"#);
        assert_eq!(extraction.record.sector, None);
        assert_eq!(extraction.report.sector, FieldSource::Strategy(0));
    }

    #[test]
    fn test_non_contracted_sector() {
        let extraction =
            extract(r#"<html><body><p class="speciality">Psychiatre - Non-conventionné</p></body></html>"#);
        assert_eq!(extraction.record.sector.as_deref(), Some("non-contracted"));
    }

    #[test]
    fn test_listing_chains_on_card() {
        let profile = SiteProfile::default();
        let extractor = FieldExtractor::new(&profile.listing_fields, &profile.vocabulary, WaitPolicy::immediate());
        let card = Document::fragment(
            r#"<div class="dl-card">
                <a data-testid="practitioner-name" href="/medecin/a">Dr Card</a>
                <div data-testid="address">1 Rue A<br>69001 Lyon</div>
                <span>Téléconsultation</span>
            </div>"#,
        );
        let record = extractor.extract(&card).record;
        assert_eq!(record.name.as_deref(), Some("Dr Card"));
        assert_eq!(record.city.as_deref(), Some("Lyon"));
        assert_eq!(record.consultation, "remote");
    }
}
