use crate::dom::Document;
use crate::locate::{Chain, Surface, WaitPolicy, resolve};

/// One result card cut out of the listing document.
///
/// The card is an owned snapshot, so nothing in it refers back to the live
/// listing once discovery returns.
#[derive(Debug, Clone)]
pub struct CandidateEntry {
    /// Zero-based position in the listing
    pub position: usize,

    /// Card markup, tagged with the listing URL
    pub card: Document,
}

impl CandidateEntry {
    /// URL of the listing the card was taken from
    pub fn listing_url(&self) -> Option<&str> {
        self.card.url()
    }
}

/// Collect the result cards of the listing shown by `surface`, in page order.
///
/// Card chains follow the usual fallback discipline; the first strategy that
/// finds at least one card decides the whole list. No card found is an empty
/// list, not an error.
pub fn discover<S: Surface + ?Sized>(surface: &S, cards: &Chain, policy: WaitPolicy) -> Vec<CandidateEntry> {
    let Some(located) = resolve(surface, cards, policy) else {
        log::warn!("No result cards found with any of {} strategies", cards.len());
        return Vec::new();
    };

    let listing_url = located.snapshot().url().map(str::to_string);
    let entries: Vec<CandidateEntry> = located
        .elements()
        .into_iter()
        .enumerate()
        .map(|(position, element)| {
            let card = Document::fragment(&element.html());
            let card = match &listing_url {
                Some(url) => card.with_url(url.clone()),
                None => card,
            };
            CandidateEntry { position, card }
        })
        .collect();

    log::info!("Found {} result cards using '{}'", entries.len(), located.strategy());
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::Strategy;
    use crate::site::SiteProfile;

    const LISTING: &str = r#"
        <html><body>
            <div class="dl-card"><a href="/medecin/a">Dr A</a></div>
            <div class="dl-card"><a href="/medecin/b">Dr B</a></div>
            <div class="dl-card"><a href="/medecin/c">Dr C</a></div>
        </body></html>
    "#;

    #[test]
    fn test_discover_in_page_order() {
        let profile = SiteProfile::default();
        let doc = Document::parse(LISTING).with_url("https://example.test/search");
        let entries = discover(&doc, &profile.cards, WaitPolicy::immediate());

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].position, 1);
        assert_eq!(entries[1].card.text(), "Dr B");
        assert_eq!(entries[2].listing_url(), Some("https://example.test/search"));
    }

    #[test]
    fn test_first_matching_selector_decides() {
        let doc = Document::parse(
            r#"<body><li class="search-result">Only one</li><div class="dl-card">X</div><div class="dl-card">Y</div></body>"#,
        );
        let chain = Chain::new("cards", Strategy::attribute("li.search-result")).or(Strategy::attribute("div.dl-card"));
        let entries = discover(&doc, &chain, WaitPolicy::immediate());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].card.text(), "Only one");
    }

    #[test]
    fn test_no_cards_is_empty() {
        let profile = SiteProfile::default();
        let doc = Document::parse("<html><body><p>Aucun résultat</p></body></html>");
        assert!(discover(&doc, &profile.cards, WaitPolicy::immediate()).is_empty());
    }
}
