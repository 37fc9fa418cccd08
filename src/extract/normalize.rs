use crate::criteria::{ConsultationMode, Sector};
use crate::site::Vocabulary;

/// Street, postal code and city split out of an address block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
}

/// Split an address block: line 0 is the street, line 1 is "<postal code> <city...>".
pub fn split_address(text: &str) -> Address {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
    let Some(street) = lines.next() else {
        return Address::default();
    };

    let mut address = Address {
        street: Some(street.to_string()),
        ..Default::default()
    };

    if let Some(second) = lines.next() {
        let mut tokens = second.split_whitespace();
        address.postal_code = tokens.next().map(str::to_string);
        let city = tokens.collect::<Vec<_>>().join(" ");
        address.city = (!city.is_empty()).then_some(city);
    }

    address
}

/// Classify a specialty block by its sector marker; the first marker found wins
pub fn classify_sector(text: &str, vocabulary: &Vocabulary) -> Option<Sector> {
    if text.contains(&vocabulary.sector_one) {
        return Some(Sector::One);
    }
    if text.contains(&vocabulary.sector_two) {
        return Some(Sector::Two);
    }
    let folded = text.to_lowercase().replace('-', " ");
    folded.contains(&vocabulary.non_contracted).then_some(Sector::NonContracted)
}

/// "remote" when any remote keyword appears in the text, "in-person" otherwise
pub fn consultation_mode(text: &str, vocabulary: &Vocabulary) -> ConsultationMode {
    let lowered = text.to_lowercase();
    if vocabulary.remote_keywords.iter().any(|keyword| lowered.contains(keyword.as_str())) {
        ConsultationMode::Remote
    } else {
        ConsultationMode::InPerson
    }
}

/// Whether text reads as an amount: a currency symbol and at least one digit
pub fn is_price(text: &str, currency_symbol: char) -> bool {
    text.contains(currency_symbol) && text.chars().any(|c| c.is_ascii_digit())
}
