use crate::criteria::SearchCriteria;
use crate::extract::PractitionerRecord;

/// Whether a record passes the criteria that are checked after extraction.
///
/// Only the address keyword is checked here, case-insensitively against
/// "street city". Sector and consultation narrow the listing on the page;
/// price and date ranges are not enforced.
pub fn include(record: &PractitionerRecord, criteria: &SearchCriteria) -> bool {
    let Some(keyword) = criteria.address_keyword.as_deref() else {
        return true;
    };
    record.address_text().to_lowercase().contains(&keyword.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(street: Option<&str>, city: Option<&str>) -> PractitionerRecord {
        let mut record = PractitionerRecord::new("in-person");
        record.street = street.map(str::to_string);
        record.city = city.map(str::to_string);
        record
    }

    #[test]
    fn test_no_keyword_includes_everything() {
        let criteria = SearchCriteria::new("x", "y");
        assert!(include(&record(None, None), &criteria));
    }

    #[test]
    fn test_keyword_matches_street_or_city() {
        let criteria = SearchCriteria::new("x", "y").address_keyword("PARIS");
        assert!(include(&record(Some("12 Rue Exemple"), Some("Paris")), &criteria));

        let criteria = SearchCriteria::new("x", "y").address_keyword("rue exemple");
        assert!(include(&record(Some("12 Rue Exemple"), None), &criteria));
    }

    #[test]
    fn test_keyword_excludes() {
        let criteria = SearchCriteria::new("x", "y").address_keyword("Lyon");
        assert!(!include(&record(Some("12 Rue Exemple"), Some("Paris")), &criteria));
        assert!(!include(&record(None, None), &criteria));
    }

    #[test]
    fn test_keyword_spanning_street_and_city() {
        let criteria = SearchCriteria::new("x", "y").address_keyword("exemple paris");
        assert!(include(&record(Some("12 Rue Exemple"), Some("Paris")), &criteria));
    }

    #[test]
    fn test_price_and_dates_not_enforced() {
        let criteria = SearchCriteria::new("x", "y")
            .price_range("10", "20")
            .date_range("01/01/2099", "02/01/2099");
        let mut expensive = record(None, None);
        expensive.price = Some("95€".to_string());
        assert!(include(&expensive, &criteria));
    }
}
