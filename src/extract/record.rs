use serde::Serialize;

/// Availability written when no availability block was found
pub const UNAVAILABLE: &str = "unavailable";

/// One practitioner row. Every field but the consultation mode may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PractitionerRecord {
    #[serde(rename = "Name")]
    pub name: Option<String>,

    #[serde(rename = "Availability")]
    pub next_availability: String,

    /// "remote" or "in-person"
    #[serde(rename = "Consultation")]
    pub consultation: String,

    /// "1", "2" or "non-contracted"
    #[serde(rename = "Sector")]
    pub sector: Option<String>,

    #[serde(rename = "Price")]
    pub price: Option<String>,

    #[serde(rename = "Street")]
    pub street: Option<String>,

    #[serde(rename = "PostalCode")]
    pub postal_code: Option<String>,

    #[serde(rename = "City")]
    pub city: Option<String>,
}

impl PractitionerRecord {
    /// Record with only the always-present fields filled
    pub fn new(consultation: impl Into<String>) -> Self {
        Self {
            name: None,
            next_availability: UNAVAILABLE.to_string(),
            consultation: consultation.into(),
            sector: None,
            price: None,
            street: None,
            postal_code: None,
            city: None,
        }
    }

    /// Street and city joined by a single space, as matched by the address filter
    pub fn address_text(&self) -> String {
        format!(
            "{} {}",
            self.street.as_deref().unwrap_or_default(),
            self.city.as_deref().unwrap_or_default()
        )
    }
}

/// Records kept by a run, in candidate processing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    records: Vec<PractitionerRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: PractitionerRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PractitionerRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<PractitionerRecord> {
        self.records
    }
}

impl FromIterator<PractitionerRecord> for ResultSet {
    fn from_iter<I: IntoIterator<Item = PractitionerRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_defaults() {
        let record = PractitionerRecord::new("in-person");
        assert_eq!(record.next_availability, UNAVAILABLE);
        assert_eq!(record.consultation, "in-person");
        assert!(record.name.is_none());
        assert!(record.city.is_none());
    }

    #[test]
    fn test_address_text() {
        let mut record = PractitionerRecord::new("remote");
        record.street = Some("12 Rue Exemple".to_string());
        record.city = Some("Paris".to_string());
        assert_eq!(record.address_text(), "12 Rue Exemple Paris");

        let empty = PractitionerRecord::new("remote");
        assert_eq!(empty.address_text(), " ");
    }

    #[test]
    fn test_result_set_keeps_order() {
        let mut set = ResultSet::new();
        for name in ["a", "b", "c"] {
            let mut record = PractitionerRecord::new("remote");
            record.name = Some(name.to_string());
            set.push(record);
        }
        let names: Vec<_> = set.iter().filter_map(|r| r.name.clone()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(set.len(), 3);
    }
}
