use crate::error::ExportError;
use crate::extract::ResultSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Column names, in column order
pub const HEADER: [&str; 8] = ["Name", "Availability", "Consultation", "Sector", "Price", "Street", "PostalCode", "City"];

/// Write the header row, then one row per record. Absent fields are empty cells.
pub fn write_csv<W: Write>(writer: W, results: &ResultSet) -> Result<(), ExportError> {
    let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv.write_record(HEADER)?;
    for record in results.iter() {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write `results` to `path`, replacing any existing file
pub fn export(path: impl AsRef<Path>, results: &ResultSet) -> Result<(), ExportError> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_csv(file, results)?;
    log::info!("Saved {} practitioners to {}", results.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::PractitionerRecord;
    use std::fs;

    fn to_string(results: &ResultSet) -> String {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, results).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_header_only_for_empty_set() {
        assert_eq!(
            to_string(&ResultSet::new()),
            "Name,Availability,Consultation,Sector,Price,Street,PostalCode,City\n"
        );
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let mut record = PractitionerRecord::new("remote");
        record.name = Some("Dr Martin, Jeanne".to_string());
        record.city = Some("Paris".to_string());
        let results: ResultSet = vec![record].into_iter().collect();

        let lines: Vec<String> = to_string(&results).lines().map(str::to_string).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "\"Dr Martin, Jeanne\",unavailable,remote,,,,,Paris");
    }

    #[test]
    fn test_export_overwrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("practitioners.csv");
        fs::write(&path, "stale content\nmore\nlines\n").unwrap();

        let results: ResultSet = vec![PractitionerRecord::new("in-person")].into_iter().collect();
        export(&path, &results).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(!written.contains("stale"));
        assert_eq!(written.lines().count(), 2);
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        assert!(matches!(export(&path, &ResultSet::new()), Err(ExportError::Io(_))));
    }
}
