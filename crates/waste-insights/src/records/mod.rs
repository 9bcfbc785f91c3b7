//! Loading collection records and leaderboards from dashboard exports.

use crate::insights::{CollectionRecord, Contributor};
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read export: {}", err),
            ImportError::Csv(err) => write!(f, "invalid CSV export: {}", err),
            ImportError::Json(err) => write!(f, "invalid JSON export: {}", err),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Export layout, picked from the file extension when loading from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

pub struct RecordImporter;

impl RecordImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<CollectionRecord>, ImportError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        match ExportFormat::from_path(path) {
            ExportFormat::Csv => Self::from_reader(file),
            ExportFormat::Json => Self::from_json_reader(file),
        }
    }

    /// Reads a CSV export. Headers may use either the English field names or
    /// the dashboard's own (`berat`, `jenisSampah`, `waktu`, `rt`, `userId`).
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<CollectionRecord>, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut records = Vec::new();
        for row in csv_reader.deserialize::<CollectionRecord>() {
            records.push(row?);
        }

        Ok(records)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Vec<CollectionRecord>, ImportError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

pub struct ContributorImporter;

impl ContributorImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Contributor>, ImportError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        match ExportFormat::from_path(path) {
            ExportFormat::Csv => Self::from_reader(file),
            ExportFormat::Json => Self::from_json_reader(file),
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Contributor>, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut contributors = Vec::new();
        for row in csv_reader.deserialize::<Contributor>() {
            contributors.push(row?);
        }

        Ok(contributors)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Vec<Contributor>, ImportError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};
    use std::io::Cursor;

    #[test]
    fn parses_dashboard_csv_headers() {
        let csv = "berat,jenisSampah,waktu,rt,userId\n\
                   12.5,Plastik,2025-03-04T08:30:00Z,RT 03,u-1\n\
                   abc,Organik,2025-03-05,RT 01,u-2\n";

        let records = RecordImporter::from_reader(Cursor::new(csv)).expect("csv parses");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].weight, 12.5);
        assert_eq!(records[0].location_tag, "RT 03");
        assert_eq!(records[1].weight, 0.0);
        assert_eq!(
            records[1].collected_at.map(|at| at.date()),
            NaiveDate::from_ymd_opt(2025, 3, 5)
        );
    }

    #[test]
    fn parses_english_csv_headers_with_blank_cells() {
        let csv = "weight,waste_category,collected_at,location_tag\n\
                   4,Kertas,,RT 02\n";

        let records = RecordImporter::from_reader(Cursor::new(csv)).expect("csv parses");

        assert_eq!(records[0].weight, 4.0);
        assert!(records[0].collected_at.is_none());
        assert!(records[0].contributor_id.is_none());
    }

    #[test]
    fn parses_json_records() {
        let json = r#"[{"weight": 3, "waste_category": "Logam", "collected_at": "2024-12-31 23:59:59", "location_tag": "RT 05"}]"#;

        let records = RecordImporter::from_json_reader(Cursor::new(json)).expect("json parses");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].collected_at.map(|at| at.month()), Some(12));
    }

    #[test]
    fn rejects_non_array_json() {
        let result = RecordImporter::from_json_reader(Cursor::new("{\"weight\": 1}"));
        assert!(matches!(result, Err(ImportError::Json(_))));
    }

    #[test]
    fn parses_contributor_leaderboard() {
        let json = r#"[{"userId": "u-1", "username": "Ani", "totalPoin": "40"}, {"id": "u-2", "display_name": "Budi", "score": 55}]"#;

        let contributors =
            ContributorImporter::from_json_reader(Cursor::new(json)).expect("json parses");

        assert_eq!(contributors[0].score, 40.0);
        assert_eq!(contributors[1].display_name, "Budi");
    }
}
