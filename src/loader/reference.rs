//! Canonical reference set and rename table loaders

use super::text::decode;
use crate::config::ReferenceColumns;
use crate::error::{BulletinError, Result};
use crate::models::{CanonicalFeature, CanonicalSet, RenameTable};
use encoding_rs::Encoding;
use polars::prelude::{CsvEncoding, CsvReadOptions, SerReader};
use std::path::Path;
use tracing::{debug, info};

const RENAME_SEPARATOR: u8 = b';';

/// Load the canonical gauge list from a CSV file with a header row.
///
/// Every column is read as text. Only the configured station, river and
/// geometry columns are kept; rows stay in file order.
pub fn load_canonical_set(path: &Path, columns: &ReferenceColumns) -> Result<CanonicalSet> {
    if !path.is_file() {
        return Err(BulletinError::ReferenceNotFound {
            path: path.to_path_buf(),
        });
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|options| options.with_encoding(CsvEncoding::LossyUtf8))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let text_column = |name: &str| -> Result<Vec<String>> {
        let column = df
            .column(name)
            .map_err(|_| BulletinError::InvalidReference {
                path: path.to_path_buf(),
                reason: format!("missing column '{}'", name),
            })?;
        Ok(column
            .str()?
            .into_iter()
            .map(|value| value.unwrap_or_default().trim().to_string())
            .collect())
    };

    let stations = text_column(&columns.station)?;
    let rivers = text_column(&columns.river)?;
    let geometries = text_column(&columns.geometry)?;

    let set: CanonicalSet = stations
        .into_iter()
        .zip(rivers)
        .zip(geometries)
        .map(|((station, river), geometry)| CanonicalFeature::new(station, river, geometry))
        .collect();

    info!(
        "Loaded {} canonical gauges from {}",
        set.len(),
        path.display()
    );
    Ok(set)
}

/// Load a `raw;canonical` rename table.
///
/// No header row. Blank lines are skipped and columns past the second are
/// ignored. When a raw name repeats, the last mapping wins.
pub fn load_rename_table(path: &Path, fallback: &'static Encoding) -> Result<RenameTable> {
    if !path.is_file() {
        return Err(BulletinError::RenameTableNotFound {
            path: path.to_path_buf(),
        });
    }

    let text = decode(std::fs::read(path)?, fallback, path);
    let table = parse_rename_table(&text, path)?;
    debug!("Loaded {} renames from {}", table.len(), path.display());
    Ok(table)
}

fn parse_rename_table(text: &str, path: &Path) -> Result<RenameTable> {
    let invalid = |line: Option<&csv::Position>, reason: String| {
        BulletinError::InvalidRenameTable {
            path: path.to_path_buf(),
            line: line.map_or(0, |p| p.line() as usize),
            reason,
        }
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(RENAME_SEPARATOR)
        .trim(csv::Trim::All)
        .from_reader(text.trim_start_matches('\u{feff}').as_bytes());

    let mut table = RenameTable::new();
    for result in reader.records() {
        let record = result.map_err(|e| invalid(e.position(), e.to_string()))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        match (record.get(0), record.get(1)) {
            (Some(raw), Some(canonical)) => table.insert(raw, canonical),
            _ => {
                return Err(invalid(
                    record.position(),
                    format!(
                        "expected '{}'-separated columns",
                        char::from(RENAME_SEPARATOR)
                    ),
                ));
            }
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_canonical_set_keeps_row_order_and_geometry() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gauges.csv");
        fs::write(
            &path,
            "id,name,river,geometry\n\
             1,Барнаул,Обь,POINT (83.77 53.35)\n\
             2,Бийск,Бия,POINT (85.21 52.54)\n",
        )
        .unwrap();

        let set = load_canonical_set(&path, &ReferenceColumns::default()).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(
            set.features()[0],
            CanonicalFeature::new("Барнаул", "Обь", "POINT (83.77 53.35)")
        );
        assert_eq!(set.position("Бийск", "Бия"), Some(1));
    }

    #[test]
    fn test_custom_reference_columns() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gauges.csv");
        fs::write(&path, "NAME,WATER,WKT\n1234,Обь,POINT (1 2)\n").unwrap();

        let columns = ReferenceColumns {
            station: "NAME".to_string(),
            river: "WATER".to_string(),
            geometry: "WKT".to_string(),
        };
        let set = load_canonical_set(&path, &columns).unwrap();

        // Numeric-looking names stay text
        assert_eq!(set.features()[0].station_name, "1234");
    }

    #[test]
    fn test_missing_reference_column() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gauges.csv");
        fs::write(&path, "name,geometry\nБарнаул,POINT (1 1)\n").unwrap();

        let error = load_canonical_set(&path, &ReferenceColumns::default()).unwrap_err();
        assert!(matches!(error, BulletinError::InvalidReference { .. }));
        assert!(error.to_string().contains("river"));
    }

    #[test]
    fn test_missing_reference_file() {
        let error =
            load_canonical_set(Path::new("/no/such/gauges.csv"), &ReferenceColumns::default())
                .unwrap_err();
        assert!(matches!(error, BulletinError::ReferenceNotFound { .. }));
    }

    #[test]
    fn test_rename_table_parsing() {
        let text = "\u{feff}Барнаул-1;Барнаул\n\nр.Обь;Обь;comment\nБарнаул-1;Барнаул II\n";
        let table = parse_rename_table(text, Path::new("renames.csv")).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("Барнаул-1"), Some("Барнаул II"));
        assert_eq!(table.get("р.Обь"), Some("Обь"));
    }

    #[test]
    fn test_quoted_rename_fields() {
        let text = "\"Барнаул-1\";\"Барнаул\"\n\"Обь; верхний бьеф\";Обь\n   \n";
        let table = parse_rename_table(text, Path::new("renames.csv")).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("Барнаул-1"), Some("Барнаул"));
        assert_eq!(table.get("Обь; верхний бьеф"), Some("Обь"));
    }

    #[test]
    fn test_rename_line_without_separator() {
        let error =
            parse_rename_table("a;b\nbroken line\n", Path::new("renames.csv")).unwrap_err();
        match error {
            BulletinError::InvalidRenameTable { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_rename_table_in_legacy_code_page() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("renames.csv");
        let (encoded, _, _) = encoding_rs::WINDOWS_1251.encode("Бийск-2;Бийск\n");
        fs::write(&path, &encoded).unwrap();

        let table = load_rename_table(&path, encoding_rs::WINDOWS_1251).unwrap();
        assert_eq!(table.get("Бийск-2"), Some("Бийск"));
    }

    #[test]
    fn test_missing_rename_file() {
        let error = load_rename_table(Path::new("/no/such/renames.csv"), encoding_rs::UTF_8)
            .unwrap_err();
        assert!(matches!(error, BulletinError::RenameTableNotFound { .. }));
    }
}
