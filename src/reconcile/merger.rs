//! Overlaying resolved records onto a fresh copy of the canonical set

use super::diagnostics::DiagnosticSink;
use crate::models::{
    Attribute, CanonicalSet, FeatureRow, FeatureTable, ObservationRecord, VariantCode,
};
use tracing::debug;

/// Result of merging one document's records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub table: FeatureTable,
    /// Records written onto a canonical row
    pub merged: usize,
    /// Records whose identity matched no canonical row
    pub unmatched: usize,
}

/// Builds output feature tables from the canonical set
#[derive(Debug, Clone)]
pub struct ReconciliationMerger {
    unset_sentinel: String,
    prune_unset: bool,
}

impl ReconciliationMerger {
    pub fn new(unset_sentinel: impl Into<String>, prune_unset: bool) -> Self {
        Self {
            unset_sentinel: unset_sentinel.into(),
            prune_unset,
        }
    }

    /// One output row per canonical row, with the variant's attribute columns.
    ///
    /// Each record overwrites the first row carrying exactly its identity;
    /// later rows with the same identity are left alone. Attributes the record
    /// leaves empty keep the sentinel. When pruning, rows whose level and level
    /// change both still hold the sentinel are removed.
    pub fn merge(
        &self,
        canonical: &CanonicalSet,
        variant: VariantCode,
        records: &[ObservationRecord],
        sink: &dyn DiagnosticSink,
    ) -> MergeOutcome {
        let attributes = variant.attributes().to_vec();
        let mut rows: Vec<FeatureRow> = canonical
            .features()
            .iter()
            .map(|feature| FeatureRow {
                station_name: feature.station_name.clone(),
                river_name: feature.river_name.clone(),
                geometry: feature.geometry.clone(),
                values: vec![self.unset_sentinel.clone(); attributes.len()],
            })
            .collect();

        let mut merged = 0;
        let mut unmatched = 0;
        for record in records {
            match canonical.position(&record.station_name, &record.river_name) {
                Some(index) => {
                    let row = &mut rows[index];
                    for (value, attribute) in row.values.iter_mut().zip(&attributes) {
                        let observed = record.attribute(*attribute);
                        if !observed.is_empty() {
                            *value = observed.to_string();
                        }
                    }
                    merged += 1;
                }
                None => {
                    unmatched += 1;
                    sink.report(format!(
                        "No canonical row for station '{}' on river '{}'",
                        record.station_name, record.river_name
                    ));
                }
            }
        }

        let mut table = FeatureTable {
            variant,
            attributes,
            rows,
        };
        if self.prune_unset {
            let pruned = self.prune(&mut table);
            debug!("Pruned {} canonical rows without observations", pruned);
        }

        MergeOutcome {
            table,
            merged,
            unmatched,
        }
    }

    /// Remove rows that received no level data, returning how many went
    fn prune(&self, table: &mut FeatureTable) -> usize {
        let level = table.attributes.iter().position(|a| *a == Attribute::WaterLevel);
        let change = table
            .attributes
            .iter()
            .position(|a| *a == Attribute::WaterLevelChange);
        let (Some(level), Some(change)) = (level, change) else {
            return 0;
        };

        let before = table.rows.len();
        // Back to front so earlier indices stay valid
        for index in (0..table.rows.len()).rev() {
            let values = &table.rows[index].values;
            if values[level] == self.unset_sentinel && values[change] == self.unset_sentinel {
                table.rows.remove(index);
            }
        }
        before - table.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CanonicalFeature;
    use crate::reconcile::diagnostics::MemorySink;

    fn canonical() -> CanonicalSet {
        vec![
            CanonicalFeature::new("Lena", "Ob", "POINT (1 1)"),
            CanonicalFeature::new("Барнаул", "Обь", "POINT (83.77 53.35)"),
            CanonicalFeature::new("Барнаул", "Обь", "POINT (83.80 53.36)"),
            CanonicalFeature::new("Бийск", "Бия", "POINT (85.21 52.54)"),
        ]
        .into_iter()
        .collect()
    }

    fn level_only(river: &str, station: &str, level: &str) -> ObservationRecord {
        let mut record = ObservationRecord::new(river, station);
        record.water_level = level.to_string();
        record
    }

    #[test]
    fn test_level_only_record_survives_pruning() {
        let set: CanonicalSet = vec![CanonicalFeature::new("Lena", "Ob", "geom1")]
            .into_iter()
            .collect();
        let record = level_only("Ob", "Lena", "120");

        let outcome = ReconciliationMerger::new("-", true).merge(
            &set,
            VariantCode::Zs,
            &[record],
            &MemorySink::new(),
        );

        let table = outcome.table;
        assert_eq!(table.len(), 1);
        assert_eq!(table.value(0, Attribute::WaterLevel), Some("120"));
        assert_eq!(table.value(0, Attribute::WaterLevelChange), Some("-"));
        assert_eq!(table.value(0, Attribute::Ice), Some("-"));
        assert_eq!(table.value(0, Attribute::FloodLevel), Some("-"));
        assert_eq!(table.rows[0].geometry, "geom1");
    }

    #[test]
    fn test_unmerged_rows_hold_the_sentinel() {
        let outcome = ReconciliationMerger::new("n/a", false).merge(
            &canonical(),
            VariantCode::B,
            &[],
            &MemorySink::new(),
        );

        assert_eq!(outcome.table.len(), 4);
        assert_eq!(outcome.table.attributes, VariantCode::B.attributes());
        for row in &outcome.table.rows {
            assert!(row.values.iter().all(|v| v == "n/a"));
        }
    }

    #[test]
    fn test_first_matching_row_wins() {
        let outcome = ReconciliationMerger::new("-", false).merge(
            &canonical(),
            VariantCode::Oi,
            &[level_only("Обь", "Барнаул", "245")],
            &MemorySink::new(),
        );

        assert_eq!(outcome.merged, 1);
        assert_eq!(outcome.table.value(1, Attribute::WaterLevel), Some("245"));
        assert_eq!(outcome.table.value(2, Attribute::WaterLevel), Some("-"));
    }

    #[test]
    fn test_identity_must_match_exactly() {
        let sink = MemorySink::new();
        // Station exists, but not on this river
        let outcome = ReconciliationMerger::new("-", true).merge(
            &canonical(),
            VariantCode::I,
            &[level_only("Обь", "Бийск", "100")],
            &sink,
        );

        assert_eq!(outcome.merged, 0);
        assert_eq!(outcome.unmatched, 1);
        assert!(outcome.table.is_empty());
        assert!(sink.messages()[0].contains("Бийск"));
    }

    #[test]
    fn test_pruning_keeps_rows_with_any_level_data() {
        let mut change_only = ObservationRecord::new("Бия", "Бийск");
        change_only.water_level_change = "+2".to_string();

        let outcome = ReconciliationMerger::new("-", true).merge(
            &canonical(),
            VariantCode::Zb,
            &[level_only("Ob", "Lena", "120"), change_only],
            &MemorySink::new(),
        );

        let stations: Vec<&str> = outcome
            .table
            .rows
            .iter()
            .map(|r| r.station_name.as_str())
            .collect();
        assert_eq!(stations, vec!["Lena", "Бийск"]);
        assert!(outcome.table.len() <= canonical().len());
    }

    #[test]
    fn test_canonical_set_is_not_modified() {
        let set = canonical();
        let before = set.clone();
        ReconciliationMerger::new("-", true).merge(
            &set,
            VariantCode::B,
            &[level_only("Обь", "Барнаул", "1")],
            &MemorySink::new(),
        );
        assert_eq!(set, before);
    }
}
