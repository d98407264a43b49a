//! Core data structures for bulletin processing.
//!
//! Defines the variant codes of the regional layouts, the uniform observation
//! record every extractor produces, the canonical reference set, the rename
//! table, the output feature table and processing statistics.

use crate::constants::columns;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Regional bulletin layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantCode {
    /// Fixed-width plain-text bulletin
    Zs,
    /// Word-processor table, up to eleven columns
    B,
    /// Word-processor table, eight or ten columns
    Zb,
    /// Two word-processor tables (rivers and other water bodies)
    I,
    /// Spreadsheet sheet
    Oi,
}

impl VariantCode {
    pub const ALL: [VariantCode; 5] = [
        VariantCode::Zs,
        VariantCode::B,
        VariantCode::Zb,
        VariantCode::I,
        VariantCode::Oi,
    ];

    /// Short label used when naming output artifacts
    pub fn code(&self) -> &'static str {
        match self {
            VariantCode::Zs => "ZS",
            VariantCode::B => "B",
            VariantCode::Zb => "ZB",
            VariantCode::I => "I",
            VariantCode::Oi => "OI",
        }
    }

    /// Attributes this layout carries, in output column order
    pub fn attributes(&self) -> &'static [Attribute] {
        use Attribute::*;
        match self {
            VariantCode::Zs => &[
                WaterLevel,
                WaterLevelChange,
                Ice,
                FloodLevel,
                IceThickness,
            ],
            VariantCode::B => &[
                WaterLevel,
                WaterLevelChange,
                Ice,
                FloodLevel,
                IceThickness,
                FloodplainLevel,
            ],
            VariantCode::Zb => &[
                WaterLevel,
                WaterLevelChange,
                Ice,
                IceThickness,
                FloodplainLevel,
            ],
            VariantCode::I => &[
                WaterLevel,
                WaterLevelChange,
                FloodLevel,
                Ice,
                IceThickness,
            ],
            VariantCode::Oi => &[
                WaterLevel,
                WaterLevelChange,
                FloodLevel,
                Ice,
                FloodplainLevel,
            ],
        }
    }
}

impl fmt::Display for VariantCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for VariantCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ZS" => Ok(VariantCode::Zs),
            "B" => Ok(VariantCode::B),
            "ZB" => Ok(VariantCode::Zb),
            "I" => Ok(VariantCode::I),
            "OI" => Ok(VariantCode::Oi),
            other => Err(format!(
                "unknown bulletin format '{}' (expected one of zs, b, zb, i, oi)",
                other
            )),
        }
    }
}

/// Observation attributes a bulletin may report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    WaterLevel,
    WaterLevelChange,
    Ice,
    FloodLevel,
    FloodplainLevel,
    IceThickness,
}

impl Attribute {
    pub fn column_name(&self) -> &'static str {
        match self {
            Attribute::WaterLevel => columns::WATER_LEVEL,
            Attribute::WaterLevelChange => columns::WATER_LEVEL_CHANGE,
            Attribute::Ice => columns::ICE,
            Attribute::FloodLevel => columns::FLOOD_LEVEL,
            Attribute::FloodplainLevel => columns::FLOODPLAIN_LEVEL,
            Attribute::IceThickness => columns::ICE_THICKNESS,
        }
    }
}

/// One station's observation as read from a bulletin.
///
/// Every attribute is always present; attributes a layout does not carry stay
/// empty and are never written out (see [`VariantCode::attributes`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub station_name: String,
    pub river_name: String,
    pub water_level: String,
    pub water_level_change: String,
    pub ice_state: String,
    pub flood_level: String,
    pub floodplain_level: String,
    pub ice_thickness: String,
}

impl ObservationRecord {
    pub fn new(river_name: impl Into<String>, station_name: impl Into<String>) -> Self {
        Self {
            station_name: station_name.into(),
            river_name: river_name.into(),
            ..Default::default()
        }
    }

    pub fn attribute(&self, attribute: Attribute) -> &str {
        match attribute {
            Attribute::WaterLevel => &self.water_level,
            Attribute::WaterLevelChange => &self.water_level_change,
            Attribute::Ice => &self.ice_state,
            Attribute::FloodLevel => &self.flood_level,
            Attribute::FloodplainLevel => &self.floodplain_level,
            Attribute::IceThickness => &self.ice_thickness,
        }
    }

    /// Clear both identity fields when they are equal.
    ///
    /// Equal names come from a merged cell that spans the whole row. Returns
    /// whether the record was cleared.
    pub fn clear_merged_identity(&mut self) -> bool {
        if self.station_name != self.river_name {
            return false;
        }
        self.station_name.clear();
        self.river_name.clear();
        true
    }
}

/// Records extracted from one document together with the layout that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDocument {
    pub variant: VariantCode,
    pub records: Vec<ObservationRecord>,
}

/// One row of the canonical reference set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalFeature {
    pub station_name: String,
    pub river_name: String,
    /// Opaque geometry text carried through unchanged
    pub geometry: String,
}

impl CanonicalFeature {
    pub fn new(
        station_name: impl Into<String>,
        river_name: impl Into<String>,
        geometry: impl Into<String>,
    ) -> Self {
        Self {
            station_name: station_name.into(),
            river_name: river_name.into(),
            geometry: geometry.into(),
        }
    }
}

/// Authoritative gauge list; read-only once loaded.
///
/// `(station, river)` pairs need not be unique. Lookups walk rows in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalSet {
    features: Vec<CanonicalFeature>,
}

impl CanonicalSet {
    pub fn new(features: Vec<CanonicalFeature>) -> Self {
        Self { features }
    }

    pub fn features(&self) -> &[CanonicalFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Station column, one entry per row
    pub fn station_names(&self) -> Vec<&str> {
        self.features
            .iter()
            .map(|f| f.station_name.as_str())
            .collect()
    }

    /// River column, one entry per row
    pub fn river_names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.river_name.as_str()).collect()
    }

    /// Rivers of every row whose station equals `station`
    pub fn rivers_of_station(&self, station: &str) -> Vec<&str> {
        self.features
            .iter()
            .filter(|f| f.station_name == station)
            .map(|f| f.river_name.as_str())
            .collect()
    }

    /// Stations of every row whose river equals `river`
    pub fn stations_on_river(&self, river: &str) -> Vec<&str> {
        self.features
            .iter()
            .filter(|f| f.river_name == river)
            .map(|f| f.station_name.as_str())
            .collect()
    }

    /// Index of the first row with exactly this identity
    pub fn position(&self, station: &str, river: &str) -> Option<usize> {
        self.features
            .iter()
            .position(|f| f.station_name == station && f.river_name == river)
    }
}

impl FromIterator<CanonicalFeature> for CanonicalSet {
    fn from_iter<T: IntoIterator<Item = CanonicalFeature>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Exact `raw name -> canonical name` mapping shared by station and river fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameTable {
    names: HashMap<String, String>,
}

impl RenameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, raw: impl Into<String>, canonical: impl Into<String>) {
        self.names.insert(raw.into(), canonical.into());
    }

    pub fn get(&self, raw: &str) -> Option<&str> {
        self.names.get(raw).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RenameTable {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut table = RenameTable::new();
        for (raw, canonical) in iter {
            table.insert(raw, canonical);
        }
        table
    }
}

/// One output row: a canonical feature plus its attribute values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRow {
    pub station_name: String,
    pub river_name: String,
    pub geometry: String,
    /// Aligned with [`FeatureTable::attributes`]
    pub values: Vec<String>,
}

/// Output table handed to the writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureTable {
    pub variant: VariantCode,
    pub attributes: Vec<Attribute>,
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `attribute` in row `row`, if both exist
    pub fn value(&self, row: usize, attribute: Attribute) -> Option<&str> {
        let column = self.attributes.iter().position(|a| *a == attribute)?;
        self.rows
            .get(row)
            .and_then(|r| r.values.get(column))
            .map(String::as_str)
    }
}

/// Outcome of one document run through the pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentStats {
    pub records_extracted: usize,
    pub records_resolved: usize,
    pub records_merged: usize,
    pub records_unmatched: usize,
}

/// Processing statistics for a whole run
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub documents_processed: usize,
    pub documents_failed: usize,
    pub documents_empty: usize,
    pub records_extracted: usize,
    pub records_resolved: usize,
    pub records_merged: usize,
    pub records_unmatched: usize,
    pub diagnostics_dropped: usize,
    pub outputs: Vec<PathBuf>,
    pub processing_time_ms: u128,
}

impl ProcessingStats {
    pub fn add_document(&mut self, stats: &DocumentStats) {
        self.records_extracted += stats.records_extracted;
        self.records_resolved += stats.records_resolved;
        self.records_merged += stats.records_merged;
        self.records_unmatched += stats.records_unmatched;
    }
}
