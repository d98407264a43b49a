//! Mapping raw station/river names onto canonical identities
//!
//! With a rename table the mapping is an exact lookup applied to both fields.
//! Without one, each field is matched approximately against its canonical
//! column and the two matches are cross-checked against each other.

use super::diagnostics::DiagnosticSink;
use super::matcher::SimilarityMatcher;
use crate::models::{CanonicalSet, ObservationRecord, RenameTable};
use tracing::trace;

/// Resolves record identities against one canonical set
pub struct IdentityResolver<'a> {
    canonical: &'a CanonicalSet,
    renames: Option<&'a RenameTable>,
    matcher: SimilarityMatcher,
}

impl<'a> IdentityResolver<'a> {
    /// Exact mode when `renames` is given, approximate mode otherwise
    pub fn new(
        canonical: &'a CanonicalSet,
        renames: Option<&'a RenameTable>,
        matcher: SimilarityMatcher,
    ) -> Self {
        Self {
            canonical,
            renames,
            matcher,
        }
    }

    pub fn is_exact(&self) -> bool {
        self.renames.is_some()
    }

    /// Rewrite the identity of every record that resolves and drop the rest.
    ///
    /// Exact mode never drops a record: unmapped names pass through and are
    /// left for the merger to report. Approximate mode reports each dropped
    /// record to `sink`.
    pub fn resolve(
        &self,
        records: Vec<ObservationRecord>,
        sink: &dyn DiagnosticSink,
    ) -> Vec<ObservationRecord> {
        match self.renames {
            Some(renames) => records
                .into_iter()
                .map(|record| rename(record, renames))
                .collect(),
            None => self.resolve_approximate(records, sink),
        }
    }

    fn resolve_approximate(
        &self,
        records: Vec<ObservationRecord>,
        sink: &dyn DiagnosticSink,
    ) -> Vec<ObservationRecord> {
        let stations = self.canonical.station_names();
        let rivers = self.canonical.river_names();
        let mut resolved = Vec::with_capacity(records.len());

        for mut record in records {
            match self.match_identity(&record, &stations, &rivers) {
                Some((station, river)) => {
                    trace!(
                        "Resolved {}/{} to {}/{}",
                        record.station_name, record.river_name, station, river
                    );
                    record.station_name = station.to_string();
                    record.river_name = river.to_string();
                    resolved.push(record);
                }
                None => sink.report(format!(
                    "Could not resolve station '{}' on river '{}'",
                    record.station_name, record.river_name
                )),
            }
        }

        resolved
    }

    /// Canonical `(station, river)` for a record, if both sides can be settled
    fn match_identity(
        &self,
        record: &ObservationRecord,
        stations: &[&'a str],
        rivers: &[&'a str],
    ) -> Option<(&'a str, &'a str)> {
        let mut station = self.matcher.find_best_match(&record.station_name, stations);
        let mut river = self.matcher.find_best_match(&record.river_name, rivers);

        match (station, river) {
            (Some(station_match), None) => river = self.river_on(record, station_match),
            (None, Some(river_match)) => station = self.station_on(record, river_match),
            _ => {}
        }

        if let (Some(station_match), Some(river_match)) = (station, river) {
            if !self
                .canonical
                .rivers_of_station(station_match)
                .contains(&river_match)
            {
                river = self.river_on(record, station_match);
            }
        }

        if let (Some(station_match), Some(river_match)) = (station, river) {
            if !self
                .canonical
                .stations_on_river(river_match)
                .contains(&station_match)
            {
                station = self.station_on(record, river_match);
            }
        }

        Some((station?, river?))
    }

    /// Match the record's river among the rivers of rows with this station
    fn river_on(&self, record: &ObservationRecord, station: &str) -> Option<&'a str> {
        let candidates = self.canonical.rivers_of_station(station);
        self.matcher.find_best_match(&record.river_name, &candidates)
    }

    /// Match the record's station among the stations of rows on this river
    fn station_on(&self, record: &ObservationRecord, river: &str) -> Option<&'a str> {
        let candidates = self.canonical.stations_on_river(river);
        self.matcher.find_best_match(&record.station_name, &candidates)
    }
}

fn rename(mut record: ObservationRecord, renames: &RenameTable) -> ObservationRecord {
    if let Some(station) = renames.get(&record.station_name) {
        record.station_name = station.to_string();
    }
    if let Some(river) = renames.get(&record.river_name) {
        record.river_name = river.to_string();
    }
    record
}
