//! Groups validated playlist records by station.
//!
//! Each station's playlists are ordered newest first by `last_updated`; records with
//! equal timestamps keep their input order. Station order is left unspecified here and
//! decided by the renderer.

use crate::foundation::error::PipelineError;
use crate::foundation::records::PlaylistRecord;
use regex::Regex;
use std::collections::HashMap;

/// Playlists grouped per station, plus the number of records kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationGroups {
    pub stations: HashMap<String, Vec<PlaylistRecord>>,
    pub total_playlist_count: usize,
}

/// Which records are dropped before grouping.
#[derive(Debug, Default)]
pub struct AggregatePolicy {
    pub drop_empty_playlists: bool,
    pub ignores: HashMap<String, Vec<Regex>>,
}

impl AggregatePolicy {
    /// Compiles per-station ignore patterns.
    ///
    /// Invalid patterns are reported and left out rather than failing the run.
    pub fn new<'a, I>(drop_empty_playlists: bool, station_ignores: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a Vec<String>)>,
    {
        let mut ignores = HashMap::new();

        for (station, patterns) in station_ignores {
            let compiled: Vec<Regex> = patterns
                .iter()
                .filter_map(|pattern| match Regex::new(pattern) {
                    Ok(regex) => Some(regex),
                    Err(e) => {
                        log::warn!(
                            "Ignoring invalid pattern '{}' for station {}: {}",
                            pattern,
                            station,
                            e
                        );
                        None
                    }
                })
                .collect();

            if !compiled.is_empty() {
                ignores.insert(station.clone(), compiled);
            }
        }

        Self {
            drop_empty_playlists,
            ignores,
        }
    }

    fn keeps(&self, record: &PlaylistRecord) -> bool {
        if self.drop_empty_playlists && record.track_count == 0 {
            return false;
        }

        !self
            .ignores
            .get(&record.station)
            .is_some_and(|patterns| patterns.iter().any(|re| re.is_match(&record.name)))
    }
}

/// Groups `records` by station under `policy`.
///
/// Fails only when handed no records at all.
pub fn aggregate(
    records: Vec<PlaylistRecord>,
    policy: &AggregatePolicy,
) -> Result<StationGroups, PipelineError> {
    if records.is_empty() {
        return Err(PipelineError::EmptyInput(
            "no playlist records to aggregate".to_string(),
        ));
    }

    let mut groups = StationGroups::default();
    let mut dropped = 0;

    for record in records {
        if !policy.keeps(&record) {
            log::debug!("Dropping {} / {}", record.station, record.name);
            dropped += 1;
            continue;
        }
        groups
            .stations
            .entry(record.station.clone())
            .or_default()
            .push(record);
        groups.total_playlist_count += 1;
    }

    for playlists in groups.stations.values_mut() {
        sort_newest_first(playlists);
    }

    log::info!(
        "Aggregated {} playlists across {} stations ({} dropped by policy)",
        groups.total_playlist_count,
        groups.stations.len(),
        dropped
    );
    Ok(groups)
}

/// Stable sort by `last_updated`, newest first.
pub fn sort_newest_first(playlists: &mut [PlaylistRecord]) {
    playlists.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(station: &str, name: &str, last_updated: &str, track_count: u64) -> PlaylistRecord {
        PlaylistRecord {
            station: station.to_string(),
            name: name.to_string(),
            url: format!("https://example.com/{name}"),
            track_count,
            last_updated: last_updated.to_string(),
            preview: Vec::new(),
        }
    }

    fn names(playlists: &[PlaylistRecord]) -> Vec<&str> {
        playlists.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_groups_and_orders_newest_first() {
        let records = vec![
            record("KALX", "old", "2024-01-01", 5),
            record("WFMU", "only", "2024-03-01", 5),
            record("KALX", "new", "2024-02-01", 5),
        ];

        let groups = aggregate(records, &AggregatePolicy::default()).unwrap();

        assert_eq!(groups.total_playlist_count, 3);
        assert_eq!(names(&groups.stations["KALX"]), vec!["new", "old"]);
        assert_eq!(names(&groups.stations["WFMU"]), vec!["only"]);
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let records = vec![
            record("KALX", "first", "2024-01-01", 1),
            record("KALX", "newer", "2024-06-01", 1),
            record("KALX", "second", "2024-01-01", 1),
            record("KALX", "third", "2024-01-01", 1),
        ];

        let groups = aggregate(records, &AggregatePolicy::default()).unwrap();

        assert_eq!(
            names(&groups.stations["KALX"]),
            vec!["newer", "first", "second", "third"]
        );
    }

    #[test]
    fn test_drop_empty_policy() {
        let records = vec![
            record("KALX", "empty", "2024-01-01", 0),
            record("KALX", "full", "2024-01-01", 9),
        ];
        let policy = AggregatePolicy {
            drop_empty_playlists: true,
            ..Default::default()
        };

        let groups = aggregate(records, &policy).unwrap();

        assert_eq!(groups.total_playlist_count, 1);
        assert_eq!(names(&groups.stations["KALX"]), vec!["full"]);
    }

    #[test]
    fn test_ignore_patterns_apply_per_station() {
        let ignores = HashMap::from([(
            "KALX".to_string(),
            vec!["^Test".to_string(), "([".to_string()],
        )]);
        let policy = AggregatePolicy::new(false, &ignores);

        let records = vec![
            record("KALX", "Test Pattern", "2024-01-01", 1),
            record("KALX", "Real Show", "2024-01-01", 1),
            record("WFMU", "Test Pattern", "2024-01-01", 1),
        ];

        let groups = aggregate(records, &policy).unwrap();

        assert_eq!(policy.ignores["KALX"].len(), 1);
        assert_eq!(names(&groups.stations["KALX"]), vec!["Real Show"]);
        assert_eq!(names(&groups.stations["WFMU"]), vec!["Test Pattern"]);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let result = aggregate(Vec::new(), &AggregatePolicy::default());
        assert!(matches!(result, Err(PipelineError::EmptyInput(_))));
    }
}
