//! The aggregated JSON dump that accompanies the HTML page.

use crate::foundation::error::PipelineError;
use crate::foundation::records::PlaylistRecord;
use crate::process::{sort_newest_first, StationGroups};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;

/// `{"stations": {...}, "timestamp": "...", "total_playlist_count": n}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedDump {
    pub stations: BTreeMap<String, Vec<PlaylistRecord>>,
    pub timestamp: String,
    pub total_playlist_count: usize,
}

impl AggregatedDump {
    /// Builds the dump with stations keyed in lexicographic order and each station's
    /// playlists newest first.
    pub fn from_groups(groups: &StationGroups, timestamp: &str) -> Self {
        let stations = groups
            .stations
            .iter()
            .map(|(station, playlists)| {
                let mut playlists = playlists.clone();
                sort_newest_first(&mut playlists);
                (station.clone(), playlists)
            })
            .collect();

        Self {
            stations,
            timestamp: timestamp.to_string(),
            total_playlist_count: groups.total_playlist_count,
        }
    }

    /// Turns the dump back into station groups, restoring each record's station.
    ///
    /// The count is recomputed from the entries rather than taken from the file.
    pub fn into_groups(self) -> StationGroups {
        let total_playlist_count = self.stations.values().map(Vec::len).sum();
        if total_playlist_count != self.total_playlist_count {
            log::warn!(
                "Dump claims {} playlists but holds {}",
                self.total_playlist_count,
                total_playlist_count
            );
        }

        let stations: HashMap<String, Vec<PlaylistRecord>> = self
            .stations
            .into_iter()
            .map(|(station, mut playlists)| {
                for playlist in &mut playlists {
                    playlist.station = station.clone();
                }
                (station, playlists)
            })
            .collect();

        StationGroups {
            stations,
            total_playlist_count,
        }
    }

    pub fn to_json(&self) -> Result<String, PipelineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Reads a previously written dump.
pub fn read_dump<R: Read>(reader: R) -> Result<AggregatedDump, PipelineError> {
    Ok(serde_json::from_reader(reader)?)
}
