use serde::{Deserialize, Serialize};

/// A single show playlist scraped for one station.
///
/// `station` is guaranteed non-empty once a record leaves the parser. It is not part of
/// the serialized dump entry because the dump already keys entries by station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistRecord {
    #[serde(skip)]
    pub station: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub track_count: u64,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub preview: Vec<TrackPreview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPreview {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl TrackPreview {
    /// The image reference, if the track carries a non-empty one.
    pub fn image(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Wire shape of one input line before validation.
///
/// Required fields are optional here so a missing field is reported as such instead of
/// as a generic decode failure.
#[derive(Debug, Deserialize)]
pub(crate) struct RawPlaylistRecord {
    pub station: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub track_count: Option<u64>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub preview: Option<Vec<TrackPreview>>,
}
