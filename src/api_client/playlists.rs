//! Access to the account's playlists on the hosting service.

use crate::api_client::RemoteError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;

/// A playlist as listed by the hosting service.
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePlaylist {
    pub id: String,
    pub name: String,
    pub description: String,
    pub track_count: u64,
    /// Opaque per-object version token, used as a best-effort "most recently
    /// modified" signal. Not a timestamp.
    pub recency_proxy: Option<String>,
}

/// One page of a listing and the cursor for the next, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaylistPage {
    pub items: Vec<RemotePlaylist>,
    pub next: Option<String>,
}

/// The two remote operations cleanup needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaylistService: Send + Sync {
    /// Fetches the page at `cursor`, or the first page when `cursor` is `None`.
    ///
    /// A non-success response is an error.
    async fn list_page(&self, cursor: Option<String>) -> Result<PlaylistPage, RemoteError>;

    /// Removes a playlist and returns the HTTP status the service answered with.
    async fn delete_playlist(&self, id: &str) -> Result<u16, RemoteError>;
}

/// Follows cursors until the listing is exhausted.
///
/// A cursor that was already followed is an error, so a cycling listing cannot loop.
pub async fn list_all(service: &dyn PlaylistService) -> Result<Vec<RemotePlaylist>, RemoteError> {
    let mut playlists = Vec::new();
    let mut seen_cursors = HashSet::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = service.list_page(cursor.clone()).await?;
        log::debug!("Fetched {} playlists", page.items.len());
        playlists.extend(page.items);

        match page.next {
            Some(next) if !seen_cursors.insert(next.clone()) => {
                return Err(RemoteError::Decode(format!(
                    "listing cursor repeated: {next}"
                )));
            }
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(playlists)
}

#[derive(Debug, Deserialize)]
struct PlaylistPageResponse {
    #[serde(default)]
    items: Vec<Option<PlaylistItem>>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    snapshot_id: Option<String>,
    #[serde(default)]
    tracks: Option<TrackTotal>,
}

#[derive(Debug, Deserialize)]
struct TrackTotal {
    #[serde(default)]
    total: u64,
}

impl From<PlaylistItem> for RemotePlaylist {
    fn from(item: PlaylistItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description.unwrap_or_default(),
            track_count: item.tracks.map(|t| t.total).unwrap_or(0),
            recency_proxy: item.snapshot_id.filter(|s| !s.is_empty()),
        }
    }
}

/// Spotify Web API client for an already authorized user.
pub struct SpotifyClient {
    client: Client,
    access_token: String,
    api_base_url: String,
}

impl SpotifyClient {
    pub fn new(client: Client, access_token: String, api_base_url: &str) -> Self {
        Self {
            client,
            access_token,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PlaylistService for SpotifyClient {
    async fn list_page(&self, cursor: Option<String>) -> Result<PlaylistPage, RemoteError> {
        let url = cursor.unwrap_or_else(|| format!("{}/me/playlists?limit=50", self.api_base_url));

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let page: PlaylistPageResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        Ok(parse_page(page))
    }

    async fn delete_playlist(&self, id: &str) -> Result<u16, RemoteError> {
        // Owners "delete" a Spotify playlist by unfollowing it.
        let url = format!("{}/playlists/{}/followers", self.api_base_url, id);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        Ok(response.status().as_u16())
    }
}

fn parse_page(page: PlaylistPageResponse) -> PlaylistPage {
    PlaylistPage {
        items: page.items.into_iter().flatten().map(RemotePlaylist::from).collect(),
        next: page.next,
    }
}
