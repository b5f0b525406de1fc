mod auth;
mod cleanup;
mod duplicates;
mod playlists;
mod remote_error;

pub use auth::{
    authorize, authorize_url, bind_callback_listener, parse_callback, refresh_access_token,
    wait_for_code, CallbackRequest, TokenGrant,
};
pub use cleanup::*;
pub use duplicates::*;
#[cfg(test)]
pub use playlists::MockPlaylistService;
pub use playlists::{list_all, PlaylistPage, PlaylistService, RemotePlaylist, SpotifyClient};
pub use remote_error::{AuthError, CleanupError, RemoteDeleteError, RemoteError};
