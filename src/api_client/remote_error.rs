use std::io;
use thiserror::Error;

/// Failures talking to the playlist-hosting service.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Why a single playlist could not be removed. Recorded, never raised.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RemoteDeleteError {
    #[error("remote answered with status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(String),
}

/// Fatal errors of a cleanup run. Nothing has been deleted when one of these is returned.
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("could not list remote playlists: {0}")]
    RemoteList(#[source] RemoteError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Failures of the authorization bootstrap and token refresh.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(
        "no authorization callback arrived within {waited_secs} seconds. Make sure {redirect_uri} \
         is registered as a redirect URI for the app and that the browser finished the consent \
         page, then run `radiolist authorize` again"
    )]
    AuthorizationTimeout {
        waited_secs: u64,
        redirect_uri: String,
    },

    #[error("authorization callback failed: {0}")]
    Callback(String),

    #[error("token request failed: {0}")]
    TokenExchange(String),

    #[error("missing Spotify setting '{0}' (set spotify.{0} in config.yaml or RADIOLIST_SPOTIFY__{1})")]
    MissingCredential(&'static str, &'static str),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
