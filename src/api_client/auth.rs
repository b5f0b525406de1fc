//! Spotify authorization: the one-time authorization-code bootstrap that yields a
//! refresh token, and the per-run refresh that yields an access token.
//!
//! The local callback listener answers every connection on its own task and hands the
//! code to the waiting flow over a channel; the wait has a fixed deadline.

use crate::api_client::AuthError;
use crate::configuration::SpotifySettings;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

const SCOPES: &str = "playlist-modify-public playlist-modify-private playlist-read-private";

/// Tokens returned by the accounts service.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// What the browser asked the callback listener for.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackRequest {
    Code(String),
    Denied(String),
    MissingCode,
    NotFound,
}

fn require<'a>(value: &'a str, field: &'static str, env: &'static str) -> Result<&'a str, AuthError> {
    if value.trim().is_empty() {
        Err(AuthError::MissingCredential(field, env))
    } else {
        Ok(value)
    }
}

/// Exchanges the configured refresh token for a fresh access token.
pub async fn refresh_access_token(client: &Client, settings: &SpotifySettings) -> Result<String, AuthError> {
    let refresh_token = require(&settings.refresh_token, "refresh_token", "REFRESH_TOKEN")?;
    let grant = request_token(
        client,
        settings,
        &[("grant_type", "refresh_token"), ("refresh_token", refresh_token)],
    )
    .await?;
    Ok(grant.access_token)
}

/// The consent page URL the operator opens in a browser.
pub fn authorize_url(settings: &SpotifySettings) -> Result<Url, AuthError> {
    let client_id = require(&settings.client_id, "client_id", "CLIENT_ID")?;
    let base = format!("{}/authorize", settings.accounts_base_url.trim_end_matches('/'));

    Url::parse_with_params(
        &base,
        &[
            ("client_id", client_id),
            ("response_type", "code"),
            ("redirect_uri", settings.redirect_uri.as_str()),
            ("scope", SCOPES),
            ("show_dialog", "true"),
        ],
    )
    .map_err(|e| AuthError::Callback(format!("invalid accounts URL: {e}")))
}

/// Runs the authorization-code flow end to end and returns the granted tokens.
///
/// Prints the consent URL, then waits for the browser to hit the redirect URI. Gives
/// up with [`AuthError::AuthorizationTimeout`] after the configured deadline.
pub async fn authorize(client: &Client, settings: &SpotifySettings) -> Result<TokenGrant, AuthError> {
    let url = authorize_url(settings)?;
    let listener = bind_callback_listener(&settings.redirect_uri).await?;

    println!("\x1b[1m\x1b[34mOpen this URL in a browser to authorize radiolist:\x1b[0m");
    println!("  {url}");
    println!("Waiting for the authorization callback...");

    let timeout = Duration::from_secs(settings.authorization_timeout_secs);
    let code = wait_for_code(listener, timeout, &settings.redirect_uri).await?;
    log::info!("Received authorization code");

    let grant = request_token(
        client,
        settings,
        &[
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("redirect_uri", settings.redirect_uri.as_str()),
        ],
    )
    .await?;

    if grant.refresh_token.is_none() {
        return Err(AuthError::TokenExchange(
            "response carried no refresh token".to_string(),
        ));
    }
    Ok(grant)
}

async fn request_token(
    client: &Client,
    settings: &SpotifySettings,
    form: &[(&str, &str)],
) -> Result<TokenGrant, AuthError> {
    let client_id = require(&settings.client_id, "client_id", "CLIENT_ID")?;
    let client_secret = require(&settings.client_secret, "client_secret", "CLIENT_SECRET")?;
    let url = format!("{}/api/token", settings.accounts_base_url.trim_end_matches('/'));

    let response = client
        .post(&url)
        .basic_auth(client_id, Some(client_secret))
        .form(form)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::TokenExchange(format!("{status}: {body}")));
    }

    response
        .json::<TokenGrant>()
        .await
        .map_err(|e| AuthError::TokenExchange(e.to_string()))
}

/// Binds a listener on the host and port of `redirect_uri`.
pub async fn bind_callback_listener(redirect_uri: &str) -> Result<TcpListener, AuthError> {
    let url = Url::parse(redirect_uri)
        .map_err(|e| AuthError::Callback(format!("invalid redirect URI {redirect_uri}: {e}")))?;
    let host = url.host_str().unwrap_or("127.0.0.1");
    let port = url.port_or_known_default().unwrap_or(8888);

    Ok(TcpListener::bind((host, port)).await?)
}

/// Serves callbacks on `listener` until one carries a code (or a denial), or until
/// `timeout` elapses. Only requests for the path of `redirect_uri` are answered as
/// callbacks.
pub async fn wait_for_code(
    listener: TcpListener,
    timeout: Duration,
    redirect_uri: &str,
) -> Result<String, AuthError> {
    let callback_path = Url::parse(redirect_uri)
        .map_err(|e| AuthError::Callback(format!("invalid redirect URI {redirect_uri}: {e}")))?
        .path()
        .to_string();

    let (tx, mut rx) = mpsc::channel(1);
    let server = tokio::spawn(serve_callbacks(listener, Arc::from(callback_path), tx));

    let result = match tokio::time::timeout(timeout, rx.recv()).await {
        Ok(Some(outcome)) => outcome,
        Ok(None) => Err(AuthError::Callback(
            "callback listener stopped unexpectedly".to_string(),
        )),
        Err(_) => Err(AuthError::AuthorizationTimeout {
            waited_secs: timeout.as_secs(),
            redirect_uri: redirect_uri.to_string(),
        }),
    };

    // Dropping the server's JoinSet aborts connections still being answered.
    server.abort();
    result
}

/// Accepts connections and answers each one on its own task, so an idle connection
/// never holds up the real callback.
async fn serve_callbacks(
    listener: TcpListener,
    callback_path: Arc<str>,
    tx: mpsc::Sender<Result<String, AuthError>>,
) {
    let mut connections = JoinSet::new();

    loop {
        let (stream, _) = match listener.accept().await {
            Ok(connection) => connection,
            Err(e) => {
                let _ = tx.send(Err(AuthError::Io(e))).await;
                return;
            }
        };

        let tx = tx.clone();
        let callback_path = Arc::clone(&callback_path);
        connections.spawn(async move {
            match answer_callback(stream, &callback_path).await {
                Ok(CallbackRequest::Code(code)) => {
                    let _ = tx.send(Ok(code)).await;
                }
                Ok(CallbackRequest::Denied(reason)) => {
                    let _ = tx
                        .send(Err(AuthError::Callback(format!(
                            "authorization was denied: {reason}"
                        ))))
                        .await;
                }
                Ok(_) => {}
                Err(e) => log::debug!("Callback connection failed: {}", e),
            }
        });
    }
}

async fn answer_callback(stream: TcpStream, callback_path: &str) -> std::io::Result<CallbackRequest> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    // Drain the headers so closing the socket does not reset the connection.
    let mut header = String::new();
    loop {
        header.clear();
        if reader.read_line(&mut header).await? == 0 || header.trim().is_empty() {
            break;
        }
    }

    let target = request_line.split_whitespace().nth(1).unwrap_or("/");
    let request = parse_callback(target, callback_path);

    let (status, body) = match &request {
        CallbackRequest::Code(_) => (
            "200 OK",
            "<h1>Success!</h1><p>You can close this window and return to the terminal.</p>",
        ),
        CallbackRequest::Denied(_) => (
            "200 OK",
            "<h1>Authorization denied</h1><p>You can close this window.</p>",
        ),
        CallbackRequest::MissingCode => (
            "400 Bad Request",
            "<h1>Error!</h1><p>No authorization code received.</p>",
        ),
        CallbackRequest::NotFound => ("404 Not Found", ""),
    };

    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let mut stream = reader.into_inner();
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;

    Ok(request)
}

/// Classifies a request target such as `/callback?code=abc` against the path the
/// redirect URI points at.
pub fn parse_callback(target: &str, callback_path: &str) -> CallbackRequest {
    let Ok(url) = Url::parse("http://localhost").and_then(|base| base.join(target)) else {
        return CallbackRequest::NotFound;
    };

    if url.path() != callback_path {
        return CallbackRequest::NotFound;
    }

    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" if !value.is_empty() => return CallbackRequest::Code(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    match error {
        Some(reason) => CallbackRequest::Denied(reason),
        None => CallbackRequest::MissingCode,
    }
}
