//! # Subcommand drivers
//!
//! Each function here wires configuration, input and the remote service to one of the
//! library's workflows:
//!
//! 1. `run_render` parses scraped records (or a previous dump), aggregates them per
//!    station and writes the static page plus dump
//! 2. `run_cleanup` lists the account's playlists and removes duplicates, or every
//!    playlist this tool created, after confirmation
//! 3. `run_authorize` performs the one-time authorization and prints a refresh token

use crate::api_client::{self, Cleanup, CleanupMode, CleanupOutcome, SpotifyClient};
use crate::configuration::Settings;
use crate::foundation::records::parse_records;
use crate::process::{aggregate, AggregatePolicy, StationGroups};
use crate::render::{read_dump, render_snapshot, write_snapshot};
use anyhow::Context;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Where `run_render` reads from and writes to.
#[derive(Debug, Default)]
pub struct RenderRequest {
    /// Line-delimited JSON records, or a dump with `from_dump`. `None` or `-` is stdin.
    pub input: Option<PathBuf>,
    pub from_dump: bool,
    pub html_path: Option<PathBuf>,
    pub dump_path: Option<PathBuf>,
}

pub fn run_render(settings: &Settings, request: &RenderRequest) -> anyhow::Result<()> {
    let reader = open_input(request.input.as_deref()).context("Unable to open render input")?;

    let (groups, generated_at) = if request.from_dump {
        let dump = read_dump(reader).context("Unable to read playlist dump")?;
        let timestamp = dump.timestamp.clone();
        (dump.into_groups(), timestamp)
    } else {
        (load_records(settings, reader)?, generation_timestamp())
    };

    let snapshot = render_snapshot(&groups, &generated_at, &settings.render)?;

    let mut paths = settings.output.paths();
    if let Some(html_path) = &request.html_path {
        paths.html = html_path.clone();
    }
    if request.from_dump {
        paths.dump = None;
    }
    if let Some(dump_path) = &request.dump_path {
        paths.dump = Some(dump_path.clone());
    }

    write_snapshot(&snapshot, &paths)?;

    println!(
        "\x1b[32mRendered {} playlists across {} stations to {}\x1b[0m",
        groups.total_playlist_count,
        groups.stations.len(),
        paths.html.display()
    );
    if let Some(dump_path) = &paths.dump {
        println!("\x1b[32mWrote playlist dump to {}\x1b[0m", dump_path.display());
    }
    Ok(())
}

fn load_records(settings: &Settings, reader: Box<dyn BufRead>) -> anyhow::Result<StationGroups> {
    let parsed = parse_records(reader)?;
    if !parsed.issues.is_empty() {
        eprintln!(
            "\x1b[33mSkipped {} malformed or incomplete lines\x1b[0m",
            parsed.issues.len()
        );
    }

    let policy = AggregatePolicy::new(
        settings.aggregate.drop_empty_playlists,
        settings.stations.iter().map(|s| (&s.name, &s.ignores)),
    );
    Ok(aggregate(parsed.records, &policy)?)
}

fn open_input(input: Option<&Path>) -> io::Result<Box<dyn BufRead>> {
    match input {
        Some(path) if path != Path::new("-") => Ok(Box::new(BufReader::new(File::open(path)?))),
        _ => Ok(Box::new(io::stdin().lock())),
    }
}

fn generation_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string()
}

pub async fn run_cleanup(settings: &Settings, mode: CleanupMode) -> anyhow::Result<CleanupOutcome> {
    let client = reqwest::Client::new();

    println!("\x1b[1m\x1b[34mGetting Spotify access token...\x1b[0m");
    let access_token = api_client::refresh_access_token(&client, &settings.spotify)
        .await
        .context("Unable to obtain an access token")?;

    let spotify = SpotifyClient::new(client, access_token, &settings.spotify.api_base_url);
    let mut cleanup = Cleanup::new(&spotify, &settings.cleanup, mode);

    Ok(cleanup.run(io::stdin().lock()).await?)
}

pub async fn run_authorize(settings: &Settings) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let grant = api_client::authorize(&client, &settings.spotify).await?;

    println!("\x1b[32mAuthorization complete.\x1b[0m");
    if let Some(refresh_token) = &grant.refresh_token {
        println!("Add this to your configuration (spotify.refresh_token) or environment:");
        println!("  RADIOLIST_SPOTIFY__REFRESH_TOKEN={refresh_token}");
    }
    Ok(())
}
