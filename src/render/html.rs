//! Static HTML rendering of aggregated station playlists.
//!
//! Output depends only on the inputs: stations are emitted in lexicographic order,
//! playlists newest first (re-sorted here, whatever order they arrive in), and each
//! playlist's accent color is a digest of its name.

use crate::foundation::error::PipelineError;
use crate::foundation::records::{PlaylistRecord, TrackPreview};
use crate::foundation::utils::{escape_html, normalize_name};
use crate::process::{sort_newest_first, StationGroups};
use crate::render::options::RenderOptions;
use std::collections::HashSet;

/// Renders the full document.
///
/// Fails with [`PipelineError::EmptyInput`] when there are no stations. A station
/// without playlists renders as an empty section.
pub fn render_html(
    groups: &StationGroups,
    generated_at: &str,
    options: &RenderOptions,
) -> Result<String, PipelineError> {
    if groups.stations.is_empty() {
        return Err(PipelineError::EmptyInput("no stations to render".to_string()));
    }

    let mut html = document_head(options);
    html.push(format!("<h1>{}</h1>", escape_html(&options.title)));
    html.push(format!(
        "<p>Updated: {} · Total Playlists: {}</p>",
        escape_html(generated_at),
        groups.total_playlist_count
    ));

    let mut stations: Vec<&String> = groups.stations.keys().collect();
    stations.sort();

    for station in stations {
        let mut playlists = groups.stations[station].clone();
        sort_newest_first(&mut playlists);

        html.push(format!(
            "<div class=\"station\"><h2>{}</h2>",
            escape_html(station)
        ));
        html.push("<ul class=\"playlist-list\">".to_string());
        for playlist in &playlists {
            render_playlist(&mut html, playlist, options);
        }
        html.push("</ul></div>".to_string());
    }

    html.push("</body></html>".to_string());
    Ok(html.join("\n"))
}

fn document_head(options: &RenderOptions) -> Vec<String> {
    let palette = options.theme.palette();
    let columns = options.grid_columns.max(1);

    vec![
        "<!DOCTYPE html>".to_string(),
        "<html lang=\"en\"><head><meta charset=\"utf-8\">".to_string(),
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">".to_string(),
        format!("<title>{}</title>", escape_html(&options.title)),
        "<style>".to_string(),
        "@import url('https://fonts.googleapis.com/css2?family=Permanent+Marker&display=swap');".to_string(),
        format!(
            "body {{ font-family: \"Segoe UI\", Roboto, \"Helvetica Neue\", Arial, sans-serif; max-width: 100vw; margin: 0; padding: 1rem; background: {}; color: {}; }}",
            palette.background, palette.text
        ),
        "a { color: inherit; text-decoration: none; }".to_string(),
        "h1 { font-size: 1.5rem; margin-bottom: 0.5rem; }".to_string(),
        "h2 { font-size: 1.25rem; margin-bottom: 0.5rem; }".to_string(),
        "h3 { font-family: 'Permanent Marker', cursive; font-size: 2rem; margin: 0 0 0.5rem; }".to_string(),
        ".station { margin-bottom: 2rem; }".to_string(),
        ".playlist-list { list-style: none; margin: 0; padding: 0; }".to_string(),
        format!(
            ".card {{ display: block; max-width: 800px; margin: 0 auto 1rem; background: {}; border-left: 6px solid transparent; border-radius: 8px; padding: 1rem; transition: background-color 0.2s ease; }}",
            palette.card
        ),
        format!(".card:hover {{ background-color: {}; }}", palette.card_hover),
        format!(".meta {{ font-size: 0.9rem; color: {}; margin: 0 0 0.5rem; }}", palette.meta),
        format!(
            ".media-block {{ display: grid; grid-template-columns: repeat({}, 1fr); gap: 0.25rem; margin-bottom: 0.5rem; }}",
            columns + 1
        ),
        ".artists-list { grid-column: 1; list-style: none; margin: 0; padding: 0; }".to_string(),
        ".artists-list li { margin-bottom: 0.5rem; }".to_string(),
        format!(
            ".preview-grid {{ grid-column: 2 / span {columns}; display: grid; grid-template-columns: repeat({columns}, 1fr); gap: 0.25rem; }}"
        ),
        ".preview-grid img { width: 100%; height: auto; object-fit: cover; border-radius: 4px; }".to_string(),
        "</style></head><body>".to_string(),
    ]
}

fn render_playlist(html: &mut Vec<String>, playlist: &PlaylistRecord, options: &RenderOptions) {
    let preview = &playlist.preview[..playlist.preview.len().min(options.preview_limit)];

    html.push(format!(
        "<li><a class=\"card\" href=\"{}\" style=\"border-left-color: {}\">",
        escape_html(&playlist.url),
        accent_color(&playlist.name)
    ));
    html.push(format!("<h3>{}</h3>", escape_html(&playlist.name)));
    html.push(format!(
        "<p class=\"meta\">{}</p>",
        escape_html(
            &options
                .caption
                .caption(playlist.track_count, &playlist.last_updated)
        )
    ));

    html.push("<div class=\"media-block\">".to_string());
    html.push("<ul class=\"artists-list\">".to_string());
    for artist in distinct_artists(preview) {
        html.push(format!("<li>{}</li>", escape_html(artist)));
    }
    html.push("</ul>".to_string());

    html.push("<div class=\"preview-grid\">".to_string());
    for track in preview {
        if let Some(image) = track.image() {
            html.push(format!(
                "<img src=\"{}\" alt=\"{}\" loading=\"lazy\"/>",
                escape_html(image),
                escape_html(&track.name)
            ));
        }
    }
    html.push("</div>".to_string());
    html.push("</div>".to_string());
    html.push("</a></li>".to_string());
}

/// Artist names across `tracks`, first occurrence wins. Blank names are skipped.
pub fn distinct_artists(tracks: &[TrackPreview]) -> Vec<&str> {
    let mut seen = HashSet::new();
    tracks
        .iter()
        .flat_map(|track| track.artists.iter())
        .map(|artist| artist.trim())
        .filter(|artist| !artist.is_empty() && seen.insert(*artist))
        .collect()
}

/// A stable HSL accent derived from the MD5 digest of the NFC-normalized name.
pub fn accent_color(name: &str) -> String {
    let digest = md5::compute(normalize_name(name).as_bytes());
    let hue = u16::from_be_bytes([digest.0[0], digest.0[1]]) % 360;
    format!("hsl({hue}, 65%, 45%)")
}
