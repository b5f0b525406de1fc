use serde::Deserialize;

/// Number of preview tracks considered per playlist.
pub const DEFAULT_PREVIEW_LIMIT: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Colors a theme paints the page with.
pub(crate) struct Palette {
    pub background: &'static str,
    pub text: &'static str,
    pub card: &'static str,
    pub card_hover: &'static str,
    pub meta: &'static str,
}

impl Theme {
    pub(crate) fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                background: "#ffffff",
                text: "#111111",
                card: "#fafafa",
                card_hover: "#eaeaea",
                meta: "#555555",
            },
            Theme::Dark => Palette {
                background: "#121212",
                text: "#eeeeee",
                card: "#1e1e1e",
                card_hover: "#2a2a2a",
                meta: "#aaaaaa",
            },
        }
    }
}

/// What the line under each playlist title shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaptionFormat {
    /// `42 songs · 2024-05-01T10:00:00Z`
    #[default]
    TracksAndDate,
    /// `42 songs`
    TracksOnly,
}

impl CaptionFormat {
    pub fn caption(self, track_count: u64, last_updated: &str) -> String {
        match self {
            CaptionFormat::TracksAndDate => format!("{track_count} songs · {last_updated}"),
            CaptionFormat::TracksOnly => format!("{track_count} songs"),
        }
    }
}

/// Presentation parameters for the static page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub title: String,
    pub theme: Theme,
    /// Columns of the image tile grid next to the artist list.
    pub grid_columns: usize,
    pub preview_limit: usize,
    pub caption: CaptionFormat,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: "Radio Station Spotify Playlists".to_string(),
            theme: Theme::default(),
            grid_columns: 4,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
            caption: CaptionFormat::default(),
        }
    }
}
