mod dump;
mod html;
mod options;

pub use dump::{read_dump, AggregatedDump};
pub use html::{accent_color, distinct_artists, render_html};
pub use options::{CaptionFormat, RenderOptions, Theme, DEFAULT_PREVIEW_LIMIT};

use crate::foundation::error::PipelineError;
use crate::process::StationGroups;
use std::fs;
use std::path::{Path, PathBuf};

/// The rendered page and its companion dump, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub html: String,
    pub dump: AggregatedDump,
}

/// Where a snapshot is written. No dump is written when `dump` is `None`.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub html: PathBuf,
    pub dump: Option<PathBuf>,
}

/// Renders the page and dump for one generation run.
pub fn render_snapshot(
    groups: &StationGroups,
    generated_at: &str,
    options: &RenderOptions,
) -> Result<Snapshot, PipelineError> {
    let html = render_html(groups, generated_at, options)?;
    let dump = AggregatedDump::from_groups(groups, generated_at);
    Ok(Snapshot { html, dump })
}

/// Writes the snapshot, creating parent directories as needed.
pub fn write_snapshot(snapshot: &Snapshot, paths: &OutputPaths) -> Result<(), PipelineError> {
    write_file(&paths.html, &snapshot.html)?;
    if let Some(dump_path) = &paths.dump {
        write_file(dump_path, &snapshot.dump.to_json()?)?;
    }
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}
