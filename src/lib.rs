pub mod api_client;
pub mod configuration;
pub mod foundation;
pub mod process;
pub mod render;
pub mod startup;

pub use api_client::{resolve_duplicates, Cleanup, CleanupMode, CleanupOutcome, MembershipRule};
pub use configuration::*;
pub use foundation::error::{ParseIssue, PipelineError};
pub use foundation::records::{parse_records, PlaylistRecord, TrackPreview};
pub use process::{aggregate, AggregatePolicy, StationGroups};
pub use render::{render_html, render_snapshot, write_snapshot, RenderOptions};
