mod models;
mod parser;

pub use models::{PlaylistRecord, TrackPreview};
pub use parser::{parse_line, parse_records, ParsedRecords};
