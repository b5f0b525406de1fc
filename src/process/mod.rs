mod aggregate;

pub use aggregate::{aggregate, sort_newest_first, AggregatePolicy, StationGroups};
