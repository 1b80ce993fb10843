mod timestamp_repository;

pub use timestamp_repository::{format_timestamp, parse_timestamp, JsonTimestampRepository};
