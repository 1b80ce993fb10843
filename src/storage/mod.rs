pub mod traits;
pub mod json;

pub use traits::{TimestampMap, TimestampRepository};
pub use json::JsonTimestampRepository;
