pub mod feed;
pub mod entry;
pub mod keywords;
pub mod notification;

pub use feed::{FeedConfig, FeedGroup};
pub use entry::Entry;
pub use keywords::KeywordSet;
pub use notification::{MessageFormat, Notification};
