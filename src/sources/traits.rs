use crate::domain::Entry;
use crate::errors::RelayResult;

#[cfg_attr(test, mockall::automock)]
pub trait FeedFetcher {
    /// Retrieve and parse the feed at `url`. A feed with no items is
    /// `Ok(vec![])`; network and parse failures are errors.
    fn fetch(&self, url: &str) -> RelayResult<Vec<Entry>>;
}
