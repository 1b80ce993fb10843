use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::errors::RelayResult;

/// Feed name -> publication time of the latest entry already handled
pub type TimestampMap = BTreeMap<String, DateTime<Utc>>;

#[cfg_attr(test, mockall::automock)]
pub trait TimestampRepository {
    /// Previously saved timestamps. Missing or unreadable state is empty.
    fn load(&self) -> TimestampMap;

    /// Replace the stored state with `timestamps`
    fn save(&self, timestamps: &TimestampMap) -> RelayResult<()>;
}
