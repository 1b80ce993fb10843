/// Which delivery rule applies to a feed's new entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedGroup {
    /// Every new entry is forwarded
    All,
    /// New entries are forwarded only when they match a keyword
    KeywordFiltered,
}

impl FeedGroup {
    /// Groups in the order a run processes them
    pub const ORDER: [FeedGroup; 2] = [FeedGroup::All, FeedGroup::KeywordFiltered];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedGroup::All => "all",
            FeedGroup::KeywordFiltered => "keyword_filtered",
        }
    }

    pub fn filters_by_keywords(&self) -> bool {
        matches!(self, FeedGroup::KeywordFiltered)
    }
}

impl std::fmt::Display for FeedGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
    pub group: FeedGroup,
}

impl FeedConfig {
    pub fn new(name: &str, url: &str, group: FeedGroup) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            group,
        }
    }
}
