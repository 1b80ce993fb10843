use chrono::{DateTime, Utc};

/// One item of a fetched feed. Lives only for the run that fetched it.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub title: String,
    pub link: String,
    pub description: String,
    pub published: Option<DateTime<Utc>>,
}

impl Entry {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            link: String::new(),
            description: String::new(),
            published: None,
        }
    }

    pub fn with_link(mut self, link: &str) -> Self {
        self.link = link.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_published(mut self, published: Option<DateTime<Utc>>) -> Self {
        self.published = published;
        self
    }

    /// True when the entry carries a publication time strictly after `since`
    pub fn is_newer_than(&self, since: DateTime<Utc>) -> bool {
        self.published.is_some_and(|published| published > since)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_is_newer_than_is_strict() {
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let entry = Entry::new("Headline").with_published(Some(t));

        assert!(entry.is_newer_than(t - chrono::Duration::seconds(1)));
        assert!(!entry.is_newer_than(t));
    }

    #[test]
    fn test_undated_entry_is_never_newer() {
        let entry = Entry::new("Undated");
        assert!(!entry.is_newer_than(DateTime::<Utc>::MIN_UTC));
    }
}
