use chrono::{DateTime, Utc};

use crate::domain::{Entry, KeywordSet};

/// Entries worth forwarding, and the new high-water mark for the feed
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub entries: Vec<Entry>,
    pub latest: DateTime<Utc>,
}

/// Keep entries published after `since` and, when `keywords` is given,
/// matching at least one keyword. `latest` advances over every entry newer
/// than `since`, whether or not the keyword check kept it, so dropped
/// entries are not looked at again next run.
pub fn select(
    entries: Vec<Entry>,
    since: DateTime<Utc>,
    keywords: Option<&KeywordSet>,
) -> Selection {
    let mut latest = since;
    let mut selected = Vec::new();

    for entry in entries {
        if !entry.is_newer_than(since) {
            continue;
        }
        if let Some(published) = entry.published {
            latest = latest.max(published);
        }

        if let Some(keywords) = keywords {
            if !keywords.matches_entry(&entry) {
                continue;
            }
        }

        selected.push(entry);
    }

    Selection {
        entries: selected,
        latest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    fn entry(title: &str, published: DateTime<Utc>) -> Entry {
        Entry::new(title).with_published(Some(published))
    }

    #[test]
    fn test_old_entries_excluded() {
        let entries = vec![
            entry("older", at(1, 0)),
            entry("same instant", at(2, 0)),
            entry("newer", at(3, 0)),
        ];

        let selection = select(entries, at(2, 0), None);

        assert_eq!(selection.entries.len(), 1);
        assert_eq!(selection.entries[0].title, "newer");
        assert_eq!(selection.latest, at(3, 0));
    }

    #[test]
    fn test_feed_order_preserved() {
        let entries = vec![
            entry("third", at(4, 0)),
            entry("first", at(2, 0)),
            entry("second", at(3, 0)),
        ];

        let selection = select(entries, at(1, 0), None);

        let titles: Vec<_> = selection.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "first", "second"]);
        assert_eq!(selection.latest, at(4, 0));
    }

    #[test]
    fn test_empty_feed_keeps_since() {
        let selection = select(Vec::new(), at(1, 0), None);

        assert!(selection.entries.is_empty());
        assert_eq!(selection.latest, at(1, 0));
    }

    #[test]
    fn test_keyword_filter_on_title_or_description() {
        let keywords = KeywordSet::new(["crypto", "financial"]);
        let entries = vec![
            entry("Crypto rally", at(2, 0)),
            entry("Weather", at(2, 1)).with_description("A FINANCIAL storm"),
            entry("Sports", at(2, 2)).with_description("Local team wins"),
        ];

        let selection = select(entries, at(1, 0), Some(&keywords));

        let titles: Vec<_> = selection.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Crypto rally", "Weather"]);
    }

    #[test]
    fn test_latest_advances_even_when_keywords_drop_everything() {
        let keywords = KeywordSet::new(["crypto"]);
        let entries = vec![
            entry("t1", at(2, 0)),
            entry("t2", at(3, 0)),
            entry("t3", at(4, 0)),
        ];

        let selection = select(entries, at(1, 0), Some(&keywords));

        assert!(selection.entries.is_empty());
        assert_eq!(selection.latest, at(4, 0));
    }

    #[test]
    fn test_undated_entries_skipped() {
        let entries = vec![Entry::new("no date"), entry("dated", at(2, 0))];

        let selection = select(entries, at(1, 0), None);

        assert_eq!(selection.entries.len(), 1);
        assert_eq!(selection.entries[0].title, "dated");
    }

    #[test]
    fn test_selection_is_idempotent() {
        let entries = vec![entry("a", at(2, 0)), entry("b", at(3, 0))];

        let first = select(entries.clone(), at(1, 0), None);
        let second = select(entries, first.latest, None);

        assert_eq!(first.entries.len(), 2);
        assert!(second.entries.is_empty());
        assert_eq!(second.latest, first.latest);
    }
}
