use chrono::{DateTime, Duration, Utc};

use super::models::FeedItem;
use crate::Result;

/// Default look-back window for a run
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Keep the items published strictly after `cutoff` (epoch seconds).
///
/// Input order is preserved. An empty result is a normal outcome.
pub fn filter_since(items: Vec<FeedItem>, cutoff: i64) -> Result<Vec<FeedItem>> {
    let mut kept = Vec::with_capacity(items.len());

    for item in items {
        if item.timestamp()? > cutoff {
            kept.push(item);
        }
    }

    Ok(kept)
}

/// Epoch seconds of `now - window`
pub fn cutoff_before(now: DateTime<Utc>, window: Duration) -> i64 {
    (now - window).timestamp()
}

/// The earliest published item, if there is one
pub fn oldest(items: &[FeedItem]) -> Option<&FeedItem> {
    items
        .iter()
        .filter_map(|item| item.timestamp().ok().map(|ts| (ts, item)))
        .min_by_key(|(ts, _)| *ts)
        .map(|(_, item)| item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(title: &str, pub_date: &str) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            description: String::new(),
            pub_date: pub_date.to_string(),
            link: format!("https://example.com/{}", title),
        }
    }

    fn at(ts: i64) -> FeedItem {
        let date = Utc.timestamp_opt(ts, 0).unwrap();
        item(&ts.to_string(), &date.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
    }

    #[test]
    fn test_scenario_keeps_only_newer_item() {
        let items = vec![
            item("old", "Mon, 01 Jan 2024 00:00:00 GMT"),
            item("new", "Wed, 03 Jan 2024 00:00:00 GMT"),
        ];
        let cutoff = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap().timestamp();

        let kept = filter_since(items, cutoff).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "new");
    }

    #[test]
    fn test_cutoff_is_exclusive() {
        let cutoff = 1_704_153_600;
        let kept = filter_since(vec![at(cutoff), at(cutoff + 1)], cutoff).unwrap();
        assert_eq!(kept, vec![at(cutoff + 1)]);
    }

    #[test]
    fn test_empty_window_is_not_an_error() {
        let t1 = 1_704_067_200;
        let kept = filter_since(vec![at(t1)], t1 + 1).unwrap();
        assert!(kept.is_empty());

        assert!(filter_since(Vec::new(), t1).unwrap().is_empty());
        assert!(oldest(&kept).is_none());
    }

    #[test]
    fn test_order_preserved() {
        let base = 1_704_067_200;
        let items = vec![at(base + 50), at(base - 10), at(base + 5), at(base + 500), at(base)];
        let kept = filter_since(items, base).unwrap();
        assert_eq!(kept, vec![at(base + 50), at(base + 5), at(base + 500)]);
    }

    #[test]
    fn test_unparseable_date_surfaces_error() {
        let result = filter_since(vec![item("bad", "not a date")], 0);
        assert!(matches!(result, Err(crate::Error::FeedFormat(_))));
    }

    #[test]
    fn test_cutoff_before() {
        let now = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
        let cutoff = cutoff_before(now, Duration::days(7));
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().timestamp());
    }

    #[test]
    fn test_oldest() {
        let base = 1_704_067_200;
        let items = vec![at(base + 3), at(base + 1), at(base + 2)];
        assert_eq!(oldest(&items), Some(&items[1]));
    }
}
