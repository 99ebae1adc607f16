use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime, Time};

use super::repo_types::ScanRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    #[default]
    All,
    /// Since local midnight.
    Today,
    /// Last 7×24 hours.
    Week,
    /// Last 30×24 hours.
    Month,
}

impl TimeFilter {
    /// Oldest timestamp still kept, or `None` for no bound. `now` carries the
    /// caller's local offset, which decides where midnight falls.
    fn cutoff(self, now: OffsetDateTime) -> Option<OffsetDateTime> {
        match self {
            TimeFilter::All => None,
            TimeFilter::Today => Some(now.replace_time(Time::MIDNIGHT)),
            TimeFilter::Week => Some(now - Duration::days(7)),
            TimeFilter::Month => Some(now - Duration::days(30)),
        }
    }
}

/// Time window AND case-insensitive substring match on `qr_data`.
/// Input order is preserved.
pub fn apply(
    records: &[ScanRecord],
    filter: TimeFilter,
    search: &str,
    now: OffsetDateTime,
) -> Vec<ScanRecord> {
    let cutoff = filter.cutoff(now);
    let needle = search.to_lowercase();
    records
        .iter()
        .filter(|r| cutoff.map_or(true, |c| r.timestamp >= c))
        .filter(|r| needle.is_empty() || r.qr_data.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scans::demo::seed_records;
    use time::macros::{datetime, offset};
    use uuid::Uuid;

    fn record(qr_data: &str, timestamp: OffsetDateTime) -> ScanRecord {
        ScanRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            user_email: "a@b.co".into(),
            qr_data: qr_data.into(),
            timestamp,
            location: None,
        }
    }

    #[test]
    fn all_with_empty_search_keeps_everything() {
        let now = datetime!(2024-06-15 12:00 UTC);
        let records = seed_records(now);
        assert_eq!(apply(&records, TimeFilter::All, "", now), records);
    }

    #[test]
    fn today_keeps_only_current_calendar_day() {
        let now = datetime!(2024-06-15 09:30 UTC);
        let records = vec![
            record("this morning", datetime!(2024-06-15 08:00 UTC)),
            record("midnight", datetime!(2024-06-15 00:00 UTC)),
            record("yesterday evening", datetime!(2024-06-14 23:59 UTC)),
        ];
        let kept: Vec<_> = apply(&records, TimeFilter::Today, "", now)
            .into_iter()
            .map(|r| r.qr_data)
            .collect();
        assert_eq!(kept, vec!["this morning", "midnight"]);
    }

    #[test]
    fn today_uses_the_local_offset() {
        // 01:00 in UTC+3 is 22:00 UTC the previous day
        let now = datetime!(2024-06-15 01:00 +3);
        let records = vec![
            record("local today", datetime!(2024-06-14 21:30 UTC)),
            record("local yesterday", datetime!(2024-06-14 20:30 UTC)),
        ];
        let kept = apply(&records, TimeFilter::Today, "", now);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].qr_data, "local today");
        assert_eq!(now.offset(), offset!(+3));
    }

    #[test]
    fn week_and_month_windows() {
        let now = datetime!(2024-06-15 12:00 UTC);
        let records = vec![
            record("6 days", now - Duration::days(6)),
            record("8 days", now - Duration::days(8)),
            record("29 days", now - Duration::days(29)),
            record("31 days", now - Duration::days(31)),
        ];
        assert_eq!(apply(&records, TimeFilter::Week, "", now).len(), 1);
        assert_eq!(apply(&records, TimeFilter::Month, "", now).len(), 3);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let now = datetime!(2024-06-15 12:00 UTC);
        let records = vec![
            record("WiFi:T:WPA;S:Net;P:pw;;", now),
            record("https://example.com", now),
        ];
        let kept = apply(&records, TimeFilter::All, "wifi", now);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].qr_data, "WiFi:T:WPA;S:Net;P:pw;;");

        assert_eq!(apply(&records, TimeFilter::All, "EXAMPLE", now).len(), 1);
        assert!(apply(&records, TimeFilter::All, "nothing", now).is_empty());
    }

    #[test]
    fn predicates_are_anded() {
        let now = datetime!(2024-06-15 12:00 UTC);
        let records = vec![
            record("https://new.example", now - Duration::days(1)),
            record("https://old.example", now - Duration::days(10)),
        ];
        let kept = apply(&records, TimeFilter::Week, "https", now);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].qr_data, "https://new.example");
    }

    #[test]
    fn week_over_demo_seeds_keeps_three_newest_first() {
        let now = OffsetDateTime::now_utc();
        let seeds = seed_records(now);
        let kept = apply(&seeds, TimeFilter::Week, "", now);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept, seeds[..3].to_vec());
        assert!(kept.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
    }

    #[test]
    fn parses_lowercase_names() {
        let f: TimeFilter = serde_json::from_str("\"month\"").unwrap();
        assert_eq!(f, TimeFilter::Month);
        assert_eq!(TimeFilter::default(), TimeFilter::All);
    }
}
