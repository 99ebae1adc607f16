use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::repo_types::{GeoPoint, ScanRecord};
use crate::auth::session::{DEMO_USER_EMAIL, DEMO_USER_ID};

struct Seed {
    id: u128,
    qr_data: &'static str,
    age_days: i64,
    location: Option<(f64, f64)>,
}

// Ages are strictly increasing; two seeds fall outside the 7-day window.
const SEEDS: [Seed; 5] = [
    Seed {
        id: 0xd3e0_0000_0000_4000_8000_000000000001,
        qr_data: "https://www.rust-lang.org",
        age_days: 1,
        location: Some((37.7749, -122.4194)),
    },
    Seed {
        id: 0xd3e0_0000_0000_4000_8000_000000000002,
        qr_data: "Hello from the QR scanner!",
        age_days: 3,
        location: None,
    },
    Seed {
        id: 0xd3e0_0000_0000_4000_8000_000000000003,
        qr_data: "Contact: Jane Doe\nPhone: +1 555 0100\nEmail: jane@example.com",
        age_days: 5,
        location: Some((40.7128, -74.0060)),
    },
    Seed {
        id: 0xd3e0_0000_0000_4000_8000_000000000004,
        qr_data: "WiFi:T:WPA;S:CoffeeShop;P:espresso42;;",
        age_days: 10,
        location: Some((51.5074, -0.1278)),
    },
    Seed {
        id: 0xd3e0_0000_0000_4000_8000_000000000005,
        qr_data: "https://github.com",
        age_days: 20,
        location: None,
    },
];

/// The fixed demo record set, timestamped relative to `now`, newest first.
pub fn seed_records(now: OffsetDateTime) -> Vec<ScanRecord> {
    SEEDS
        .iter()
        .map(|s| ScanRecord {
            id: Uuid::from_u128(s.id),
            user_id: DEMO_USER_ID,
            user_email: DEMO_USER_EMAIL.to_string(),
            qr_data: s.qr_data.to_string(),
            timestamp: now - Duration::days(s.age_days),
            location: s.location.map(|(latitude, longitude)| GeoPoint {
                latitude,
                longitude,
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scans::classify::{classify, QrKind};
    use time::macros::datetime;

    #[test]
    fn five_records_with_strictly_decreasing_timestamps() {
        let now = datetime!(2024-06-15 12:00 UTC);
        let records = seed_records(now);
        assert_eq!(records.len(), 5);
        assert!(records.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
        assert!(records.iter().all(|r| r.timestamp < now));
    }

    #[test]
    fn seeds_are_deterministic() {
        let now = datetime!(2024-06-15 12:00 UTC);
        assert_eq!(seed_records(now), seed_records(now));
    }

    #[test]
    fn seeds_cover_several_content_kinds() {
        let kinds: Vec<QrKind> = seed_records(OffsetDateTime::now_utc())
            .iter()
            .map(|r| classify(&r.qr_data).kind)
            .collect();
        for kind in [QrKind::Url, QrKind::Text, QrKind::Contact, QrKind::Wifi] {
            assert!(kinds.contains(&kind), "missing {:?}", kind);
        }
    }
}
