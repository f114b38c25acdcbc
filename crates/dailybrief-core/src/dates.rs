//! Listing-date matching.
//!
//! Portals print dates either as `YYYY.MM.DD`, `YY.MM.DD`, or `YYYY-MM-DD`.
//! [`TargetDates`] holds both dotted forms for every day in the lookback
//! window so a raw cell can be matched after light normalization.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, FixedOffset, NaiveDate, Utc, Weekday};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDates {
    days: Vec<NaiveDate>,
    accepted: BTreeSet<String>,
}

impl TargetDates {
    /// Build the accepted date set for `today` and the `lookback_days - 1`
    /// preceding days. A `lookback_days` of zero is treated as one.
    #[must_use]
    pub fn for_day(today: NaiveDate, lookback_days: u32) -> Self {
        let span = i64::from(lookback_days.max(1));
        let days: Vec<NaiveDate> = (0..span).map(|i| today - Duration::days(i)).collect();
        let accepted = days
            .iter()
            .flat_map(|d| [d.format("%Y.%m.%d").to_string(), d.format("%y.%m.%d").to_string()])
            .collect();
        Self { days, accepted }
    }

    /// Returns `true` when a raw listing cell names one of the target days.
    #[must_use]
    pub fn matches(&self, raw: &str) -> bool {
        self.accepted.contains(&normalize_listing_date(raw))
    }

    #[must_use]
    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    /// Dotted four-digit-year labels, newest first.
    #[must_use]
    pub fn display_labels(&self) -> Vec<String> {
        self.days
            .iter()
            .map(|d| d.format("%Y.%m.%d").to_string())
            .collect()
    }
}

/// Strip whitespace and convert `-` separators to `.`.
#[must_use]
pub fn normalize_listing_date(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '-' { '.' } else { c })
        .collect()
}

/// Korea Standard Time has no daylight saving.
const KST_OFFSET_SECS: i32 = 9 * 3600;

/// Current calendar day in Korea, which is what the portals print.
#[must_use]
pub fn today_kst() -> NaiveDate {
    FixedOffset::east_opt(KST_OFFSET_SECS).map_or_else(
        || Utc::now().date_naive(),
        |kst| Utc::now().with_timezone(&kst).date_naive(),
    )
}

#[must_use]
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
