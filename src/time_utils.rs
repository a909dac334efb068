// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
///
/// Stored timestamps use this form so that string order matches time order.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_uses_z_suffix_and_sorts() {
        let early = Utc.with_ymd_and_hms(2026, 3, 9, 8, 5, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 11, 1, 17, 30, 0).unwrap();

        assert_eq!(format_utc_rfc3339(early), "2026-03-09T08:05:00Z");
        assert!(format_utc_rfc3339(early) < format_utc_rfc3339(late));
    }
}
