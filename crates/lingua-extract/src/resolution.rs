//! Calendar-bucket and season helpers.
//!
//! Pure functions consumed by the date-time resolver: locating the year
//! span of an ordinal decade/century/millennium, aligning a boundary date
//! to a requested granularity, clamped month arithmetic, and the
//! hemisphere-dependent season calendar.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Calendar bucket size for "before/after/first/last of X" computations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Resolution {
    #[default]
    Day,
    Week,
    Month,
    Decade,
    Century,
    Millennium,
}

/// Which half of the globe the speaker is in. Flips the season calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Hemisphere {
    #[default]
    North,
    South,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

// ── Ordinal buckets ─────────────────────────────────────────────────────────

/// Year span of the Nth bucket of `size` years, popular-usage numbering:
/// bucket N covers years `(N-1)*size ..= N*size - 1`, so the 10th century
/// is 900..=999 and the 3rd millennium is 2000..=2999.
pub(crate) fn ordinal_year_span(n: i64, size: i64) -> (i32, i32) {
    let start = (n - 1) * size;
    (start as i32, (start + size - 1) as i32)
}

/// First day of the bucket containing `date` at the given granularity.
pub(crate) fn bucket_first_day(date: NaiveDate, resolution: Resolution) -> Option<NaiveDate> {
    match resolution {
        Resolution::Day => Some(date),
        Resolution::Week => {
            let back = date.weekday().num_days_from_monday() as i64;
            date.checked_sub_signed(chrono::Duration::days(back))
        }
        Resolution::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1),
        Resolution::Decade => NaiveDate::from_ymd_opt(date.year() / 10 * 10, 1, 1),
        Resolution::Century => NaiveDate::from_ymd_opt(date.year() / 100 * 100, 1, 1),
        Resolution::Millennium => NaiveDate::from_ymd_opt(date.year() / 1000 * 1000, 1, 1),
    }
}

/// Last day of the bucket containing `date` at the given granularity.
pub(crate) fn bucket_last_day(date: NaiveDate, resolution: Resolution) -> Option<NaiveDate> {
    match resolution {
        Resolution::Day => Some(date),
        Resolution::Week => {
            let ahead = 6 - date.weekday().num_days_from_monday() as i64;
            date.checked_add_signed(chrono::Duration::days(ahead))
        }
        Resolution::Month => {
            let last = last_day_of_month(date.year(), date.month());
            NaiveDate::from_ymd_opt(date.year(), date.month(), last)
        }
        Resolution::Decade => NaiveDate::from_ymd_opt(date.year() / 10 * 10 + 9, 12, 31),
        Resolution::Century => NaiveDate::from_ymd_opt(date.year() / 100 * 100 + 99, 12, 31),
        Resolution::Millennium => NaiveDate::from_ymd_opt(date.year() / 1000 * 1000 + 999, 12, 31),
    }
}

// ── Month arithmetic ────────────────────────────────────────────────────────

/// Number of days in `(year, month)`, via first-of-next-month minus one day.
pub(crate) fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

/// Shift `date` by `delta` whole months, clamping the day to the end of the
/// target month (Jan 31 + 1 month = Feb 28/29).
pub(crate) fn add_months_clamped(date: NaiveDate, delta: i64) -> Option<NaiveDate> {
    let zero_based = date.year() as i64 * 12 + date.month() as i64 - 1 + delta;
    let year = zero_based.div_euclid(12) as i32;
    let month = (zero_based.rem_euclid(12) + 1) as u32;
    let day = date.day().min(last_day_of_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

// ── Seasons ─────────────────────────────────────────────────────────────────

/// First day of `season` in the calendar year `year`, for `hemisphere`.
///
/// Meteorological boundaries: northern spring starts March 1, summer
/// June 1, fall September 1, winter December 1; southern seasons are
/// shifted six months.
pub(crate) fn season_start(season: Season, year: i32, hemisphere: Hemisphere) -> Option<NaiveDate> {
    let month = match (season, hemisphere) {
        (Season::Spring, Hemisphere::North) | (Season::Fall, Hemisphere::South) => 3,
        (Season::Summer, Hemisphere::North) | (Season::Winter, Hemisphere::South) => 6,
        (Season::Fall, Hemisphere::North) | (Season::Spring, Hemisphere::South) => 9,
        (Season::Winter, Hemisphere::North) | (Season::Summer, Hemisphere::South) => 12,
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Which season `date` falls in, for `hemisphere`.
pub fn season_of(date: NaiveDate, hemisphere: Hemisphere) -> Season {
    let northern = match date.month() {
        3..=5 => Season::Spring,
        6..=8 => Season::Summer,
        9..=11 => Season::Fall,
        _ => Season::Winter,
    };
    match hemisphere {
        Hemisphere::North => northern,
        Hemisphere::South => match northern {
            Season::Spring => Season::Fall,
            Season::Summer => Season::Winter,
            Season::Fall => Season::Spring,
            Season::Winter => Season::Summer,
        },
    }
}
