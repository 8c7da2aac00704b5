//! Duration extraction.
//!
//! Scans a token stream for `(quantity, unit)` pairs — a numeric phrase
//! next to a unit keyword — and accumulates them into a single duration
//! value. Fixed-length units (seconds through weeks) convert exactly;
//! calendar units (months through millennia) either keep exact calendar
//! components or convert through a nominal fixed length, selected by the
//! caller's [`DurationResolution`].

use chrono::Duration;
use serde::Serialize;

use crate::error::{ExtractError, Result};
use crate::number::{self, NumberOptions};
use crate::token::TokenStream;
use crate::vocab::Vocabulary;

// ── Units ───────────────────────────────────────────────────────────────────

/// A duration unit keyword. Months and above are calendar units: their
/// fixed-length equivalents are nominal (a month is 365.25/12 days, a year
/// 365.25 days).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DurationUnit {
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
    Decades,
    Centuries,
    Millennia,
}

const SECONDS_PER_YEAR: f64 = 365.25 * 86_400.0;
const SECONDS_PER_MONTH: f64 = SECONDS_PER_YEAR / 12.0;

impl DurationUnit {
    /// Whether the unit has exact meaning only as a calendar component.
    pub fn is_calendar(self) -> bool {
        matches!(
            self,
            Self::Months | Self::Years | Self::Decades | Self::Centuries | Self::Millennia
        )
    }

    /// Fixed-length equivalent in seconds (nominal for calendar units).
    pub fn nominal_seconds(self) -> f64 {
        match self {
            Self::Microseconds => 1e-6,
            Self::Milliseconds => 1e-3,
            Self::Seconds => 1.0,
            Self::Minutes => 60.0,
            Self::Hours => 3_600.0,
            Self::Days => 86_400.0,
            Self::Weeks => 604_800.0,
            Self::Months => SECONDS_PER_MONTH,
            Self::Years => SECONDS_PER_YEAR,
            Self::Decades => 10.0 * SECONDS_PER_YEAR,
            Self::Centuries => 100.0 * SECONDS_PER_YEAR,
            Self::Millennia => 1_000.0 * SECONDS_PER_YEAR,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Microseconds => "microseconds",
            Self::Milliseconds => "milliseconds",
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
            Self::Years => "years",
            Self::Decades => "decades",
            Self::Centuries => "centuries",
            Self::Millennia => "millennia",
        }
    }
}

// ── Value types ─────────────────────────────────────────────────────────────

/// Exact calendar components of a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CalendarDelta {
    pub years: i64,
    pub months: i64,
    pub weeks: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

/// The value produced by duration extraction, shaped by the resolution
/// mode the caller picked.
#[derive(Debug, Clone, PartialEq)]
pub enum DurationValue {
    /// A fixed-length duration.
    Fixed(Duration),
    /// Exact calendar components plus a fixed-length remainder. The
    /// remainder is zero in [`DurationResolution::Calendar`] mode unless a
    /// fixed unit carried a fractional quantity; in
    /// [`DurationResolution::CalendarApprox`] it also absorbs the
    /// fractional part of calendar quantities.
    Calendar {
        delta: CalendarDelta,
        remainder: Duration,
    },
    /// The total expressed as a scalar in one requested unit.
    Total { value: f64, unit: DurationUnit },
}

/// How calendar units are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationResolution {
    /// Convert everything through nominal fixed lengths. Always succeeds.
    #[default]
    Fixed,
    /// Keep calendar units as exact components. A fractional calendar
    /// quantity ("1.3 months") is an [`ExtractError::AmbiguousDuration`].
    Calendar,
    /// As [`Self::Calendar`], but silently fall back to [`Self::Fixed`]
    /// when the ambiguity would otherwise occur.
    CalendarFallback,
    /// As [`Self::Calendar`], but split a fractional calendar quantity
    /// into its integer calendar part plus a fixed-length remainder.
    CalendarApprox,
    /// Sum every pair into a single scalar in the requested unit.
    TotalIn(DurationUnit),
}

// ── Public surface ──────────────────────────────────────────────────────────

/// Extract a duration from `text` with the built-in English table and
/// fixed-length resolution.
///
/// On a match, returns the duration and the leftover text (unconsumed
/// words rejoined and pruned). `Ok(None)` means no duration was found.
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use lingua_extract::{extract_duration, DurationValue};
///
/// let (value, rest) = extract_duration("set a timer for 10 seconds").unwrap().unwrap();
/// assert_eq!(value, DurationValue::Fixed(Duration::seconds(10)));
/// assert_eq!(rest, "set a timer for");
/// ```
pub fn extract_duration(text: &str) -> Result<Option<(DurationValue, String)>> {
    extract_duration_with_options(text, DurationResolution::Fixed)
}

/// Like [`extract_duration`], with an explicit resolution mode.
///
/// # Errors
///
/// [`ExtractError::AmbiguousDuration`] in [`DurationResolution::Calendar`]
/// mode when a calendar unit has a non-integer quantity. No other mode
/// fails on that input.
pub fn extract_duration_with_options(
    text: &str,
    resolution: DurationResolution,
) -> Result<Option<(DurationValue, String)>> {
    extract_duration_vocab(&crate::vocab::english().vocab, text, resolution)
}

pub(crate) fn extract_duration_vocab(
    vocab: &Vocabulary,
    text: &str,
    resolution: DurationResolution,
) -> Result<Option<(DurationValue, String)>> {
    let mut tokens = TokenStream::new(text);
    let pairs = scan_pairs(vocab, &mut tokens);
    if pairs.is_empty() {
        return Ok(None);
    }
    let value = combine(&pairs, resolution)?;
    Ok(Some((value, vocab.prune(&tokens.leftover()))))
}

// ── Scanning ────────────────────────────────────────────────────────────────

/// Collect `(quantity, unit)` pairs, consuming each matched span.
fn scan_pairs(vocab: &Vocabulary, tokens: &mut TokenStream) -> Vec<(f64, DurationUnit)> {
    let opts = NumberOptions::default();
    let mut pairs = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens.is_consumed(i) {
            i += 1;
            continue;
        }
        let Some((quantity, quantity_end)) = quantity_at(vocab, tokens, i, &opts) else {
            i += 1;
            continue;
        };
        // Glue between quantity and unit: "half an hour", "a couple of minutes".
        let mut j = quantity_end;
        if tokens
            .live(j)
            .is_some_and(|w| vocab.articles.contains(w) || vocab.linkers.contains(w))
        {
            j += 1;
        }
        match tokens.live(j).and_then(|w| vocab.unit(w)) {
            Some(unit) => {
                tokens.consume(i..j + 1);
                pairs.push((quantity, unit));
                i = j + 1;
            }
            None => i += 1,
        }
    }
    pairs
}

/// A quantity starting at `i`: a numeric phrase, a bare article meaning 1
/// ("a minute"), or a colloquial pair word meaning 2 ("a couple of").
fn quantity_at(
    vocab: &Vocabulary,
    tokens: &TokenStream,
    i: usize,
    opts: &NumberOptions,
) -> Option<(f64, usize)> {
    if let Some(m) = number::resolve(vocab, tokens, i, opts) {
        return Some((m.value, m.span.end));
    }
    let w = tokens.live(i)?;
    if vocab.couple_words.contains(w) {
        return Some((2.0, i + 1));
    }
    if vocab.articles.contains(w) {
        if let Some(next) = tokens.live(i + 1) {
            if vocab.couple_words.contains(next) {
                return Some((2.0, i + 2));
            }
            if vocab.unit(next).is_some() {
                return Some((1.0, i + 1));
            }
        }
    }
    None
}

// ── Combination ─────────────────────────────────────────────────────────────

fn duration_from_secs(secs: f64) -> Duration {
    // chrono durations are bounded at i64 milliseconds; clamp so absurd
    // quantities saturate instead of panicking.
    const MAX_WHOLE_SECS: i64 = i64::MAX / 1_000 - 1;
    let whole = (secs.trunc() as i64).clamp(-MAX_WHOLE_SECS, MAX_WHOLE_SECS);
    let micros = (secs.fract() * 1e6).round() as i64;
    Duration::seconds(whole) + Duration::microseconds(micros)
}

fn combine(pairs: &[(f64, DurationUnit)], resolution: DurationResolution) -> Result<DurationValue> {
    match resolution {
        DurationResolution::Fixed => {
            let secs: f64 = pairs.iter().map(|&(q, u)| q * u.nominal_seconds()).sum();
            Ok(DurationValue::Fixed(duration_from_secs(secs)))
        }
        DurationResolution::TotalIn(unit) => {
            let secs: f64 = pairs.iter().map(|&(q, u)| q * u.nominal_seconds()).sum();
            Ok(DurationValue::Total {
                value: secs / unit.nominal_seconds(),
                unit,
            })
        }
        DurationResolution::Calendar
        | DurationResolution::CalendarFallback
        | DurationResolution::CalendarApprox => {
            let mut delta = CalendarDelta::default();
            let mut remainder_secs = 0.0f64;
            for &(quantity, unit) in pairs {
                let whole = quantity.trunc() as i64;
                let fract = quantity.fract();
                if unit.is_calendar() && fract != 0.0 {
                    match resolution {
                        DurationResolution::Calendar => {
                            return Err(ExtractError::AmbiguousDuration(format!(
                                "{} {} have no exact calendar form",
                                quantity,
                                unit.name()
                            )));
                        }
                        DurationResolution::CalendarFallback => {
                            return combine(pairs, DurationResolution::Fixed);
                        }
                        _ => {
                            add_calendar(&mut delta, whole, unit);
                            remainder_secs += fract * unit.nominal_seconds();
                        }
                    }
                    continue;
                }
                if unit.is_calendar() {
                    add_calendar(&mut delta, whole, unit);
                    continue;
                }
                match unit {
                    DurationUnit::Seconds => delta.seconds += whole,
                    DurationUnit::Minutes => delta.minutes += whole,
                    DurationUnit::Hours => delta.hours += whole,
                    DurationUnit::Days => delta.days += whole,
                    DurationUnit::Weeks => delta.weeks += whole,
                    // Sub-second units live in the remainder.
                    _ => {
                        remainder_secs += whole as f64 * unit.nominal_seconds();
                    }
                }
                if fract != 0.0 {
                    remainder_secs += fract * unit.nominal_seconds();
                }
            }
            Ok(DurationValue::Calendar {
                delta,
                remainder: duration_from_secs(remainder_secs),
            })
        }
    }
}

fn add_calendar(delta: &mut CalendarDelta, whole: i64, unit: DurationUnit) {
    match unit {
        DurationUnit::Months => delta.months += whole,
        DurationUnit::Years => delta.years += whole,
        DurationUnit::Decades => delta.years += whole * 10,
        DurationUnit::Centuries => delta.years += whole * 100,
        DurationUnit::Millennia => delta.years += whole * 1_000,
        _ => unreachable!("not a calendar unit"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_fixed_duration_full_consumption() {
        let (value, rest) = extract_duration("10 seconds").unwrap().unwrap();
        assert_eq!(value, DurationValue::Fixed(Duration::seconds(10)));
        assert_eq!(rest, "");
    }

    #[test]
    fn test_no_duration_is_none() {
        assert_eq!(extract_duration("wake me up gently").unwrap(), None);
    }

    #[test]
    fn test_leftover_and_idempotence() {
        let (_, rest) = extract_duration("set a timer for 5 minutes").unwrap().unwrap();
        assert_eq!(rest, "set a timer for");
        // Re-running on the leftover finds nothing.
        assert_eq!(extract_duration(&rest).unwrap(), None);
    }

    #[test]
    fn test_word_quantities() {
        let (value, rest) = extract_duration("wait three minutes please").unwrap().unwrap();
        assert_eq!(value, DurationValue::Fixed(Duration::minutes(3)));
        assert_eq!(rest, "wait please");
    }

    #[test]
    fn test_mixed_units_accumulate() {
        let (value, _) = extract_duration("1 hour and 30 minutes").unwrap().unwrap();
        assert_eq!(value, DurationValue::Fixed(Duration::minutes(90)));
    }

    #[test]
    fn test_fractional_fixed_units() {
        let (value, _) = extract_duration("two and a half hours").unwrap().unwrap();
        assert_eq!(value, DurationValue::Fixed(Duration::minutes(150)));
        let (value, _) = extract_duration("half an hour").unwrap().unwrap();
        assert_eq!(value, DurationValue::Fixed(Duration::minutes(30)));
    }

    #[test]
    fn test_colloquial_quantities() {
        let (value, _) = extract_duration("a couple of minutes").unwrap().unwrap();
        assert_eq!(value, DurationValue::Fixed(Duration::minutes(2)));
        let (value, _) = extract_duration("a minute").unwrap().unwrap();
        assert_eq!(value, DurationValue::Fixed(Duration::minutes(1)));
        let (value, _) = extract_duration("a decade").unwrap().unwrap();
        assert_eq!(
            value,
            DurationValue::Fixed(duration_from_secs(10.0 * SECONDS_PER_YEAR))
        );
    }

    #[test]
    fn test_nominal_calendar_lengths_in_fixed_mode() {
        let (value, _) = extract_duration("1 month").unwrap().unwrap();
        assert_eq!(value, DurationValue::Fixed(duration_from_secs(SECONDS_PER_MONTH)));
        let (value, _) = extract_duration("2 years").unwrap().unwrap();
        assert_eq!(
            value,
            DurationValue::Fixed(duration_from_secs(2.0 * SECONDS_PER_YEAR))
        );
    }

    #[test]
    fn test_calendar_mode_exact_components() {
        let (value, _) =
            extract_duration_with_options("2 years and 3 months", DurationResolution::Calendar)
                .unwrap()
                .unwrap();
        assert_eq!(
            value,
            DurationValue::Calendar {
                delta: CalendarDelta {
                    years: 2,
                    months: 3,
                    ..Default::default()
                },
                remainder: Duration::zero(),
            }
        );
    }

    #[test]
    fn test_calendar_mode_rejects_fractional_calendar_quantity() {
        let err = extract_duration_with_options("1.3 months", DurationResolution::Calendar)
            .unwrap_err();
        assert!(matches!(err, ExtractError::AmbiguousDuration(_)));
        assert!(err.to_string().contains("1.3 months"), "got: {err}");
    }

    #[test]
    fn test_calendar_fallback_switches_to_fixed() {
        let (value, _) =
            extract_duration_with_options("1.3 months", DurationResolution::CalendarFallback)
                .unwrap()
                .unwrap();
        assert_eq!(
            value,
            DurationValue::Fixed(duration_from_secs(1.3 * SECONDS_PER_MONTH))
        );
    }

    #[test]
    fn test_calendar_approx_splits_fraction() {
        let (value, _) =
            extract_duration_with_options("1.3 months", DurationResolution::CalendarApprox)
                .unwrap()
                .unwrap();
        let DurationValue::Calendar { delta, remainder } = value else {
            panic!("expected calendar value, got {value:?}");
        };
        assert_eq!(delta.months, 1);
        let expected = duration_from_secs(0.3 * SECONDS_PER_MONTH);
        let diff = (remainder - expected).num_milliseconds().abs();
        assert!(diff <= 1, "remainder off by {diff}ms");
    }

    #[test]
    fn test_total_in_unit() {
        let (value, _) =
            extract_duration_with_options("2 minutes", DurationResolution::TotalIn(DurationUnit::Seconds))
                .unwrap()
                .unwrap();
        assert_eq!(
            value,
            DurationValue::Total {
                value: 120.0,
                unit: DurationUnit::Seconds
            }
        );

        let (value, _) = extract_duration_with_options(
            "1 day and 12 hours",
            DurationResolution::TotalIn(DurationUnit::Days),
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            value,
            DurationValue::Total {
                value: 1.5,
                unit: DurationUnit::Days
            }
        );
    }

    #[test]
    fn test_calendar_units_never_ambiguous_outside_calendar_mode() {
        for mode in [
            DurationResolution::Fixed,
            DurationResolution::CalendarFallback,
            DurationResolution::CalendarApprox,
            DurationResolution::TotalIn(DurationUnit::Hours),
        ] {
            assert!(extract_duration_with_options("1.3 months", mode).is_ok());
        }
    }

    #[test]
    fn test_sub_second_units() {
        let (value, _) = extract_duration("500 milliseconds").unwrap().unwrap();
        assert_eq!(value, DurationValue::Fixed(Duration::milliseconds(500)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_fixed_mode_never_errors(s in "[ -~]{0,60}") {
            prop_assert!(extract_duration(&s).is_ok());
        }

        #[test]
        fn test_whole_second_quantities_are_exact(n in 0u32..100_000) {
            let text = format!("{n} seconds");
            let (value, rest) = extract_duration(&text).unwrap().unwrap();
            prop_assert_eq!(value, DurationValue::Fixed(Duration::seconds(n as i64)));
            prop_assert_eq!(rest, "");
        }
    }
}
