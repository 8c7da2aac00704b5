//! Date-time extraction.
//!
//! Two scanning passes over the token stream — a date pass and a time
//! pass — each marking consumed spans and accumulating either relative
//! offsets or absolute components. Composition then folds the accumulator
//! over the caller's anchor: explicit date first, then calendar-aware
//! offsets, then absolute clock fields, then relative clock offsets.
//!
//! The hour/minute/second fields carry an explicit [`TimeField`] tag, so
//! "a wall-clock 10" and "ten hours from now" can never be confused at a
//! call site.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::duration::DurationUnit;
use crate::error::{ExtractError, Result};
use crate::number::{self, NumberOptions};
use crate::resolution::{
    bucket_first_day, bucket_last_day, last_day_of_month, add_months_clamped, ordinal_year_span,
    season_start, Hemisphere, Resolution, Season,
};
use crate::token::TokenStream;
use crate::vocab::{Language, Vocabulary};

// ── Options and accumulator ─────────────────────────────────────────────────

/// Options for [`extract_datetime_with_options`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeOptions {
    /// Bucket size for "first/last of X" boundary computations.
    pub resolution: Resolution,
    /// Clock time used when the text names a day but no time.
    /// Midnight when `None`.
    pub default_time: Option<NaiveTime>,
    pub hemisphere: Hemisphere,
    /// When set, a bare numeral may be read as an hour ("remind me at 8"
    /// works without it; "8" alone needs it).
    pub greedy: bool,
}

/// State of one clock field after the time pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeField {
    #[default]
    Unset,
    /// A wall-clock value.
    Absolute(u32),
    /// An additive offset from the anchor.
    Relative(i64),
}

#[derive(Debug, Clone, Copy)]
struct ExplicitDate {
    month: u32,
    day: u32,
    year: Option<i32>,
}

#[derive(Debug, Default)]
struct Accumulator {
    year_offset: i64,
    month_offset: i64,
    day_offset: i64,
    explicit_date: Option<ExplicitDate>,
    /// A fully determined date (ordinal compositions, seasons, holidays).
    explicit_full: Option<NaiveDate>,
    hour: TimeField,
    minute: TimeField,
    second: TimeField,
    ampm_specified: bool,
    day_specified: bool,
    found: bool,
}

impl Accumulator {
    fn has_date(&self) -> bool {
        self.day_specified
            || self.explicit_date.is_some()
            || self.explicit_full.is_some()
            || self.year_offset != 0
            || self.month_offset != 0
            || self.day_offset != 0
    }
}

// ── Public surface ──────────────────────────────────────────────────────────

/// Extract a date-time from `text`, resolved relative to `anchor`, with
/// the built-in English table and default options.
///
/// Returns the composed date-time and the leftover text, or `Ok(None)`
/// when the text carries no date or time content.
///
/// # Errors
///
/// [`ExtractError::InvalidDate`] when an explicit date names a day that
/// does not exist — malformed dates are never silently clamped.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use lingua_extract::extract_datetime;
///
/// let anchor = NaiveDate::from_ymd_opt(2017, 6, 27).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let (dt, rest) = extract_datetime("tomorrow", anchor).unwrap().unwrap();
/// assert_eq!(dt, NaiveDate::from_ymd_opt(2017, 6, 28).unwrap().and_hms_opt(0, 0, 0).unwrap());
/// assert_eq!(rest, "");
/// ```
pub fn extract_datetime(
    text: &str,
    anchor: NaiveDateTime,
) -> Result<Option<(NaiveDateTime, String)>> {
    extract_datetime_with_options(text, anchor, &DateTimeOptions::default())
}

/// Like [`extract_datetime`], with explicit options.
pub fn extract_datetime_with_options(
    text: &str,
    anchor: NaiveDateTime,
    options: &DateTimeOptions,
) -> Result<Option<(NaiveDateTime, String)>> {
    extract_datetime_lang(crate::vocab::english(), text, anchor, options)
}

pub(crate) fn extract_datetime_lang(
    lang: &Language,
    text: &str,
    anchor: NaiveDateTime,
    options: &DateTimeOptions,
) -> Result<Option<(NaiveDateTime, String)>> {
    let vocab = &lang.vocab;
    let mut tokens = TokenStream::new(text);
    let mut acc = Accumulator::default();

    date_pass(lang, &mut tokens, &mut acc, anchor, options);
    time_pass(vocab, &mut tokens, &mut acc, options);

    if !acc.found {
        return Ok(None);
    }
    let resolved = compose(&acc, anchor, options)?;
    Ok(Some((resolved, vocab.prune(&tokens.leftover()))))
}

/// Step over one article or linker between a quantity and its unit
/// ("half an hour", "a couple of minutes" style glue).
fn skip_glue(vocab: &Vocabulary, tokens: &TokenStream, i: usize) -> usize {
    if tokens
        .live(i)
        .is_some_and(|w| vocab.articles.contains(w) || vocab.linkers.contains(w))
    {
        i + 1
    } else {
        i
    }
}

/// Consume `span`, absorbing any run of prepositions/linkers directly
/// before it ("on the fifth of march" falls out of the leftover whole).
fn consume_span(vocab: &Vocabulary, tokens: &mut TokenStream, span: std::ops::Range<usize>) {
    let mut s = span.start;
    while s > 0
        && tokens
            .live(s - 1)
            .is_some_and(|w| vocab.prepositions.contains(w) || vocab.linkers.contains(w))
    {
        s -= 1;
    }
    tokens.consume(s..span.end);
}

// ── Date pass ───────────────────────────────────────────────────────────────

fn date_pass(
    lang: &Language,
    tokens: &mut TokenStream,
    acc: &mut Accumulator,
    anchor: NaiveDateTime,
    options: &DateTimeOptions,
) {
    let vocab = &lang.vocab;
    let mut i = 0;
    while i < tokens.len() {
        if tokens.is_consumed(i) {
            i += 1;
            continue;
        }
        let matched = ordinal_composition(vocab, tokens, acc, anchor, options, i)
            .or_else(|| relative_day(vocab, tokens, acc, i))
            .or_else(|| date_unit_offset(vocab, tokens, acc, i))
            .or_else(|| direction_phrase(vocab, tokens, acc, anchor, options, i))
            .or_else(|| month_phrase(vocab, tokens, acc, i))
            .or_else(|| bare_weekday(vocab, tokens, acc, anchor, i))
            .or_else(|| bare_season(vocab, tokens, acc, anchor, options, i))
            .or_else(|| holiday_phrase(lang, tokens, acc, anchor, i));
        match matched {
            Some(end) => i = end,
            None => i += 1,
        }
    }
}

/// "today", "tomorrow", "yesterday", "the day after tomorrow",
/// "the day before yesterday". "tonight" also pins the evening hour.
fn relative_day(
    vocab: &Vocabulary,
    tokens: &mut TokenStream,
    acc: &mut Accumulator,
    i: usize,
) -> Option<usize> {
    let w = tokens.live(i)?;

    // "day after tomorrow" / "day before yesterday"
    if vocab.unit(w) == Some(DurationUnit::Days) {
        let link = tokens.live(i + 1)?;
        let sign = if vocab.after_words.contains(link) {
            1
        } else if vocab.before_words.contains(link) {
            -1
        } else {
            return None;
        };
        let base = vocab.relative_days.get(tokens.live(i + 2)?).copied()?;
        acc.day_offset += base + sign;
        acc.day_specified = true;
        acc.found = true;
        consume_span(vocab, tokens, i..i + 3);
        return Some(i + 3);
    }

    let offset = vocab.relative_days.get(w).copied()?;
    acc.day_offset += offset;
    acc.day_specified = true;
    acc.found = true;
    if let Some(&hour) = vocab.time_of_day.get(w) {
        if acc.hour == TimeField::Unset {
            acc.hour = TimeField::Absolute(hour);
            acc.ampm_specified = true;
        }
    }
    consume_span(vocab, tokens, i..i + 1);
    Some(i + 1)
}

/// "N days from now", "in 3 weeks", "2 months ago", "a year from now",
/// "2 days before tomorrow".
fn date_unit_offset(
    vocab: &Vocabulary,
    tokens: &mut TokenStream,
    acc: &mut Accumulator,
    i: usize,
) -> Option<usize> {
    let opts = NumberOptions::default();
    let (quantity, qty_end) = if let Some(m) = number::resolve(vocab, tokens, i, &opts) {
        (m.value, m.span.end)
    } else if tokens.live(i).is_some_and(|w| vocab.articles.contains(w)) {
        (1.0, i + 1)
    } else {
        return None;
    };
    // Fractional or absurd quantities are left for other readings.
    if quantity.fract() != 0.0 || quantity.abs() > 1.0e9 {
        return None;
    }
    let n = quantity as i64;

    let unit_at = skip_glue(vocab, tokens, qty_end);
    let unit = tokens.live(unit_at).and_then(|w| vocab.unit(w))?;
    let mut end = unit_at + 1;
    let mut sign = 1i64;
    let mut base_offset = 0i64;

    if let Some(next) = tokens.live(end) {
        if vocab.ago_words.contains(next) {
            sign = -1;
            end += 1;
        } else if next == "from" && tokens.live(end + 1) == Some("now") {
            end += 2;
        } else if vocab.before_words.contains(next) || vocab.after_words.contains(next) {
            // "2 days before tomorrow"
            let rel = tokens
                .live(end + 1)
                .and_then(|w| vocab.relative_days.get(w).copied())?;
            sign = if vocab.before_words.contains(next) { -1 } else { 1 };
            base_offset = rel;
            end += 2;
        }
    }

    match unit {
        DurationUnit::Days => acc.day_offset += base_offset + sign * n,
        DurationUnit::Weeks => acc.day_offset += base_offset + sign * n * 7,
        DurationUnit::Months => acc.month_offset += sign * n,
        DurationUnit::Years => acc.year_offset += sign * n,
        DurationUnit::Decades => acc.year_offset += sign * n * 10,
        DurationUnit::Centuries => acc.year_offset += sign * n * 100,
        DurationUnit::Millennia => acc.year_offset += sign * n * 1_000,
        // Clock units belong to the time pass.
        _ => return None,
    }
    if matches!(unit, DurationUnit::Days | DurationUnit::Weeks) {
        acc.day_specified = true;
    }
    acc.found = true;
    consume_span(vocab, tokens, i..end);
    Some(end)
}

/// "next/last/this" + weekday, calendar bucket, month name, or season.
fn direction_phrase(
    vocab: &Vocabulary,
    tokens: &mut TokenStream,
    acc: &mut Accumulator,
    anchor: NaiveDateTime,
    options: &DateTimeOptions,
    i: usize,
) -> Option<usize> {
    let dir = vocab.direction_words.get(tokens.live(i)?).copied()?;
    let next = tokens.live(i + 1)?;

    if let Some(target) = vocab.weekday(next) {
        acc.day_offset += weekday_offset(anchor.weekday(), target, dir);
        acc.day_specified = true;
        acc.found = true;
        consume_span(vocab, tokens, i..i + 2);
        return Some(i + 2);
    }

    if let Some(unit) = vocab.unit(next) {
        match unit {
            DurationUnit::Days => acc.day_offset += dir,
            DurationUnit::Weeks => acc.day_offset += dir * 7,
            DurationUnit::Months => acc.month_offset += dir,
            DurationUnit::Years => acc.year_offset += dir,
            DurationUnit::Decades => acc.year_offset += dir * 10,
            DurationUnit::Centuries => acc.year_offset += dir * 100,
            DurationUnit::Millennia => acc.year_offset += dir * 1_000,
            _ => return None,
        }
        acc.day_specified = true;
        acc.found = true;
        consume_span(vocab, tokens, i..i + 2);
        return Some(i + 2);
    }

    if let Some(month) = vocab.month(next) {
        let anchor_month = anchor.month();
        let year = match dir {
            1 if month <= anchor_month => anchor.year() + 1,
            -1 if month >= anchor_month => anchor.year() - 1,
            _ => anchor.year(),
        };
        acc.explicit_date = Some(ExplicitDate {
            month,
            day: 1,
            year: Some(year),
        });
        acc.found = true;
        consume_span(vocab, tokens, i..i + 2);
        return Some(i + 2);
    }

    if let Some(&season) = vocab.seasons.get(next) {
        let date = directed_season(season, anchor, options.hemisphere, dir)?;
        acc.explicit_full = Some(date);
        acc.day_specified = true;
        acc.found = true;
        consume_span(vocab, tokens, i..i + 2);
        return Some(i + 2);
    }

    None
}

/// "<ordinal|first|last> day of [the] <qualifier> <bucket> [of ...]*".
///
/// When several "of" qualifiers chain, the last one wins and earlier ones
/// are discarded — an inherited behavior, kept deliberately.
fn ordinal_composition(
    vocab: &Vocabulary,
    tokens: &mut TokenStream,
    acc: &mut Accumulator,
    anchor: NaiveDateTime,
    options: &DateTimeOptions,
    i: usize,
) -> Option<usize> {
    #[derive(Clone, Copy)]
    enum Selector {
        Last,
        Nth(i64),
    }

    let w = tokens.live(i)?;
    let selector = if let Some(o) = selector_ordinal(vocab, w) {
        Selector::Nth(o)
    } else if vocab.direction_words.get(w) == Some(&-1) {
        Selector::Last
    } else {
        return None;
    };

    if tokens.live(i + 1).and_then(|w| vocab.unit(w)) != Some(DurationUnit::Days) {
        return None;
    }
    let mut j = i + 2;
    if tokens.live(j) != Some("of") {
        return None;
    }

    // Qualifier groups: "of [the] (<ordinal>|next|last|this)? <bucket>".
    let mut last_group: Option<(Option<i64>, i64, DurationUnit)> = None;
    while tokens.live(j) == Some("of") {
        j += 1;
        while tokens.live(j).is_some_and(|w| vocab.linkers.contains(w)) {
            j += 1;
        }
        let mut ord = None;
        let mut dir = 0i64;
        let w = tokens.live(j)?;
        if let Some(o) = selector_ordinal(vocab, w) {
            ord = Some(o);
            j += 1;
        } else if let Some(&d) = vocab.direction_words.get(w) {
            dir = d;
            j += 1;
        }
        let bucket = tokens.live(j).and_then(|w| vocab.unit(w))?;
        if matches!(
            bucket,
            DurationUnit::Microseconds
                | DurationUnit::Milliseconds
                | DurationUnit::Seconds
                | DurationUnit::Minutes
                | DurationUnit::Hours
                | DurationUnit::Days
        ) {
            return None;
        }
        j += 1;
        last_group = Some((ord, dir, bucket));
    }

    let (ord, dir, bucket) = last_group?;
    if ord.is_some_and(|n| !(1..=10_000).contains(&n)) {
        return None;
    }
    let (first, last) = bucket_days(ord, dir, bucket, anchor)?;
    let date = match selector {
        Selector::Last => bucket_last_day(last, options.resolution)?,
        Selector::Nth(n) => {
            if !(1..=400_000).contains(&n) {
                return None;
            }
            let d = first.checked_add_signed(Duration::days(n - 1))?;
            bucket_first_day(d, options.resolution)?
        }
    };
    acc.explicit_full = Some(date);
    acc.day_specified = true;
    acc.found = true;
    consume_span(vocab, tokens, i..j);
    Some(j)
}

/// Ordinal selector as word ("tenth") or suffix numeral ("10th").
fn selector_ordinal(vocab: &Vocabulary, w: &str) -> Option<i64> {
    if let Some(o) = vocab.ordinal(w) {
        if o.fract() == 0.0 {
            return Some(o as i64);
        }
    }
    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(stem) = w.strip_suffix(suffix) {
            if !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit()) {
                return stem.parse().ok();
            }
        }
    }
    None
}

/// First and last day of the qualified bucket.
fn bucket_days(
    ord: Option<i64>,
    dir: i64,
    bucket: DurationUnit,
    anchor: NaiveDateTime,
) -> Option<(NaiveDate, NaiveDate)> {
    let anchor_date = anchor.date();
    match bucket {
        DurationUnit::Weeks => {
            let base = match ord {
                // "the Nth week": week N of the anchor year.
                Some(n) => NaiveDate::from_ymd_opt(anchor.year(), 1, 1)?
                    .checked_add_signed(Duration::days((n - 1) * 7))?,
                None => anchor_date.checked_add_signed(Duration::days(dir * 7))?,
            };
            let first = bucket_first_day(base, Resolution::Week)?;
            Some((first, bucket_last_day(base, Resolution::Week)?))
        }
        DurationUnit::Months => {
            let (year, month) = match ord {
                Some(n) if (1..=12).contains(&n) => (anchor.year(), n as u32),
                Some(_) => return None,
                None => {
                    let shifted = add_months_clamped(anchor_date, dir)?;
                    (shifted.year(), shifted.month())
                }
            };
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            let last = NaiveDate::from_ymd_opt(year, month, last_day_of_month(year, month))?;
            Some((first, last))
        }
        DurationUnit::Years | DurationUnit::Decades | DurationUnit::Centuries
        | DurationUnit::Millennia => {
            let size = match bucket {
                DurationUnit::Years => 1,
                DurationUnit::Decades => 10,
                DurationUnit::Centuries => 100,
                _ => 1_000,
            };
            let (start, end) = match ord {
                Some(n) => ordinal_year_span(n, size),
                None => {
                    let base = anchor.year() as i64 / size * size + dir * size;
                    (base as i32, (base + size - 1) as i32)
                }
            };
            Some((
                NaiveDate::from_ymd_opt(start, 1, 1)?,
                NaiveDate::from_ymd_opt(end, 12, 31)?,
            ))
        }
        _ => None,
    }
}

/// Month-name dates in the four common orderings: "5 march",
/// "march 5th", "the fifth of march", "march 5 2020", "march 2020".
fn month_phrase(
    vocab: &Vocabulary,
    tokens: &mut TokenStream,
    acc: &mut Accumulator,
    i: usize,
) -> Option<usize> {
    let month = vocab.month(tokens.live(i)?)?;
    let mut start = i;
    let mut end = i + 1;
    let mut day = None;

    // Day before the month: "5 march" or "fifth of march".
    if i >= 1 {
        if let Some(d) = tokens.live(i - 1).and_then(|w| day_number(vocab, w)) {
            day = Some(d);
            start = i - 1;
        } else if i >= 2
            && tokens.live(i - 1) == Some("of")
            && tokens.live(i - 2).and_then(|w| day_number(vocab, w)).is_some()
        {
            day = tokens.live(i - 2).and_then(|w| day_number(vocab, w));
            start = i - 2;
        }
    }

    // Day after the month: "march 5th".
    if day.is_none() {
        if let Some(d) = tokens.live(i + 1).and_then(|w| day_number(vocab, w)) {
            day = Some(d);
            end = i + 2;
        }
    }

    // Explicit year after the consumed portion.
    let year = tokens.live(end).and_then(year_number);
    if year.is_some() {
        end += 1;
    }

    acc.explicit_date = Some(ExplicitDate {
        month,
        day: day.unwrap_or(1),
        year,
    });
    acc.day_specified = day.is_some();
    acc.found = true;
    consume_span(vocab, tokens, start..end);
    Some(end)
}

/// A day-of-month candidate: "5", "5th", "fifth", "five". Accepts up to
/// two digits so an impossible day next to a month ("june 32") still
/// forms an explicit date and fails composition instead of being
/// silently skipped.
fn day_number(vocab: &Vocabulary, w: &str) -> Option<u32> {
    let value = if let Some(o) = selector_ordinal(vocab, w) {
        o as f64
    } else if let Some(c) = vocab.cardinal(w) {
        c
    } else if w.bytes().all(|b| b.is_ascii_digit()) && !w.is_empty() {
        w.parse::<f64>().ok()?
    } else {
        return None;
    };
    (value.fract() == 0.0 && (1.0..=99.0).contains(&value)).then_some(value as u32)
}

fn year_number(w: &str) -> Option<i32> {
    (w.len() == 4 && w.bytes().all(|b| b.is_ascii_digit()))
        .then(|| w.parse().ok())
        .flatten()
}

fn bare_weekday(
    vocab: &Vocabulary,
    tokens: &mut TokenStream,
    acc: &mut Accumulator,
    anchor: NaiveDateTime,
    i: usize,
) -> Option<usize> {
    let target = vocab.weekday(tokens.live(i)?)?;
    acc.day_offset += weekday_offset(anchor.weekday(), target, 0).max(0);
    acc.day_specified = true;
    acc.found = true;
    consume_span(vocab, tokens, i..i + 1);
    Some(i + 1)
}

fn bare_season(
    vocab: &Vocabulary,
    tokens: &mut TokenStream,
    acc: &mut Accumulator,
    anchor: NaiveDateTime,
    options: &DateTimeOptions,
    i: usize,
) -> Option<usize> {
    let season = vocab.seasons.get(tokens.live(i)?).copied()?;
    let date = directed_season(season, anchor, options.hemisphere, 0)?;
    acc.explicit_full = Some(date);
    acc.day_specified = true;
    acc.found = true;
    consume_span(vocab, tokens, i..i + 1);
    Some(i + 1)
}

/// Start date of a season relative to the anchor. `dir` +1 means strictly
/// upcoming, -1 the most recent past one, 0 the current-or-next one.
fn directed_season(
    season: Season,
    anchor: NaiveDateTime,
    hemisphere: Hemisphere,
    dir: i64,
) -> Option<NaiveDate> {
    let anchor_date = anchor.date();
    let this_year = season_start(season, anchor.year(), hemisphere)?;
    match dir {
        1 => {
            if this_year > anchor_date {
                Some(this_year)
            } else {
                season_start(season, anchor.year() + 1, hemisphere)
            }
        }
        -1 => {
            if this_year < anchor_date {
                Some(this_year)
            } else {
                season_start(season, anchor.year() - 1, hemisphere)
            }
        }
        _ => {
            // Current season period, or the next one once it has passed.
            let season_end = this_year.checked_add_signed(Duration::days(89))?;
            if season_end >= anchor_date {
                Some(this_year)
            } else {
                season_start(season, anchor.year() + 1, hemisphere)
            }
        }
    }
}

/// Holiday names resolved through the registered collaborator, longest
/// phrase first.
fn holiday_phrase(
    lang: &Language,
    tokens: &mut TokenStream,
    acc: &mut Accumulator,
    anchor: NaiveDateTime,
    i: usize,
) -> Option<usize> {
    let resolver = lang.holidays.as_ref()?;
    'lens: for len in (1..=3).rev() {
        if i + len > tokens.len() {
            continue;
        }
        let mut words = Vec::with_capacity(len);
        for k in i..i + len {
            match tokens.live(k) {
                Some(w) => words.push(w),
                None => continue 'lens,
            }
        }
        let phrase = words.join(" ");
        if let Some(date) = resolver.resolve(&phrase, anchor.date()) {
            acc.explicit_full = Some(date);
            acc.day_specified = true;
            acc.found = true;
            consume_span(&lang.vocab, tokens, i..i + len);
            return Some(i + len);
        }
    }
    None
}

/// Day offset to the target weekday. `dir` +1 is strictly future, -1
/// strictly past, 0 the same week (0 when the anchor already is that day).
fn weekday_offset(anchor_wd: Weekday, target: Weekday, dir: i64) -> i64 {
    let ahead = (target.num_days_from_monday() as i64 - anchor_wd.num_days_from_monday() as i64)
        .rem_euclid(7);
    match dir {
        1 => {
            if ahead == 0 {
                7
            } else {
                ahead
            }
        }
        -1 => {
            let back = (7 - ahead) % 7;
            if back == 0 {
                -7
            } else {
                -back
            }
        }
        _ => ahead,
    }
}

// ── Time pass ───────────────────────────────────────────────────────────────

fn time_pass(
    vocab: &Vocabulary,
    tokens: &mut TokenStream,
    acc: &mut Accumulator,
    options: &DateTimeOptions,
) {
    let mut i = 0;
    while i < tokens.len() {
        if tokens.is_consumed(i) {
            i += 1;
            continue;
        }
        let matched = clock_literal(vocab, tokens, acc, i)
            .or_else(|| military_time(vocab, tokens, acc, i))
            .or_else(|| quarter_half_phrase(vocab, tokens, acc, i))
            .or_else(|| oclock_phrase(vocab, tokens, acc, options, i))
            .or_else(|| time_of_day_word(vocab, tokens, acc, i))
            .or_else(|| clock_unit_offset(vocab, tokens, acc, i));
        match matched {
            Some(end) => i = end,
            None => i += 1,
        }
    }
}

fn set_absolute(acc: &mut Accumulator, hour: u32, minute: u32, second: u32, ampm: bool) {
    // Absolute and relative readings are mutually exclusive; first wins.
    if acc.hour != TimeField::Unset {
        return;
    }
    acc.hour = TimeField::Absolute(hour);
    acc.minute = TimeField::Absolute(minute);
    acc.second = TimeField::Absolute(second);
    acc.ampm_specified = ampm;
    acc.found = true;
}

/// Apply an am/pm marker to a 1-12 clock hour.
fn apply_meridiem(hour: u32, pm: bool) -> u32 {
    match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    }
}

/// "10:30", "10:30:15", "10:30pm", "10:30 pm", "10am".
fn clock_literal(
    vocab: &Vocabulary,
    tokens: &mut TokenStream,
    acc: &mut Accumulator,
    i: usize,
) -> Option<usize> {
    let w = tokens.live(i)?;
    let (body, mut meridiem) = split_meridiem(w);
    let mut end = i + 1;
    if meridiem.is_none() {
        if let Some(next) = tokens.live(i + 1) {
            if vocab.meridiem_am.contains(next) {
                meridiem = Some(false);
            } else if vocab.meridiem_pm.contains(next) {
                meridiem = Some(true);
            }
            if meridiem.is_some() {
                end += 1;
            }
        }
    }

    if body.contains(':') {
        let mut parts = body.split(':');
        let hour: u32 = digits(parts.next()?)?;
        let minute: u32 = digits(parts.next()?)?;
        let second: u32 = match parts.next() {
            Some(p) => digits(p)?,
            None => 0,
        };
        if parts.next().is_some() || minute > 59 || second > 59 {
            return None;
        }
        let hour = match meridiem {
            Some(pm) if (1..=12).contains(&hour) => apply_meridiem(hour, pm),
            Some(_) => return None,
            None if hour <= 23 => hour,
            None => return None,
        };
        set_absolute(acc, hour, minute, second, meridiem.is_some());
        consume_span(vocab, tokens, i..end);
        return Some(end);
    }

    // Bare hour with a meridiem: "10am", "10 pm".
    let pm = meridiem?;
    let hour = digits(&body)?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    set_absolute(acc, apply_meridiem(hour, pm), 0, 0, true);
    consume_span(vocab, tokens, i..end);
    Some(end)
}

fn split_meridiem(w: &str) -> (String, Option<bool>) {
    for (suffix, pm) in [("am", false), ("pm", true)] {
        if let Some(stem) = w.strip_suffix(suffix) {
            if !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit() || b == b':') {
                return (stem.to_string(), Some(pm));
            }
        }
    }
    (w.to_string(), None)
}

fn digits(s: &str) -> Option<u32> {
    (!s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .then(|| s.parse().ok())
        .flatten()
}

/// "0600", "at 1430", "1900 hours", and the spoken "oh six hundred".
fn military_time(
    vocab: &Vocabulary,
    tokens: &mut TokenStream,
    acc: &mut Accumulator,
    i: usize,
) -> Option<usize> {
    let w = tokens.live(i)?;

    // Spoken form: ("oh" | "zero") <digit-word> "hundred".
    if w == "oh" || vocab.cardinal(w) == Some(0.0) {
        let digit = tokens.live(i + 1).and_then(|w| vocab.cardinal(w))?;
        if digit.fract() == 0.0
            && (1.0..=9.0).contains(&digit)
            && tokens.live(i + 2).is_some_and(|w| vocab.hundred_words.contains(w))
        {
            let mut end = i + 3;
            if tokens.live(end).and_then(|w| vocab.unit(w)) == Some(DurationUnit::Hours) {
                end += 1;
            }
            set_absolute(acc, digit as u32, 0, 0, true);
            consume_span(vocab, tokens, i..end);
            return Some(end);
        }
        return None;
    }

    // Digit form needs four digits plus either a leading zero or a marker.
    if w.len() != 4 || !w.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = w[..2].parse().ok()?;
    let minute: u32 = w[2..].parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    // A year-like numeral ("in 2015") must not read as 20:15, so only a
    // leading zero, an "at", or a trailing "hours" marks the digit form.
    let marked = w.starts_with('0')
        || (i > 0 && tokens.live(i - 1) == Some("at"))
        || tokens.live(i + 1).and_then(|n| vocab.unit(n)) == Some(DurationUnit::Hours);
    if !marked {
        return None;
    }
    let mut end = i + 1;
    if tokens.live(end).and_then(|n| vocab.unit(n)) == Some(DurationUnit::Hours) {
        end += 1;
    }
    set_absolute(acc, hour, minute, 0, true);
    consume_span(vocab, tokens, i..end);
    Some(end)
}

/// "quarter past ten", "half past ten", "quarter to ten".
fn quarter_half_phrase(
    vocab: &Vocabulary,
    tokens: &mut TokenStream,
    acc: &mut Accumulator,
    i: usize,
) -> Option<usize> {
    let minutes = match tokens.live(i).and_then(|w| vocab.fraction(w)) {
        Some(d) if d == 4.0 => 15,
        Some(d) if d == 2.0 => 30,
        _ => return None,
    };
    let link = tokens.live(i + 1)?;
    let to = if vocab.past_words.contains(link) {
        false
    } else if vocab.to_words.contains(link) {
        true
    } else {
        return None;
    };

    let hour_word = tokens.live(i + 2)?;
    let hour = if let Some(&h) = vocab.time_of_day.get(hour_word) {
        h
    } else {
        let m = number::resolve(vocab, tokens, i + 2, &NumberOptions::default())?;
        if m.span.len() != 1 || m.value.fract() != 0.0 || !(0.0..=23.0).contains(&m.value) {
            return None;
        }
        m.value as u32
    };

    let (hour, minute) = if to {
        ((hour + 23) % 24, 60 - minutes)
    } else {
        (hour, minutes)
    };
    set_absolute(acc, hour, minute, 0, false);
    consume_span(vocab, tokens, i..i + 3);
    Some(i + 3)
}

/// "ten o'clock", "at 8", and (greedy only) a bare hour numeral.
fn oclock_phrase(
    vocab: &Vocabulary,
    tokens: &mut TokenStream,
    acc: &mut Accumulator,
    options: &DateTimeOptions,
    i: usize,
) -> Option<usize> {
    let m = number::resolve(vocab, tokens, i, &NumberOptions::default())?;
    if m.value.fract() != 0.0 || !(0.0..=23.0).contains(&m.value) {
        return None;
    }
    let hour = m.value as u32;
    let end = m.span.end;

    if tokens.live(end).is_some_and(|w| vocab.oclock_words.contains(w)) {
        set_absolute(acc, hour, 0, 0, false);
        consume_span(vocab, tokens, i..end + 1);
        return Some(end + 1);
    }

    let at_marked = i > 0 && tokens.live(i - 1) == Some("at");
    if at_marked || options.greedy {
        set_absolute(acc, hour, 0, 0, false);
        consume_span(vocab, tokens, i..end);
        return Some(end);
    }
    None
}

/// Vague times of day ("morning", "noon"), optionally pinning the am/pm
/// of an absolute hour that precedes them ("8 in the evening").
fn time_of_day_word(
    vocab: &Vocabulary,
    tokens: &mut TokenStream,
    acc: &mut Accumulator,
    i: usize,
) -> Option<usize> {
    let w = tokens.live(i)?;
    let &default_hour = vocab.time_of_day.get(w)?;

    // Look back past glue for a bare clock hour, digit or spoken:
    // "8 in the evening", "eight in the evening".
    let mut k = i;
    while k > 0
        && tokens
            .live(k - 1)
            .is_some_and(|p| vocab.prepositions.contains(p) || vocab.linkers.contains(p))
    {
        k -= 1;
    }
    if k > 0 && acc.hour == TimeField::Unset {
        if let Some(m) = number::resolve(vocab, tokens, k - 1, &NumberOptions::default()) {
            if m.span.len() == 1 && m.value.fract() == 0.0 && (1.0..=12.0).contains(&m.value) {
                let h = m.value as u32;
                let hour = if default_hour >= 12 && h < 12 { h + 12 } else { h };
                set_absolute(acc, hour, 0, 0, true);
                consume_span(vocab, tokens, k - 1..i + 1);
                return Some(i + 1);
            }
        }
    }

    match acc.hour {
        TimeField::Unset => {
            set_absolute(acc, default_hour, 0, 0, true);
        }
        TimeField::Absolute(h) => {
            // "at 8 in the evening" where the hour is already set.
            if default_hour >= 12 && h < 12 {
                acc.hour = TimeField::Absolute(h + 12);
            }
            acc.ampm_specified = true;
        }
        TimeField::Relative(_) => return None,
    }
    consume_span(vocab, tokens, i..i + 1);
    Some(i + 1)
}

/// "in 2 hours", "in an hour", "30 minutes ago" → relative clock offsets.
fn clock_unit_offset(
    vocab: &Vocabulary,
    tokens: &mut TokenStream,
    acc: &mut Accumulator,
    i: usize,
) -> Option<usize> {
    if acc.hour != TimeField::Unset {
        return None;
    }
    let opts = NumberOptions::default();
    let (quantity, qty_end) = if let Some(m) = number::resolve(vocab, tokens, i, &opts) {
        (m.value, m.span.end)
    } else if tokens.live(i).is_some_and(|w| vocab.articles.contains(w)) {
        (1.0, i + 1)
    } else {
        return None;
    };
    let unit_at = skip_glue(vocab, tokens, qty_end);
    let unit = tokens.live(unit_at).and_then(|w| vocab.unit(w))?;
    if !matches!(
        unit,
        DurationUnit::Hours | DurationUnit::Minutes | DurationUnit::Seconds
    ) {
        return None;
    }
    let mut end = unit_at + 1;
    let mut sign = 1.0;
    if let Some(next) = tokens.live(end) {
        if vocab.ago_words.contains(next) {
            sign = -1.0;
            end += 1;
        } else if next == "from" && tokens.live(end + 1) == Some("now") {
            end += 2;
        }
    }

    let total_seconds = sign * quantity * unit.nominal_seconds();
    let whole_minutes = (total_seconds / 60.0).trunc() as i64;
    let seconds = (total_seconds - whole_minutes as f64 * 60.0).round() as i64;
    let hours = whole_minutes / 60;
    let minutes = whole_minutes % 60;
    acc.hour = TimeField::Relative(hours);
    acc.minute = TimeField::Relative(minutes);
    acc.second = TimeField::Relative(seconds);
    acc.found = true;
    consume_span(vocab, tokens, i..end);
    Some(end)
}

// ── Composition ─────────────────────────────────────────────────────────────

fn compose(
    acc: &Accumulator,
    anchor: NaiveDateTime,
    options: &DateTimeOptions,
) -> Result<NaiveDateTime> {
    let anchor_date = anchor.date();
    let mut date = anchor_date;

    if let Some(full) = acc.explicit_full {
        date = full;
    } else if let Some(explicit) = acc.explicit_date {
        let year = explicit.year.unwrap_or_else(|| anchor.year());
        let mut candidate =
            NaiveDate::from_ymd_opt(year, explicit.month, explicit.day).ok_or_else(|| {
                ExtractError::InvalidDate(format!(
                    "{year:04}-{:02}-{:02} does not exist",
                    explicit.month, explicit.day
                ))
            })?;
        // An unstated year that has already passed rolls forward.
        if explicit.year.is_none() && candidate < anchor_date {
            candidate = NaiveDate::from_ymd_opt(year + 1, explicit.month, explicit.day)
                .ok_or_else(|| {
                    ExtractError::InvalidDate(format!(
                        "{:04}-{:02}-{:02} does not exist",
                        year + 1,
                        explicit.month,
                        explicit.day
                    ))
                })?;
        }
        date = candidate;
    }

    let month_delta = acc.year_offset * 12 + acc.month_offset;
    if month_delta != 0 {
        if month_delta.abs() > 120_000 {
            return Err(ExtractError::InvalidDate("month offset out of range".into()));
        }
        date = add_months_clamped(date, month_delta)
            .ok_or_else(|| ExtractError::InvalidDate("month offset out of range".into()))?;
    }
    if acc.day_offset != 0 {
        let delta = Duration::try_days(acc.day_offset)
            .ok_or_else(|| ExtractError::InvalidDate("day offset out of range".into()))?;
        date = date
            .checked_add_signed(delta)
            .ok_or_else(|| ExtractError::InvalidDate("day offset out of range".into()))?;
    }

    let relative = matches!(acc.hour, TimeField::Relative(_))
        || matches!(acc.minute, TimeField::Relative(_))
        || matches!(acc.second, TimeField::Relative(_));

    let time = if let TimeField::Absolute(h) = acc.hour {
        let minute = match acc.minute {
            TimeField::Absolute(m) => m,
            _ => 0,
        };
        let second = match acc.second {
            TimeField::Absolute(s) => s,
            _ => 0,
        };
        NaiveTime::from_hms_opt(h, minute, second)
            .ok_or_else(|| ExtractError::InvalidDate(format!("{h}:{minute}:{second} is not a valid time")))?
    } else if relative {
        // Relative offsets count from the anchor's own clock.
        anchor.time()
    } else {
        options.default_time.unwrap_or(NaiveTime::MIN)
    };

    let mut resolved = date.and_time(time);

    // A bare clock time with no am/pm and no date rolls to its next
    // occurrence past the anchor: "10 o'clock" at noon means 22:00
    // tonight, and at 22:30 it means 10:00 tomorrow.
    if let TimeField::Absolute(h) = acc.hour {
        if !acc.ampm_specified && !acc.has_date() && resolved < anchor {
            if h < 12 {
                resolved += Duration::hours(12);
            }
            if resolved < anchor {
                if h < 12 {
                    resolved -= Duration::hours(12);
                }
                resolved += Duration::days(1);
            }
        }
    }

    let out_of_range = || ExtractError::InvalidDate("clock offset out of range".into());
    if let TimeField::Relative(n) = acc.hour {
        resolved = resolved
            .checked_add_signed(Duration::try_hours(n).ok_or_else(out_of_range)?)
            .ok_or_else(out_of_range)?;
    }
    if let TimeField::Relative(n) = acc.minute {
        resolved = resolved
            .checked_add_signed(Duration::try_minutes(n).ok_or_else(out_of_range)?)
            .ok_or_else(out_of_range)?;
    }
    if let TimeField::Relative(n) = acc.second {
        resolved = resolved
            .checked_add_signed(Duration::try_seconds(n).ok_or_else(out_of_range)?)
            .ok_or_else(out_of_range)?;
    }

    Ok(resolved)
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> NaiveDateTime {
        // Tuesday, June 27, 2017, midnight.
        NaiveDate::from_ymd_opt(2017, 6, 27)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(hh, mm, ss)
            .unwrap()
    }

    fn extract(text: &str) -> (NaiveDateTime, String) {
        extract_datetime(text, anchor()).unwrap().unwrap()
    }

    #[test]
    fn test_no_datetime_content_is_none() {
        assert!(extract_datetime("feed the cat", anchor()).unwrap().is_none());
        assert!(extract_datetime("", anchor()).unwrap().is_none());
    }

    #[test]
    fn test_tomorrow() {
        let (dt, rest) = extract("tomorrow");
        assert_eq!(dt, at(2017, 6, 28, 0, 0, 0));
        assert_eq!(rest, "");
    }

    #[test]
    fn test_yesterday_and_compound_days() {
        assert_eq!(extract("yesterday").0, at(2017, 6, 26, 0, 0, 0));
        assert_eq!(extract("the day after tomorrow").0, at(2017, 6, 29, 0, 0, 0));
        assert_eq!(extract("the day before yesterday").0, at(2017, 6, 25, 0, 0, 0));
    }

    #[test]
    fn test_leftover_text() {
        let (_, rest) = extract("what is the weather like tomorrow");
        assert_eq!(rest, "what is the weather like");
    }

    #[test]
    fn test_n_units_from_now_and_ago() {
        assert_eq!(extract("in 3 days").0, at(2017, 6, 30, 0, 0, 0));
        assert_eq!(extract("2 weeks from now").0, at(2017, 7, 11, 0, 0, 0));
        assert_eq!(extract("2 days ago").0, at(2017, 6, 25, 0, 0, 0));
        assert_eq!(extract("in a week").0, at(2017, 7, 4, 0, 0, 0));
    }

    #[test]
    fn test_month_and_year_offsets_clamp() {
        // June 27 + 1 month → July 27.
        assert_eq!(extract("in 1 month").0, at(2017, 7, 27, 0, 0, 0));
        assert_eq!(extract("in 2 years").0, at(2019, 6, 27, 0, 0, 0));
        // Jan 31 + 1 month clamps to Feb 28.
        let jan31 = at(2017, 1, 31, 0, 0, 0);
        let (dt, _) = extract_datetime("in 1 month", jan31).unwrap().unwrap();
        assert_eq!(dt, at(2017, 2, 28, 0, 0, 0));
    }

    #[test]
    fn test_next_last_this_weekday() {
        // Anchor is Tuesday June 27.
        assert_eq!(extract("next friday").0, at(2017, 6, 30, 0, 0, 0));
        assert_eq!(extract("next tuesday").0, at(2017, 7, 4, 0, 0, 0));
        assert_eq!(extract("last monday").0, at(2017, 6, 26, 0, 0, 0));
        assert_eq!(extract("this friday").0, at(2017, 6, 30, 0, 0, 0));
        assert_eq!(extract("on wednesday").0, at(2017, 6, 28, 0, 0, 0));
        assert_eq!(extract("tuesday").0, at(2017, 6, 27, 0, 0, 0));
    }

    #[test]
    fn test_next_last_buckets() {
        assert_eq!(extract("next week").0, at(2017, 7, 4, 0, 0, 0));
        assert_eq!(extract("last week").0, at(2017, 6, 20, 0, 0, 0));
        assert_eq!(extract("next month").0, at(2017, 7, 27, 0, 0, 0));
        assert_eq!(extract("next year").0, at(2018, 6, 27, 0, 0, 0));
        assert_eq!(extract("next decade").0, at(2027, 6, 27, 0, 0, 0));
    }

    #[test]
    fn test_month_name_orderings() {
        assert_eq!(extract("march 5").0, at(2018, 3, 5, 0, 0, 0));
        assert_eq!(extract("5 march").0, at(2018, 3, 5, 0, 0, 0));
        assert_eq!(extract("the fifth of march").0, at(2018, 3, 5, 0, 0, 0));
        assert_eq!(extract("july 4th").0, at(2017, 7, 4, 0, 0, 0));
        assert_eq!(extract("march 5 2019").0, at(2019, 3, 5, 0, 0, 0));
        assert_eq!(extract("march 2019").0, at(2019, 3, 1, 0, 0, 0));
    }

    #[test]
    fn test_unstated_year_rolls_forward() {
        // March has passed by the June anchor → next March.
        assert_eq!(extract("in march").0, at(2018, 3, 1, 0, 0, 0));
        // December has not → this December.
        assert_eq!(extract("december 1").0, at(2017, 12, 1, 0, 0, 0));
    }

    #[test]
    fn test_next_last_month_name() {
        // "next" is the first strictly-future occurrence, "last" the most
        // recent strictly-past one.
        assert_eq!(extract("next march").0, at(2018, 3, 1, 0, 0, 0));
        assert_eq!(extract("last march").0, at(2017, 3, 1, 0, 0, 0));
        assert_eq!(extract("next december").0, at(2017, 12, 1, 0, 0, 0));
        assert_eq!(extract("last december").0, at(2016, 12, 1, 0, 0, 0));
    }

    #[test]
    fn test_malformed_explicit_date_errors() {
        // An impossible day next to a month errors, never clamps or skips.
        assert!(matches!(
            extract_datetime("june 32", anchor()),
            Err(ExtractError::InvalidDate(_))
        ));
        assert!(matches!(
            extract_datetime("february 30", anchor()),
            Err(ExtractError::InvalidDate(_))
        ));
        assert!(matches!(
            extract_datetime("the 32nd of june", anchor()),
            Err(ExtractError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_ordinal_bucket_compositions() {
        let opts = DateTimeOptions::default();
        let (dt, _) = extract_datetime_with_options("last day of the 10th century", anchor(), &opts)
            .unwrap()
            .unwrap();
        assert_eq!(dt, at(999, 12, 31, 0, 0, 0));

        let (dt, _) = extract_datetime_with_options("first day of the 3rd millennium", anchor(), &opts)
            .unwrap()
            .unwrap();
        assert_eq!(dt, at(2000, 1, 1, 0, 0, 0));

        let (dt, _) = extract_datetime_with_options("last day of this month", anchor(), &opts)
            .unwrap()
            .unwrap();
        assert_eq!(dt, at(2017, 6, 30, 0, 0, 0));

        let (dt, _) = extract_datetime_with_options("first day of next year", anchor(), &opts)
            .unwrap()
            .unwrap();
        assert_eq!(dt, at(2018, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_chained_qualifiers_collapse_to_last() {
        // Inherited behavior: the decade qualifier is discarded, the
        // millennium wins.
        let (dt, _) = extract_datetime(
            "second day of the 3rd decade of the 3rd millennium",
            anchor(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(dt, at(2000, 1, 2, 0, 0, 0));
    }

    #[test]
    fn test_seasons_by_hemisphere() {
        assert_eq!(extract("next winter").0, at(2017, 12, 1, 0, 0, 0));
        assert_eq!(extract("last summer").0, at(2017, 6, 1, 0, 0, 0));
        let south = DateTimeOptions {
            hemisphere: Hemisphere::South,
            ..Default::default()
        };
        let (dt, _) = extract_datetime_with_options("next winter", anchor(), &south)
            .unwrap()
            .unwrap();
        assert_eq!(dt, at(2018, 6, 1, 0, 0, 0));
    }

    #[test]
    fn test_clock_literals() {
        assert_eq!(extract("at 10:30").0, at(2017, 6, 27, 10, 30, 0));
        assert_eq!(extract("at 10:30pm").0, at(2017, 6, 27, 22, 30, 0));
        assert_eq!(extract("at 10:30 pm").0, at(2017, 6, 27, 22, 30, 0));
        assert_eq!(extract("9am").0, at(2017, 6, 27, 9, 0, 0));
        assert_eq!(extract("12am").0, at(2017, 6, 27, 0, 0, 0));
        assert_eq!(extract("12pm").0, at(2017, 6, 27, 12, 0, 0));
    }

    #[test]
    fn test_military_time() {
        assert_eq!(extract("0600").0, at(2017, 6, 27, 6, 0, 0));
        assert_eq!(extract("at 1430").0, at(2017, 6, 27, 14, 30, 0));
        assert_eq!(extract("1900 hours").0, at(2017, 6, 27, 19, 0, 0));
        assert_eq!(extract("oh six hundred").0, at(2017, 6, 27, 6, 0, 0));
        assert_eq!(extract("zero six hundred").0, at(2017, 6, 27, 6, 0, 0));
        // A bare unmarked 4-digit number is not a time.
        assert!(extract_datetime("1430", anchor()).unwrap().is_none());
    }

    #[test]
    fn test_quarter_and_half() {
        assert_eq!(extract("quarter past ten").0, at(2017, 6, 27, 10, 15, 0));
        assert_eq!(extract("half past ten").0, at(2017, 6, 27, 10, 30, 0));
        assert_eq!(extract("quarter to ten").0, at(2017, 6, 27, 9, 45, 0));
        assert_eq!(extract("half past noon").0, at(2017, 6, 27, 12, 30, 0));
    }

    #[test]
    fn test_vague_times_of_day() {
        assert_eq!(extract("tomorrow morning").0, at(2017, 6, 28, 8, 0, 0));
        assert_eq!(extract("tomorrow evening").0, at(2017, 6, 28, 19, 0, 0));
        assert_eq!(extract("tomorrow at noon").0, at(2017, 6, 28, 12, 0, 0));
        assert_eq!(extract("tomorrow at midnight").0, at(2017, 6, 28, 0, 0, 0));
        assert_eq!(extract("tomorrow afternoon").0, at(2017, 6, 28, 15, 0, 0));
        assert_eq!(extract("tonight").0, at(2017, 6, 27, 22, 0, 0));
    }

    #[test]
    fn test_hour_with_time_of_day_period() {
        assert_eq!(extract("tomorrow at 8 in the evening").0, at(2017, 6, 28, 20, 0, 0));
        assert_eq!(extract("tomorrow at 8 in the morning").0, at(2017, 6, 28, 8, 0, 0));
    }

    #[test]
    fn test_spoken_hour_with_time_of_day_period() {
        let (dt, rest) = extract("eight in the evening");
        assert_eq!(dt, at(2017, 6, 27, 20, 0, 0));
        assert_eq!(rest, "");
        assert_eq!(extract("nine in the morning").0, at(2017, 6, 27, 9, 0, 0));
    }

    #[test]
    fn test_ambiguous_bare_time_rolls_past_anchor() {
        // Spec pair: at an 08:01 anchor "10 o'clock" is 10:00 …
        let morning = at(2017, 6, 27, 8, 1, 2);
        let (dt, _) = extract_datetime("10 o'clock", morning).unwrap().unwrap();
        assert_eq!(dt, at(2017, 6, 27, 10, 0, 0));
        // … and at a 12:01 anchor it is 22:00.
        let noonish = at(2017, 6, 27, 12, 1, 2);
        let (dt, _) = extract_datetime("10 o'clock", noonish).unwrap().unwrap();
        assert_eq!(dt, at(2017, 6, 27, 22, 0, 0));
        // Past even after the pm flip → next day.
        let late = at(2017, 6, 27, 22, 30, 0);
        let (dt, _) = extract_datetime("10 o'clock", late).unwrap().unwrap();
        assert_eq!(dt, at(2017, 6, 28, 10, 0, 0));
    }

    #[test]
    fn test_day_qualifier_suppresses_roll() {
        // An explicit day keeps the literal hour even if it is past.
        let noonish = at(2017, 6, 27, 12, 1, 2);
        let (dt, _) = extract_datetime("today at 10 o'clock", noonish)
            .unwrap()
            .unwrap();
        assert_eq!(dt, at(2017, 6, 27, 10, 0, 0));
    }

    #[test]
    fn test_relative_clock_offsets() {
        let base = at(2017, 6, 27, 8, 1, 2);
        let (dt, _) = extract_datetime("in 3 hours", base).unwrap().unwrap();
        assert_eq!(dt, at(2017, 6, 27, 11, 1, 2));
        let (dt, _) = extract_datetime("in 90 minutes", base).unwrap().unwrap();
        assert_eq!(dt, at(2017, 6, 27, 9, 31, 2));
        let (dt, _) = extract_datetime("30 seconds ago", base).unwrap().unwrap();
        assert_eq!(dt, at(2017, 6, 27, 8, 0, 32));
        let (dt, _) = extract_datetime("in an hour", base).unwrap().unwrap();
        assert_eq!(dt, at(2017, 6, 27, 9, 1, 2));
        let (dt, _) = extract_datetime("in half an hour", base).unwrap().unwrap();
        assert_eq!(dt, at(2017, 6, 27, 8, 31, 2));
    }

    #[test]
    fn test_default_time_applies_when_unset() {
        let opts = DateTimeOptions {
            default_time: NaiveTime::from_hms_opt(9, 30, 0),
            ..Default::default()
        };
        let (dt, _) = extract_datetime_with_options("tomorrow", anchor(), &opts)
            .unwrap()
            .unwrap();
        assert_eq!(dt, at(2017, 6, 28, 9, 30, 0));
        // An absolute time wins over the default.
        let (dt, _) = extract_datetime_with_options("tomorrow at 7am", anchor(), &opts)
            .unwrap()
            .unwrap();
        assert_eq!(dt, at(2017, 6, 28, 7, 0, 0));
    }

    #[test]
    fn test_greedy_bare_hour() {
        assert!(extract_datetime("8", anchor()).unwrap().is_none());
        let greedy = DateTimeOptions {
            greedy: true,
            ..Default::default()
        };
        let (dt, _) = extract_datetime_with_options("8", anchor(), &greedy)
            .unwrap()
            .unwrap();
        assert_eq!(dt, at(2017, 6, 27, 8, 0, 0));
    }

    #[test]
    fn test_combined_date_and_time() {
        assert_eq!(extract("next friday at 10:30").0, at(2017, 6, 30, 10, 30, 0));
        assert_eq!(extract("march 5 at 9am").0, at(2018, 3, 5, 9, 0, 0));
        assert_eq!(
            extract("set an appointment for next tuesday at 2pm").0,
            at(2017, 7, 4, 14, 0, 0)
        );
    }

    #[test]
    fn test_holiday_lookup_through_language() {
        use crate::vocab::{HolidayResolver, Language, Vocabulary};
        use std::sync::Arc;

        struct Christmas;
        impl HolidayResolver for Christmas {
            fn resolve(&self, name: &str, anchor: NaiveDate) -> Option<NaiveDate> {
                (name == "christmas")
                    .then(|| NaiveDate::from_ymd_opt(anchor.year(), 12, 25).unwrap())
            }
        }

        let lang = Language::new(Vocabulary::english()).with_holidays(Arc::new(Christmas));
        let (dt, rest) =
            extract_datetime_lang(&lang, "on christmas", anchor(), &DateTimeOptions::default())
                .unwrap()
                .unwrap();
        assert_eq!(dt, at(2017, 12, 25, 0, 0, 0));
        assert_eq!(rest, "");
    }

    #[test]
    fn test_anchor_is_never_mutated() {
        let a = anchor();
        let _ = extract_datetime("tomorrow at noon", a).unwrap();
        assert_eq!(a, anchor());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_arbitrary_ascii_never_panics(s in "[ -~]{0,60}") {
            let anchor = NaiveDate::from_ymd_opt(2017, 6, 27)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap();
            let _ = extract_datetime(&s, anchor);
        }

        #[test]
        fn test_day_offsets_compose_linearly(n in 0i64..10_000) {
            let anchor = NaiveDate::from_ymd_opt(2017, 6, 27)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            let text = format!("in {n} days");
            let (dt, _) = extract_datetime(&text, anchor).unwrap().unwrap();
            prop_assert_eq!(dt - anchor, Duration::days(n));
        }
    }
}
