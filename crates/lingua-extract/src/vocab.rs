//! Per-language vocabulary tables and the language capability table.
//!
//! The resolvers contain no hard-coded words: every word they consult
//! comes from a [`Vocabulary`], so adding a language is a matter of
//! registering a new table, not branching on a language code. The
//! [`LanguageRegistry`] maps a language tag to its [`Language`] entry;
//! a lookup miss logs a warning and the calling operation returns its
//! neutral not-found result, since callers may probe several languages
//! opportunistically.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use chrono::{NaiveDate, Weekday};
use tracing::warn;

use crate::duration::DurationUnit;
use crate::resolution::Season;

// ── Collaborator interfaces ─────────────────────────────────────────────────

/// Location-aware holiday lookup, supplied by the host application.
///
/// `anchor` is the date relative to which "next Christmas" style phrases
/// should be resolved. Returning `None` means the name is not a known
/// holiday; the date pass then leaves those tokens unconsumed.
pub trait HolidayResolver: Send + Sync {
    fn resolve(&self, name: &str, anchor: NaiveDate) -> Option<NaiveDate>;
}

// ── Vocabulary ──────────────────────────────────────────────────────────────

/// Word tables for one language.
///
/// All lookups are exact-match on lowercase normalized words. Fraction
/// words map to their denominator ("quarter" → 4). Scale tables list
/// magnitude words at and above one million; "hundred" and "thousand" are
/// common to both scales.
#[derive(Debug, Default)]
pub struct Vocabulary {
    pub(crate) cardinals: HashMap<String, f64>,
    pub(crate) ordinals: HashMap<String, f64>,
    pub(crate) fractions: HashMap<String, f64>,
    pub(crate) scale_short: HashMap<String, f64>,
    pub(crate) scale_long: HashMap<String, f64>,
    pub(crate) hundred_words: HashSet<String>,
    pub(crate) thousand_words: HashSet<String>,
    pub(crate) sign_words: HashSet<String>,
    pub(crate) decimal_markers: HashSet<String>,
    pub(crate) conjunctions: HashSet<String>,
    pub(crate) articles: HashSet<String>,
    pub(crate) couple_words: HashSet<String>,
    pub(crate) unit_words: HashMap<String, DurationUnit>,
    pub(crate) weekdays: HashMap<String, Weekday>,
    pub(crate) months: HashMap<String, u32>,
    pub(crate) relative_days: HashMap<String, i64>,
    pub(crate) time_of_day: HashMap<String, u32>,
    pub(crate) seasons: HashMap<String, Season>,
    /// next → +1, last → -1, this/current → 0.
    pub(crate) direction_words: HashMap<String, i64>,
    pub(crate) before_words: HashSet<String>,
    pub(crate) after_words: HashSet<String>,
    pub(crate) ago_words: HashSet<String>,
    pub(crate) past_words: HashSet<String>,
    pub(crate) to_words: HashSet<String>,
    pub(crate) oclock_words: HashSet<String>,
    pub(crate) meridiem_am: HashSet<String>,
    pub(crate) meridiem_pm: HashSet<String>,
    /// Glue words consumed inside a matched pattern ("of", "the").
    pub(crate) linkers: HashSet<String>,
    /// Prepositions swallowed when they directly precede a matched span
    /// ("in five minutes", "on monday", "at noon").
    pub(crate) prepositions: HashSet<String>,
    /// Words dropped from leftover text after extraction.
    pub(crate) stop_words: HashSet<String>,
}

impl Vocabulary {
    pub(crate) fn cardinal(&self, w: &str) -> Option<f64> {
        self.cardinals.get(w).copied()
    }

    pub(crate) fn ordinal(&self, w: &str) -> Option<f64> {
        self.ordinals.get(w).copied()
    }

    /// Denominator of a fraction word ("half" → 2).
    pub(crate) fn fraction(&self, w: &str) -> Option<f64> {
        self.fractions.get(w).copied()
    }

    pub(crate) fn scale(&self, w: &str, short_scale: bool) -> Option<f64> {
        if short_scale {
            self.scale_short.get(w).copied()
        } else {
            self.scale_long.get(w).copied()
        }
    }

    pub(crate) fn unit(&self, w: &str) -> Option<DurationUnit> {
        self.unit_words.get(w).copied()
    }

    pub(crate) fn weekday(&self, w: &str) -> Option<Weekday> {
        self.weekdays.get(w).copied()
    }

    pub(crate) fn month(&self, w: &str) -> Option<u32> {
        self.months.get(w).copied()
    }

    /// Strip stop-words out of leftover text.
    pub(crate) fn prune(&self, leftover: &str) -> String {
        leftover
            .split_whitespace()
            .filter(|w| !self.stop_words.contains(*w))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The built-in English table.
    pub fn english() -> Self {
        let mut v = Vocabulary::default();

        for (w, n) in [
            ("zero", 0.0),
            ("one", 1.0),
            ("two", 2.0),
            ("three", 3.0),
            ("four", 4.0),
            ("five", 5.0),
            ("six", 6.0),
            ("seven", 7.0),
            ("eight", 8.0),
            ("nine", 9.0),
            ("ten", 10.0),
            ("eleven", 11.0),
            ("twelve", 12.0),
            ("thirteen", 13.0),
            ("fourteen", 14.0),
            ("fifteen", 15.0),
            ("sixteen", 16.0),
            ("seventeen", 17.0),
            ("eighteen", 18.0),
            ("nineteen", 19.0),
            ("twenty", 20.0),
            ("thirty", 30.0),
            ("forty", 40.0),
            ("fifty", 50.0),
            ("sixty", 60.0),
            ("seventy", 70.0),
            ("eighty", 80.0),
            ("ninety", 90.0),
        ] {
            v.cardinals.insert(w.into(), n);
        }

        for (w, n) in [
            ("first", 1.0),
            ("second", 2.0),
            ("third", 3.0),
            ("fourth", 4.0),
            ("fifth", 5.0),
            ("sixth", 6.0),
            ("seventh", 7.0),
            ("eighth", 8.0),
            ("ninth", 9.0),
            ("tenth", 10.0),
            ("eleventh", 11.0),
            ("twelfth", 12.0),
            ("thirteenth", 13.0),
            ("fourteenth", 14.0),
            ("fifteenth", 15.0),
            ("sixteenth", 16.0),
            ("seventeenth", 17.0),
            ("eighteenth", 18.0),
            ("nineteenth", 19.0),
            ("twentieth", 20.0),
            ("thirtieth", 30.0),
            ("fortieth", 40.0),
            ("fiftieth", 50.0),
            ("sixtieth", 60.0),
            ("seventieth", 70.0),
            ("eightieth", 80.0),
            ("ninetieth", 90.0),
            ("hundredth", 100.0),
            ("thousandth", 1000.0),
        ] {
            v.ordinals.insert(w.into(), n);
        }

        for (w, den) in [
            ("half", 2.0),
            ("halves", 2.0),
            ("quarter", 4.0),
            ("quarters", 4.0),
            ("third", 3.0),
            ("thirds", 3.0),
            ("fourth", 4.0),
            ("fourths", 4.0),
            ("fifth", 5.0),
            ("fifths", 5.0),
            ("sixth", 6.0),
            ("sixths", 6.0),
            ("seventh", 7.0),
            ("sevenths", 7.0),
            ("eighth", 8.0),
            ("eighths", 8.0),
            ("ninth", 9.0),
            ("ninths", 9.0),
            ("tenth", 10.0),
            ("tenths", 10.0),
            ("eleventh", 11.0),
            ("elevenths", 11.0),
            ("twelfth", 12.0),
            ("twelfths", 12.0),
            ("thirteenth", 13.0),
            ("thirteenths", 13.0),
            ("fourteenth", 14.0),
            ("fourteenths", 14.0),
            ("fifteenth", 15.0),
            ("fifteenths", 15.0),
            ("sixteenth", 16.0),
            ("sixteenths", 16.0),
            ("seventeenth", 17.0),
            ("seventeenths", 17.0),
            ("eighteenth", 18.0),
            ("eighteenths", 18.0),
            ("nineteenth", 19.0),
            ("nineteenths", 19.0),
            ("twentieth", 20.0),
            ("twentieths", 20.0),
            ("hundredth", 100.0),
            ("hundredths", 100.0),
            ("thousandth", 1000.0),
            ("thousandths", 1000.0),
        ] {
            v.fractions.insert(w.into(), den);
        }

        for (w, n) in [
            ("million", 1e6),
            ("billion", 1e9),
            ("trillion", 1e12),
            ("quadrillion", 1e15),
            ("quintillion", 1e18),
            ("sextillion", 1e21),
            ("septillion", 1e24),
        ] {
            v.scale_short.insert(w.into(), n);
        }
        for (w, n) in [
            ("million", 1e6),
            ("milliard", 1e9),
            ("billion", 1e12),
            ("billiard", 1e15),
            ("trillion", 1e18),
            ("trilliard", 1e21),
            ("quadrillion", 1e24),
        ] {
            v.scale_long.insert(w.into(), n);
        }

        v.hundred_words.insert("hundred".into());
        v.thousand_words.insert("thousand".into());
        for w in ["minus", "negative"] {
            v.sign_words.insert(w.into());
        }
        v.decimal_markers.insert("point".into());
        v.conjunctions.insert("and".into());
        for w in ["a", "an"] {
            v.articles.insert(w.into());
        }
        for w in ["couple", "pair"] {
            v.couple_words.insert(w.into());
        }

        for (w, u) in [
            ("microsecond", DurationUnit::Microseconds),
            ("microseconds", DurationUnit::Microseconds),
            ("millisecond", DurationUnit::Milliseconds),
            ("milliseconds", DurationUnit::Milliseconds),
            ("second", DurationUnit::Seconds),
            ("seconds", DurationUnit::Seconds),
            ("sec", DurationUnit::Seconds),
            ("secs", DurationUnit::Seconds),
            ("minute", DurationUnit::Minutes),
            ("minutes", DurationUnit::Minutes),
            ("min", DurationUnit::Minutes),
            ("mins", DurationUnit::Minutes),
            ("hour", DurationUnit::Hours),
            ("hours", DurationUnit::Hours),
            ("hr", DurationUnit::Hours),
            ("hrs", DurationUnit::Hours),
            ("day", DurationUnit::Days),
            ("days", DurationUnit::Days),
            ("week", DurationUnit::Weeks),
            ("weeks", DurationUnit::Weeks),
            ("month", DurationUnit::Months),
            ("months", DurationUnit::Months),
            ("year", DurationUnit::Years),
            ("years", DurationUnit::Years),
            ("decade", DurationUnit::Decades),
            ("decades", DurationUnit::Decades),
            ("century", DurationUnit::Centuries),
            ("centuries", DurationUnit::Centuries),
            ("millennium", DurationUnit::Millennia),
            ("millennia", DurationUnit::Millennia),
            ("millenniums", DurationUnit::Millennia),
        ] {
            v.unit_words.insert(w.into(), u);
        }

        for (w, d) in [
            ("monday", Weekday::Mon),
            ("mon", Weekday::Mon),
            ("tuesday", Weekday::Tue),
            ("tue", Weekday::Tue),
            ("tues", Weekday::Tue),
            ("wednesday", Weekday::Wed),
            ("wed", Weekday::Wed),
            ("thursday", Weekday::Thu),
            ("thu", Weekday::Thu),
            ("thurs", Weekday::Thu),
            ("friday", Weekday::Fri),
            ("fri", Weekday::Fri),
            ("saturday", Weekday::Sat),
            ("sat", Weekday::Sat),
            ("sunday", Weekday::Sun),
            ("sun", Weekday::Sun),
        ] {
            v.weekdays.insert(w.into(), d);
        }

        for (w, m) in [
            ("january", 1),
            ("jan", 1),
            ("february", 2),
            ("feb", 2),
            ("march", 3),
            ("mar", 3),
            ("april", 4),
            ("apr", 4),
            ("may", 5),
            ("june", 6),
            ("jun", 6),
            ("july", 7),
            ("jul", 7),
            ("august", 8),
            ("aug", 8),
            ("september", 9),
            ("sep", 9),
            ("sept", 9),
            ("october", 10),
            ("oct", 10),
            ("november", 11),
            ("nov", 11),
            ("december", 12),
            ("dec", 12),
        ] {
            v.months.insert(w.into(), m);
        }

        for (w, off) in [("today", 0), ("tonight", 0), ("tomorrow", 1), ("yesterday", -1)] {
            v.relative_days.insert(w.into(), off);
        }

        for (w, h) in [
            ("morning", 8),
            ("afternoon", 15),
            ("evening", 19),
            ("night", 22),
            ("tonight", 22),
            ("noon", 12),
            ("midday", 12),
            ("midnight", 0),
        ] {
            v.time_of_day.insert(w.into(), h);
        }

        for (w, s) in [
            ("spring", Season::Spring),
            ("summer", Season::Summer),
            ("fall", Season::Fall),
            ("autumn", Season::Fall),
            ("winter", Season::Winter),
        ] {
            v.seasons.insert(w.into(), s);
        }

        for (w, d) in [("next", 1), ("coming", 1), ("last", -1), ("this", 0), ("current", 0)] {
            v.direction_words.insert(w.into(), d);
        }
        v.before_words.insert("before".into());
        v.after_words.insert("after".into());
        v.ago_words.insert("ago".into());
        v.past_words.insert("past".into());
        for w in ["to", "til", "till"] {
            v.to_words.insert(w.into());
        }
        for w in ["o'clock", "oclock"] {
            v.oclock_words.insert(w.into());
        }
        for w in ["am", "a.m", "a.m."] {
            v.meridiem_am.insert(w.into());
        }
        for w in ["pm", "p.m", "p.m."] {
            v.meridiem_pm.insert(w.into());
        }
        for w in ["of", "the"] {
            v.linkers.insert(w.into());
        }
        for w in ["in", "on", "at"] {
            v.prepositions.insert(w.into());
        }
        v.stop_words.insert("and".into());

        v
    }
}

// ── Language registry ───────────────────────────────────────────────────────

/// One language's capabilities: its word tables plus optional collaborators.
pub struct Language {
    pub vocab: Vocabulary,
    pub holidays: Option<Arc<dyn HolidayResolver>>,
}

impl Language {
    pub fn new(vocab: Vocabulary) -> Self {
        Self {
            vocab,
            holidays: None,
        }
    }

    pub fn with_holidays(mut self, holidays: Arc<dyn HolidayResolver>) -> Self {
        self.holidays = Some(holidays);
        self
    }
}

/// Capability table: language tag → [`Language`].
///
/// Registration is an explicit lifecycle operation; the caller serializes
/// it against in-flight resolution for the same tag. Reads of an already
/// registered language need no locking — entries are shared `Arc`s.
#[derive(Default)]
pub struct LanguageRegistry {
    languages: HashMap<String, Arc<Language>>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in English table under `"en"`.
    pub fn with_english() -> Self {
        let mut r = Self::new();
        r.register("en", Language::new(Vocabulary::english()));
        r
    }

    pub fn register(&mut self, tag: &str, language: Language) {
        self.languages.insert(tag.to_lowercase(), Arc::new(language));
    }

    pub fn unregister(&mut self, tag: &str) -> bool {
        self.languages.remove(&tag.to_lowercase()).is_some()
    }

    /// Look up a language tag. Falls back from a region-qualified tag
    /// ("en-us") to its primary subtag ("en"). A miss logs a warning; the
    /// caller returns its neutral not-found result.
    pub fn get(&self, tag: &str) -> Option<Arc<Language>> {
        let tag = tag.to_lowercase();
        if let Some(lang) = self.languages.get(&tag) {
            return Some(Arc::clone(lang));
        }
        if let Some(primary) = tag.split('-').next() {
            if let Some(lang) = self.languages.get(primary) {
                return Some(Arc::clone(lang));
            }
        }
        warn!(language = %tag, "unsupported language, returning no match");
        None
    }
}

/// Shared English entry for the crate-root convenience functions.
pub(crate) fn english() -> &'static Arc<Language> {
    static ENGLISH: OnceLock<Arc<Language>> = OnceLock::new();
    ENGLISH.get_or_init(|| Arc::new(Language::new(Vocabulary::english())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_tables_spot_checks() {
        let v = Vocabulary::english();
        assert_eq!(v.cardinal("seven"), Some(7.0));
        assert_eq!(v.ordinal("third"), Some(3.0));
        assert_eq!(v.fraction("quarter"), Some(4.0));
        assert_eq!(v.scale("billion", true), Some(1e9));
        assert_eq!(v.scale("billion", false), Some(1e12));
        assert_eq!(v.unit("mins"), Some(DurationUnit::Minutes));
        assert_eq!(v.month("sept"), Some(9));
        assert_eq!(v.weekday("tues"), Some(Weekday::Tue));
    }

    #[test]
    fn test_registry_round_trip_and_fallback() {
        let registry = LanguageRegistry::with_english();
        assert!(registry.get("en").is_some());
        assert!(registry.get("en-US").is_some());
        assert!(registry.get("xx").is_none());
    }

    #[test]
    fn test_unregister() {
        let mut registry = LanguageRegistry::with_english();
        assert!(registry.unregister("en"));
        assert!(registry.get("en").is_none());
        assert!(!registry.unregister("en"));
    }

    #[test]
    fn test_prune_drops_stop_words() {
        let v = Vocabulary::english();
        assert_eq!(v.prune("wake me and remind me"), "wake me remind me");
    }

    struct FixedHoliday;
    impl HolidayResolver for FixedHoliday {
        fn resolve(&self, name: &str, anchor: NaiveDate) -> Option<NaiveDate> {
            (name == "christmas").then(|| NaiveDate::from_ymd_opt(anchor.year(), 12, 25).unwrap())
        }
    }

    use chrono::Datelike;

    #[test]
    fn test_holiday_resolver_interface() {
        let lang = Language::new(Vocabulary::english()).with_holidays(Arc::new(FixedHoliday));
        let anchor = NaiveDate::from_ymd_opt(2017, 6, 27).unwrap();
        let resolved = lang.holidays.as_ref().unwrap().resolve("christmas", anchor);
        assert_eq!(resolved, NaiveDate::from_ymd_opt(2017, 12, 25));
        assert_eq!(lang.holidays.as_ref().unwrap().resolve("notaday", anchor), None);
    }
}
