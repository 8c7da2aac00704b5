//! # lingua-extract
//!
//! Natural-language extraction of numbers, durations, and date-times.
//!
//! Free text goes in; structured values and the leftover text come out.
//! "wake me up at eight tomorrow morning" becomes tomorrow's date at
//! 08:00 plus the remainder "wake me up", ready for intent handling.
//! All date-time resolution is relative to a caller-supplied anchor, so
//! results are reproducible and testable.
//!
//! ## Modules
//!
//! - [`number`] — spoken and literal numbers ("two and a half" → 2.5)
//! - [`duration`] — quantity-unit spans, fixed or calendar-aware
//! - [`datetime`] — dates, clock times, and their composition
//! - [`resolution`] — calendar buckets, seasons, hemisphere handling
//! - [`vocab`] — per-language word tables and the language registry
//! - [`token`] — shared token stream with consumed-span tracking
//! - [`error`] — error types
//!
//! ## Quick start
//!
//! ```
//! use chrono::NaiveDate;
//! use lingua_extract::{extract_datetime, extract_number};
//!
//! assert_eq!(extract_number("two and a half"), Some(2.5));
//!
//! let anchor = NaiveDate::from_ymd_opt(2017, 6, 27)
//!     .unwrap()
//!     .and_hms_opt(0, 0, 0)
//!     .unwrap();
//! let (when, rest) = extract_datetime("remind me tomorrow", anchor)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(when.date(), NaiveDate::from_ymd_opt(2017, 6, 28).unwrap());
//! assert_eq!(rest, "remind me");
//! ```

use std::sync::Arc;

use chrono::NaiveDateTime;

pub mod datetime;
pub mod duration;
pub mod error;
pub mod number;
pub mod resolution;
mod token;
pub mod vocab;

pub use datetime::{
    extract_datetime, extract_datetime_with_options, DateTimeOptions, TimeField,
};
pub use duration::{
    extract_duration, extract_duration_with_options, CalendarDelta, DurationResolution,
    DurationUnit, DurationValue,
};
pub use error::{ExtractError, Result};
pub use number::{
    extract_number, extract_number_with_options, extract_numbers, extract_numbers_with_options,
    NumberOptions, OrdinalMode,
};
pub use resolution::{season_of, Hemisphere, Resolution, Season};
pub use vocab::{HolidayResolver, Language, LanguageRegistry, Vocabulary};

/// Extraction context bound to one language.
///
/// The free functions at the crate root always use the built-in English
/// table; an `Extractor` carries a [`Language`] looked up from a
/// [`LanguageRegistry`], including any registered collaborators such as
/// a [`HolidayResolver`].
///
/// # Examples
///
/// ```
/// use lingua_extract::{Extractor, LanguageRegistry};
///
/// let registry = LanguageRegistry::with_english();
/// let extractor = Extractor::for_language("en-US", &registry).unwrap();
/// assert_eq!(extractor.extract_number("seven"), Some(7.0));
/// assert!(Extractor::for_language("xx", &registry).is_none());
/// ```
#[derive(Clone)]
pub struct Extractor {
    language: Arc<Language>,
}

impl Extractor {
    pub fn new(language: Arc<Language>) -> Self {
        Self { language }
    }

    /// The built-in English context.
    pub fn english() -> Self {
        Self {
            language: Arc::clone(vocab::english()),
        }
    }

    /// Look up `tag` in `registry`. `None` on an unsupported language;
    /// the registry logs the miss.
    pub fn for_language(tag: &str, registry: &LanguageRegistry) -> Option<Self> {
        registry.get(tag).map(Self::new)
    }

    pub fn extract_number(&self, text: &str) -> Option<f64> {
        self.extract_number_with_options(text, &NumberOptions::default())
    }

    pub fn extract_number_with_options(
        &self,
        text: &str,
        options: &NumberOptions,
    ) -> Option<f64> {
        number::extract_number_vocab(&self.language.vocab, text, options)
    }

    pub fn extract_numbers(&self, text: &str) -> Vec<f64> {
        self.extract_numbers_with_options(text, &NumberOptions::default())
    }

    pub fn extract_numbers_with_options(
        &self,
        text: &str,
        options: &NumberOptions,
    ) -> Vec<f64> {
        number::extract_numbers_vocab(&self.language.vocab, text, options)
    }

    /// See [`extract_duration`].
    pub fn extract_duration(&self, text: &str) -> Result<Option<(DurationValue, String)>> {
        self.extract_duration_with_options(text, DurationResolution::Fixed)
    }

    pub fn extract_duration_with_options(
        &self,
        text: &str,
        resolution: DurationResolution,
    ) -> Result<Option<(DurationValue, String)>> {
        duration::extract_duration_vocab(&self.language.vocab, text, resolution)
    }

    /// See [`extract_datetime`].
    pub fn extract_datetime(
        &self,
        text: &str,
        anchor: NaiveDateTime,
    ) -> Result<Option<(NaiveDateTime, String)>> {
        self.extract_datetime_with_options(text, anchor, &DateTimeOptions::default())
    }

    pub fn extract_datetime_with_options(
        &self,
        text: &str,
        anchor: NaiveDateTime,
        options: &DateTimeOptions,
    ) -> Result<Option<(NaiveDateTime, String)>> {
        datetime::extract_datetime_lang(&self.language, text, anchor, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_extractor_matches_free_functions() {
        let e = Extractor::english();
        assert_eq!(e.extract_number("twenty two"), extract_number("twenty two"));
        let anchor = NaiveDate::from_ymd_opt(2017, 6, 27)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            e.extract_datetime("tomorrow", anchor).unwrap(),
            extract_datetime("tomorrow", anchor).unwrap()
        );
    }

    #[test]
    fn test_extractor_for_language_fallback_and_miss() {
        let registry = LanguageRegistry::with_english();
        assert!(Extractor::for_language("en", &registry).is_some());
        assert!(Extractor::for_language("en-GB", &registry).is_some());
        assert!(Extractor::for_language("de", &registry).is_none());
    }

    #[test]
    fn test_extractor_carries_holidays() {
        use std::sync::Arc;

        struct NewYear;
        impl HolidayResolver for NewYear {
            fn resolve(&self, name: &str, anchor: NaiveDate) -> Option<NaiveDate> {
                use chrono::Datelike;
                (name == "new year")
                    .then(|| NaiveDate::from_ymd_opt(anchor.year() + 1, 1, 1).unwrap())
            }
        }

        let mut registry = LanguageRegistry::new();
        registry.register(
            "en",
            Language::new(Vocabulary::english()).with_holidays(Arc::new(NewYear)),
        );
        let e = Extractor::for_language("en", &registry).unwrap();
        let anchor = NaiveDate::from_ymd_opt(2017, 6, 27)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let (dt, _) = e.extract_datetime("on new year", anchor).unwrap().unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
    }
}
