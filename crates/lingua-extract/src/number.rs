//! Numeric-expression resolution.
//!
//! Resolves a window of tokens to a numeric value: cardinal words,
//! magnitude words under short or long scale, ordinals, spoken fractions,
//! decimal continuations, sign words, literal numerals, and slash
//! fractions. The resolver is greedy — it matches the longest valid
//! numeric phrase starting at a given index — and reports the span it
//! matched so callers can mark those tokens consumed.
//!
//! "No number found" is `None`, never `0.0`: a spoken "zero" resolves to
//! `Some(0.0)` and callers must not conflate the two.

use std::ops::Range;

use crate::token::TokenStream;
use crate::vocab::Vocabulary;

// ── Options ─────────────────────────────────────────────────────────────────

/// How to read words that are simultaneously ordinal and fraction
/// ("third" is ordinal-3 and fraction-1/3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrdinalMode {
    /// Prefer the ordinal reading: "third" → 3.
    Prefer,
    /// Prefer the fraction/cardinal reading and reject ordinal-only words:
    /// "third" → 1/3, "first" → no match.
    #[default]
    Ignore,
    /// Prefer the fraction/cardinal reading, but fall back to the ordinal
    /// one when no other reading exists: "third" → 1/3, "first" → 1.
    Infer,
}

/// Options for [`extract_number_with_options`] and
/// [`extract_numbers_with_options`].
#[derive(Debug, Clone, Copy)]
pub struct NumberOptions {
    /// Short scale ("billion" = 10^9) vs. long scale ("billion" = 10^12).
    pub short_scale: bool,
    pub ordinals: OrdinalMode,
}

impl Default for NumberOptions {
    fn default() -> Self {
        Self {
            short_scale: true,
            ordinals: OrdinalMode::Ignore,
        }
    }
}

/// A resolved numeric phrase: its value and the token span it covered.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NumberMatch {
    pub value: f64,
    pub span: Range<usize>,
}

// ── Public surface ──────────────────────────────────────────────────────────

/// Extract the first number from `text` using the built-in English table
/// and default options (short scale, ordinals ignored).
///
/// Returns `None` when the text contains no numeric expression — distinct
/// from `Some(0.0)` for a spoken zero.
///
/// # Examples
///
/// ```
/// use lingua_extract::extract_number;
///
/// assert_eq!(extract_number("two and a half cups"), Some(2.5));
/// assert_eq!(extract_number("no numbers here"), None);
/// assert_eq!(extract_number("zero"), Some(0.0));
/// ```
pub fn extract_number(text: &str) -> Option<f64> {
    extract_number_with_options(text, &NumberOptions::default())
}

/// Like [`extract_number`], with explicit scale and ordinal handling.
pub fn extract_number_with_options(text: &str, options: &NumberOptions) -> Option<f64> {
    extract_number_vocab(&crate::vocab::english().vocab, text, options)
}

/// Extract every number from `text`, in order of appearance, one entry per
/// independent numeric phrase. Empty when none match.
pub fn extract_numbers(text: &str) -> Vec<f64> {
    extract_numbers_with_options(text, &NumberOptions::default())
}

/// Like [`extract_numbers`], with explicit options.
pub fn extract_numbers_with_options(text: &str, options: &NumberOptions) -> Vec<f64> {
    extract_numbers_vocab(&crate::vocab::english().vocab, text, options)
}

pub(crate) fn extract_number_vocab(
    vocab: &Vocabulary,
    text: &str,
    options: &NumberOptions,
) -> Option<f64> {
    let tokens = TokenStream::new(text);
    let mut i = 0;
    while i < tokens.len() {
        if let Some(m) = resolve(vocab, &tokens, i, options) {
            return Some(m.value);
        }
        i += 1;
    }
    None
}

pub(crate) fn extract_numbers_vocab(
    vocab: &Vocabulary,
    text: &str,
    options: &NumberOptions,
) -> Vec<f64> {
    let tokens = TokenStream::new(text);
    resolve_all(vocab, &tokens, options)
        .into_iter()
        .map(|m| m.value)
        .collect()
}

// ── Resolver core ───────────────────────────────────────────────────────────

/// Greedily match the longest numeric phrase starting at `start`.
pub(crate) fn resolve(
    vocab: &Vocabulary,
    tokens: &TokenStream,
    start: usize,
    options: &NumberOptions,
) -> Option<NumberMatch> {
    let first = tokens.live(start)?;
    let (negative, core_start) = if vocab.sign_words.contains(first) {
        (true, start + 1)
    } else {
        (false, start)
    };
    let m = resolve_unsigned(vocab, tokens, core_start, options)?;
    let value = if negative { -m.value } else { m.value };
    Some(NumberMatch {
        value,
        span: start..m.span.end,
    })
}

/// Apply [`resolve`] repeatedly across the stream, skipping tokens that
/// start no match. Order-preserving, duplicates kept.
pub(crate) fn resolve_all(
    vocab: &Vocabulary,
    tokens: &TokenStream,
    options: &NumberOptions,
) -> Vec<NumberMatch> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        match resolve(vocab, tokens, i, options) {
            Some(m) => {
                i = m.span.end;
                out.push(m);
            }
            None => i += 1,
        }
    }
    out
}

/// Literal readings of a single token.
enum Literal {
    Plain(f64),
    /// Integer whose phrase may continue ("2 thousand", "2 and a half").
    Integer(f64),
    /// Suffix ordinal like "3rd" or "21st".
    Ordinal(f64),
}

fn parse_literal(word: &str) -> Option<Literal> {
    fn numeric(w: &str) -> bool {
        !w.is_empty() && w.bytes().all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+'))
    }

    // Slash fraction: "3/4".
    if let Some((num, den)) = word.split_once('/') {
        if !numeric(num) || !numeric(den) {
            return None;
        }
        let n: f64 = num.parse().ok()?;
        let d: f64 = den.parse().ok()?;
        if d != 0.0 {
            return Some(Literal::Plain(n / d));
        }
        return None;
    }
    // Suffix ordinal: "1st", "2nd", "3rd", "21st", "10th".
    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            if !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit()) {
                return stem.parse::<f64>().ok().map(Literal::Ordinal);
            }
        }
    }
    // `f64::parse` accepts "inf"/"nan"; only digit-shaped words count.
    if !numeric(word) {
        return None;
    }
    let v: f64 = word.parse().ok()?;
    if word.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
        Some(Literal::Integer(v))
    } else {
        Some(Literal::Plain(v))
    }
}

/// "twenty-two" → 22.
fn parse_hyphenated(vocab: &Vocabulary, word: &str) -> Option<f64> {
    let (left, right) = word.split_once('-')?;
    let tens = vocab.cardinal(left)?;
    let ones = vocab.cardinal(right)?;
    if tens >= 20.0 && tens % 10.0 == 0.0 && (1.0..=9.0).contains(&ones) {
        Some(tens + ones)
    } else {
        None
    }
}

/// Can `small` extend the running sub-total? "twenty" then "two" yes,
/// "two" then "three" no.
fn accepts_small(current: f64, small: f64) -> bool {
    if current == 0.0 {
        return true;
    }
    if small < 10.0 && current >= 20.0 && current % 10.0 == 0.0 {
        return true;
    }
    small < 100.0 && current >= 100.0 && current % 100.0 == 0.0
}

fn resolve_unsigned(
    vocab: &Vocabulary,
    tokens: &TokenStream,
    start: usize,
    options: &NumberOptions,
) -> Option<NumberMatch> {
    let mut total = 0.0f64;
    let mut current = 0.0f64;
    let mut any = false;
    let mut j = start;

    loop {
        let Some(w) = tokens.live(j) else { break };

        // Literal numerals are only admitted at the head of a phrase.
        if !any {
            match parse_literal(w) {
                Some(Literal::Plain(v)) => {
                    return Some(NumberMatch {
                        value: v,
                        span: start..j + 1,
                    });
                }
                Some(Literal::Integer(v)) => {
                    current = v;
                    any = true;
                    j += 1;
                    continue;
                }
                Some(Literal::Ordinal(v)) => {
                    if matches!(options.ordinals, OrdinalMode::Prefer | OrdinalMode::Infer) {
                        return Some(NumberMatch {
                            value: v,
                            span: start..j + 1,
                        });
                    }
                    break;
                }
                None => {}
            }
        }

        if let Some(v) = parse_hyphenated(vocab, w) {
            if !accepts_small(current, v) {
                break;
            }
            current += v;
            any = true;
            j += 1;
            continue;
        }

        // Fraction / ordinal words, disambiguated by mode. Checked before
        // plain cardinals since the tables are disjoint from them.
        let ordinal = vocab.ordinal(w);
        let fraction = vocab.fraction(w);
        if ordinal.is_some() || fraction.is_some() {
            match options.ordinals {
                OrdinalMode::Prefer => {
                    if let Some(o) = ordinal {
                        if !any {
                            return Some(NumberMatch {
                                value: o,
                                span: start..j + 1,
                            });
                        }
                        if accepts_small(current, o) {
                            return Some(NumberMatch {
                                value: total + current + o,
                                span: start..j + 1,
                            });
                        }
                        break;
                    }
                    // Ordinal-less fraction word ("half") keeps its
                    // fraction reading even when ordinals are preferred.
                    let f = fraction?;
                    return Some(fraction_match(total, current, any, f, start, j));
                }
                OrdinalMode::Ignore | OrdinalMode::Infer => {
                    if let Some(f) = fraction {
                        return Some(fraction_match(total, current, any, f, start, j));
                    }
                    let o = ordinal?;
                    if options.ordinals == OrdinalMode::Infer {
                        if !any {
                            return Some(NumberMatch {
                                value: o,
                                span: start..j + 1,
                            });
                        }
                        if accepts_small(current, o) {
                            return Some(NumberMatch {
                                value: total + current + o,
                                span: start..j + 1,
                            });
                        }
                    }
                    break;
                }
            }
        }

        if let Some(v) = vocab.cardinal(w) {
            if !accepts_small(current, v) {
                break;
            }
            current += v;
            any = true;
            j += 1;
            continue;
        }

        if vocab.hundred_words.contains(w) {
            if !any || current == 0.0 {
                break;
            }
            current *= 100.0;
            j += 1;
            continue;
        }

        if vocab.thousand_words.contains(w) {
            if !any {
                break;
            }
            let pending = if current == 0.0 { 1.0 } else { current };
            total += pending * 1000.0;
            current = 0.0;
            j += 1;
            continue;
        }

        if let Some(scale) = vocab.scale(w, options.short_scale) {
            if !any {
                break;
            }
            let pending = if current == 0.0 { 1.0 } else { current };
            total += pending * scale;
            current = 0.0;
            j += 1;
            continue;
        }

        if vocab.decimal_markers.contains(w) && any {
            if let Some(m) = decimal_continuation(vocab, tokens, total + current, start, j) {
                return Some(m);
            }
            break;
        }

        if vocab.conjunctions.contains(w) && any {
            match conjunction_continuation(vocab, tokens, total, current, start, j) {
                Continuation::Terminal(m) => return Some(m),
                Continuation::Join => {
                    j += 1;
                    continue;
                }
                Continuation::None => break,
            }
        }

        break;
    }

    if !any {
        return None;
    }
    Some(NumberMatch {
        value: total + current,
        span: start..j,
    })
}

fn fraction_match(
    total: f64,
    current: f64,
    any: bool,
    denominator: f64,
    start: usize,
    j: usize,
) -> NumberMatch {
    // A preceding number is divided by N; a bare fraction word is 1/N.
    let value = if any {
        (total + current) / denominator
    } else {
        1.0 / denominator
    };
    NumberMatch {
        value,
        span: start..j + 1,
    }
}

/// Digits after a decimal marker concatenate digit-by-digit, preserving
/// leading zeros: "two point zero zero six" → 2.006.
fn decimal_continuation(
    vocab: &Vocabulary,
    tokens: &TokenStream,
    integer_part: f64,
    start: usize,
    marker: usize,
) -> Option<NumberMatch> {
    let mut digits = String::new();
    let mut k = marker + 1;
    while let Some(w) = tokens.live(k) {
        if let Some(v) = vocab.cardinal(w) {
            if v <= 9.0 && v.fract() == 0.0 {
                digits.push((b'0' + v as u8) as char);
                k += 1;
                continue;
            }
            break;
        }
        if !w.is_empty() && w.bytes().all(|b| b.is_ascii_digit()) {
            digits.push_str(w);
            k += 1;
            continue;
        }
        break;
    }
    if digits.is_empty() {
        return None;
    }
    let value: f64 = format!("{}.{}", integer_part as i64, digits).parse().ok()?;
    Some(NumberMatch {
        value,
        span: start..k,
    })
}

enum Continuation {
    Terminal(NumberMatch),
    /// The conjunction joins two parts of one additive phrase; the main
    /// loop consumes it and keeps accumulating.
    Join,
    None,
}

/// Resolve "and" after an accumulated value.
///
/// "two and a half" adds a fraction; "one hundred and nine" keeps
/// accumulating; "four and seven" (accumulated total below 20) reads the
/// continuation as decimal digits, giving 4.7.
fn conjunction_continuation(
    vocab: &Vocabulary,
    tokens: &TokenStream,
    total: f64,
    current: f64,
    start: usize,
    j: usize,
) -> Continuation {
    let base = total + current;
    let mut k = j + 1;

    // [article] [small-cardinal] fraction-word → base + numerator/N.
    let mut probe = k;
    if tokens.live(probe).is_some_and(|w| vocab.articles.contains(w)) {
        probe += 1;
    }
    let mut numerator = 1.0;
    let mut frac_at = probe;
    if let Some(v) = tokens.live(probe).and_then(|w| vocab.cardinal(w)) {
        if v < 100.0 {
            numerator = v;
            frac_at = probe + 1;
        }
    }
    if let Some(den) = tokens.live(frac_at).and_then(|w| vocab.fraction(w)) {
        return Continuation::Terminal(NumberMatch {
            value: base + numerator / den,
            span: start..frac_at + 1,
        });
    }

    let continues = tokens
        .live(k)
        .and_then(|w| parse_hyphenated(vocab, w).or_else(|| vocab.cardinal(w)))
        .is_some();
    if !continues {
        return Continuation::None;
    }

    if base >= 20.0 {
        // "one hundred and nine" — plain additive join.
        return Continuation::Join;
    }

    // Small base: the continuation is a decimal tail ("four and seven" → 4.7).
    let mut digits = String::new();
    while let Some(w) = tokens.live(k) {
        let Some(d) = parse_hyphenated(vocab, w).or_else(|| vocab.cardinal(w)) else {
            break;
        };
        digits.push_str(&format!("{}", d as i64));
        k += 1;
    }
    match format!("{}.{}", base as i64, digits).parse::<f64>() {
        Ok(value) => Continuation::Terminal(NumberMatch {
            value,
            span: start..k,
        }),
        Err(_) => Continuation::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_number_is_none_not_zero() {
        assert_eq!(extract_number("the quick brown fox"), None);
        assert_eq!(extract_numbers("nothing to see"), Vec::<f64>::new());
    }

    #[test]
    fn test_zero_is_distinguishable_from_no_match() {
        assert_eq!(extract_number("zero"), Some(0.0));
        assert_eq!(extract_number("count to zero"), Some(0.0));
    }

    #[test]
    fn test_literal_numerals() {
        assert_eq!(extract_number("give me 42 cookies"), Some(42.0));
        assert_eq!(extract_number("pi is 3.14 roughly"), Some(3.14));
        assert_eq!(extract_number("3/4 of a cup"), Some(0.75));
    }

    #[test]
    fn test_cardinal_words() {
        assert_eq!(extract_number("seven"), Some(7.0));
        assert_eq!(extract_number("twenty two"), Some(22.0));
        assert_eq!(extract_number("twenty-two"), Some(22.0));
        assert_eq!(extract_number("ninety nine"), Some(99.0));
    }

    #[test]
    fn test_magnitudes() {
        assert_eq!(extract_number("two hundred"), Some(200.0));
        assert_eq!(extract_number("three hundred forty two"), Some(342.0));
        assert_eq!(extract_number("two thousand five"), Some(2005.0));
        assert_eq!(
            extract_number("three hundred forty two thousand five hundred"),
            Some(342_500.0)
        );
        assert_eq!(extract_number("2 thousand"), Some(2000.0));
    }

    #[test]
    fn test_short_vs_long_scale() {
        assert_eq!(extract_number("two billion"), Some(2e9));
        let long = NumberOptions {
            short_scale: false,
            ..Default::default()
        };
        assert_eq!(extract_number_with_options("two billion", &long), Some(2e12));
        assert_eq!(extract_number_with_options("two milliard", &long), Some(2e9));
    }

    #[test]
    fn test_conjunction_addition() {
        assert_eq!(extract_number("one hundred and nine"), Some(109.0));
        assert_eq!(extract_number("five hundred and twenty two"), Some(522.0));
    }

    #[test]
    fn test_conjunction_decimal_below_twenty() {
        assert_eq!(extract_number("four and seven"), Some(4.7));
    }

    #[test]
    fn test_fractions() {
        assert_eq!(extract_number("half"), Some(0.5));
        assert_eq!(extract_number("a quarter"), Some(0.25));
        assert_eq!(extract_number("three quarters"), Some(0.75));
        assert_eq!(extract_number("two and a half"), Some(2.5));
        assert_eq!(extract_number("two and three quarters"), Some(2.75));
    }

    #[test]
    fn test_decimal_marker_preserves_leading_zeros() {
        assert_eq!(extract_number("two point five"), Some(2.5));
        assert_eq!(extract_number("two point zero zero six"), Some(2.006));
        assert_eq!(extract_number("ten point oh"), Some(10.0));
    }

    #[test]
    fn test_sign_words() {
        assert_eq!(extract_number("minus three"), Some(-3.0));
        assert_eq!(extract_number("negative two point five"), Some(-2.5));
        assert_eq!(extract_number("minus"), None);
    }

    #[test]
    fn test_ordinal_modes() {
        let prefer = NumberOptions {
            ordinals: OrdinalMode::Prefer,
            ..Default::default()
        };
        let infer = NumberOptions {
            ordinals: OrdinalMode::Infer,
            ..Default::default()
        };

        // "third" is ordinal-3 and fraction-1/3.
        assert_eq!(extract_number_with_options("third", &prefer), Some(3.0));
        assert_eq!(extract_number("third"), Some(1.0 / 3.0));
        assert_eq!(
            extract_number_with_options("third", &infer),
            Some(1.0 / 3.0)
        );

        // "first" has no fraction reading.
        assert_eq!(extract_number_with_options("first", &prefer), Some(1.0));
        assert_eq!(extract_number("first"), None);
        assert_eq!(extract_number_with_options("first", &infer), Some(1.0));

        assert_eq!(
            extract_number_with_options("twenty third", &prefer),
            Some(23.0)
        );
    }

    #[test]
    fn test_suffix_ordinals() {
        let prefer = NumberOptions {
            ordinals: OrdinalMode::Prefer,
            ..Default::default()
        };
        assert_eq!(extract_number_with_options("the 21st", &prefer), Some(21.0));
        assert_eq!(extract_number("the 21st"), None);
        let infer = NumberOptions {
            ordinals: OrdinalMode::Infer,
            ..Default::default()
        };
        assert_eq!(extract_number_with_options("the 3rd", &infer), Some(3.0));
    }

    #[test]
    fn test_extract_numbers_order_and_duplicates() {
        assert_eq!(
            extract_numbers("1 dog, seven pigs, 3 times 5"),
            vec![1.0, 7.0, 3.0, 5.0]
        );
        assert_eq!(extract_numbers("two and two"), vec![2.2]);
        assert_eq!(extract_numbers("one fish two fish"), vec![1.0, 2.0]);
    }

    #[test]
    fn test_adjacent_phrases_do_not_merge() {
        // "two three" is two independent numbers, not 5 or 23.
        assert_eq!(extract_numbers("two three"), vec![2.0, 3.0]);
    }

    #[test]
    fn test_resolve_reports_span() {
        let vocab = crate::vocab::Vocabulary::english();
        let tokens = TokenStream::new("wait five hundred and nine seconds");
        let m = resolve(&vocab, &tokens, 1, &NumberOptions::default()).unwrap();
        assert_eq!(m.value, 509.0);
        assert_eq!(m.span, 1..5);
    }
}
