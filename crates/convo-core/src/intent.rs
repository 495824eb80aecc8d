//! Free-text intent parsing.
//!
//! Pattern matching over the raw user message, no external calls. Kept
//! behind [`IntentParser`] so a model-based parser can replace it without
//! touching callers.

use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;

/// Minimum input length before any pattern is tried.
const MIN_INPUT_CHARS: usize = 4;

/// Minimum length of a captured listing term.
const MIN_TERM_CHARS: usize = 2;

/// Stray articles that are never a listing name on their own.
const STRAY_ARTICLES: &[&str] = &["la", "el", "de", "un", "una"];

/// A parsed location + date-range request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StayQuery {
    /// Location phrase, trimmed.
    pub location: String,
    /// Check-in date (inclusive).
    pub entry: NaiveDate,
    /// Check-out date (exclusive): the day after the second day number.
    pub exit: NaiveDate,
}

/// Strategy interface: free text in, structured intent or nothing out.
pub trait IntentParser: Send + Sync {
    /// Detect a "show me listing X" request, returning the term.
    fn single_listing(&self, text: &str) -> Option<String>;

    /// Detect a location + date-range request, resolved against `today`.
    fn stay_search(&self, text: &str, today: NaiveDate) -> Option<StayQuery>;
}

/// The regex-based parser used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternIntentParser;

impl IntentParser for PatternIntentParser {
    fn single_listing(&self, text: &str) -> Option<String> {
        parse_single_listing_request(text)
    }

    fn stay_search(&self, text: &str, today: NaiveDate) -> Option<StayQuery> {
        parse_location_and_dates(text, today)
    }
}

// Patterns in priority order; only the first that matches is used.
static SINGLE_LISTING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // "(quiero) ver/mostrar (la) finca (de) X"
        Regex::new(r"(?i)^(?:quiero\s+)?(?:ver|mostrar)\s+(?:la\s+)?finca\s+(?:de\s+)?(.+)$")
            .expect("valid regex"),
        // "finca de X"
        Regex::new(r"(?i)finca\s+de\s+(.+)$").expect("valid regex"),
        // "ver/mostrar X"
        Regex::new(r"(?i)^(?:quiero\s+)?(?:ver|mostrar)\s+(.+)$").expect("valid regex"),
    ]
});

static LOCATION_INTRO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:para|en)\s+").expect("valid regex"));

static LOCATION_TERMINATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:del|para)\b|\d").expect("valid regex"));

static DAY_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})\s+al\s+(\d{1,2})\b").expect("valid regex"));

/// Detect phrasing like "quiero ver la finca de villa green" and return the
/// listing term.
///
/// Returns `None` for inputs under 4 characters, when no pattern matches,
/// or when the captured term is under 2 characters or a stray article.
pub fn parse_single_listing_request(text: &str) -> Option<String> {
    let text = text.trim();
    if text.chars().count() < MIN_INPUT_CHARS {
        return None;
    }

    for pattern in SINGLE_LISTING_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(text) {
            let term = captures[1]
                .trim()
                .trim_end_matches(['?', '!', '.', ','])
                .trim()
                .to_string();

            if term.chars().count() < MIN_TERM_CHARS {
                return None;
            }
            if STRAY_ARTICLES.contains(&term.to_lowercase().as_str()) {
                return None;
            }
            return Some(term);
        }
    }

    None
}

/// Detect a location phrase ("para X" / "en X") together with a day range
/// ("del 20 al 21"), resolved against the current month and year of
/// `today`.
///
/// Both parts are required; partial matches return `None`. The exit date is
/// the day after the second day number, making `[entry, exit)` a half-open
/// range for availability overlap checks. Day pairs spanning a month
/// boundary are not reinterpreted; both days resolve against the current
/// month.
pub fn parse_location_and_dates(text: &str, today: NaiveDate) -> Option<StayQuery> {
    let location = parse_location(text)?;

    let captures = DAY_RANGE.captures(text)?;
    let first: u32 = captures[1].parse().ok()?;
    let second: u32 = captures[2].parse().ok()?;
    if !(1..=31).contains(&first) || !(1..=31).contains(&second) {
        return None;
    }

    let entry = NaiveDate::from_ymd_opt(today.year(), today.month(), first)?;
    let exit = NaiveDate::from_ymd_opt(today.year(), today.month(), second)?
        .checked_add_days(Days::new(1))?;

    Some(StayQuery {
        location,
        entry,
        exit,
    })
}

/// Extract the location phrase: introduced by "para" or "en", terminated at
/// "del", "para", a digit, or end-of-string.
fn parse_location(text: &str) -> Option<String> {
    for intro in LOCATION_INTRO.find_iter(text) {
        let remainder = &text[intro.end()..];

        let phrase = match LOCATION_TERMINATOR.find(remainder) {
            Some(terminator) => &remainder[..terminator.start()],
            None => remainder,
        };

        let phrase = phrase
            .trim()
            .trim_end_matches([',', ';', '.'])
            .trim()
            .to_string();

        if !phrase.is_empty() {
            return Some(phrase);
        }
    }

    None
}
