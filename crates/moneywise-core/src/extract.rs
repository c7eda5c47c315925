//! Natural-language entity extraction for expense messages
//!
//! Turns a single free-form sentence ("taxi 2500 yesterday airport") into a
//! partial [`Draft`]. Extraction is a single deterministic pass: amount, then
//! date, then category. Within each entity type the first match wins and no
//! entity type revisits another one's decision. Whatever text is left after
//! removing the recognized spans becomes the description.

use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Category, Draft};

/// Relative date words and how many days back they point
pub const DATE_ALIASES: &[(&str, i64)] = &[
    ("today", 0),
    ("yesterday", 1),
    ("day-before-yesterday", 2),
];

/// Maximum number of fractional digits an amount token may carry
const MAX_AMOUNT_SCALE: usize = 2;

/// Compiled patterns for entity extraction
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    amount: Regex,
    date: Regex,
    typed_date: Regex,
    alias: Regex,
}

impl EntityExtractor {
    pub fn new() -> Result<Self> {
        // Longest alias first so "day-before-yesterday" is never read as "yesterday"
        let mut aliases: Vec<&str> = DATE_ALIASES.iter().map(|(word, _)| *word).collect();
        aliases.sort_by_key(|word| std::cmp::Reverse(word.len()));
        let alternation = aliases
            .iter()
            .map(|word| regex::escape(word))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            amount: Regex::new(r"[.,]?\d+(?:[.,]\d+)*")?,
            date: Regex::new(r"\b(\d{1,2})\.(\d{1,2})\.(\d{2,4})\b")?,
            typed_date: Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{2,4})$")?,
            alias: Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))?,
        })
    }

    /// Extract amount, date, category and description from free text
    ///
    /// `categories` are the user's known categories; `now` is local "now" and
    /// bounds the date (no future dates) and supplies the time of day.
    pub fn extract(&self, text: &str, categories: &[Category], now: NaiveDateTime) -> Draft {
        let text = text.trim();
        if text.is_empty() {
            return Draft::default();
        }

        let mut spans: Vec<(usize, usize)> = Vec::new();

        let amount = self.find_amount(text).map(|(value, span)| {
            spans.push(span);
            value
        });

        let spent_at = self.find_date(text, now).map(|(value, span)| {
            spans.push(span);
            value
        });

        let category = find_category(text, categories).map(|(category, span)| {
            spans.push(span);
            category.clone()
        });

        let description = if spans.is_empty() {
            collapse_whitespace(text)
        } else {
            remove_spans(text, &spans)
        };

        let draft = Draft {
            category,
            amount,
            spent_at,
            description,
        };
        debug!(
            "Extracted from '{}': category={:?} amount={:?} spent_at={:?} description={:?}",
            text,
            draft.category.as_ref().map(|c| c.name.as_str()),
            draft.amount,
            draft.spent_at,
            draft.description
        );
        draft
    }

    /// Find the first numeric run that does not touch other digits
    ///
    /// Runs inside a `DD.MM.YYYY`-shaped date are date material, not amounts.
    /// The whole run is the token: `12.345` or `1.2.3` are not amounts and
    /// nothing of them is consumed. Returns `None` when the first candidate is
    /// not a positive number.
    fn find_amount(&self, text: &str) -> Option<(Decimal, (usize, usize))> {
        let date_runs: Vec<(usize, usize)> = self
            .date
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect();

        let candidate = self.amount.find_iter(text).find(|m| {
            !date_runs
                .iter()
                .any(|(start, end)| m.start() < *end && *start < m.end())
        })?;

        match amount_token_value(candidate.as_str()) {
            Some(value) if value > Decimal::ZERO => {
                Some((value, (candidate.start(), candidate.end())))
            }
            _ => {
                debug!("Discarding amount token '{}'", candidate.as_str());
                None
            }
        }
    }

    /// Explicit date first, then relative aliases
    fn find_date(&self, text: &str, now: NaiveDateTime) -> Option<(NaiveDateTime, (usize, usize))> {
        if let Some(caps) = self.date.captures(text) {
            let whole = caps.get(0)?;
            match date_from_parts(&caps[1], &caps[2], &caps[3]) {
                Some(date) if date <= now.date() => {
                    return Some((date.and_time(now.time()), (whole.start(), whole.end())));
                }
                Some(date) => debug!("Ignoring future date {}", date),
                None => debug!("Ignoring invalid date '{}'", whole.as_str()),
            }
        }

        let m = self.alias.find(text)?;
        let word = m.as_str().to_lowercase();
        let offset = DATE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == word)
            .map(|(_, offset)| *offset)?;
        let date = now.date() - Duration::days(offset);
        Some((date.and_time(now.time()), (m.start(), m.end())))
    }

    /// Parse a date typed on its own (`DD.MM.YYYY` or `DD.MM.YY`)
    ///
    /// Only the format is checked here; rejecting future dates is up to the caller.
    pub fn parse_date_input(&self, text: &str) -> Result<NaiveDate> {
        let text = text.trim();
        let caps = self.typed_date.captures(text).ok_or_else(|| {
            Error::Validation(
                "Could not read the date. Use the DD.MM.YYYY format, e.g. 05.09.2024.".to_string(),
            )
        })?;
        date_from_parts(&caps[1], &caps[2], &caps[3]).ok_or_else(|| {
            Error::Validation(format!("{} is not a valid calendar date.", text))
        })
    }
}

/// Parse a typed amount with the same numeric rule the extractor uses
///
/// Comma or dot decimal separator, strictly positive.
pub fn parse_amount(value: &str) -> Result<Decimal> {
    let amount = amount_token_value(value.trim())
        .ok_or_else(|| Error::Validation("The amount must be a number.".to_string()))?;
    if amount <= Decimal::ZERO {
        return Err(Error::Validation(
            "The amount must be positive.".to_string(),
        ));
    }
    Ok(amount)
}

/// The numeric rule shared by extraction and typed input
///
/// Digits with an optional `.` or `,` followed by one or two digits.
/// Anything else (`.5`, `5.`, `12.345`, `1.2.3`) is not an amount.
fn amount_token_value(token: &str) -> Option<Decimal> {
    let (whole, fraction) = match token.find(['.', ',']) {
        Some(sep) => (&token[..sep], Some(&token[sep + 1..])),
        None => (token, None),
    };

    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) {
        return None;
    }
    match fraction {
        Some(fraction) if !all_digits(fraction) || fraction.len() > MAX_AMOUNT_SCALE => None,
        Some(fraction) => Decimal::from_str(&format!("{}.{}", whole, fraction)).ok(),
        None => Decimal::from_str(whole).ok(),
    }
}

fn date_from_parts(day: &str, month: &str, year: &str) -> Option<NaiveDate> {
    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let mut year: i32 = year.parse().ok()?;
    if year < 100 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Whole-word, case-insensitive category match, longest names first
fn find_category<'a>(text: &str, categories: &'a [Category]) -> Option<(&'a Category, (usize, usize))> {
    let mut candidates: Vec<&Category> = categories
        .iter()
        .filter(|c| !c.name.trim().is_empty())
        .collect();
    candidates.sort_by_key(|c| std::cmp::Reverse(c.name.trim().chars().count()));

    for candidate in candidates {
        let pattern = format!(r"(?i)\b{}\b", regex::escape(candidate.name.trim()));
        let Ok(re) = Regex::new(&pattern) else {
            continue;
        };
        if let Some(m) = re.find(text) {
            return Some((candidate, (m.start(), m.end())));
        }
    }
    None
}

fn remove_spans(text: &str, spans: &[(usize, usize)]) -> Option<String> {
    let mut sorted = spans.to_vec();
    sorted.sort_unstable();

    let mut remaining = String::with_capacity(text.len());
    let mut last = 0;
    for (start, end) in sorted {
        if start > last {
            remaining.push_str(&text[last..start]);
            remaining.push(' ');
        }
        last = last.max(end);
    }
    remaining.push_str(&text[last..]);
    collapse_whitespace(&remaining)
}

fn collapse_whitespace(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, 10)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            user_id: 1,
            name: name.to_string(),
            normalized_name: name.to_lowercase(),
            monthly_limit: dec!(10000),
        }
    }

    fn extractor() -> EntityExtractor {
        EntityExtractor::new().unwrap()
    }

    #[test]
    fn test_category_then_amount() {
        let cats = vec![category(1, "taxi")];
        let draft = extractor().extract("taxi 2500", &cats, now());
        assert_eq!(draft.category.unwrap().id, 1);
        assert_eq!(draft.amount, Some(dec!(2500)));
        assert!(draft.spent_at.is_none());
        assert!(draft.description.is_none());
    }

    #[test]
    fn test_amount_then_category() {
        let cats = vec![category(1, "taxi"), category(2, "food")];
        for text in ["2500 food", "food 2500"] {
            let draft = extractor().extract(text, &cats, now());
            assert_eq!(draft.category.as_ref().map(|c| c.id), Some(2), "{}", text);
            assert_eq!(draft.amount, Some(dec!(2500)), "{}", text);
            assert!(draft.spent_at.is_none(), "{}", text);
        }
    }

    #[test]
    fn test_comma_and_dot_decimal_separators_agree() {
        let ex = extractor();
        let comma = ex.extract("12,50", &[], now());
        let dot = ex.extract("12.50", &[], now());
        assert_eq!(comma.amount, Some(dec!(12.50)));
        assert_eq!(comma.amount, dot.amount);
    }

    #[test]
    fn test_digit_run_is_never_split() {
        let draft = extractor().extract("12345", &[], now());
        assert_eq!(draft.amount, Some(dec!(12345)));
        assert!(draft.description.is_none());
    }

    #[test]
    fn test_first_amount_wins() {
        let draft = extractor().extract("lunch 300 tip 50", &[], now());
        assert_eq!(draft.amount, Some(dec!(300)));
        assert_eq!(draft.description.as_deref(), Some("lunch tip 50"));
    }

    #[test]
    fn test_malformed_numeric_run_is_not_an_amount() {
        let ex = extractor();
        for text in ["12.345", "coffee 3,999 beans", "1.2.3", ".5"] {
            let draft = ex.extract(text, &[], now());
            assert!(draft.amount.is_none(), "{}", text);
            assert_eq!(draft.description.as_deref(), Some(text), "{}", text);
        }
    }

    #[test]
    fn test_day_month_without_year_is_an_amount() {
        let draft = extractor().extract("05.09", &[], now());
        assert_eq!(draft.amount, Some(dec!(5.09)));
        assert!(draft.spent_at.is_none());
    }

    #[test]
    fn test_trailing_punctuation_is_not_part_of_the_amount() {
        let cats = vec![category(1, "taxi")];
        let draft = extractor().extract("taxi 2500, airport.", &cats, now());
        assert_eq!(draft.amount, Some(dec!(2500)));
        assert_eq!(draft.description.as_deref(), Some(", airport."));
    }

    #[test]
    fn test_zero_amount_is_discarded() {
        let cats = vec![category(1, "taxi")];
        let draft = extractor().extract("taxi 0", &cats, now());
        assert!(draft.amount.is_none());
        assert_eq!(draft.category.unwrap().name, "taxi");
    }

    #[test]
    fn test_future_date_is_ignored() {
        let draft = extractor().extract("01.01.2999", &[], now());
        assert!(draft.spent_at.is_none());
        assert!(draft.amount.is_none(), "date digits must not become an amount");
        assert_eq!(draft.description.as_deref(), Some("01.01.2999"));
    }

    #[test]
    fn test_explicit_date_keeps_time_of_day() {
        let cats = vec![category(1, "taxi")];
        let draft = extractor().extract("05.09.2024 taxi 2500", &cats, now());
        let spent_at = draft.spent_at.unwrap();
        assert_eq!(spent_at.date(), NaiveDate::from_ymd_opt(2024, 9, 5).unwrap());
        assert_eq!(spent_at.time(), now().time());
        assert_eq!(draft.amount, Some(dec!(2500)));
        assert!(draft.description.is_none());
    }

    #[test]
    fn test_two_digit_year() {
        let draft = extractor().extract("300 on 01.09.24", &[], now());
        assert_eq!(
            draft.spent_at.unwrap().date(),
            NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
        );
        assert_eq!(draft.amount, Some(dec!(300)));
        assert_eq!(draft.description.as_deref(), Some("on"));
    }

    #[test]
    fn test_invalid_calendar_date_falls_through_to_alias() {
        let draft = extractor().extract("31.02.2024 yesterday 100", &[], now());
        assert_eq!(
            draft.spent_at.unwrap().date(),
            NaiveDate::from_ymd_opt(2024, 9, 9).unwrap()
        );
    }

    #[test]
    fn test_date_aliases() {
        let ex = extractor();
        let cases = [
            ("coffee today", 10),
            ("coffee Yesterday", 9),
            ("coffee day-before-yesterday", 8),
        ];
        for (text, day) in cases {
            let draft = ex.extract(text, &[], now());
            assert_eq!(
                draft.spent_at.unwrap().date(),
                NaiveDate::from_ymd_opt(2024, 9, day).unwrap(),
                "{}",
                text
            );
            assert_eq!(draft.description.as_deref(), Some("coffee"), "{}", text);
        }
    }

    #[test]
    fn test_leftmost_alias_wins() {
        let draft = extractor().extract("yesterday or today", &[], now());
        assert_eq!(
            draft.spent_at.unwrap().date(),
            NaiveDate::from_ymd_opt(2024, 9, 9).unwrap()
        );
        assert_eq!(draft.description.as_deref(), Some("or today"));
    }

    #[test]
    fn test_alias_must_be_whole_word() {
        let draft = extractor().extract("todays special", &[], now());
        assert!(draft.spent_at.is_none());
    }

    #[test]
    fn test_longest_category_name_wins() {
        let cats = vec![category(1, "car"), category(2, "car wash")];
        let draft = extractor().extract("car wash 1500", &cats, now());
        assert_eq!(draft.category.unwrap().id, 2);
        assert!(draft.description.is_none());
    }

    #[test]
    fn test_category_is_whole_word_and_case_insensitive() {
        let cats = vec![category(1, "tax")];
        let draft = extractor().extract("taxi 100", &cats, now());
        assert!(draft.category.is_none());

        let cats = vec![category(1, "Taxi")];
        let draft = extractor().extract("TAXI 100", &cats, now());
        assert_eq!(draft.category.unwrap().id, 1);
    }

    #[test]
    fn test_description_is_residue() {
        let cats = vec![category(1, "taxi")];
        let draft = extractor().extract("taxi  2500 yesterday   airport ride", &cats, now());
        assert_eq!(draft.description.as_deref(), Some("airport ride"));
    }

    #[test]
    fn test_residue_has_no_further_entities() {
        let ex = extractor();
        let cats = vec![category(1, "taxi"), category(2, "food")];
        for text in [
            "taxi 2500 yesterday airport ride",
            "lunch with team food 1200,50",
            "05.09.2024 food 300 groceries",
            "12.345",
            "coffee 3,999 beans",
            "taxi 1.2.3 ride",
        ] {
            let first = ex.extract(text, &cats, now());
            let Some(residue) = first.description.clone() else {
                continue;
            };
            let second = ex.extract(&residue, &cats, now());
            assert!(second.category.is_none(), "{}", text);
            assert!(second.amount.is_none(), "{}", text);
            assert!(second.spent_at.is_none(), "{}", text);
            assert_eq!(second.description, first.description, "{}", text);
        }
    }

    #[test]
    fn test_unrecognized_text_becomes_description() {
        let draft = extractor().extract("  hello   there ", &[], now());
        assert_eq!(draft.description.as_deref(), Some("hello there"));
        assert!(draft.amount.is_none());
    }

    #[test]
    fn test_empty_text() {
        assert!(extractor().extract("   ", &[], now()).is_empty());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12,50").unwrap(), dec!(12.50));
        assert_eq!(parse_amount(" 100 ").unwrap(), dec!(100));
        assert!(parse_amount("abc").unwrap_err().is_validation());
        assert!(parse_amount("").is_err());
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("1.2.3").is_err());
        assert!(parse_amount("12.345").is_err());
        assert!(parse_amount(".5").is_err());
        assert!(parse_amount("5.").is_err());
    }

    #[test]
    fn test_typed_and_extracted_amounts_agree() {
        let ex = extractor();
        for text in ["12,50", "12.50", "2500", "0", "12.345", ".5", "1.2.3", "abc", "007"] {
            let extracted = ex.extract(text, &[], now()).amount;
            let typed = parse_amount(text).ok();
            assert_eq!(extracted, typed, "{}", text);
        }
    }

    #[test]
    fn test_parse_date_input() {
        let ex = extractor();
        assert_eq!(
            ex.parse_date_input("05.09.2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 9, 5).unwrap()
        );
        assert_eq!(
            ex.parse_date_input("5.9.24").unwrap(),
            NaiveDate::from_ymd_opt(2024, 9, 5).unwrap()
        );
        assert!(ex.parse_date_input("2024-09-05").is_err());
        assert!(ex.parse_date_input("30.02.2024").is_err());
    }
}
