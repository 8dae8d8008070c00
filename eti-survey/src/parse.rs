//! Parsing of raw model replies into numeric or categorical answers.
//!
//! Replies are free text, so every parser here returns `Option` and never
//! guesses: an answer that cannot be recognized is `None`, and the caller
//! decides whether that becomes a dropped row or a flagged one.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

use eti_core::CategoricalResponse;

/// Extracts a dollar amount from a numeric reply ("$85,000", "85000.50",
/// "Taxable income: 72,000").
pub fn parse_income_response(text: &str) -> Option<Decimal> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();

    let cleaned = text.replace(['$', ','], "");
    let trimmed = cleaned.trim();
    if let Ok(value) = Decimal::from_str(trimmed) {
        return Some(value);
    }

    let pattern = NUMBER.get_or_init(|| {
        Regex::new(r"-?\d+(?:\.\d+)?").expect("numeric pattern is valid")
    });
    let found = pattern.find(trimmed)?;
    Decimal::from_str(found.as_str()).ok()
}

/// Maps a free-text reply onto one of the five survey categories.
///
/// Exact option tokens ("ABOUT_SAME") win first; loose phrasings
/// ("slightly lower", "no change") are matched by pattern as a fallback,
/// in the same order the options are presented.
pub fn parse_categorical_response(text: &str) -> Option<CategoricalResponse> {
    if text.trim().is_empty() {
        return None;
    }

    let upper = text.to_uppercase();

    for response in CategoricalResponse::ALL {
        if upper.contains(&response.as_str().to_uppercase()) {
            return Some(response);
        }
    }

    for (response, patterns) in fallback_patterns() {
        if patterns.iter().any(|pattern| pattern.is_match(&upper)) {
            return Some(*response);
        }
    }

    None
}

/// Extracts the chosen hours from a labor-decision reply. Replies above the
/// round's endowment are rejected rather than clamped.
pub fn parse_labor_response(text: &str, max_units: u32) -> Option<u32> {
    static INTEGER: OnceLock<Regex> = OnceLock::new();

    let pattern = INTEGER.get_or_init(|| Regex::new(r"\d+").expect("integer pattern is valid"));
    let units: u32 = pattern.find(text)?.as_str().parse().ok()?;

    (units <= max_units).then_some(units)
}

type ResponsePatterns = Vec<(CategoricalResponse, Vec<Regex>)>;

fn fallback_patterns() -> &'static ResponsePatterns {
    static PATTERNS: OnceLock<ResponsePatterns> = OnceLock::new();

    PATTERNS.get_or_init(|| {
        let compile = |patterns: &[&str]| {
            patterns
                .iter()
                .map(|p| Regex::new(p).expect("response pattern is valid"))
                .collect::<Vec<_>>()
        };

        vec![
            (
                CategoricalResponse::MuchLower,
                compile(&[r"MUCH\s*LOWER", r"DECREASE.*10%", r"DOWN.*10%"]),
            ),
            (
                CategoricalResponse::SomewhatLower,
                compile(&[r"SOMEWHAT\s*LOWER", r"SLIGHTLY\s*LOWER", r"DECREASE.*2-10%"]),
            ),
            (
                CategoricalResponse::AboutSame,
                compile(&[
                    r"ABOUT\s*(?:THE\s*)?SAME",
                    r"STAY.*SAME",
                    r"NO\s*CHANGE",
                    r"UNCHANGED",
                ]),
            ),
            (
                CategoricalResponse::SomewhatHigher,
                compile(&[r"SOMEWHAT\s*HIGHER", r"SLIGHTLY\s*HIGHER", r"INCREASE.*2-10%"]),
            ),
            (
                CategoricalResponse::MuchHigher,
                compile(&[r"MUCH\s*HIGHER", r"INCREASE.*10%", r"UP.*10%"]),
            ),
        ]
    })
}
