//! Line classification rules for the case extractor.
//!
//! A line is tested against the case-start markers first, then against
//! [`HEADER_RULES`] in table order; the first rule that matches decides what
//! the line is. Everything else is a continuation of the current field.
//!
//! Keeping the rules in one ordered table makes the priority order visible
//! in a single place and lets each rule be tested on its own.

use crate::output::Field;
use once_cell::sync::Lazy;
use regex::Regex;

/// Substrings that open a new case-info block.
pub const CASE_START_MARKERS: [&str; 2] = ["案號", "索號"];

/// A header rule: which field a header line opens and how its prefix is
/// removed.
#[derive(Debug)]
pub struct HeaderRule {
    pub field: Field,
    /// Any of these substrings marks the line as this header. Longer
    /// keywords come first so stripping removes the whole keyword.
    pub keywords: &'static [&'static str],
    strip: Regex,
}

impl HeaderRule {
    fn new(field: Field, keywords: &'static [&'static str]) -> Self {
        let alternation = keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        // Outline numeral ("3." / "3．"), keyword, optional half/full-width colon.
        let strip = Regex::new(&format!(r"^\s*[0-9.．]*\s*(?:{alternation})\s*[:：]?\s*")).unwrap();
        Self {
            field,
            keywords,
            strip,
        }
    }

    pub fn matches(&self, line: &str) -> bool {
        self.keywords.iter().any(|k| line.contains(k))
    }

    /// Remove the header prefix and return the trimmed remainder.
    pub fn strip(&self, line: &str) -> String {
        self.strip.replace(line, "").trim().to_string()
    }
}

/// Header rules in priority order.
pub static HEADER_RULES: Lazy<[HeaderRule; 5]> = Lazy::new(|| {
    [
        HeaderRule::new(Field::Problem, &["解決之問題", "解決問題"]),
        HeaderRule::new(Field::Spirit, &["發明精神"]),
        HeaderRule::new(Field::KeyPoint, &["一句重點", "重點"]),
        HeaderRule::new(Field::RepFig, &["代表圖"]),
        HeaderRule::new(Field::Claim, &["獨立請求項", "獨立項"]),
    ]
});

/// What a single input line means to the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Starts (or restarts) a case-info block.
    CaseStart,
    /// Opens `field`; `content` is the line with its header prefix removed.
    Header { field: Field, content: String },
    /// Appended to whichever field is currently open.
    Continuation(&'a str),
}

pub fn is_case_start(line: &str) -> bool {
    CASE_START_MARKERS.iter().any(|m| line.contains(m))
}

/// Classify one trimmed line. First match wins.
pub fn classify(line: &str) -> LineKind<'_> {
    if is_case_start(line) {
        return LineKind::CaseStart;
    }
    HEADER_RULES
        .iter()
        .find(|rule| rule.matches(line))
        .map(|rule| LineKind::Header {
            field: rule.field,
            content: rule.strip(line),
        })
        .unwrap_or(LineKind::Continuation(line))
}
