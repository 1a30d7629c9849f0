//! Key derivation from the case-info block: the case number used to match
//! PDF filenames, and the `(company, date)` sort key.

use crate::output::{CaseRecord, UNKNOWN_COMPANY, UNKNOWN_DATE};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_CASE_NO: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]{2,4}\d+[A-Za-z]?").unwrap());

static RE_DATE_SEPARATED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"((?:19|20)\d{2})\s*[./\-年]\s*(\d{1,2})\s*[./\-月]\s*(\d{1,2})").unwrap()
});

static RE_DATE_COMPACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)((?:19|20)\d{2})(\d{2})(\d{2})(?:\D|$)").unwrap());

static RE_COMPANY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:申請人|申請公司|公司名稱|公司|客戶|applicant|company)\s*[:：]?\s*([^/,，、;；()（）]+)")
        .unwrap()
});

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Any date form, for cutting a trailing date off a company name.
static RE_DATE_ANY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:19|20)\d{2}\s*[./\-年]\s*\d{1,2}\s*[./\-月]\s*\d{1,2}日?|(?:19|20)\d{6}").unwrap()
});

/// Extract the short case number (`US123A`, `TW1234`, …) from a line.
pub fn extract_case_no(text: &str) -> Option<String> {
    RE_CASE_NO.find(text).map(|m| m.as_str().to_string())
}

/// Extract a filing date as a zero-padded `YYYYMMDD` string.
pub fn extract_date(text: &str) -> Option<String> {
    if let Some(caps) = RE_DATE_SEPARATED.captures(text) {
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        if (1..=12).contains(&month) && (1..=31).contains(&day) {
            return Some(format!("{}{:02}{:02}", &caps[1], month, day));
        }
    }
    RE_DATE_COMPACT
        .captures(text)
        .map(|caps| format!("{}{}{}", &caps[1], &caps[2], &caps[3]))
}

/// Extract and normalise the applicant/company name.
pub fn extract_company(text: &str) -> Option<String> {
    let caps = RE_COMPANY.captures(text)?;
    let without_date = RE_DATE_ANY.replace_all(&caps[1], " ");
    let name = RE_WHITESPACE
        .replace_all(without_date.trim(), " ")
        .to_uppercase();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Derive all keys from a freshly started case-info block, replacing any
/// previous values.
pub fn derive_keys(record: &mut CaseRecord, line: &str) {
    record.raw_case_no = extract_case_no(line).unwrap_or_default();
    record.sort_date = extract_date(line).unwrap_or_else(|| UNKNOWN_DATE.to_string());
    record.sort_company = extract_company(line).unwrap_or_else(|| UNKNOWN_COMPANY.to_string());
}

/// Fill in whichever keys are still unknown from a continuation line of the
/// case-info block. Keys already found are kept.
pub fn backfill_keys(record: &mut CaseRecord, line: &str) {
    if record.raw_case_no.is_empty() {
        if let Some(no) = extract_case_no(line) {
            record.raw_case_no = no;
        }
    }
    if record.sort_date == UNKNOWN_DATE {
        if let Some(date) = extract_date(line) {
            record.sort_date = date;
        }
    }
    if record.sort_company == UNKNOWN_COMPANY {
        if let Some(company) = extract_company(line) {
            record.sort_company = company;
        }
    }
}

/// Sort records company-major, date-minor.
///
/// Records without a known company go last even when a real company name
/// sorts after the `"ZZZ"` sentinel (CJK names do). The sort is stable, so
/// ties keep their input order.
pub fn sort_records(records: &mut [CaseRecord]) {
    records.sort_by(|a, b| {
        let ka = (a.sort_company == UNKNOWN_COMPANY, &a.sort_company, &a.sort_date);
        let kb = (b.sort_company == UNKNOWN_COMPANY, &b.sort_company, &b.sort_date);
        ka.cmp(&kb)
    });
}
