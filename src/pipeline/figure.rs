//! Figure lookup heuristics: which uploaded PDF belongs to a case, and which
//! token identifies the representative figure inside it.
//!
//! Both searches are first-match-wins. File selection follows upload order,
//! token extraction follows line order; nothing is scored or ranked.

use crate::error::ResolveError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, warn};

/// Case numbers this short or shorter never match a file.
pub const MIN_CASE_NO_LEN: usize = 4;

/// `FIG. 3E`, `Fig 2`, `Figure 10A`, `圖2`…
static RE_FIGURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:figure|fig\.?|圖)\s*\d+[A-Za-z]*").unwrap());

/// Candidate PDFs keyed by normalised filename, in upload order.
#[derive(Debug, Clone, Default)]
pub struct FigureCandidates {
    entries: Vec<(String, Vec<u8>)>,
}

impl FigureCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a PDF under the normalised form of `filename`.
    ///
    /// Returns the key used, or `None` when the name has no ASCII
    /// alphanumerics to key on. Re-adding an existing key replaces the bytes
    /// and keeps the original position.
    pub fn insert(&mut self, filename: &str, bytes: Vec<u8>) -> Option<String> {
        let key = normalize_filename(filename);
        if key.is_empty() {
            warn!("Ignoring PDF '{filename}': no alphanumeric characters to match on");
            return None;
        }
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = bytes,
            None => self.entries.push((key.clone(), bytes)),
        }
        Some(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, b)| b.as_slice())
    }

    /// First candidate whose key and the case number contain one another.
    pub fn select(&self, raw_case_no: &str) -> Result<(&str, &[u8]), ResolveError> {
        let not_found = || ResolveError::NoCorrespondingFile {
            case_no: raw_case_no.to_string(),
        };
        if raw_case_no.chars().count() <= MIN_CASE_NO_LEN {
            return Err(not_found());
        }
        let case_key = normalize_key(raw_case_no);
        self.entries
            .iter()
            .find(|(key, _)| case_key.contains(key.as_str()) || key.contains(case_key.as_str()))
            .map(|(key, bytes)| {
                debug!("Case '{raw_case_no}' matched file '{key}'");
                (key.as_str(), bytes.as_slice())
            })
            .ok_or_else(not_found)
    }
}

/// Keep ASCII alphanumerics, upper-cased.
pub fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Normalise an upload filename: drop directories and the extension, then
/// [`normalize_key`].
pub fn normalize_filename(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    normalize_key(stem)
}

/// Figure token to search for in page text.
///
/// The first figure mention across lines wins; without one, the first
/// `fallback_chars` characters of the first non-empty line are used.
pub fn extract_token(rep_fig_text: &str, fallback_chars: usize) -> Result<String, ResolveError> {
    if rep_fig_text.trim().is_empty() {
        return Err(ResolveError::NoFigureText);
    }
    if let Some(m) = rep_fig_text.lines().find_map(|line| RE_FIGURE.find(line)) {
        return Ok(squash_upper(m.as_str()));
    }
    let first = rep_fig_text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();
    let head: String = first.chars().take(fallback_chars).collect();
    debug!("No figure mention in {rep_fig_text:?}; falling back to {head:?}");
    Ok(squash_upper(&head))
}

/// Whether a page's text contains the token, ignoring whitespace and case.
pub fn page_matches(page_text: &str, token: &str) -> bool {
    squash_upper(page_text).contains(token)
}

fn squash_upper(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}
