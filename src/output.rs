//! Output types: case records, figure reports, batch results and the
//! diagnostic rows derived from them.

use crate::error::ResolveError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort-date value for records whose filing date could not be found.
pub const UNKNOWN_DATE: &str = "99999999";

/// Sort-company value for records whose applicant could not be found.
pub const UNKNOWN_COMPANY: &str = "ZZZ";

/// A content field of a case that is introduced by a header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// 解決問題 — the problem the invention solves.
    Problem,
    /// 發明精神 — the inventive concept.
    Spirit,
    /// 一句重點 — one-line summary.
    KeyPoint,
    /// 代表圖 — which figure represents the case.
    RepFig,
    /// 獨立項 — independent claim text.
    Claim,
}

impl Field {
    /// Fields audited for emptiness when a record is sealed.
    pub const AUDITED: [Field; 3] = [Field::Problem, Field::Spirit, Field::KeyPoint];

    /// Label used in the source documents and in diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Field::Problem => "解決問題",
            Field::Spirit => "發明精神",
            Field::KeyPoint => "一句重點",
            Field::RepFig => "代表圖",
            Field::Claim => "獨立項",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One patent/disclosure entry extracted from a source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Name of the document this record was extracted from.
    pub source: String,
    /// Identifying block: the case-start line plus its continuation lines.
    pub case_info: String,
    pub problem: String,
    pub spirit: String,
    pub key_point: String,
    pub rep_fig_text: String,
    pub claim_text: String,
    /// Short alphanumeric case number, used only to match PDF filenames.
    pub raw_case_no: String,
    /// `YYYYMMDD`, or [`UNKNOWN_DATE`].
    pub sort_date: String,
    /// Normalised applicant, or [`UNKNOWN_COMPANY`].
    pub sort_company: String,
    /// PNG bytes of the representative figure page.
    #[serde(skip)]
    pub image_data: Option<Vec<u8>>,
    /// Audited fields that were empty when the record was sealed.
    pub missing_fields: Vec<Field>,
    /// Figure-resolution outcome, absent until the resolver has run.
    pub figure: Option<FigureReport>,
}

impl Default for CaseRecord {
    fn default() -> Self {
        Self::new("")
    }
}

impl CaseRecord {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            case_info: String::new(),
            problem: String::new(),
            spirit: String::new(),
            key_point: String::new(),
            rep_fig_text: String::new(),
            claim_text: String::new(),
            raw_case_no: String::new(),
            sort_date: UNKNOWN_DATE.to_string(),
            sort_company: UNKNOWN_COMPANY.to_string(),
            image_data: None,
            missing_fields: Vec::new(),
            figure: None,
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Problem => &self.problem,
            Field::Spirit => &self.spirit,
            Field::KeyPoint => &self.key_point,
            Field::RepFig => &self.rep_fig_text,
            Field::Claim => &self.claim_text,
        }
    }

    pub fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Problem => &mut self.problem,
            Field::Spirit => &mut self.spirit,
            Field::KeyPoint => &mut self.key_point,
            Field::RepFig => &mut self.rep_fig_text,
            Field::Claim => &mut self.claim_text,
        }
    }

    /// Display identifier: the case number, else the first `case_info` line.
    pub fn title(&self) -> &str {
        if !self.raw_case_no.is_empty() {
            return &self.raw_case_no;
        }
        self.case_info.lines().next().unwrap_or_default()
    }

    pub fn has_image(&self) -> bool {
        self.image_data.is_some()
    }

    /// Record the resolver outcome. On success the PNG bytes move into
    /// `image_data`.
    pub fn apply_resolution(&mut self, outcome: Result<ResolvedFigure, ResolveError>) {
        match outcome {
            Ok(resolved) => {
                self.figure = Some(FigureReport {
                    status: FigureStatus::Success,
                    reason: FigureStatus::Success.to_string(),
                    file: Some(resolved.file),
                    page_index: Some(resolved.page_index),
                    token: Some(resolved.token),
                });
                self.image_data = Some(resolved.png);
            }
            Err(e) => {
                let (file, token) = match &e {
                    ResolveError::TokenNotFound { file, token } => {
                        (Some(file.clone()), Some(token.clone()))
                    }
                    ResolveError::PdfUnreadable { file, .. }
                    | ResolveError::RenderFailed { file, .. } => (Some(file.clone()), None),
                    _ => (None, None),
                };
                self.figure = Some(FigureReport {
                    status: e.status(),
                    reason: e.to_string(),
                    file,
                    page_index: None,
                    token,
                });
                self.image_data = None;
            }
        }
    }
}

/// A successfully located and rasterised figure page.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFigure {
    /// Candidate key of the PDF that matched.
    pub file: String,
    /// Normalised figure token that was searched for.
    pub token: String,
    /// 0-based index of the first page containing the token.
    pub page_index: usize,
    /// PNG-encoded page image.
    pub png: Vec<u8>,
}

/// Diagnostic status of a case's figure lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FigureStatus {
    Success,
    MissingInfo,
    NoMatchingFile,
    TokenNotFound,
}

impl fmt::Display for FigureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FigureStatus::Success => "success",
            FigureStatus::MissingInfo => "missing info",
            FigureStatus::NoMatchingFile => "no matching file",
            FigureStatus::TokenNotFound => "token not found",
        })
    }
}

/// What the resolver did for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureReport {
    pub status: FigureStatus,
    /// Human-readable reason (`"success"` or the error message).
    pub reason: String,
    /// Candidate key of the PDF involved, if one was selected.
    pub file: Option<String>,
    /// 0-based page index on success.
    pub page_index: Option<usize>,
    /// Figure token searched for, when known.
    pub token: Option<String>,
}

/// A document that could not be turned into lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub name: String,
    pub error: String,
}

/// Counters and timings for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub documents: usize,
    pub failed_documents: usize,
    pub cases: usize,
    pub cases_with_image: usize,
    pub cases_with_missing_fields: usize,
    pub total_duration_ms: u64,
    pub extract_duration_ms: u64,
    pub resolve_duration_ms: u64,
}

/// Result of one batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutput {
    /// Records in output order (sorted when sorting is enabled).
    pub records: Vec<CaseRecord>,
    /// Documents that could not be parsed; the rest of the batch continued.
    pub failures: Vec<DocumentFailure>,
    pub stats: BatchStats,
}

/// One row of the diagnostic table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRow {
    /// 1-based position in the output sequence.
    pub index: usize,
    pub case_no: String,
    pub company: String,
    pub date: String,
    /// `None` when the resolver has not run for this record.
    pub status: Option<FigureStatus>,
    pub reason: String,
    pub missing_fields: Vec<Field>,
}

/// Build the diagnostic table for a record sequence.
pub fn diagnostics(records: &[CaseRecord]) -> Vec<DiagnosticRow> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| DiagnosticRow {
            index: i + 1,
            case_no: r.title().to_string(),
            company: r.sort_company.clone(),
            date: r.sort_date.clone(),
            status: r.figure.as_ref().map(|f| f.status),
            reason: r
                .figure
                .as_ref()
                .map(|f| f.reason.clone())
                .unwrap_or_else(|| "not resolved".to_string()),
            missing_fields: r.missing_fields.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_uses_sort_sentinels() {
        let r = CaseRecord::new("a.docx");
        assert_eq!(r.sort_date, UNKNOWN_DATE);
        assert_eq!(r.sort_company, UNKNOWN_COMPANY);
        assert!(r.image_data.is_none());
        assert_eq!(r.source, "a.docx");
    }

    #[test]
    fn title_falls_back_to_first_case_info_line() {
        let mut r = CaseRecord::default();
        r.case_info = "案號：待定\n申請人：Acme".into();
        assert_eq!(r.title(), "案號：待定");
        r.raw_case_no = "TW1234".into();
        assert_eq!(r.title(), "TW1234");
    }

    #[test]
    fn apply_success_moves_png_into_record() {
        let mut r = CaseRecord::default();
        r.apply_resolution(Ok(ResolvedFigure {
            file: "US123A".into(),
            token: "FIG.1".into(),
            page_index: 1,
            png: vec![1, 2, 3],
        }));
        assert_eq!(r.image_data.as_deref(), Some(&[1u8, 2, 3][..]));
        let report = r.figure.unwrap();
        assert_eq!(report.status, FigureStatus::Success);
        assert_eq!(report.reason, "success");
        assert_eq!(report.page_index, Some(1));
    }

    #[test]
    fn apply_failure_keeps_reason() {
        let mut r = CaseRecord::default();
        r.apply_resolution(Err(ResolveError::TokenNotFound {
            file: "US123A".into(),
            token: "FIG.9".into(),
        }));
        assert!(!r.has_image());
        let report = r.figure.unwrap();
        assert_eq!(report.status, FigureStatus::TokenNotFound);
        assert_eq!(report.token.as_deref(), Some("FIG.9"));
        assert!(report.reason.contains("FIG.9"));
    }

    #[test]
    fn diagnostics_rows_are_one_based() {
        let mut a = CaseRecord::default();
        a.raw_case_no = "US1000".into();
        a.missing_fields = vec![Field::KeyPoint];
        let mut b = CaseRecord::default();
        b.raw_case_no = "US2000".into();
        b.apply_resolution(Err(ResolveError::NoFigureText));

        let rows = diagnostics(&[a, b]);
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[0].status, None);
        assert_eq!(rows[0].reason, "not resolved");
        assert_eq!(rows[0].missing_fields, vec![Field::KeyPoint]);
        assert_eq!(rows[1].status, Some(FigureStatus::MissingInfo));
        assert_eq!(rows[1].reason, "no figure text");
    }

    #[test]
    fn field_labels() {
        assert_eq!(Field::KeyPoint.to_string(), "一句重點");
        assert_eq!(Field::AUDITED.len(), 3);
    }
}
