//! Case extraction: partition a flat sequence of lines into case records.
//!
//! ## State machine
//!
//! ```text
//!            case-start line (seals previous record unless already in CaseInfo)
//!   ┌────────────────────────────────────────────────────────────┐
//!   ▼                                                            │
//! CaseInfo ──header──▶ Problem / Spirit / KeyPoint / RepFig / Claim
//!   ▲  │                          │  ▲
//!   │  └─continuation─┐           └──┘ continuation appends
//!   └─────────────────┘
//! ```
//!
//! Exactly one record is open at any time. It is sealed when a case-start
//! line arrives while another section is open, or when input runs out.
//! Records whose `case_info` is empty are dropped when sealed.

use crate::output::{CaseRecord, Field};
use crate::pipeline::keys::{backfill_keys, derive_keys};
use crate::pipeline::rules::{classify, LineKind};
use tracing::{debug, info};

/// The section currently receiving continuation lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// No header seen yet; continuation lines are discarded.
    None,
    CaseInfo,
    Field(Field),
}

/// Line-by-line case extractor.
///
/// Feed lines with [`CaseExtractor::push_line`] and collect the records
/// with [`CaseExtractor::finish`].
#[derive(Debug)]
pub struct CaseExtractor {
    source: String,
    current: CaseRecord,
    section: Section,
    sealed: Vec<CaseRecord>,
    discarded: usize,
}

impl CaseExtractor {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            current: CaseRecord::new(source.clone()),
            source,
            section: Section::None,
            sealed: Vec::new(),
            discarded: 0,
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    /// Number of continuation lines dropped because no section was open.
    pub fn discarded_lines(&self) -> usize {
        self.discarded
    }

    pub fn push_line(&mut self, raw: &str) {
        let line = raw.trim();
        if line.is_empty() {
            return;
        }

        match classify(line) {
            LineKind::CaseStart => {
                if !self.current.case_info.is_empty() && self.section != Section::CaseInfo {
                    let fresh = CaseRecord::new(self.source.clone());
                    let done = std::mem::replace(&mut self.current, fresh);
                    self.seal(done);
                }
                self.section = Section::CaseInfo;
                self.current.case_info = line.to_string();
                derive_keys(&mut self.current, line);
            }
            LineKind::Header { field, content } => {
                self.section = Section::Field(field);
                *self.current.field_mut(field) = content;
            }
            LineKind::Continuation(text) => match self.section {
                Section::None => {
                    self.discarded += 1;
                    debug!("Discarding line outside any section: {text:?}");
                }
                Section::CaseInfo => {
                    append_line(&mut self.current.case_info, text);
                    backfill_keys(&mut self.current, text);
                }
                Section::Field(field) => append_line(self.current.field_mut(field), text),
            },
        }
    }

    /// Seal the open record and return every record in input order.
    pub fn finish(mut self) -> Vec<CaseRecord> {
        let last = std::mem::take(&mut self.current);
        self.seal(last);
        info!(
            "Extracted {} cases from '{}' ({} lines discarded)",
            self.sealed.len(),
            self.source,
            self.discarded
        );
        self.sealed
    }

    fn seal(&mut self, mut record: CaseRecord) {
        if record.case_info.is_empty() {
            return;
        }
        record.missing_fields = Field::AUDITED
            .into_iter()
            .filter(|&f| record.field(f).trim().is_empty())
            .collect();
        if !record.missing_fields.is_empty() {
            debug!(
                "Case '{}' is missing: {:?}",
                record.title(),
                record.missing_fields
            );
        }
        self.sealed.push(record);
    }
}

/// Append a continuation line. An empty field takes the line as-is rather
/// than starting with a newline.
fn append_line(field: &mut String, line: &str) {
    if !field.is_empty() {
        field.push('\n');
    }
    field.push_str(line);
}

/// Extract all cases from a sequence of lines.
pub fn extract_cases<I, S>(source: &str, lines: I) -> Vec<CaseRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut extractor = CaseExtractor::new(source);
    for line in lines {
        extractor.push_line(line.as_ref());
    }
    extractor.finish()
}
