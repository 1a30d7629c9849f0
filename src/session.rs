//! Caller-owned accumulation of records across several batch runs.
//!
//! A host that lets users upload documents in several rounds keeps one
//! [`ExtractionSession`] and calls [`ExtractionSession::run`] per round.
//! Records accumulate until [`ExtractionSession::reset`].

use crate::batch::{run_batch, Batch};
use crate::config::ExtractionConfig;
use crate::error::PatdeckError;
use crate::output::{diagnostics, BatchStats, CaseRecord, DiagnosticRow, DocumentFailure};
use crate::pipeline::keys;
use crate::pipeline::render::PageSource;
use tracing::info;

#[derive(Debug)]
pub struct ExtractionSession {
    config: ExtractionConfig,
    records: Vec<CaseRecord>,
    failures: Vec<DocumentFailure>,
}

impl ExtractionSession {
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            config,
            records: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Run `batch` and append its records. With sorting enabled the whole
    /// accumulated list is re-sorted, so earlier rounds interleave with
    /// the new one.
    ///
    /// On a fatal error the session is left unchanged.
    pub fn run(
        &mut self,
        batch: &Batch,
        pages: Option<&dyn PageSource>,
    ) -> Result<BatchStats, PatdeckError> {
        let output = run_batch(batch, &self.config, pages)?;

        self.records.extend(output.records);
        self.failures.extend(output.failures);
        if self.config.sort_records {
            keys::sort_records(&mut self.records);
        }

        info!(
            "Session now holds {} records ({} failed documents)",
            self.records.len(),
            self.failures.len()
        );
        Ok(output.stats)
    }

    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    pub fn failures(&self) -> &[DocumentFailure] {
        &self.failures
    }

    pub fn diagnostics(&self) -> Vec<DiagnosticRow> {
        diagnostics(&self.records)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every accumulated record and failure.
    pub fn reset(&mut self) {
        self.records.clear();
        self.failures.clear();
    }

    /// Hand the accumulated records to the caller, leaving the session empty.
    pub fn take_records(&mut self) -> Vec<CaseRecord> {
        self.failures.clear();
        std::mem::take(&mut self.records)
    }
}
