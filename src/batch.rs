//! Batch entry point: documents + candidate PDFs in, ordered case records out.
//!
//! A run is synchronous and self-contained. Documents are read and
//! extracted one after another; a document that cannot be read is recorded
//! as a [`DocumentFailure`] and the rest of the batch continues. After
//! sorting, each record's figure is resolved independently, so a bad PDF
//! only affects the cases that point at it.

use crate::config::ExtractionConfig;
use crate::error::PatdeckError;
use crate::output::{BatchOutput, BatchStats, CaseRecord, DocumentFailure, FigureStatus};
use crate::pipeline::figure::FigureCandidates;
use crate::pipeline::input::{display_name, read_input_file, read_pdf_file};
use crate::pipeline::lines::{looks_like_docx, read_docx_lines, read_text_lines};
use crate::pipeline::render::PageSource;
use crate::pipeline::{extract, keys, resolve};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where a document's lines come from.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// Raw file content: a DOCX archive, or UTF-8 text.
    Bytes(Vec<u8>),
    /// Lines already read by the caller.
    Lines(Vec<String>),
}

/// A named input document.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    pub source: DocumentSource,
}

impl SourceDocument {
    /// Decode the document into trimmed, non-empty lines.
    ///
    /// Bytes starting with the ZIP signature are read as DOCX; anything
    /// else must be UTF-8 text.
    pub fn lines(&self) -> Result<Vec<String>, PatdeckError> {
        match &self.source {
            DocumentSource::Lines(lines) => Ok(lines
                .iter()
                .map(|l| l.trim())
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()),
            DocumentSource::Bytes(bytes) if looks_like_docx(bytes) => {
                read_docx_lines(&self.name, bytes)
            }
            DocumentSource::Bytes(bytes) => std::str::from_utf8(bytes)
                .map(read_text_lines)
                .map_err(|e| PatdeckError::UnreadableDocument {
                    name: self.name.clone(),
                    detail: format!("neither a DOCX archive nor UTF-8 text: {e}"),
                }),
        }
    }
}

/// The inputs of one run: documents in order, plus candidate PDFs.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    documents: Vec<SourceDocument>,
    candidates: FigureCandidates,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document from its raw bytes (DOCX or UTF-8 text).
    pub fn add_document(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> &mut Self {
        self.documents.push(SourceDocument {
            name: name.into(),
            source: DocumentSource::Bytes(bytes),
        });
        self
    }

    /// Add a document whose lines were already read.
    pub fn add_lines<I, S>(&mut self, name: impl Into<String>, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.documents.push(SourceDocument {
            name: name.into(),
            source: DocumentSource::Lines(lines.into_iter().map(Into::into).collect()),
        });
        self
    }

    /// Add a candidate PDF under its upload filename. Returns the
    /// normalised key, or `None` when the name cannot be keyed.
    pub fn add_pdf(&mut self, filename: &str, bytes: Vec<u8>) -> Option<String> {
        self.candidates.insert(filename, bytes)
    }

    /// Read a document from disk.
    pub fn add_document_file(&mut self, path: &Path) -> Result<&mut Self, PatdeckError> {
        let bytes = read_input_file(path)?;
        Ok(self.add_document(display_name(path), bytes))
    }

    /// Read a candidate PDF from disk.
    pub fn add_pdf_file(&mut self, path: &Path) -> Result<Option<String>, PatdeckError> {
        let bytes = read_pdf_file(path)?;
        Ok(self.add_pdf(&display_name(path), bytes))
    }

    pub fn documents(&self) -> &[SourceDocument] {
        &self.documents
    }

    pub fn candidates(&self) -> &FigureCandidates {
        &self.candidates
    }
}

/// Run one batch to completion.
///
/// `pages` is the PDF engine used for figure resolution; it may be `None`
/// only when `config.resolve_figures` is false.
///
/// # Errors
/// Only fatal conditions are errors: an empty batch, every document
/// unreadable, or resolution requested without a page source. Per-document
/// and per-case problems are reported inside the [`BatchOutput`].
pub fn run_batch(
    batch: &Batch,
    config: &ExtractionConfig,
    pages: Option<&dyn PageSource>,
) -> Result<BatchOutput, PatdeckError> {
    let total_start = Instant::now();
    let cb = config.progress_callback.as_deref();

    if batch.documents.is_empty() {
        return Err(PatdeckError::EmptyBatch);
    }
    if config.resolve_figures && pages.is_none() {
        return Err(PatdeckError::InvalidConfig(
            "figure resolution is enabled but no PDF page source was provided".into(),
        ));
    }

    info!(
        "Starting batch: {} documents, {} candidate PDFs",
        batch.documents.len(),
        batch.candidates.len()
    );
    if let Some(cb) = cb {
        cb.on_batch_start(batch.documents.len());
    }

    // ── Step 1: Read and extract every document ─────────────────────────
    let extract_start = Instant::now();
    let mut records: Vec<CaseRecord> = Vec::new();
    let mut failures: Vec<DocumentFailure> = Vec::new();

    for doc in &batch.documents {
        match doc.lines() {
            Ok(lines) => {
                let cases = extract::extract_cases(&doc.name, &lines);
                debug!("'{}': {} lines → {} cases", doc.name, lines.len(), cases.len());
                if let Some(cb) = cb {
                    cb.on_document_parsed(&doc.name, cases.len());
                }
                records.extend(cases);
            }
            Err(e) => {
                warn!("Skipping document '{}': {}", doc.name, e);
                if let Some(cb) = cb {
                    cb.on_document_failed(&doc.name, &e.to_string());
                }
                failures.push(DocumentFailure {
                    name: doc.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    if failures.len() == batch.documents.len() {
        return Err(PatdeckError::AllDocumentsFailed {
            total: failures.len(),
            first_error: failures[0].error.clone(),
        });
    }
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;

    // ── Step 2: Order records ────────────────────────────────────────────
    if config.sort_records {
        keys::sort_records(&mut records);
    }

    // ── Step 3: Resolve figures ──────────────────────────────────────────
    let resolve_start = Instant::now();
    if let (true, Some(pages)) = (config.resolve_figures, pages) {
        resolve_all(&mut records, &batch.candidates, pages, config);
    }
    let resolve_duration_ms = resolve_start.elapsed().as_millis() as u64;

    // ── Step 4: Stats ────────────────────────────────────────────────────
    let stats = BatchStats {
        documents: batch.documents.len(),
        failed_documents: failures.len(),
        cases: records.len(),
        cases_with_image: records.iter().filter(|r| r.has_image()).count(),
        cases_with_missing_fields: records
            .iter()
            .filter(|r| !r.missing_fields.is_empty())
            .count(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        extract_duration_ms,
        resolve_duration_ms,
    };

    info!(
        "Batch complete: {} cases ({} with figure) from {}/{} documents, {}ms total",
        stats.cases,
        stats.cases_with_image,
        stats.documents - stats.failed_documents,
        stats.documents,
        stats.total_duration_ms
    );
    if let Some(cb) = cb {
        cb.on_batch_complete(stats.cases, stats.cases_with_image);
    }

    Ok(BatchOutput {
        records,
        failures,
        stats,
    })
}

/// Resolve every record's figure in order. Failures stay on the record.
fn resolve_all(
    records: &mut [CaseRecord],
    candidates: &FigureCandidates,
    pages: &dyn PageSource,
    config: &ExtractionConfig,
) {
    let cb = config.progress_callback.as_deref();
    let total = records.len();

    for (i, record) in records.iter_mut().enumerate() {
        if let Some(cb) = cb {
            cb.on_figure_start(i + 1, total);
        }
        let outcome = resolve::resolve_figure(record, candidates, pages, config);
        if let Err(ref e) = outcome {
            warn!("Case '{}': {}", record.title(), e);
        }
        record.apply_resolution(outcome);
        let status = record
            .figure
            .as_ref()
            .map(|f| f.status)
            .unwrap_or(FigureStatus::MissingInfo);
        if let Some(cb) = cb {
            cb.on_figure_resolved(i + 1, total, status);
        }
    }
}
