//! # patdeck
//!
//! Turn patent-disclosure documents into ordered case records, each with
//! the page image of its representative figure, ready for a slide deck.
//!
//! ## Why this crate?
//!
//! Disclosure write-ups are loosely structured: a case-number line, then
//! numbered headings such as `1. 解決問題`, `2. 發明精神` or `代表圖`, in
//! whatever order the author chose. Collecting them by hand, then hunting
//! the right page in each patent PDF for the figure, is slow. This crate
//! classifies every line with an ordered rule table, seals one record per
//! case, sorts by applicant and date, and locates each figure page by
//! matching the case number against the uploaded PDF filenames.
//!
//! ## Pipeline Overview
//!
//! ```text
//! documents (DOCX / text)          candidate PDFs
//!  │                                │
//!  ├─ 1. Lines    paragraphs → trimmed lines
//!  ├─ 2. Extract  rule table + state machine → CaseRecord*
//!  ├─ 3. Sort     (company, date), unknowns last
//!  ├─ 4. Resolve  case no → PDF, figure token → first page ◀┘
//!  ├─ 5. Render   pdfium rasterisation → PNG
//!  └─ 6. Output   records + diagnostics + Markdown deck outline
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use patdeck::{render_deck, run_batch, Batch, DeckOptions, ExtractionConfig, PdfiumPages};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut batch = Batch::new();
//!     batch.add_document_file("disclosures.docx".as_ref())?;
//!     batch.add_pdf_file("US20230012345A1.pdf".as_ref())?;
//!
//!     let pages = PdfiumPages::bind(None)?;
//!     let output = run_batch(&batch, &ExtractionConfig::default(), Some(&pages))?;
//!     println!("{}", render_deck(&output.records, &DeckOptions::default()));
//!     eprintln!("{} cases, {} with figure", output.stats.cases, output.stats.cases_with_image);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `patdeck` binary (clap + anyhow + serde_json + tracing-subscriber + indicatif + comfy-table) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! patdeck = { version = "0.1", default-features = false }
//! ```
//!
//! ## Locating pdfium
//!
//! Figure rendering needs the pdfium shared library at runtime. Set
//! `PDFIUM_LIB_PATH` to the library file or its directory; otherwise the
//! working directory and then the system library path are tried.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod deck;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{run_batch, Batch, DocumentSource, SourceDocument};
pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use deck::{figure_file_name, render_deck, DeckOptions, ImageMode};
pub use error::{PatdeckError, ResolveError};
pub use output::{
    diagnostics, BatchOutput, BatchStats, CaseRecord, DiagnosticRow, DocumentFailure, Field,
    FigureReport, FigureStatus, ResolvedFigure,
};
pub use pipeline::extract::{extract_cases, CaseExtractor};
pub use pipeline::figure::FigureCandidates;
pub use pipeline::render::{bind_pdfium, PageHit, PageSource, PdfiumPages};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use session::ExtractionSession;
