//! Error types for the patdeck library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PatdeckError`] — **Fatal**: the run (or one document of it) cannot
//!   proceed at all (unreadable document, missing file, pdfium not found).
//!   Returned as `Err(PatdeckError)` from the top-level functions.
//!
//! * [`ResolveError`] — **Non-fatal**: the figure of a single case could not
//!   be located (no matching PDF, token not on any page, corrupt PDF) but
//!   every other case is fine. Stored inside
//!   [`crate::output::FigureReport`] so the record still reaches the deck
//!   with its textual figure description.

use crate::output::FigureStatus;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the patdeck library.
///
/// Per-case figure failures use [`ResolveError`] and are stored in
/// [`crate::output::FigureReport`] rather than propagated here.
#[derive(Debug, Error)]
pub enum PatdeckError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The document could not be decoded into lines (not a DOCX, broken XML…).
    #[error("Document '{name}' is unreadable: {detail}")]
    UnreadableDocument { name: String, detail: String },

    /// The batch contained no documents at all.
    #[error("Nothing to extract: the batch contains no documents")]
    EmptyBatch,

    /// Every document in the batch failed to parse.
    #[error("All {total} documents failed to parse.\nFirst error: {first_error}")]
    AllDocumentsFailed { total: usize, first_error: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is needed to search and rasterise figure pages.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (file or directory).\n\
  • Or place libpdfium next to the binary / in the working directory.\n\
  • Or run with --no-figures to skip figure matching.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single case's figure lookup.
///
/// The record is still emitted; downstream formatting falls back to the
/// raw figure description.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum ResolveError {
    /// The case has no representative-figure text to search for.
    #[error("no figure text")]
    NoFigureText,

    /// No uploaded PDF name matches the case number (or it is too short to match on).
    #[error("no corresponding file for case number '{case_no}'")]
    NoCorrespondingFile { case_no: String },

    /// The PDF was opened but no page contains the figure token.
    #[error("token '{token}' not found in PDF '{file}'")]
    TokenNotFound { file: String, token: String },

    /// pdfium could not open or read the PDF.
    #[error("PDF '{file}' could not be read: {detail}")]
    PdfUnreadable { file: String, detail: String },

    /// The matching page was found but could not be rasterised.
    #[error("page {page} of '{file}' could not be rendered: {detail}")]
    RenderFailed {
        file: String,
        page: usize,
        detail: String,
    },

    /// The rendered bitmap could not be PNG-encoded.
    #[error("image encoding failed: {detail}")]
    EncodeFailed { detail: String },
}

impl ResolveError {
    /// Diagnostic status shown for this failure.
    ///
    /// PDF read/render failures surface as `TokenNotFound`: the token could
    /// not be located, and the reason column carries the detail.
    pub fn status(&self) -> FigureStatus {
        match self {
            ResolveError::NoFigureText => FigureStatus::MissingInfo,
            ResolveError::NoCorrespondingFile { .. } => FigureStatus::NoMatchingFile,
            ResolveError::TokenNotFound { .. }
            | ResolveError::PdfUnreadable { .. }
            | ResolveError::RenderFailed { .. }
            | ResolveError::EncodeFailed { .. } => FigureStatus::TokenNotFound,
        }
    }
}
