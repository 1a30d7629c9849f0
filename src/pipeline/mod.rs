//! Pipeline stages for turning disclosure documents into case records.
//!
//! Each submodule implements one step, testable on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ lines ──▶ extract ──▶ keys::sort ──▶ resolve
//! (files)   (docx)    (rules)                    ├─ figure  (file + token)
//!                                                ├─ render  (pdfium page search)
//!                                                └─ encode  (PNG)
//! ```
//!
//! 1. [`input`]   — read document and PDF files into memory
//! 2. [`lines`]   — DOCX / plain text → trimmed, non-empty lines
//! 3. [`rules`]   — ordered classification table for a single line
//! 4. [`extract`] — the state machine that partitions lines into records
//! 5. [`keys`]    — case number and `(company, date)` sort keys
//! 6. [`figure`]  — candidate PDFs, file selection, figure token
//! 7. [`render`]  — first page containing the token, rasterised via pdfium
//! 8. [`encode`]  — PNG encoding and data URIs
//! 9. [`resolve`] — steps 6–8 for one record

pub mod encode;
pub mod extract;
pub mod figure;
pub mod input;
pub mod keys;
pub mod lines;
pub mod render;
pub mod resolve;
pub mod rules;
