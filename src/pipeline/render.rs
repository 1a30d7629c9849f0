//! PDF page search and rasterisation via pdfium.
//!
//! The resolver only needs one capability from a PDF engine: walk the pages
//! in order, test each page's text, and rasterise the first page that
//! passes. [`PageSource`] captures exactly that, so the heuristics in
//! [`crate::pipeline::resolve`] can be exercised without a pdfium library.
//!
//! pdfium reads the PDF straight from the uploaded byte buffer; nothing is
//! written to disk.

use crate::error::{PatdeckError, ResolveError};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};

/// Environment variable naming a pdfium library file or the directory
/// containing it.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// The first page whose text satisfied the matcher, rasterised.
#[derive(Debug, Clone)]
pub struct PageHit {
    /// 0-based page index.
    pub page_index: usize,
    pub image: DynamicImage,
}

/// A PDF engine able to search page text and rasterise a page.
pub trait PageSource {
    /// Scan the pages of `pdf` in document order and rasterise the first one
    /// whose extracted text satisfies `matches`, at `scale` × its natural
    /// size. `Ok(None)` means no page matched.
    ///
    /// `file` names the PDF in error messages.
    fn find_page(
        &self,
        file: &str,
        pdf: &[u8],
        matches: &dyn Fn(&str) -> bool,
        scale: f32,
    ) -> Result<Option<PageHit>, ResolveError>;
}

/// [`PageSource`] backed by pdfium.
pub struct PdfiumPages {
    pdfium: Pdfium,
    password: Option<String>,
}

impl PdfiumPages {
    pub fn new(pdfium: Pdfium, password: Option<String>) -> Self {
        Self { pdfium, password }
    }

    /// Bind pdfium (see [`bind_pdfium`]) and wrap it.
    pub fn bind(password: Option<String>) -> Result<Self, PatdeckError> {
        Ok(Self::new(bind_pdfium()?, password))
    }
}

impl PageSource for PdfiumPages {
    fn find_page(
        &self,
        file: &str,
        pdf: &[u8],
        matches: &dyn Fn(&str) -> bool,
        scale: f32,
    ) -> Result<Option<PageHit>, ResolveError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(pdf, self.password.as_deref())
            .map_err(|e| ResolveError::PdfUnreadable {
                file: file.to_string(),
                detail: format!("{:?}", e),
            })?;

        let pages = document.pages();
        debug!("PDF '{}' loaded: {} pages", file, pages.len());

        for (index, page) in pages.iter().enumerate() {
            let text = page
                .text()
                .map_err(|e| ResolveError::PdfUnreadable {
                    file: file.to_string(),
                    detail: format!("text extraction failed on page {}: {:?}", index + 1, e),
                })?
                .all();

            if !matches(&text) {
                continue;
            }

            let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);
            let bitmap =
                page.render_with_config(&render_config)
                    .map_err(|e| ResolveError::RenderFailed {
                        file: file.to_string(),
                        page: index + 1,
                        detail: format!("{:?}", e),
                    })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered '{}' page {} → {}x{} px",
                file,
                index + 1,
                image.width(),
                image.height()
            );
            return Ok(Some(PageHit {
                page_index: index,
                image,
            }));
        }

        Ok(None)
    }
}

/// Bind to a pdfium library.
///
/// Resolution order: `PDFIUM_LIB_PATH` (a library file or a directory
/// holding one), then the working directory, then the system library path.
pub fn bind_pdfium() -> Result<Pdfium, PatdeckError> {
    let bindings = match std::env::var(PDFIUM_LIB_PATH_ENV) {
        Ok(path) if !path.is_empty() => {
            let path = PathBuf::from(path);
            let lib = if path.is_dir() {
                PathBuf::from(Pdfium::pdfium_platform_library_name_at_path(&path))
            } else {
                path
            };
            info!("Binding pdfium from {}", lib.display());
            Pdfium::bind_to_library(&lib)
        }
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| PatdeckError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}
