//! Figure resolution for one case: select the PDF, extract the figure
//! token, find the first page containing it, rasterise and encode it.
//!
//! Every failure is returned as a [`ResolveError`] value; nothing here
//! aborts the batch.

use crate::config::ExtractionConfig;
use crate::error::ResolveError;
use crate::output::{CaseRecord, ResolvedFigure};
use crate::pipeline::encode::encode_png;
use crate::pipeline::figure::{extract_token, page_matches, FigureCandidates};
use crate::pipeline::render::PageSource;
use tracing::debug;

/// Resolve the representative figure of `record`.
pub fn resolve_figure(
    record: &CaseRecord,
    candidates: &FigureCandidates,
    pages: &dyn PageSource,
    config: &ExtractionConfig,
) -> Result<ResolvedFigure, ResolveError> {
    if record.rep_fig_text.trim().is_empty() {
        return Err(ResolveError::NoFigureText);
    }

    let (file, pdf) = candidates.select(&record.raw_case_no)?;
    let token = extract_token(&record.rep_fig_text, config.fallback_token_chars)?;
    debug!("Searching '{}' for token {:?}", file, token);

    let matcher = |text: &str| page_matches(text, &token);
    let hit = pages
        .find_page(file, pdf, &matcher, config.render_scale)?
        .ok_or_else(|| ResolveError::TokenNotFound {
            file: file.to_string(),
            token: token.clone(),
        })?;

    let png = encode_png(&hit.image).map_err(|e| ResolveError::EncodeFailed {
        detail: e.to_string(),
    })?;

    Ok(ResolvedFigure {
        file: file.to_string(),
        token,
        page_index: hit.page_index,
        png,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::render::PageHit;
    use image::{DynamicImage, RgbaImage};
    use std::cell::Cell;

    /// Treats the PDF bytes as UTF-8 page texts separated by form feeds.
    /// Rendered pages are `(index + 1) × scale` pixels wide.
    #[derive(Default)]
    struct TextPages {
        scanned: Cell<usize>,
    }

    impl PageSource for TextPages {
        fn find_page(
            &self,
            file: &str,
            pdf: &[u8],
            matches: &dyn Fn(&str) -> bool,
            scale: f32,
        ) -> Result<Option<PageHit>, ResolveError> {
            let text = std::str::from_utf8(pdf).map_err(|e| ResolveError::PdfUnreadable {
                file: file.to_string(),
                detail: e.to_string(),
            })?;
            for (i, page) in text.split('\u{c}').enumerate() {
                self.scanned.set(self.scanned.get() + 1);
                if matches(page) {
                    let w = ((i + 1) as f32 * scale) as u32;
                    return Ok(Some(PageHit {
                        page_index: i,
                        image: DynamicImage::ImageRgba8(RgbaImage::new(w, 1)),
                    }));
                }
            }
            Ok(None)
        }
    }

    fn record(case_no: &str, fig: &str) -> CaseRecord {
        let mut r = CaseRecord::new("doc");
        r.case_info = format!("案號：{case_no}");
        r.raw_case_no = case_no.to_string();
        r.rep_fig_text = fig.to_string();
        r
    }

    fn candidates(entries: &[(&str, &str)]) -> FigureCandidates {
        let mut c = FigureCandidates::new();
        for (name, pages) in entries {
            c.insert(name, pages.as_bytes().to_vec());
        }
        c
    }

    #[test]
    fn finds_page_two() {
        let c = candidates(&[("US123A.pdf", "Cover\u{c}Sheet 1\nFIG. 1\u{c}FIG. 2")]);
        let pages = TextPages::default();
        let got = resolve_figure(
            &record("US123A", "FIG.1"),
            &c,
            &pages,
            &ExtractionConfig::default(),
        )
        .unwrap();
        assert_eq!(got.page_index, 1);
        assert_eq!(got.file, "US123A");
        assert_eq!(got.token, "FIG.1");
        let img = image::load_from_memory(&got.png).unwrap();
        assert_eq!(img.width(), 4); // page 2 at 2×
        assert_eq!(pages.scanned.get(), 2);
    }

    #[test]
    fn first_matching_page_wins() {
        let c = candidates(&[(
            "US123A.pdf",
            "FIG. 3 brief\u{c}FIG. 3 FIG. 3 FIG. 3\u{c}FIG.3",
        )]);
        let got = resolve_figure(
            &record("US123A", "圖式：FIG. 3"),
            &c,
            &TextPages::default(),
            &ExtractionConfig::default(),
        )
        .unwrap();
        assert_eq!(got.page_index, 0);
    }

    #[test]
    fn empty_figure_text_fails_before_file_lookup() {
        let c = candidates(&[]);
        let err = resolve_figure(
            &record("US123A", " "),
            &c,
            &TextPages::default(),
            &ExtractionConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, ResolveError::NoFigureText);
    }

    #[test]
    fn missing_figure_text_wins_over_missing_file() {
        let c = candidates(&[("TW999999.pdf", "FIG.1")]);
        let err = resolve_figure(
            &record("US123A", ""),
            &c,
            &TextPages::default(),
            &ExtractionConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, ResolveError::NoFigureText);
        assert_eq!(err.status(), crate::output::FigureStatus::MissingInfo);
    }

    #[test]
    fn short_case_number_never_matches() {
        let c = candidates(&[("US12.pdf", "FIG.1")]);
        let err = resolve_figure(
            &record("US12", "FIG.1"),
            &c,
            &TextPages::default(),
            &ExtractionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::NoCorrespondingFile { .. }));
    }

    #[test]
    fn token_absent_from_every_page() {
        let c = candidates(&[("US123A.pdf", "FIG.1\u{c}FIG.2")]);
        let err = resolve_figure(
            &record("US123A", "FIG.7"),
            &c,
            &TextPages::default(),
            &ExtractionConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ResolveError::TokenNotFound {
                file: "US123A".into(),
                token: "FIG.7".into()
            }
        );
    }

    #[test]
    fn unreadable_pdf_is_a_value_not_a_panic() {
        let mut c = FigureCandidates::new();
        c.insert("US123A.pdf", vec![0xff, 0xfe, 0x00]);
        let err = resolve_figure(
            &record("US123A", "FIG.1"),
            &c,
            &TextPages::default(),
            &ExtractionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::PdfUnreadable { .. }));
    }

    #[test]
    fn render_scale_is_passed_through() {
        let c = candidates(&[("US123A.pdf", "FIG.1")]);
        let config = ExtractionConfig::builder().render_scale(3.0).build().unwrap();
        let got = resolve_figure(&record("US123A", "FIG.1"), &c, &TextPages::default(), &config)
            .unwrap();
        assert_eq!(image::load_from_memory(&got.png).unwrap().width(), 3);
    }
}
