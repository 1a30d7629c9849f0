//! Integration tests for the public batch API.
//!
//! PDFs are stood in for by an in-memory `PageSource` that reads the
//! "PDF" bytes as UTF-8 page texts separated by form feeds, so these tests
//! run without pdfium.

use image::{DynamicImage, RgbaImage};
use patdeck::{
    diagnostics, render_deck, run_batch, Batch, BatchProgressCallback, DeckOptions,
    ExtractionConfig, ExtractionSession, Field, FigureStatus, PageHit, PageSource, ResolveError,
};
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use zip::write::SimpleFileOptions;

// ── Test helpers ─────────────────────────────────────────────────────────────

struct TextPages;

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
        Ok(text
            .split('\u{c}')
            .position(|page| matches(page))
            .map(|i| PageHit {
                page_index: i,
                image: DynamicImage::ImageRgba8(RgbaImage::new((10.0 * scale) as u32, 8)),
            }))
    }
}

fn docx(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );
    let mut out = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut out);
        zip.start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    out.into_inner()
}

const FULL_CASE: &[&str] = &[
    "案號：US123A/2020.01.01",
    "解決問題：過熱",
    "發明精神：散熱片設計",
    "重點：新型散熱",
    "代表圖：FIG.1",
];

// ── Extraction ───────────────────────────────────────────────────────────────

#[test]
fn docx_case_is_extracted_complete() {
    let mut batch = Batch::new();
    batch.add_document("cases.docx", docx(FULL_CASE));
    let config = ExtractionConfig::builder()
        .resolve_figures(false)
        .build()
        .unwrap();

    let out = run_batch(&batch, &config, None).unwrap();
    assert_eq!(out.records.len(), 1);
    let r = &out.records[0];
    assert_eq!(r.source, "cases.docx");
    assert_eq!(r.raw_case_no, "US123A");
    assert_eq!(r.problem, "過熱");
    assert_eq!(r.rep_fig_text, "FIG.1");
    assert_eq!(r.sort_date, "20200101");
    assert!(r.missing_fields.is_empty());
    assert!(r.figure.is_none());
}

#[test]
fn missing_key_point_is_audited() {
    let lines: Vec<&str> = FULL_CASE
        .iter()
        .copied()
        .filter(|l| !l.starts_with("重點"))
        .collect();
    let mut batch = Batch::new();
    batch.add_lines("cases", lines);
    let config = ExtractionConfig::builder()
        .resolve_figures(false)
        .build()
        .unwrap();

    let out = run_batch(&batch, &config, None).unwrap();
    let r = &out.records[0];
    assert_eq!(r.key_point, "");
    assert_eq!(r.missing_fields, vec![Field::KeyPoint]);
    assert_eq!(r.missing_fields[0].label(), "一句重點");
    assert_eq!(diagnostics(&out.records)[0].missing_fields, vec![Field::KeyPoint]);
}

// ── Figure resolution ────────────────────────────────────────────────────────

#[test]
fn figure_is_found_on_second_page() {
    let mut batch = Batch::new();
    batch.add_lines("cases", FULL_CASE.iter().copied());
    batch.add_pdf("US123A.pdf", "Abstract\u{c}Sheet 1/3\nFIG. 1\u{c}FIG. 2".into());

    let out = run_batch(&batch, &ExtractionConfig::default(), Some(&TextPages)).unwrap();
    let r = &out.records[0];
    let report = r.figure.as_ref().unwrap();
    assert_eq!(report.status, FigureStatus::Success);
    assert_eq!(report.page_index, Some(1));
    assert_eq!(report.file.as_deref(), Some("US123A"));
    let png = r.image_data.as_ref().unwrap();
    assert_eq!(image::load_from_memory(png).unwrap().width(), 20);
    assert_eq!(out.stats.cases_with_image, 1);
}

#[test]
fn each_case_reports_its_own_status() {
    let mut batch = Batch::new();
    batch.add_lines(
        "cases",
        [
            "案號：US111111 申請人：Acme",
            "代表圖：FIG. 2",
            "案號：US222222 申請人：Acme",
            "代表圖：FIG. 9",
            "案號：US333333 申請人：Acme",
            "代表圖：FIG. 1",
            "案號：US444444 申請人：Acme",
            "解決問題：無圖",
        ],
    );
    batch.add_pdf("US111111B2.pdf", "FIG.1\u{c}FIG.2".into());
    batch.add_pdf("US222222.pdf", "FIG.1".into());

    let out = run_batch(&batch, &ExtractionConfig::default(), Some(&TextPages)).unwrap();
    let statuses: Vec<_> = diagnostics(&out.records)
        .into_iter()
        .map(|row| (row.case_no, row.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("US111111".to_string(), Some(FigureStatus::Success)),
            ("US222222".to_string(), Some(FigureStatus::TokenNotFound)),
            ("US333333".to_string(), Some(FigureStatus::NoMatchingFile)),
            ("US444444".to_string(), Some(FigureStatus::MissingInfo)),
        ]
    );
    assert_eq!(out.stats.cases_with_image, 1);
}

#[test]
fn unreadable_pdf_only_affects_its_case() {
    let mut batch = Batch::new();
    batch.add_lines(
        "cases",
        ["案號：US111111", "代表圖：FIG.1", "案號：US222222", "代表圖：FIG.1"],
    );
    batch.add_pdf("US111111.pdf", vec![0xff, 0xfe]);
    batch.add_pdf("US222222.pdf", "FIG.1".into());

    let out = run_batch(&batch, &ExtractionConfig::default(), Some(&TextPages)).unwrap();
    let first = out.records[0].figure.as_ref().unwrap();
    assert_eq!(first.status, FigureStatus::TokenNotFound);
    assert!(first.reason.contains("US111111"));
    assert!(out.records[1].has_image());
}

// ── Batch behaviour ──────────────────────────────────────────────────────────

#[derive(Default)]
struct Counter {
    parsed: AtomicUsize,
    failed: AtomicUsize,
    resolved: AtomicUsize,
}

impl BatchProgressCallback for Counter {
    fn on_document_parsed(&self, _name: &str, _cases: usize) {
        self.parsed.fetch_add(1, Ordering::SeqCst);
    }
    fn on_document_failed(&self, _name: &str, _error: &str) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
    fn on_figure_resolved(&self, _index: usize, _total: usize, _status: FigureStatus) {
        self.resolved.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn corrupt_document_is_reported_and_skipped() {
    let counter = Arc::new(Counter::default());
    let config = ExtractionConfig::builder()
        .progress_callback(counter.clone())
        .build()
        .unwrap();

    let mut batch = Batch::new();
    batch.add_document("good.docx", docx(FULL_CASE));
    batch.add_document("broken.docx", b"PK\x03\x04not really a zip".to_vec());
    batch.add_document("notes.txt", "案號：TW999999\n代表圖：圖3".as_bytes().to_vec());

    let out = run_batch(&batch, &config, Some(&TextPages)).unwrap();
    assert_eq!(out.records.len(), 2);
    assert_eq!(out.failures.len(), 1);
    assert_eq!(out.failures[0].name, "broken.docx");
    assert_eq!(counter.parsed.load(Ordering::SeqCst), 2);
    assert_eq!(counter.failed.load(Ordering::SeqCst), 1);
    assert_eq!(counter.resolved.load(Ordering::SeqCst), 2);
}

#[test]
fn records_sort_by_company_then_date_across_documents() {
    let mut batch = Batch::new();
    batch.add_lines(
        "a",
        [
            "案號：US100001 申請人：Beta 2020.01.01",
            "解決問題：A",
            "案號：US100002 2018.05.05",
            "解決問題：B",
        ],
    );
    batch.add_lines(
        "b",
        [
            "案號：US100003 申請人：Acme 2021.03.01",
            "解決問題：C",
            "案號：US100004 申請人：Acme 2019.12.31",
            "解決問題：D",
        ],
    );
    let config = ExtractionConfig::builder()
        .resolve_figures(false)
        .build()
        .unwrap();

    let out = run_batch(&batch, &config, None).unwrap();
    assert_eq!(out.records.len(), 4);
    let order: Vec<_> = out
        .records
        .iter()
        .map(|r| (r.sort_company.as_str(), r.sort_date.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("ACME", "20191231"),
            ("ACME", "20210301"),
            ("BETA", "20200101"),
            ("ZZZ", "20180505"),
        ]
    );
}

#[test]
fn session_accumulates_rounds() {
    let mut session = ExtractionSession::new(ExtractionConfig::default());
    let mut first = Batch::new();
    first.add_lines("a", ["案號：US500001 申請人：Beta", "代表圖：FIG.1"]);
    first.add_pdf("US500001.pdf", "FIG.1".into());
    session.run(&first, Some(&TextPages)).unwrap();

    let mut second = Batch::new();
    second.add_lines("b", ["案號：US500002 申請人：Acme"]);
    session.run(&second, Some(&TextPages)).unwrap();

    let rows = session.diagnostics();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].case_no, "US500002");
    assert_eq!(rows[1].status, Some(FigureStatus::Success));

    session.reset();
    assert!(session.is_empty());
}

// ── Deck outline ─────────────────────────────────────────────────────────────

#[test]
fn deck_falls_back_to_figure_text() {
    let mut batch = Batch::new();
    batch.add_lines(
        "cases",
        [
            "案號：US700001",
            "代表圖：FIG.1",
            "獨立項：1. 一種散熱裝置",
            "案號：US700002",
            "代表圖：第3圖 剖面",
        ],
    );
    batch.add_pdf("US700001.pdf", "FIG.1".into());

    let config = ExtractionConfig::builder()
        .sort_records(false)
        .build()
        .unwrap();
    let out = run_batch(&batch, &config, Some(&TextPages)).unwrap();
    let md = render_deck(&out.records, &DeckOptions::default());

    let slides: Vec<_> = md.split("\n\n---\n\n").collect();
    assert_eq!(slides.len(), 3);
    assert!(slides[0].contains("![US700001](data:image/png;base64,"));
    assert!(slides[1].contains("1. 一種散熱裝置"));
    assert!(slides[2].contains("### 代表圖\n\n第3圖 剖面"));
}
