//! Line reading: turn a source document into the flat, ordered sequence of
//! lines the extractor consumes.
//!
//! A DOCX file is a ZIP archive; the body lives in `word/document.xml`.
//! Every `<w:p>` becomes one line, whether it sits in the body or inside a
//! table cell, in document order. Text runs (`<w:t>`) are concatenated,
//! `<w:tab/>` becomes a tab and `<w:br/>` a space, since a soft break inside
//! a paragraph does not start a new logical line.

use crate::error::PatdeckError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

const DOCUMENT_XML: &str = "word/document.xml";

/// ZIP local-file-header magic.
pub fn looks_like_docx(bytes: &[u8]) -> bool {
    bytes.starts_with(b"PK\x03\x04")
}

/// Read the paragraph lines of a DOCX document.
///
/// Lines are trimmed and empty paragraphs are dropped.
pub fn read_docx_lines(name: &str, bytes: &[u8]) -> Result<Vec<String>, PatdeckError> {
    let unreadable = |detail: String| PatdeckError::UnreadableDocument {
        name: name.to_string(),
        detail,
    };

    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| unreadable(format!("not a valid DOCX (ZIP) archive: {e}")))?;

    let xml = {
        let mut file = archive
            .by_name(DOCUMENT_XML)
            .map_err(|_| unreadable(format!("missing {DOCUMENT_XML}")))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| unreadable(format!("failed to read {DOCUMENT_XML}: {e}")))?;
        content
    };

    let lines = paragraphs_from_xml(&xml).map_err(unreadable)?;
    debug!("Read {} lines from DOCX '{}'", lines.len(), name);
    Ok(lines)
}

/// Split plain text into trimmed, non-empty lines.
pub fn read_text_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Walk WordprocessingML and collect one string per paragraph.
///
/// Paragraphs can nest (text boxes inside a paragraph), so open paragraphs
/// are kept on a stack; an inner paragraph is emitted when it closes.
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut in_text = false;
    let mut lines = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => open.push(String::new()),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if let Some(current) = open.last_mut() {
                    match e.local_name().as_ref() {
                        b"tab" => current.push('\t'),
                        b"br" | b"cr" => current.push(' '),
                        _ => {}
                    }
                }
            }
            Ok(Event::Text(t)) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| format!("bad text at byte {}: {e}", reader.buffer_position()))?;
                if let Some(current) = open.last_mut() {
                    current.push_str(&text);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if let Some(paragraph) = open.pop() {
                        let line = paragraph.trim();
                        if !line.is_empty() {
                            lines.push(line.to_string());
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "XML error at byte {}: {e}",
                    reader.buffer_position()
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(lines)
}
