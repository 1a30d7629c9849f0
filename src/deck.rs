//! Markdown deck outline: one slide section per case record.
//!
//! The outline is what a slide builder consumes. Each record gets a slide
//! with its identifying block, the three summary fields and the figure;
//! claims get a slide of their own.

use crate::output::{CaseRecord, Field};
use crate::pipeline::encode::png_data_uri;
use serde::{Deserialize, Serialize};

/// How figure images appear in the outline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageMode {
    /// Inline `data:image/png;base64,…` URIs. (default)
    #[default]
    Embedded,
    /// Relative links to `<dir>/<NNN>.png`, written separately by the caller.
    Linked(String),
    /// No images; the raw figure text is shown instead.
    Omit,
}

/// Options for [`render_deck`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckOptions {
    /// Optional `# title` line at the top of the outline.
    pub title: Option<String>,
    /// Emit a claim slide for records with claim text. Default: true.
    pub include_claims: bool,
    pub images: ImageMode,
    /// Line placed between slides. Default: `---`.
    pub separator: String,
}

impl Default for DeckOptions {
    fn default() -> Self {
        Self {
            title: None,
            include_claims: true,
            images: ImageMode::Embedded,
            separator: "---".to_string(),
        }
    }
}

/// File name used for the figure of the `index`-th record (1-based).
pub fn figure_file_name(index: usize) -> String {
    format!("{index:03}.png")
}

/// Assemble the outline for `records`, in the given order.
pub fn render_deck(records: &[CaseRecord], options: &DeckOptions) -> String {
    let mut slides: Vec<String> = Vec::new();

    for (i, record) in records.iter().enumerate() {
        let index = i + 1;
        slides.push(case_slide(index, record, options));
        if options.include_claims && !record.claim_text.is_empty() {
            slides.push(claim_slide(index, record));
        }
    }

    let separator = format!("\n\n{}\n\n", options.separator);
    let body = slides.join(&separator);

    match &options.title {
        Some(title) => format!("# {title}\n\n{body}\n"),
        None if body.is_empty() => String::new(),
        None => format!("{body}\n"),
    }
}

fn case_slide(index: usize, record: &CaseRecord, options: &DeckOptions) -> String {
    let mut out = format!("## {}. {}\n", index, record.title());

    if !record.case_info.is_empty() {
        out.push('\n');
        out.push_str(&quote_block(&record.case_info));
        out.push('\n');
    }

    for field in Field::AUDITED {
        let text = record.field(field);
        if text.is_empty() {
            continue;
        }
        out.push_str(&format!("\n### {}\n\n{}\n", field.label(), text));
    }

    if let Some(figure) = figure_markdown(index, record, options) {
        out.push_str(&format!("\n### {}\n\n{}\n", Field::RepFig.label(), figure));
    }

    out.trim_end().to_string()
}

fn claim_slide(index: usize, record: &CaseRecord) -> String {
    format!(
        "## {}. {} · {}\n\n{}",
        index,
        record.title(),
        Field::Claim.label(),
        record.claim_text
    )
}

/// The figure as an image when one was resolved, else the raw text.
fn figure_markdown(index: usize, record: &CaseRecord, options: &DeckOptions) -> Option<String> {
    let alt = record.title();
    match (&record.image_data, &options.images) {
        (Some(png), ImageMode::Embedded) => Some(format!("![{}]({})", alt, png_data_uri(png))),
        (Some(_), ImageMode::Linked(dir)) => {
            let dir = dir.trim_end_matches('/');
            Some(format!("![{}]({}/{})", alt, dir, figure_file_name(index)))
        }
        _ if record.rep_fig_text.is_empty() => None,
        _ => Some(record.rep_fig_text.clone()),
    }
}

fn quote_block(text: &str) -> String {
    text.lines()
        .map(|l| format!("> {l}"))
        .collect::<Vec<_>>()
        .join("\n")
}
