//! CLI binary for patdeck.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig`, runs one batch and writes the results.

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use patdeck::{
    diagnostics, figure_file_name, render_deck, run_batch, Batch, BatchOutput,
    BatchProgressCallback, DeckOptions, DiagnosticRow, ExtractionConfig, FigureStatus, ImageMode,
    PageSource, PatdeckError, PdfiumPages, ProgressCallback,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: a spinner while documents are parsed, then a bar over
/// the figure lookups.
struct CliProgressCallback {
    bar: ProgressBar,
    misses: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Reading");
        bar.set_message("documents…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            misses: AtomicUsize::new(0),
        })
    }

    /// Switch to the full bar once the number of cases is known.
    fn activate_bar(&self, total: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} cases  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Figures");
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Reading {total_documents} documents…"))
        ));
    }

    fn on_document_parsed(&self, name: &str, cases: usize) {
        self.bar.println(format!(
            "  {} {:<40} {}",
            green("✓"),
            name,
            dim(&format!("{cases} cases"))
        ));
    }

    fn on_document_failed(&self, name: &str, error: &str) {
        self.bar
            .println(format!("  {} {:<40} {}", red("✗"), name, red(error)));
    }

    fn on_figure_start(&self, index: usize, total: usize) {
        if index == 1 {
            self.activate_bar(total);
        }
        self.bar.set_message(format!("case {index}"));
    }

    fn on_figure_resolved(&self, _index: usize, _total: usize, status: FigureStatus) {
        if status != FigureStatus::Success {
            self.misses.fetch_add(1, Ordering::SeqCst);
        }
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, cases: usize, with_image: usize) {
        self.bar.finish_and_clear();
        let misses = self.misses.load(Ordering::SeqCst);
        let mark = if cases > 0 && with_image == 0 && misses > 0 {
            red("✘")
        } else if misses > 0 {
            cyan("⚠")
        } else {
            green("✔")
        };
        eprintln!(
            "{} {} cases, {} with figure",
            mark,
            bold(&cases.to_string()),
            bold(&with_image.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Outline to stdout, figures looked up in two PDFs
  patdeck disclosures.docx --pdf US20230012345A1.pdf --pdf TW202301234A.pdf

  # Write deck.md, report.json and figures/*.png into out/
  patdeck a.docx b.docx --pdf pdfs/*.pdf -o out/

  # Records only, no pdfium needed
  patdeck --no-figures --json disclosures.docx > cases.json

FILE MATCHING:
  A case matches the first PDF whose file stem, reduced to upper-case
  letters and digits, contains the case number reduced the same way.
  Case numbers of four characters or fewer never match.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory)
  RUST_LOG          Overrides the log filter (e.g. patdeck=debug)
"#;

/// Extract patent cases from disclosure documents and locate their figures.
#[derive(Parser, Debug)]
#[command(
    name = "patdeck",
    version,
    about = "Extract patent cases from disclosure documents and locate their figures",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Disclosure documents (DOCX or UTF-8 text).
    #[arg(required = true)]
    documents: Vec<PathBuf>,

    /// Candidate patent PDF (repeatable).
    #[arg(long = "pdf", value_name = "FILE")]
    pdfs: Vec<PathBuf>,

    /// Write deck.md, report.json and figures/ into this directory.
    #[arg(short, long, env = "PATDECK_OUTPUT", value_name = "DIR")]
    output: Option<PathBuf>,

    /// Print the batch output as JSON instead of the Markdown outline.
    #[arg(long, env = "PATDECK_JSON")]
    json: bool,

    /// Keep document order instead of sorting by company and date.
    #[arg(long, env = "PATDECK_NO_SORT")]
    no_sort: bool,

    /// Skip figure lookup (pdfium is not loaded).
    #[arg(long, env = "PATDECK_NO_FIGURES")]
    no_figures: bool,

    /// Rasterisation scale factor (0.5–8.0).
    #[arg(long, env = "PATDECK_SCALE", default_value_t = 2.0)]
    scale: f32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PATDECK_PASSWORD")]
    password: Option<String>,

    /// Leave claim slides out of the outline.
    #[arg(long, env = "PATDECK_NO_CLAIMS")]
    no_claims: bool,

    /// Disable progress bar.
    #[arg(long, env = "PATDECK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PATDECK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PATDECK_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Load inputs ──────────────────────────────────────────────────────
    let mut batch = Batch::new();
    for path in &cli.documents {
        batch
            .add_document_file(path)
            .with_context(|| format!("Failed to read document {}", path.display()))?;
    }
    for path in &cli.pdfs {
        let key = batch
            .add_pdf_file(path)
            .with_context(|| format!("Failed to read PDF {}", path.display()))?;
        if key.is_none() && !cli.quiet {
            eprintln!(
                "{} {} has no letters or digits in its name; it can never match a case",
                cyan("⚠"),
                path.display()
            );
        }
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    let pages = if config.resolve_figures {
        Some(PdfiumPages::bind(config.password.clone()).context("Cannot load the PDF engine")?)
    } else {
        None
    };

    // ── Run ──────────────────────────────────────────────────────────────
    let output = run_batch(
        &batch,
        &config,
        pages.as_ref().map(|p| p as &dyn PageSource),
    )
    .context("Extraction failed")?;

    if let Some(ref dir) = cli.output {
        write_output_dir(dir, &output, &cli)?;
        if !cli.quiet {
            eprintln!(
                "{}  {} cases  {}ms  →  {}",
                green("✔"),
                output.stats.cases,
                output.stats.total_duration_ms,
                bold(&dir.display().to_string()),
            );
        }
    } else if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        let options = DeckOptions {
            include_claims: !cli.no_claims,
            ..Default::default()
        };
        let markdown = render_deck(&output.records, &options);
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(markdown.as_bytes())
            .context("Failed to write to stdout")?;
    }

    if !cli.quiet && !cli.json {
        print_diagnostics(&diagnostics(&output.records));
        for failure in &output.failures {
            eprintln!("  {} {}: {}", red("✗"), failure.name, failure.error);
        }
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .render_scale(cli.scale)
        .sort_records(!cli.no_sort)
        .resolve_figures(!cli.no_figures);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Write `deck.md`, `report.json` and one PNG per resolved figure.
fn write_output_dir(dir: &Path, output: &BatchOutput, cli: &Cli) -> Result<()> {
    let figures_dir = dir.join("figures");
    std::fs::create_dir_all(&figures_dir).map_err(|source| PatdeckError::OutputWriteFailed {
        path: figures_dir.clone(),
        source,
    })?;

    for (i, record) in output.records.iter().enumerate() {
        if let Some(ref png) = record.image_data {
            write_file(&figures_dir.join(figure_file_name(i + 1)), png)?;
        }
    }

    let options = DeckOptions {
        include_claims: !cli.no_claims,
        images: ImageMode::Linked("figures".to_string()),
        ..Default::default()
    };
    write_file(
        &dir.join("deck.md"),
        render_deck(&output.records, &options).as_bytes(),
    )?;

    let report = serde_json::to_vec_pretty(output).context("Failed to serialise report")?;
    write_file(&dir.join("report.json"), &report)?;
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes)
        .map_err(|source| PatdeckError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        })
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn status_cell(status: Option<FigureStatus>) -> Cell {
    match status {
        Some(FigureStatus::Success) => Cell::new("success").fg(Color::Green),
        Some(other) => Cell::new(other.to_string()).fg(Color::Red),
        None => Cell::new("-").fg(Color::DarkGrey),
    }
}

/// Per-case diagnostic table on stderr.
fn print_diagnostics(rows: &[DiagnosticRow]) {
    if rows.is_empty() {
        return;
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        header_cell("#"),
        header_cell("Case"),
        header_cell("Company"),
        header_cell("Date"),
        header_cell("Figure"),
        header_cell("Reason"),
        header_cell("Missing"),
    ]);

    for row in rows {
        let missing = row
            .missing_fields
            .iter()
            .map(|f| f.label())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(row.index),
            Cell::new(&row.case_no),
            Cell::new(&row.company),
            Cell::new(&row.date),
            status_cell(row.status),
            Cell::new(&row.reason).fg(Color::DarkGrey),
            Cell::new(missing).fg(Color::Yellow),
        ]);
    }
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    eprintln!("{table}");
}
