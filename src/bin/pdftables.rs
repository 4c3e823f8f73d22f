//! CLI binary for pdftables-api.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `ClientConfig`, uploads one PDF and writes the converted document.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdftables_api::{Client, ClientConfig, ConvertedDocument, Format, NamedInput};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # CSV to stdout
  pdftables statement.pdf

  # Excel workbook, one sheet per page
  pdftables --format xlsx-multiple report.pdf -o report.xlsx

  # Against a local test server
  pdftables --endpoint http://localhost:8080/api scan.pdf

FORMATS:
  csv             Comma Separated Values (default)
  xml             XML using HTML tables
  xlsx-single     Single-sheet Excel workbook (alias: xlsx)
  xlsx-multiple   Excel workbook with one sheet per page

ENVIRONMENT VARIABLES:
  PDFTABLES_API_KEY    API key (required)
  PDFTABLES_ENDPOINT   Override the service URL (default https://pdftables.com/api)
"#;

/// Convert a PDF to CSV, XML or Excel using the PDFTables API.
#[derive(Parser, Debug)]
#[command(
    name = "pdftables",
    version,
    about = "Convert a PDF to CSV, XML or Excel using the PDFTables API",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file to convert.
    input: PathBuf,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "csv")]
    format: FormatArg,

    /// Write the converted document to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// PDFTables API key.
    #[arg(long, env = "PDFTABLES_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Service URL.
    #[arg(long, env = "PDFTABLES_ENDPOINT")]
    endpoint: Option<String>,

    /// Whole-request timeout in seconds (default: none).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Disable the progress spinner.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum FormatArg {
    Csv,
    Xml,
    #[value(alias = "xlsx")]
    XlsxSingle,
    XlsxMultiple,
}

impl From<FormatArg> for Format {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Csv => Format::Csv,
            FormatArg::Xml => Format::Xml,
            FormatArg::XlsxSingle => Format::XlsxSingle,
            FormatArg::XlsxMultiple => Format::XlsxMultiple,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build client ─────────────────────────────────────────────────────
    let config = build_config(&cli)?;
    let client = Client::new(config).context("Failed to build HTTP client")?;

    let input = NamedInput::open(&cli.input)
        .await
        .with_context(|| format!("Cannot read {}", cli.input.display()))?;
    let format: Format = cli.format.clone().into();

    // ── Run conversion ───────────────────────────────────────────────────
    let spinner = (!cli.quiet && !cli.no_progress).then(|| upload_spinner(&cli.input));
    let start = Instant::now();

    let result: Result<u64> = async {
        let doc = client
            .convert(input, format.clone())
            .await
            .context("Conversion failed")?;
        if let Some(ref bar) = spinner {
            bar.set_message("Downloading…");
        }
        write_output(doc, cli.output.as_ref()).await
    }
    .await;

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    let written = result?;

    if !cli.quiet {
        let target = cli
            .output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".into());
        eprintln!(
            "{}  {}  →  {}  {}",
            green("✔"),
            format,
            bold(&target),
            dim(&format!(
                "{written} bytes in {}ms",
                start.elapsed().as_millis()
            )),
        );
    }

    Ok(())
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let api_key = match cli.api_key.as_deref() {
        Some(key) if !key.is_empty() => key,
        _ => anyhow::bail!(
            "No API key provided.\nSet PDFTABLES_API_KEY or pass --api-key <KEY>."
        ),
    };

    let mut builder = ClientConfig::builder().api_key(api_key);
    if let Some(endpoint) = cli.endpoint.as_deref().filter(|e| !e.is_empty()) {
        builder = builder.endpoint(endpoint);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.timeout_secs(secs);
    }

    builder.build().context("Invalid configuration")
}

/// Stream the document to `output` or to stdout.
async fn write_output(doc: ConvertedDocument, output: Option<&PathBuf>) -> Result<u64> {
    match output {
        Some(path) => doc
            .save(path)
            .await
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = tokio::io::stdout();
            doc.copy_to(&mut stdout)
                .await
                .context("Failed to write to stdout")
        }
    }
}

fn upload_spinner(input: &std::path::Path) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
    bar.set_style(style);
    bar.set_prefix("Converting");
    bar.set_message(format!("Uploading {}…", input.display()));
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}
