//! # pdftables-api
//!
//! Convert PDF documents to CSV, XML or Excel through the
//! [PDFTables](https://pdftables.com) web API.
//!
//! Table extraction happens on the service. This crate uploads the PDF as a
//! `multipart/form-data` POST and hands the converted bytes back as a stream,
//! so neither the upload nor the result has to fit in memory.
//!
//! ## Request Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    any NamedReader: file, buffer, network stream
//!  ├─ 2. Body     multipart framing produced by a background task
//!  ├─ 3. POST     https://pdftables.com/api?key=…&format=…
//!  └─ 4. Output   200 → ConvertedDocument (streamed), else HttpError
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdftables_api::{Client, Format};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Endpoint and key from PDFTABLES_ENDPOINT / PDFTABLES_API_KEY
//!     let client = Client::from_env()?;
//!     let doc = client.convert_file("report.pdf", Format::XlsxSingle).await?;
//!     let bytes = doc.save("report.xlsx").await?;
//!     eprintln!("wrote {bytes} bytes");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdftables` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdftables-api = { version = "0.1", default-features = false }
//! ```
//!
//! ## Formats
//!
//! | Format | Wire value | Output |
//! |--------|------------|--------|
//! | [`Format::Csv`] | `csv` | Comma Separated Values (default) |
//! | [`Format::Xml`] | `xml` | XML using HTML tables |
//! | [`Format::XlsxSingle`] | `xlsx-single` | One Excel sheet (alias `xlsx`) |
//! | [`Format::XlsxMultiple`] | `xlsx-multiple` | One Excel sheet per page |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod input;
pub mod multipart;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{convert, convert_file, default_client, Client};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_ENDPOINT};
pub use document::ConvertedDocument;
pub use error::{HttpError, PdfTablesError, MAX_ERROR_BODY};
pub use format::Format;
pub use input::{NamedInput, NamedReader};
pub use multipart::MultipartBody;
