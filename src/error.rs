//! Error types for the pdftables-api library.
//!
//! Every fallible operation returns [`PdfTablesError`]. The variants map onto
//! the four ways a conversion can fail:
//!
//! * **Configuration**: the endpoint string is malformed. Detected before any
//!   network activity.
//! * **Input**: the PDF could not be opened or read.
//! * **Transport**: the request never completed (DNS, refused connection,
//!   TLS, timeout, or a failure while streaming the upload body).
//! * **Protocol**: the service answered with something other than `200 OK`.
//!   The response is captured in an [`HttpError`] so callers can tell "the
//!   service rejected the request" apart from "the request never got there".

use bytes::Bytes;
use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Maximum number of response-body bytes kept in an [`HttpError`].
pub const MAX_ERROR_BODY: usize = 1024;

/// All errors returned by the pdftables-api library.
#[derive(Debug, Error)]
pub enum PdfTablesError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input file exists but could not be opened.
    #[error("Failed to open '{path}': {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// The configured endpoint is not a valid URL.
    #[error("Invalid endpoint '{endpoint}': {source}\nCheck PDFTABLES_ENDPOINT or --endpoint.")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Transport errors ──────────────────────────────────────────────────
    /// The HTTP request could not be completed.
    #[error("Request to PDFTables failed: {0}")]
    Transport(#[from] reqwest::Error),

    // ── Protocol errors ───────────────────────────────────────────────────
    /// The service answered with a non-200 status.
    #[error(transparent)]
    Http(#[from] HttpError),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the converted document to a caller-supplied sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PdfTablesError {
    /// `true` when the service was reached and rejected the request.
    pub fn is_http(&self) -> bool {
        matches!(self, PdfTablesError::Http(_))
    }

    /// The structured HTTP error, if this is one.
    pub fn http_error(&self) -> Option<&HttpError> {
        match self {
            PdfTablesError::Http(e) => Some(e),
            _ => None,
        }
    }
}

/// A non-200 response from the conversion service.
///
/// `body` holds at most [`MAX_ERROR_BODY`] raw bytes of the response. The
/// bytes are kept as received; [`HttpError::body_text`] decodes them lossily
/// for display. Meant for diagnostics, not for parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct HttpError {
    /// Numeric status code, e.g. `401`.
    pub status: u16,
    /// Reason phrase sent by the server, or the canonical one for the code
    /// when the server sent the standard phrase. Empty for unknown codes.
    pub status_text: String,
    /// Leading part of the response body.
    pub body: Bytes,
}

impl HttpError {
    /// Build an error from a status and the raw snippet bytes, using the
    /// canonical reason phrase.
    ///
    /// Bytes past [`MAX_ERROR_BODY`] are discarded.
    pub fn new(status: reqwest::StatusCode, snippet: &[u8]) -> Self {
        let end = snippet.len().min(MAX_ERROR_BODY);
        Self {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body: Bytes::copy_from_slice(&snippet[..end]),
        }
    }

    /// Replace the reason phrase with the one the server actually sent.
    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = text.into();
        self
    }

    /// The body snippet as text; invalid UTF-8 becomes `U+FFFD`.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Non-200 response: {} {}: {:?}",
            self.status,
            self.status_text,
            self.body_text()
        )
    }
}
