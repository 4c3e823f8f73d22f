//! The conversion client: one upload, one converted document.
//!
//! ## Request flow
//!
//! ```text
//! NamedReader
//!  │
//!  ├─ 1. URL      endpoint + ?key=…&format=…   (fails fast on a bad endpoint)
//!  ├─ 2. Body     streaming multipart/form-data (see crate::multipart)
//!  ├─ 3. POST     through the shared reqwest::Client, no retries
//!  └─ 4. Status   200 → ConvertedDocument, anything else → HttpError
//! ```
//!
//! Every error goes straight back to the caller. The client logs at `debug`
//! level only and never reports failures itself.

use crate::config::{redact, ClientConfig};
use crate::document::ConvertedDocument;
use crate::error::{HttpError, PdfTablesError, MAX_ERROR_BODY};
use crate::format::Format;
use crate::input::{NamedInput, NamedReader};
use crate::multipart::MultipartBody;
use hyper::ext::ReasonPhrase;
use once_cell::sync::Lazy;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Client for the PDFTables conversion API.
///
/// Cheap to clone: clones share the underlying connection pool. The
/// configuration is fixed at construction, and concurrent calls do not
/// share any per-request state.
///
/// # Example
/// ```rust,no_run
/// use pdftables_api::{Client, ClientConfig, Format};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ClientConfig::builder().api_key("my-key").build()?;
///     let client = Client::new(config)?;
///     let doc = client.convert_file("statement.pdf", Format::Csv).await?;
///     doc.save("statement.csv").await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    http: reqwest::Client,
}

impl Client {
    /// Build a client with its own transport, honouring `timeout_secs`.
    pub fn new(config: ClientConfig) -> Result<Self, PdfTablesError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;
        Ok(Self { config, http })
    }

    /// Build a client on top of an existing transport.
    ///
    /// `timeout_secs` is ignored; configure the transport instead.
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    /// Build a client from `PDFTABLES_ENDPOINT` and `PDFTABLES_API_KEY`.
    pub fn from_env() -> Result<Self, PdfTablesError> {
        Self::new(ClientConfig::from_env())
    }

    /// Target URL for a conversion into `format`.
    ///
    /// Any `key` or `format` parameters already present on the endpoint are
    /// replaced; other parameters are kept in order.
    pub fn url(&self, format: &Format) -> Result<Url, PdfTablesError> {
        let endpoint = self.config.endpoint();
        let mut url = Url::parse(endpoint).map_err(|source| PdfTablesError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            source,
        })?;

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "key" && k != "format")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair("key", &self.config.api_key)
            .append_pair("format", format.as_str());

        Ok(url)
    }

    /// Upload `input` and return the document converted into `format`.
    ///
    /// # Errors
    /// - [`PdfTablesError::InvalidEndpoint`] before any network activity
    /// - [`PdfTablesError::Transport`] when the request cannot be completed,
    ///   including a read failure on `input` while uploading
    /// - [`PdfTablesError::Http`] when the service answers with a non-200 status
    pub async fn convert<R: NamedReader>(
        &self,
        input: R,
        format: impl Into<Format>,
    ) -> Result<ConvertedDocument, PdfTablesError> {
        let format = format.into();
        let url = self.url(&format)?;
        debug!(
            "POST {} (format={}, key={}, file={})",
            url.path(),
            format,
            redact(&self.config.api_key),
            input.name()
        );

        let body = MultipartBody::new(input);
        let content_type = body.content_type();

        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(body.into_body())
            .send()
            .await?;

        classify(response).await
    }

    /// Open the file at `path` and convert it.
    pub async fn convert_file(
        &self,
        path: impl AsRef<Path>,
        format: impl Into<Format>,
    ) -> Result<ConvertedDocument, PdfTablesError> {
        let input = NamedInput::open(path).await?;
        self.convert(input, format).await
    }
}

/// Turn a response into the document or an [`HttpError`].
async fn classify(mut response: reqwest::Response) -> Result<ConvertedDocument, PdfTablesError> {
    let status = response.status();
    debug!("Response status: {}", status);
    if status == StatusCode::OK {
        return Ok(ConvertedDocument::new(response));
    }

    let reason = reason_phrase(&response);
    let snippet = read_snippet(&mut response).await;
    drop(response);
    let err = HttpError::new(status, &snippet);
    Err(match reason {
        Some(text) => err.with_status_text(text),
        None => err,
    }
    .into())
}

/// Reason phrase from the status line when it differs from the canonical one.
///
/// hyper only records the phrase in the response extensions when it is
/// non-standard, so `None` means the canonical phrase applies.
fn reason_phrase(response: &reqwest::Response) -> Option<String> {
    let phrase = response.extensions().get::<ReasonPhrase>()?;
    std::str::from_utf8(phrase.as_bytes()).ok().map(str::to_string)
}

/// Read at most [`MAX_ERROR_BODY`] bytes of the body.
///
/// A body that fails mid-read yields whatever arrived before the failure;
/// the status code is the error that matters here.
async fn read_snippet(response: &mut reqwest::Response) -> Vec<u8> {
    let mut snippet = Vec::new();
    while snippet.len() < MAX_ERROR_BODY {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let take = chunk.len().min(MAX_ERROR_BODY - snippet.len());
                snippet.extend_from_slice(&chunk[..take]);
            }
            Ok(None) => break,
            Err(e) => {
                debug!("Error body read failed: {}", e);
                break;
            }
        }
    }
    snippet
}

// ── Default client ───────────────────────────────────────────────────────

static DEFAULT_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::with_http_client(ClientConfig::from_env(), reqwest::Client::new())
});

/// Process-wide client configured from the environment on first use.
pub fn default_client() -> &'static Client {
    &DEFAULT_CLIENT
}

/// Convert `input` with the [`default_client`].
pub async fn convert<R: NamedReader>(
    input: R,
    format: impl Into<Format>,
) -> Result<ConvertedDocument, PdfTablesError> {
    default_client().convert(input, format).await
}

/// Convert the file at `path` with the [`default_client`].
pub async fn convert_file(
    path: impl AsRef<Path>,
    format: impl Into<Format>,
) -> Result<ConvertedDocument, PdfTablesError> {
    default_client().convert_file(path, format).await
}
