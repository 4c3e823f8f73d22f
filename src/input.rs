//! Named inputs: a byte source plus the name it is uploaded under.
//!
//! The service only needs the file's bytes and a filename for the form part,
//! so the client accepts anything implementing [`NamedReader`] rather than a
//! concrete file type. Files, in-memory buffers and network streams all work
//! once wrapped in [`NamedInput`].

use crate::error::PdfTablesError;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};
use tracing::debug;

/// A sequential byte source with a declared name.
///
/// The name is used only for the multipart `filename`; its final path
/// segment is what the service sees.
///
/// The reader is moved into the upload task, so it must be `Send + 'static`.
pub trait NamedReader: AsyncRead + Unpin + Send + 'static {
    /// Declared name, typically the path the data was read from.
    fn name(&self) -> &str;
}

/// Wraps any async reader with a name.
///
/// # Example
/// ```rust
/// use pdftables_api::{NamedInput, NamedReader};
///
/// let input = NamedInput::from_bytes("invoices/march.pdf", b"%PDF-1.7".to_vec());
/// assert_eq!(input.name(), "invoices/march.pdf");
/// ```
#[derive(Debug)]
pub struct NamedInput<R> {
    name: String,
    reader: R,
}

impl<R> NamedInput<R> {
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            reader,
        }
    }
}

impl NamedInput<io::Cursor<Vec<u8>>> {
    /// Wrap an in-memory buffer.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(name, io::Cursor::new(bytes.into()))
    }
}

impl NamedInput<tokio::fs::File> {
    /// Open a local file for upload, named after its path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, PdfTablesError> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| open_error(path.to_path_buf(), e))?;
        debug!("Opened input: {}", path.display());
        Ok(Self::new(path.to_string_lossy(), file))
    }
}

fn open_error(path: PathBuf, e: io::Error) -> PdfTablesError {
    match e.kind() {
        io::ErrorKind::NotFound => PdfTablesError::FileNotFound { path },
        io::ErrorKind::PermissionDenied => PdfTablesError::PermissionDenied { path },
        _ => PdfTablesError::InputRead { path, source: e },
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for NamedInput<R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.reader).poll_read(cx, buf)
    }
}

impl<R: AsyncRead + Unpin + Send + 'static> NamedReader for NamedInput<R> {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Final path segment of `name`, following the usual `basename` rules.
///
/// Trailing separators are ignored, an empty name gives `"."` and a name made
/// only of separators gives `"/"`. Both `/` and `\` separate segments.
pub fn base_name(name: &str) -> &str {
    let is_sep = |c: char| c == '/' || c == '\\';
    if name.is_empty() {
        return ".";
    }
    let trimmed = name.trim_end_matches(is_sep);
    if trimmed.is_empty() {
        return "/";
    }
    match trimmed.rfind(is_sep) {
        Some(i) => &trimmed[i + 1..],
        None => trimmed,
    }
}
