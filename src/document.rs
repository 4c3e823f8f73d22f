//! The converted document returned by a successful request.
//!
//! [`ConvertedDocument`] owns the HTTP response and hands out its body
//! sequentially. The body is never interpreted: CSV, XML and XLSX bytes are
//! passed through exactly as the service sent them. Dropping the document
//! releases the connection, whether or not the body was read to the end.

use crate::error::PdfTablesError;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Streaming body of a `200 OK` conversion response.
#[derive(Debug)]
pub struct ConvertedDocument {
    response: reqwest::Response,
}

impl ConvertedDocument {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self { response }
    }

    /// `Content-Type` reported by the service, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Next chunk of the body, or `None` at the end.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>, PdfTablesError> {
        Ok(self.response.chunk().await?)
    }

    /// Collect the whole body into memory.
    pub async fn bytes(self) -> Result<Bytes, PdfTablesError> {
        Ok(self.response.bytes().await?)
    }

    /// The body as a stream of chunks.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, PdfTablesError>> {
        self.response.bytes_stream().map_err(PdfTablesError::from)
    }

    /// Copy the body into `writer`, returning the number of bytes written.
    ///
    /// The writer is flushed but not shut down.
    pub async fn copy_to<W>(mut self, writer: &mut W) -> Result<u64, PdfTablesError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut written = 0u64;
        while let Some(chunk) = self.response.chunk().await? {
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;
        debug!("Copied {} converted bytes", written);
        Ok(written)
    }

    /// Write the body to a file at `path`, replacing any existing file.
    pub async fn save(self, path: impl AsRef<Path>) -> Result<u64, PdfTablesError> {
        let path = path.as_ref();
        let write_failed = |source| PdfTablesError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        };
        let mut file = tokio::fs::File::create(path).await.map_err(write_failed)?;
        match self.copy_to(&mut file).await {
            Err(PdfTablesError::Io(e)) => Err(write_failed(e)),
            other => other,
        }
    }
}
