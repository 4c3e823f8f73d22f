//! Streaming `multipart/form-data` request bodies.
//!
//! ## Why a producer task?
//!
//! PDFs can be hundreds of megabytes. Instead of reading the whole file into
//! memory, a spawned task writes the multipart framing and the file's bytes,
//! chunk by chunk, into a bounded channel while `reqwest` drains the other end
//! as the request body. At most [`PIPE_CAPACITY`] chunks are in flight.
//!
//! ```text
//! NamedReader ──read──▶ producer task ──mpsc──▶ ReceiverStream ──▶ reqwest::Body
//! ```
//!
//! The producer owns the only sender. It is dropped exactly once when the
//! task returns, which ends the stream. A read failure is sent as the final
//! item instead of the closing boundary, so the consumer sees an error and
//! never a silently truncated upload. If the consumer goes away, the next
//! send fails and the producer stops.

use crate::input::{base_name, NamedReader};
use bytes::Bytes;
use std::io;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

/// Form field name the service expects the PDF under.
pub const FORM_FIELD: &str = "file";

/// Size of each chunk read from the input.
pub const CHUNK_SIZE: usize = 32 * 1024;

/// Number of chunks buffered between producer and consumer.
pub const PIPE_CAPACITY: usize = 4;

const PART_CONTENT_TYPE: &str = "application/octet-stream";

/// The consumer end of the pipe: framed body bytes, or a terminal error.
pub type BodyStream = ReceiverStream<io::Result<Bytes>>;

/// A multipart body being produced in the background.
///
/// Must be created inside a Tokio runtime; the producer starts immediately.
///
/// The boundary is always random outside this crate, so callers cannot pick
/// one that collides with the file contents:
///
/// ```compile_fail
/// use pdftables_api::{MultipartBody, NamedInput};
///
/// let input = NamedInput::from_bytes("a.pdf", b"--XYZ".to_vec());
/// let _ = MultipartBody::with_boundary(input, "XYZ");
/// ```
#[derive(Debug)]
pub struct MultipartBody {
    boundary: String,
    stream: BodyStream,
    producer: JoinHandle<()>,
}

impl MultipartBody {
    /// Start framing `input` as a single `file` part with a random boundary.
    pub fn new<R: NamedReader>(input: R) -> Self {
        Self::with_boundary(input, random_boundary())
    }

    /// Start framing `input` with a caller-chosen boundary.
    ///
    /// The boundary must not occur in the input; [`MultipartBody::new`]
    /// picks one that won't in practice.
    pub(crate) fn with_boundary<R: NamedReader>(input: R, boundary: impl Into<String>) -> Self {
        let boundary = boundary.into();
        let (tx, rx) = mpsc::channel(PIPE_CAPACITY);
        let producer = tokio::spawn(produce(input, boundary.clone(), tx));
        Self {
            boundary,
            stream: ReceiverStream::new(rx),
            producer,
        }
    }

    /// The boundary declared in [`MultipartBody::content_type`].
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Hand the stream to `reqwest`. The producer keeps running detached.
    pub fn into_body(self) -> reqwest::Body {
        reqwest::Body::wrap_stream(self.stream)
    }

    /// Split into the content type, the body stream and the producer handle.
    pub fn into_parts(self) -> (String, BodyStream, JoinHandle<()>) {
        let content_type = self.content_type();
        (content_type, self.stream, self.producer)
    }
}

/// 30 random bytes as 60 lowercase hex characters.
pub fn random_boundary() -> String {
    let bytes: [u8; 30] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Header block opening the single form part.
fn part_header(boundary: &str, filename: &str) -> String {
    format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"{FORM_FIELD}\"; filename=\"{}\"\r\n\
         Content-Type: {PART_CONTENT_TYPE}\r\n\r\n",
        escape_quotes(filename)
    )
}

fn closing_delimiter(boundary: &str) -> String {
    format!("\r\n--{boundary}--\r\n")
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

enum ProduceError {
    /// The consumer dropped its end of the pipe.
    Closed,
    /// Reading the input failed.
    Read(io::Error),
}

async fn produce<R: NamedReader>(
    mut input: R,
    boundary: String,
    tx: mpsc::Sender<io::Result<Bytes>>,
) {
    match write_body(&mut input, &boundary, &tx).await {
        Ok(bytes) => debug!("Multipart body complete: {} input bytes", bytes),
        Err(ProduceError::Closed) => debug!("Multipart consumer closed early"),
        Err(ProduceError::Read(e)) => {
            debug!("Multipart input failed: {}", e);
            // Ignored if the consumer is already gone.
            let _ = tx.send(Err(e)).await;
        }
    }
}

async fn write_body<R: NamedReader>(
    input: &mut R,
    boundary: &str,
    tx: &mpsc::Sender<io::Result<Bytes>>,
) -> Result<u64, ProduceError> {
    let header = part_header(boundary, base_name(input.name()));
    send(tx, Bytes::from(header)).await?;

    let mut total = 0u64;
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match input.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ProduceError::Read(e)),
        };
        total += n as u64;
        send(tx, Bytes::copy_from_slice(&buf[..n])).await?;
    }

    send(tx, Bytes::from(closing_delimiter(boundary))).await?;
    Ok(total)
}

async fn send(tx: &mpsc::Sender<io::Result<Bytes>>, chunk: Bytes) -> Result<(), ProduceError> {
    tx.send(Ok(chunk)).await.map_err(|_| ProduceError::Closed)
}
