//! Integration tests for pdftables-api against a local mock service.
//!
//! A `wiremock` server stands in for PDFTables so every test runs offline.
//!
//! Run with:
//!   cargo test --test convert -- --nocapture

use futures::StreamExt;
use std::time::Duration;
use pdftables_api::{
    Client, ClientConfig, Format, NamedInput, PdfTablesError, MAX_ERROR_BODY,
};
use wiremock::matchers::{header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn client_for(server: &MockServer, key: &str) -> Client {
    let config = ClientConfig::builder()
        .endpoint(format!("{}/api", server.uri()))
        .api_key(key)
        .build()
        .unwrap();
    Client::new(config).unwrap()
}

/// Boundary declared in a `multipart/form-data` content type.
fn boundary_of(content_type: &str) -> &str {
    content_type
        .split("boundary=")
        .nth(1)
        .expect("content type declares a boundary")
}

/// Extract (filename, content) of the single `file` part.
fn file_part(body: &[u8], boundary: &str) -> (String, Vec<u8>) {
    let opening = format!("--{boundary}\r\n");
    let closing = format!("\r\n--{boundary}--\r\n");
    assert!(body.starts_with(opening.as_bytes()), "body must open with the boundary");
    assert!(body.ends_with(closing.as_bytes()), "body must close with the boundary");

    let inner = &body[opening.len()..body.len() - closing.len()];
    let split = inner
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("part headers");
    let headers = String::from_utf8_lossy(&inner[..split]).into_owned();
    assert!(headers.contains("name=\"file\""), "headers: {headers}");

    let filename = headers
        .split("filename=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .expect("filename parameter")
        .to_string();
    (filename, inner[split + 4..].to_vec())
}

async fn mount(server: &MockServer, status: u16, body: impl Into<Vec<u8>>) {
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(status).set_body_bytes(body.into()))
        .mount(server)
        .await;
}

// ── Success path ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_success_returns_body_verbatim() {
    let server = MockServer::start().await;
    let csv = b"Date,Amount\n2024-01-02,12.50\n".to_vec();
    Mock::given(method("POST"))
        .and(path("/api"))
        .and(query_param("key", "test-key"))
        .and(query_param("format", "csv"))
        .and(header_regex("content-type", "^multipart/form-data; boundary=[0-9a-f]{60}$"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(csv.clone(), "text/csv"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let pdf = b"%PDF-1.4\n%binary\x00\xff\n%%EOF".to_vec();
    let input = NamedInput::from_bytes("/tmp/dir/report.pdf", pdf.clone());
    let doc = client_for(&server, "test-key")
        .convert(input, Format::Csv)
        .await
        .unwrap();
    assert_eq!(doc.content_type(), Some("text/csv"));
    assert_eq!(doc.bytes().await.unwrap().to_vec(), csv);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let content_type = requests[0]
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let (filename, content) = file_part(&requests[0].body, boundary_of(&content_type));
    assert_eq!(filename, "report.pdf");
    assert_eq!(content, pdf);
}

#[tokio::test]
async fn test_zero_byte_file_empty_response() {
    let server = MockServer::start().await;
    mount(&server, 200, Vec::new()).await;

    let input = NamedInput::from_bytes("empty.pdf", Vec::new());
    let mut doc = client_for(&server, "k").convert(input, "csv").await.unwrap();
    assert!(doc.chunk().await.unwrap().is_none());
}

#[tokio::test]
async fn test_format_values_are_forwarded() {
    let server = MockServer::start().await;
    for (format, wire) in [
        (Format::Xml, "xml"),
        (Format::XLSX, "xlsx-single"),
        (Format::XlsxMultiple, "xlsx-multiple"),
        (Format::from("not-a-format"), "not-a-format"),
    ] {
        Mock::given(method("POST"))
            .and(query_param("format", wire))
            .respond_with(ResponseTemplate::new(200).set_body_string(wire))
            .expect(1)
            .mount(&server)
            .await;

        let input = NamedInput::from_bytes("a.pdf", b"%PDF".to_vec());
        let doc = client_for(&server, "k").convert(input, format).await.unwrap();
        assert_eq!(doc.bytes().await.unwrap(), wire.as_bytes());
    }
}

#[tokio::test]
async fn test_large_upload_streams_intact() {
    let server = MockServer::start().await;
    mount(&server, 200, b"ok".to_vec()).await;

    let pdf: Vec<u8> = (0..1_000_000u32).map(|i| (i % 253) as u8).collect();
    let input = NamedInput::from_bytes("scans/big.pdf", pdf.clone());
    client_for(&server, "k").convert(input, Format::Csv).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0].headers.get("content-type").unwrap().to_str().unwrap();
    let (filename, content) = file_part(&requests[0].body, boundary_of(content_type));
    assert_eq!(filename, "big.pdf");
    assert_eq!(content.len(), pdf.len());
    assert_eq!(content, pdf);
}

#[tokio::test]
async fn test_stream_and_copy_to() {
    let server = MockServer::start().await;
    let body = vec![b'z'; 200_000];
    mount(&server, 200, body.clone()).await;
    let client = client_for(&server, "k");

    let doc = client
        .convert(NamedInput::from_bytes("a.pdf", b"%PDF".to_vec()), Format::Csv)
        .await
        .unwrap();
    let mut collected = Vec::new();
    let mut stream = Box::pin(doc.into_stream());
    while let Some(chunk) = stream.next().await {
        collected.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(collected, body);

    let doc = client
        .convert(NamedInput::from_bytes("a.pdf", b"%PDF".to_vec()), Format::Csv)
        .await
        .unwrap();
    let mut sink: Vec<u8> = Vec::new();
    let written = doc.copy_to(&mut sink).await.unwrap();
    assert_eq!(written, body.len() as u64);
    assert_eq!(sink, body);
}

#[tokio::test]
async fn test_convert_file_and_save() {
    let server = MockServer::start().await;
    mount(&server, 200, b"a,b\n1,2\n".to_vec()).await;

    let dir = tempfile::tempdir().unwrap();
    let pdf_path = dir.path().join("invoice.pdf");
    std::fs::write(&pdf_path, b"%PDF-1.7 invoice").unwrap();
    let out_path = dir.path().join("invoice.csv");

    let doc = client_for(&server, "k")
        .convert_file(&pdf_path, Format::Csv)
        .await
        .unwrap();
    let written = doc.save(&out_path).await.unwrap();
    assert_eq!(written, 8);
    assert_eq!(std::fs::read(&out_path).unwrap(), b"a,b\n1,2\n");

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0].headers.get("content-type").unwrap().to_str().unwrap();
    let (filename, content) = file_part(&requests[0].body, boundary_of(content_type));
    assert_eq!(filename, "invoice.pdf");
    assert_eq!(content, b"%PDF-1.7 invoice");
}

#[tokio::test]
async fn test_concurrent_calls_share_client() {
    let server = MockServer::start().await;
    mount(&server, 200, b"done".to_vec()).await;
    let client = client_for(&server, "k");

    let calls = (0..8).map(|i| {
        let client = client.clone();
        tokio::spawn(async move {
            let input = NamedInput::from_bytes(format!("doc{i}.pdf"), vec![i as u8; 1000]);
            client.convert(input, Format::Csv).await?.bytes().await
        })
    });
    for handle in futures::future::join_all(calls).await {
        assert_eq!(handle.unwrap().unwrap(), "done".as_bytes());
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 8);
}

// ── Error paths ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_invalid_key_returns_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(query_param("key", ""))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .mount(&server)
        .await;

    let input = NamedInput::from_bytes("a.pdf", b"%PDF".to_vec());
    let err = client_for(&server, "").convert(input, Format::Csv).await.unwrap_err();

    let http = err.http_error().expect("protocol error");
    assert_eq!(http.status, 401);
    assert_eq!(http.status_text, "Unauthorized");
    assert_eq!(http.body, "invalid key");
    assert!(err.to_string().contains("401"), "got: {err}");
}

#[tokio::test]
async fn test_error_snippet_is_capped() {
    let server = MockServer::start().await;
    let body: Vec<u8> = (0..5000u32).map(|i| b'a' + (i % 26) as u8).collect();
    mount(&server, 500, body.clone()).await;

    let input = NamedInput::from_bytes("a.pdf", b"%PDF".to_vec());
    let err = client_for(&server, "k").convert(input, Format::Csv).await.unwrap_err();

    let http = err.http_error().expect("protocol error");
    assert_eq!(http.status, 500);
    assert_eq!(http.body.len(), MAX_ERROR_BODY);
    assert_eq!(http.body, &body[..MAX_ERROR_BODY]);
}

#[tokio::test]
async fn test_error_snippet_cap_splits_multibyte_char() {
    let server = MockServer::start().await;
    let mut body = vec![b'a'; MAX_ERROR_BODY - 1];
    body.extend_from_slice("é and more text".as_bytes());
    mount(&server, 400, body.clone()).await;

    let input = NamedInput::from_bytes("a.pdf", b"%PDF".to_vec());
    let err = client_for(&server, "k").convert(input, Format::Csv).await.unwrap_err();

    let http = err.http_error().expect("protocol error");
    assert_eq!(http.body.len(), MAX_ERROR_BODY);
    assert_eq!(http.body, &body[..MAX_ERROR_BODY]);
}

#[tokio::test]
async fn test_non_utf8_error_body_is_kept_raw() {
    let server = MockServer::start().await;
    mount(&server, 500, vec![0xff, 0xfe, 0x00, 0x41]).await;

    let input = NamedInput::from_bytes("a.pdf", b"%PDF".to_vec());
    let err = client_for(&server, "k").convert(input, Format::Csv).await.unwrap_err();

    let http = err.http_error().expect("protocol error");
    assert_eq!(http.body, &[0xff, 0xfe, 0x00, 0x41][..]);
    assert_eq!(http.status_text, "Internal Server Error");
}

#[tokio::test]
async fn test_non_200_success_codes_are_errors() {
    let server = MockServer::start().await;
    mount(&server, 202, b"accepted".to_vec()).await;

    let input = NamedInput::from_bytes("a.pdf", b"%PDF".to_vec());
    let err = client_for(&server, "k").convert(input, Format::Csv).await.unwrap_err();
    assert_eq!(err.http_error().map(|h| h.status), Some(202));
}

#[tokio::test]
async fn test_malformed_endpoint_fails_before_network() {
    let config = ClientConfig::builder()
        .endpoint("http//missing-colon")
        .api_key("k")
        .build()
        .unwrap();
    let client = Client::new(config).unwrap();

    let input = NamedInput::from_bytes("a.pdf", b"%PDF".to_vec());
    let err = client.convert(input, Format::Csv).await.unwrap_err();
    assert!(matches!(err, PdfTablesError::InvalidEndpoint { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Reserve a port, then free it so nothing is listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = ClientConfig::builder()
        .endpoint(format!("http://127.0.0.1:{port}/api"))
        .api_key("k")
        .build()
        .unwrap();
    let client = Client::new(config).unwrap();

    let input = NamedInput::from_bytes("a.pdf", b"%PDF".to_vec());
    let err = client.convert(input, Format::Csv).await.unwrap_err();
    assert!(matches!(err, PdfTablesError::Transport(_)), "got: {err:?}");
    assert!(!err.is_http());
}

#[tokio::test]
async fn test_input_read_failure_aborts_upload() {
    let server = MockServer::start().await;
    mount(&server, 200, b"should not be returned".to_vec()).await;

    let reader = tokio_test::io::Builder::new()
        .read(b"%PDF-1.4 partial")
        .read_error(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "disk went away",
        ))
        .build();
    let input = NamedInput::new("broken.pdf", reader);

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        client_for(&server, "k").convert(input, Format::Csv),
    )
    .await
    .expect("upload failure must not hang");
    let err = result.unwrap_err();
    assert!(matches!(err, PdfTablesError::Transport(_)), "got: {err:?}");
    assert!(!err.is_http());
}

#[tokio::test]
async fn test_missing_input_file() {
    let server = MockServer::start().await;
    mount(&server, 200, b"never".to_vec()).await;

    let err = client_for(&server, "k")
        .convert_file("/no/such/dir/missing.pdf", Format::Csv)
        .await
        .unwrap_err();
    assert!(matches!(err, PdfTablesError::FileNotFound { .. }), "got: {err:?}");
    assert!(server.received_requests().await.unwrap().is_empty());
}
