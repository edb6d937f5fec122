//! `HttpTransport` against a one-shot HTTP responder on a local socket.

use http_transport::HttpTransport;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracking::{ApiTransport, Method, QueryParams, TrackMlConfig, TransportError};

/// Serves exactly one response and returns the raw request head it received.
async fn serve_once(content_type: &str, body: Vec<u8>) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/", listener.local_addr().unwrap());
    let content_type = content_type.to_string();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut head = Vec::new();
        let mut chunk = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&chunk[..n]);
        }

        let mut response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(&body);
        socket.write_all(&response).await.unwrap();
        socket.shutdown().await.unwrap();

        String::from_utf8_lossy(&head).into_owned()
    });

    (base_url, handle)
}

fn transport(base_url: &str) -> HttpTransport {
    HttpTransport::new(&TrackMlConfig::with_base_url(base_url)).unwrap()
}

#[tokio::test]
async fn test_post_encodes_params_in_query_string() {
    let (base_url, server) = serve_once(
        "application/json",
        br#"{"success": true, "id": 12}"#.to_vec(),
    )
    .await;

    let params = QueryParams::new()
        .with("project[name]", "my digits")
        .with("experiment[parameters]", r#"{"lr":0.1}"#);
    let response = transport(&base_url)
        .post("api/create_project", &params)
        .await
        .unwrap();

    assert!(response.success());
    assert_eq!(response.id(), Some(12));

    let head = server.await.unwrap();
    let request_line = head.lines().next().unwrap();
    assert!(request_line.starts_with("POST /api/create_project?"));
    assert!(request_line.contains("project%5Bname%5D=my+digits"));
    assert!(request_line.contains("experiment%5Bparameters%5D=%7B%22lr%22%3A0.1%7D"));
    assert!(request_line.ends_with("HTTP/1.1"));
}

#[tokio::test]
async fn test_get_uses_get_method() {
    let (base_url, server) = serve_once("application/json", br#"{"success": true}"#.to_vec()).await;

    let response = transport(&base_url)
        .request(Method::Get, "api/projects", &QueryParams::new())
        .await
        .unwrap();

    assert!(response.success());
    let head = server.await.unwrap();
    assert!(head.starts_with("GET /api/projects HTTP/1.1"));
}

#[tokio::test]
async fn test_charset_from_content_type_is_honoured() {
    // "caf\u{e9}" in ISO-8859-1: the final byte is not valid UTF-8 on its own.
    let mut body = br#"{"success": true, "name": "caf"#.to_vec();
    body.push(0xE9);
    body.extend_from_slice(br#""}"#);

    let (base_url, _server) = serve_once("application/json; charset=iso-8859-1", body).await;

    let response = transport(&base_url)
        .post("api/create_project", &QueryParams::new())
        .await
        .unwrap();

    assert_eq!(response.get("name"), Some(&serde_json::json!("caf\u{e9}")));
}

#[tokio::test]
async fn test_configured_encoding_is_the_fallback() {
    let mut body = br#"{"success": true, "name": "caf"#.to_vec();
    body.push(0xE9);
    body.extend_from_slice(br#""}"#);

    let (base_url, _server) = serve_once("application/json", body).await;
    let config = TrackMlConfig {
        base_url,
        encoding: "iso-8859-1".to_string(),
        ..TrackMlConfig::default()
    };

    let response = HttpTransport::new(&config)
        .unwrap()
        .post("api/create_project", &QueryParams::new())
        .await
        .unwrap();

    assert_eq!(response.get("name"), Some(&serde_json::json!("caf\u{e9}")));
}

#[tokio::test]
async fn test_invalid_bytes_for_charset_are_decode_error() {
    let mut body = br#"{"success": true, "name": "caf"#.to_vec();
    body.push(0xE9);
    body.extend_from_slice(br#""}"#);

    let (base_url, _server) = serve_once("application/json", body).await;

    let err = transport(&base_url)
        .post("api/create_project", &QueryParams::new())
        .await
        .unwrap_err();

    match err {
        TransportError::Decode { message, .. } => assert!(message.contains("UTF-8")),
        other => panic!("expected Decode, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let (base_url, _server) = serve_once("text/html", b"<h1>Routing Error</h1>".to_vec()).await;

    let err = transport(&base_url)
        .post("api/create_experiment", &QueryParams::new())
        .await
        .unwrap_err();

    match err {
        TransportError::Decode { url, .. } => assert!(url.ends_with("/api/create_experiment")),
        other => panic!("expected Decode, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let err = transport(&base_url)
        .post("api/create_project", &QueryParams::new())
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Request { .. }));
}
