//! HTTPクライアントの送受信テスト
//!
//! ローカルに1回だけ応答するサーバーを立て、実際に送られたリクエストを検証

use foodseg_common::{ErrorOrigin, ImagePayload};
use foodseg_dashboard::api::{submit, ApiClient, SegmentBackend};
use foodseg_dashboard::error::DashboardError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// 1リクエストだけ受けて固定レスポンスを返す
///
/// 受け取った生のリクエストを返す。
async fn serve_once(status: &str, content_type: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });
    (base, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok());
    let chunked = headers.contains("transfer-encoding: chunked");

    loop {
        let body = &buf[header_end..];
        let done = match content_length {
            Some(len) => body.len() >= len,
            None if chunked => body.ends_with(b"0\r\n\r\n"),
            None => true,
        };
        if done {
            break;
        }
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    String::from_utf8_lossy(&buf).into_owned()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn jpeg_payload() -> ImagePayload {
    ImagePayload::new("plate05.jpeg", b"\xFF\xD8\xFF fake jpeg".to_vec())
}

/// multipartに `image` と `model` が正しく入る
#[tokio::test]
async fn test_segment_sends_image_and_model_fields() {
    let body = r#"{"results":[{"label":"rice","confidence":91.5}],"image":"plate05.jpeg","resized_image":"models/plate05.jpeg","model":"yolov8n-seg"}"#;
    let (base, server) = serve_once("200 OK", "application/json", body).await;

    let client = ApiClient::new(base);
    let response = client.segment(&jpeg_payload(), "yolov8n-seg").await.unwrap();
    let request = server.await.unwrap();

    let lowered = request.to_ascii_lowercase();
    assert!(request.starts_with("POST /segment HTTP/1.1\r\n"));
    assert!(lowered.contains("content-type: multipart/form-data; boundary="));
    assert!(request.contains(r#"name="image""#));
    assert!(request.contains(r#"filename="plate05.jpeg""#));
    assert!(lowered.contains("content-type: image/jpeg"));
    assert!(request.contains(" fake jpeg\r\n"));
    assert!(request.contains("name=\"model\"\r\n\r\nyolov8n-seg\r\n"));

    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].label, "rice");
    assert_eq!(response.resized_image.as_deref(), Some("models/plate05.jpeg"));
}

/// 2xx以外は Status エラー
#[tokio::test]
async fn test_segment_non_success_status() {
    let (base, server) = serve_once("500 Internal Server Error", "text/plain", "boom").await;

    let client = ApiClient::new(base.clone());
    let err = client.segment(&jpeg_payload(), "yolov8n-seg").await.unwrap_err();
    server.await.unwrap();

    match err {
        DashboardError::Status { url, status } => {
            assert_eq!(status, 500);
            assert_eq!(url, format!("{}/segment", base));
        }
        other => panic!("expected Status, got {:?}", other),
    }
}

/// 200でもJSONでなければ Decode エラー
#[tokio::test]
async fn test_segment_html_body_is_decode_error() {
    let (base, server) = serve_once("200 OK", "text/html", "<html><body>Not JSON</body></html>").await;

    let client = ApiClient::new(base);
    let err = client.segment(&jpeg_payload(), "yolov8n-seg").await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, DashboardError::Common(foodseg_common::Error::Decode(_))));
}

/// ページ番号とページサイズがクエリに入る
#[tokio::test]
async fn test_logs_sends_page_query() {
    let body = r#"{"items":[{"id":7,"image":"soup.png","model":"yolov8n-seg","prediction":"soup","confidence":88.0,"num_detections":2,"date":"2024-05-01 12:00:00"}],"total":6}"#;
    let (base, server) = serve_once("200 OK", "application/json", body).await;

    let client = ApiClient::new(base);
    let page = client.logs(2, 5).await.unwrap();
    let request = server.await.unwrap();

    assert!(request.starts_with("GET /logs?page=2&page_size=5 HTTP/1.1\r\n"));
    assert_eq!(page.total, 6);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, 7);
    assert_eq!(page.items[0].detection_count, Some(2));
}

/// 画像取得は本文をそのまま返す
#[tokio::test]
async fn test_fetch_returns_body_bytes() {
    let (base, server) = serve_once("200 OK", "image/png", "png-bytes").await;

    let client = ApiClient::new(base.clone());
    let bytes = client.fetch(&format!("{}/uploads/soup.png", base)).await.unwrap();
    let request = server.await.unwrap();

    assert!(request.starts_with("GET /uploads/soup.png HTTP/1.1\r\n"));
    assert_eq!(bytes, b"png-bytes");
}

/// 送信失敗は発生元タグ付きの結果になる
#[tokio::test]
async fn test_submit_tags_failure_with_origin() {
    let (base, server) = serve_once("502 Bad Gateway", "text/plain", "").await;

    let client = ApiClient::new(base);
    let result = submit(&client, &jpeg_payload(), "yolov8n-seg", ErrorOrigin::Gallery).await;
    server.await.unwrap();

    assert!(!result.is_success());
    let error = result.error.unwrap();
    assert_eq!(error.origin, Some(ErrorOrigin::Gallery));
    assert!(error.to_string().ends_with(" [Gallery]"));
    assert!(error.message.contains("502"));
}
