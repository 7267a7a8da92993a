//! Client behavior against a local stub server.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use zarc_api::{ApiClient, ApiConfig, ApiError, SignInRequest, SignUpRequest};

const USER: &str = r#"{"id":7,"email":"ana@zarc.dev","username":"ana","created_at":"2024-10-14T09:30:00"}"#;

/// Serve one canned response and hand back the raw request.
async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        request
    });
    (base, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&raw).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if raw.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&raw).to_string()
}

fn client(base: &str, dir: &tempfile::TempDir) -> ApiClient {
    ApiClient::new(ApiConfig::new(base, dir.path().join("token"))).unwrap()
}

#[tokio::test]
async fn signin_persists_token_and_later_calls_send_it() {
    let dir = tempfile::tempdir().unwrap();

    let body = format!(r#"{{"access_token":"tok-123","token_type":"bearer","user":{USER}}}"#);
    let (base, server) = serve_once("200 OK", body).await;
    let api = client(&base, &dir);
    let response = api
        .signin(&SignInRequest::new("ana@zarc.dev", "Secret123"))
        .await
        .unwrap();
    assert_eq!(response.user.username, "ana");
    assert_eq!(api.tokens().load().unwrap().as_deref(), Some("tok-123"));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/auth/signin HTTP/1.1"));
    assert!(request.to_lowercase().contains("content-type: application/json"));
    assert!(!request.to_lowercase().contains("authorization:"));
    assert!(request.contains(r#""email":"ana@zarc.dev""#));

    let (base, server) = serve_once("200 OK", r#"{"ok":true}"#.to_string()).await;
    let api = client(&base, &dir);
    let value: serde_json::Value = api.get_json("/api/reports").await.unwrap();
    assert_eq!(value["ok"], true);
    let request = server.await.unwrap();
    assert!(request.to_lowercase().contains("authorization: bearer tok-123"));
}

#[tokio::test]
async fn rejected_signin_surfaces_detail() {
    let dir = tempfile::tempdir().unwrap();
    let (base, server) =
        serve_once("401 Unauthorized", r#"{"detail":"Invalid credentials"}"#.to_string()).await;
    let api = client(&base, &dir);

    let err = api
        .signin(&SignInRequest::new("ana", "wrong"))
        .await
        .unwrap_err();
    match err {
        ApiError::Status { status, detail } => {
            assert_eq!(status, 401);
            assert_eq!(detail, "Invalid credentials");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(api.tokens().load().unwrap(), None);
    server.await.unwrap();
}

#[tokio::test]
async fn error_without_detail_uses_default_message() {
    let dir = tempfile::tempdir().unwrap();
    let (base, server) = serve_once("500 Internal Server Error", "{}".to_string()).await;
    let api = client(&base, &dir);

    let err = api
        .get_json::<serde_json::Value>("/api/anything")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Something went wrong (HTTP 500)");
    server.await.unwrap();
}

#[tokio::test]
async fn signup_validates_before_sending() {
    let dir = tempfile::tempdir().unwrap();
    // Nothing listens here; validation must fail first.
    let api = client("http://127.0.0.1:9", &dir);
    let err = api
        .signup(&SignUpRequest::new("ana@zarc.dev", "ana", "weak"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Invalid(_)));
}

#[tokio::test]
async fn signup_created_response() {
    let dir = tempfile::tempdir().unwrap();
    let body = format!(r#"{{"access_token":"new-tok","token_type":"bearer","user":{USER}}}"#);
    let (base, server) = serve_once("201 Created", body).await;
    let api = client(&base, &dir);

    let response = api
        .signup(&SignUpRequest::new("ana@zarc.dev", "ana", "Secret123"))
        .await
        .unwrap();
    assert_eq!(response.user.id, 7);
    assert_eq!(api.tokens().load().unwrap().as_deref(), Some("new-tok"));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/auth/signup HTTP/1.1"));
    api.signout().unwrap();
    assert_eq!(api.tokens().load().unwrap(), None);
}
