use super::*;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct CapturedRequest {
    request_line: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body should be JSON")
    }
}

type Captured = Arc<Mutex<Vec<CapturedRequest>>>;

/// Serves one canned response per entry in `responses`, in order, and
/// records every request it sees.
async fn spawn_server(responses: Vec<(u16, &'static str)>) -> (String, Captured) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let captured_for_server = Arc::clone(&captured);

    tokio::spawn(async move {
        for (status, body) in responses {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let Ok(request) = read_http_request(&mut stream).await else {
                return;
            };
            captured_for_server.lock().await.push(request);
            let reason = match status {
                200 => "OK",
                401 => "Unauthorized",
                500 => "Internal Server Error",
                _ => "Status",
            };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    (format!("http://{addr}/api"), captured)
}

async fn read_http_request(stream: &mut TcpStream) -> Result<CapturedRequest, String> {
    let mut buffer = Vec::new();
    let mut header_end = None;
    while header_end.is_none() {
        let mut chunk = [0_u8; 1024];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP headers".to_string());
        }
        buffer.extend_from_slice(&chunk[..read]);
        header_end = buffer
            .windows(4)
            .position(|window| window == b"\r\n\r\n")
            .map(|index| index + 4);
    }

    let header_end = header_end.expect("header end should exist");
    let header_text = std::str::from_utf8(&buffer[..header_end]).map_err(|err| err.to_string())?;
    let mut lines = header_text.split("\r\n").filter(|line| !line.is_empty());
    let request_line = lines
        .next()
        .ok_or_else(|| "Missing HTTP request line".to_string())?
        .to_string();

    let mut headers = Vec::new();
    let mut content_length = 0_usize;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse::<usize>().map_err(|err| err.to_string())?;
        }
        headers.push((name.to_string(), value));
    }

    let mut body = buffer[header_end..].to_vec();
    while body.len() < content_length {
        let mut chunk = vec![0_u8; content_length - body.len()];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..read]);
    }

    Ok(CapturedRequest {
        request_line,
        headers,
        body,
    })
}

#[tokio::test]
async fn login_posts_credentials_and_returns_token() {
    let (base_url, captured) = spawn_server(vec![(200, r#"{"token":"abc.def"}"#)]).await;
    let client = ApiClient::new(&base_url).expect("client");

    let response = client
        .login("ada@example.com", "hunter2")
        .await
        .expect("login should decode");
    assert_eq!(response.issued_token(), Some("abc.def"));

    let requests = captured.lock().await;
    assert_eq!(requests.len(), 1);
    assert!(requests[0].request_line.starts_with("POST /api/login "));
    assert_eq!(requests[0].header("authorization"), None);
    assert_eq!(
        requests[0].json(),
        serde_json::json!({"email": "ada@example.com", "password": "hunter2"})
    );
}

#[tokio::test]
async fn login_rejection_is_decoded_not_raised() {
    let (base_url, _captured) =
        spawn_server(vec![(401, r#"{"message":"Wrong email or password"}"#)]).await;
    let client = ApiClient::new(&base_url).expect("client");

    let response = client
        .login("ada@example.com", "nope")
        .await
        .expect("a 401 login still carries a JSON body");
    assert_eq!(response.issued_token(), None);
    assert_eq!(response.message.as_deref(), Some("Wrong email or password"));
}

#[tokio::test]
async fn empty_token_counts_as_not_issued() {
    let (base_url, _captured) = spawn_server(vec![(200, r#"{"token":""}"#)]).await;
    let client = ApiClient::new(&base_url).expect("client");
    let response = client.login("a@b.c", "pw").await.expect("decode");
    assert_eq!(response.issued_token(), None);
}

#[tokio::test]
async fn register_reports_duplicate_email() {
    let (base_url, captured) = spawn_server(vec![(
        200,
        r#"{"success":false,"message":"Email already registered"}"#,
    )])
    .await;
    let client = ApiClient::new(&base_url).expect("client");

    let response = client
        .register("ada@example.com", "pw")
        .await
        .expect("register should decode");
    assert!(!response.success);
    assert_eq!(response.message.as_deref(), Some("Email already registered"));

    let requests = captured.lock().await;
    assert!(requests[0].request_line.starts_with("POST /api/register "));
}

#[tokio::test]
async fn chat_sends_bearer_token_and_null_conversation() {
    let (base_url, captured) =
        spawn_server(vec![(200, r#"{"reply":"Hello!","conversation_id":7}"#)]).await;
    let client = ApiClient::new(&format!("{base_url}/")).expect("client");

    let response = client
        .send_message("tok", "Hi there", None)
        .await
        .expect("chat should succeed");
    assert_eq!(response.reply, "Hello!");
    assert_eq!(response.conversation_id, Some(ConversationId::Number(7)));

    let requests = captured.lock().await;
    assert!(requests[0].request_line.starts_with("POST /api/chat "));
    assert_eq!(requests[0].header("authorization"), Some("Bearer tok"));
    assert_eq!(
        requests[0].json(),
        serde_json::json!({"message": "Hi there", "conversation_id": null})
    );
}

#[tokio::test]
async fn chat_forwards_existing_conversation_id() {
    let (base_url, captured) =
        spawn_server(vec![(200, r#"{"reply":"ok","conversation_id":"c-1"}"#)]).await;
    let client = ApiClient::new(&base_url).expect("client");
    let id = ConversationId::Text("c-1".to_string());

    client
        .send_message("tok", "again", Some(&id))
        .await
        .expect("chat should succeed");

    let requests = captured.lock().await;
    assert_eq!(requests[0].json()["conversation_id"], "c-1");
}

#[tokio::test]
async fn chat_unauthorized_maps_to_unauthorized_error() {
    let (base_url, _captured) =
        spawn_server(vec![(401, r#"{"message":"Invalid token"}"#)]).await;
    let client = ApiClient::new(&base_url).expect("client");

    let err = client
        .send_message("stale", "hello", None)
        .await
        .expect_err("401 should fail");
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Invalid token");
}

#[tokio::test]
async fn chat_server_error_uses_error_field() {
    let (base_url, _captured) =
        spawn_server(vec![(500, r#"{"error":"CUDA out of memory"}"#)]).await;
    let client = ApiClient::new(&base_url).expect("client");

    let err = client
        .send_message("tok", "hello", None)
        .await
        .expect_err("500 should fail");
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(message, "CUDA out of memory");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn history_decodes_conversation_list() {
    let (base_url, captured) = spawn_server(vec![(
        200,
        r#"[{"id":2,"title":"Second...","created_at":"2024-05-01 10:11:12"},{"id":1,"title":null}]"#,
    )])
    .await;
    let client = ApiClient::new(&base_url).expect("client");

    let history = client.history("tok").await.expect("history should decode");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, ConversationId::Number(2));
    assert_eq!(history[0].display_title(), "Second...");
    assert_eq!(
        history[0].display_created_at().as_deref(),
        Some("2024-05-01 10:11")
    );
    assert_eq!(history[1].display_title(), NEW_CONVERSATION_TITLE);

    let requests = captured.lock().await;
    assert!(requests[0].request_line.starts_with("GET /api/history "));
    assert_eq!(requests[0].header("authorization"), Some("Bearer tok"));
}

#[tokio::test]
async fn authenticated_calls_without_token_never_hit_the_network() {
    let client = ApiClient::new("http://127.0.0.1:9/api").expect("client");
    let err = client.history("").await.expect_err("no token");
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn malformed_history_body_is_a_decode_error() {
    let (base_url, _captured) = spawn_server(vec![(200, r#"{"oops":true}"#)]).await;
    let client = ApiClient::new(&base_url).expect("client");
    let err = client.history("tok").await.expect_err("not an array");
    assert!(matches!(err, ApiError::Decode { endpoint: "history", .. }));
}

#[test]
fn conversation_id_parses_numbers_and_strings() {
    assert_eq!(
        "42".parse::<ConversationId>(),
        Ok(ConversationId::Number(42))
    );
    assert_eq!(
        " abc ".parse::<ConversationId>(),
        Ok(ConversationId::Text("abc".to_string()))
    );
    assert!("   ".parse::<ConversationId>().is_err());
    assert_eq!(ConversationId::Number(3).to_string(), "3");
}

#[test]
fn blank_title_falls_back_to_placeholder() {
    let summary = ConversationSummary {
        id: ConversationId::Number(1),
        title: Some("   ".to_string()),
        created_at: Some("yesterday".to_string()),
    };
    assert_eq!(summary.display_title(), NEW_CONVERSATION_TITLE);
    assert_eq!(summary.display_created_at().as_deref(), Some("yesterday"));
}
