use stackpulse_core::{ApiConfig, Author, Repo, StackpulseError};
use stackpulse_identity::IdentityResolver;
use stackpulse_report::{HttpFactsApi, MetaHasher};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve a single HTTP request with `status_line`, returning the raw request.
async fn serve_once(
    status_line: &'static str,
    body: &'static str,
) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&raw);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if raw.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        let response = format!(
            "{status_line}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        String::from_utf8_lossy(&raw).into_owned()
    });

    (format!("http://{addr}/api"), handle)
}

fn api(base_url: String) -> HttpFactsApi {
    HttpFactsApi::new(&ApiConfig {
        base_url: Some(base_url),
        token: Some("tok-123".into()),
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn posts_batch_with_bearer_token() {
    let (base_url, server) = serve_once("HTTP/1.1 200 OK", "").await;
    let hasher = MetaHasher::new(Repo::new("repo-9"), api(base_url), IdentityResolver::default());

    let facts = hasher
        .calculate_and_send_facts(&[
            Author::new("John Smith", "j@x.com"),
            Author::new("Jon Smith", "jon@x.com"),
        ])
        .await
        .unwrap();
    assert_eq!(facts[0].value, "1");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/facts HTTP/1.1"));
    let lower = request.to_lowercase();
    assert!(lower.contains("authorization: bearer tok-123"));
    assert!(lower.contains("content-type: application/json"));

    let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(json["facts"][0]["code"], "TEAM_SIZE");
    assert_eq!(json["facts"][0]["repo"]["id"], "repo-9");
    assert_eq!(json["facts"][0]["value"], "1");
}

#[tokio::test]
async fn server_error_carries_status_and_body() {
    let (base_url, server) = serve_once("HTTP/1.1 500 Internal Server Error", "boom").await;
    let hasher = MetaHasher::new(Repo::new("repo-9"), api(base_url), IdentityResolver::default());

    let result = hasher
        .calculate_and_send_facts(&[Author::new("Maria Garcia", "maria@x.com")])
        .await;
    server.await.unwrap();

    match result {
        Err(StackpulseError::Api(msg)) => {
            assert!(msg.contains("500"));
            assert!(msg.contains("boom"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
}
