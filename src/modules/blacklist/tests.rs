use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::modules::blacklist::protocol::parse_status_line;
use crate::modules::blacklist::BlacklistClient;
use crate::modules::error::code::ErrorCode;

/// Serves the blacklist line protocol from an in-memory set, one command per connection.
async fn spawn_fake_service(initial: &[&str]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let entries: Arc<Mutex<HashSet<String>>> =
        Arc::new(Mutex::new(initial.iter().map(|s| s.to_string()).collect()));

    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            let entries = entries.clone();
            tokio::spawn(async move {
                let (read_half, mut write_half) = socket.into_split();
                let mut line = String::new();
                let mut reader = BufReader::new(read_half);
                if reader.read_line(&mut line).await.is_err() {
                    return;
                }
                let mut parts = line.trim().splitn(2, ' ');
                let command = parts.next().unwrap_or_default().to_string();
                let url = parts.next().unwrap_or_default().to_string();
                let reply = {
                    let mut entries = entries.lock().await;
                    match (command.as_str(), url.is_empty()) {
                        (_, true) => "400 Bad Request\n".to_string(),
                        ("GET", false) => {
                            let hit = entries.contains(&url);
                            format!("200 Ok\n\n{} {}\n", hit, hit)
                        }
                        ("POST", false) => {
                            entries.insert(url);
                            "201 Created\n".to_string()
                        }
                        ("DELETE", false) => {
                            if entries.remove(&url) {
                                "204 No Content\n".to_string()
                            } else {
                                "404 Not Found\n".to_string()
                            }
                        }
                        _ => "400 Bad Request\n".to_string(),
                    }
                };
                let _ = write_half.write_all(reply.as_bytes()).await;
            });
        }
    });
    addr
}

#[test]
fn status_line_parsing() {
    assert_eq!(parse_status_line("201 Created").unwrap(), 201);
    assert_eq!(parse_status_line("404 Not Found\n").unwrap(), 404);
    let err = parse_status_line("garbage").unwrap_err();
    assert_eq!(err.code(), ErrorCode::BlacklistProtocolError);
}

#[tokio::test]
async fn remote_client_speaks_line_protocol() {
    let addr = spawn_fake_service(&["www.bad.com"]).await;
    let client = BlacklistClient::remote(&addr, Duration::from_secs(2));

    assert!(client.is_blacklisted("www.bad.com").await.unwrap());
    assert!(!client.is_blacklisted("www.good.com").await.unwrap());

    client.add("www.good.com").await.unwrap();
    assert!(client.is_blacklisted("www.good.com").await.unwrap());

    assert!(client.remove("www.good.com").await.unwrap());
    assert!(!client.remove("www.good.com").await.unwrap());
    assert!(!client.is_blacklisted("www.good.com").await.unwrap());
}

#[tokio::test]
async fn remote_scan_of_mail_fields() {
    let addr = spawn_fake_service(&["evil.org"]).await;
    let client = BlacklistClient::remote(&addr, Duration::from_secs(2));
    assert!(client
        .has_blacklisted_urls(&["bob@doar.com", "hi", "go to evil.org now"])
        .await
        .unwrap());
    assert!(!client
        .has_blacklisted_urls(&["bob@doar.com", "hi", "go to fine.org"])
        .await
        .unwrap());
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let client = BlacklistClient::remote(&addr, Duration::from_secs(1));
    let err = client.is_blacklisted("www.any.com").await.unwrap_err();
    assert!(matches!(
        err.code(),
        ErrorCode::NetworkError | ErrorCode::ConnectionTimeout
    ));
    // registration failures are swallowed
    client.register_all(&["www.any.com".to_string()]).await;
}

#[tokio::test]
async fn local_client_tracks_urls() {
    let client = BlacklistClient::local();
    assert!(!client.has_blacklisted_urls(&["visit spam.net"]).await.unwrap());
    client.register_all(&["spam.net".to_string()]).await;
    assert!(client.has_blacklisted_urls(&["visit spam.net"]).await.unwrap());
    client.unregister_all(&["spam.net".to_string()]).await;
    assert!(!client.is_blacklisted("spam.net").await.unwrap());
}
