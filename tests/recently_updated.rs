//! MangaDexClient against a local HTTP stub.
//!
//! The stub answers every request by path prefix and records each request
//! target, so the tests can check both what came back and what was asked.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use dexreader::prelude::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

struct StubServer {
    base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    /// Serves `(path prefix, JSON body)` routes; anything else is a 404.
    async fn start(routes: Vec<(&'static str, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let target = read_request_target(&mut socket).await;
                log.lock().unwrap().push(target.clone());

                let (status, body) = routes
                    .iter()
                    .find(|(prefix, _)| target.starts_with(prefix))
                    .map(|(_, body)| ("200 OK", body.clone()))
                    .unwrap_or(("404 Not Found", r#"{"result":"error","errors":[]}"#.to_string()));
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self { base, requests }
    }

    fn client(&self) -> MangaDexClient {
        let config = ClientConfig {
            api_base: self.base.clone(),
            ..Default::default()
        };
        MangaDexClient::with_config(config).unwrap()
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request_target(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf)
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string()
}

fn chapter_json(id: &str, manga_id: Option<&str>) -> String {
    let relationships = match manga_id {
        Some(manga_id) => format!(
            r#"[{{"id": "g1", "type": "scanlation_group"}}, {{"id": "{}", "type": "manga"}}]"#,
            manga_id
        ),
        None => r#"[{"id": "g1", "type": "scanlation_group"}]"#.to_string(),
    };
    format!(
        r#"{{"id": "{}", "type": "chapter", "attributes": {{"chapter": "1", "pages": 10}}, "relationships": {}}}"#,
        id, relationships
    )
}

fn manga_json(id: &str, title: &str) -> String {
    format!(
        r#"{{"id": "{}", "type": "manga", "attributes": {{"title": {{"en": "{}"}}}}, "relationships": []}}"#,
        id, title
    )
}

fn collection(entries: &[String], total: Option<usize>) -> String {
    let total = total.map(|t| format!(r#", "total": {}"#, t)).unwrap_or_default();
    format!(r#"{{"result": "ok", "data": [{}]{}}}"#, entries.join(", "), total)
}

fn since() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

#[cfg(test)]
mod recently_updated_tests {
    use super::*;

    #[tokio::test]
    async fn test_no_manga_relations_skips_batch_request() {
        let server = StubServer::start(vec![
            ("/chapter?", collection(&[chapter_json("c1", None), chapter_json("c2", None)], Some(2))),
            ("/manga?", collection(&[manga_json("m1", "Should Not Load")], Some(1))),
        ])
        .await;

        let updated = server.client().recently_updated(since()).await.unwrap();

        assert!(updated.is_empty());
        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].starts_with("/chapter?"));
        assert!(requests[0].contains("updatedAtSince=2024-05-01"));
    }

    #[tokio::test]
    async fn test_batch_is_resorted_into_first_seen_order() {
        let server = StubServer::start(vec![
            (
                "/chapter?",
                collection(
                    &[
                        chapter_json("c1", Some("m2")),
                        chapter_json("c2", Some("m1")),
                        chapter_json("c3", Some("m2")),
                        chapter_json("c4", None),
                    ],
                    Some(4),
                ),
            ),
            // The batch endpoint answers in its own order
            (
                "/manga?",
                collection(&[manga_json("m1", "First Id"), manga_json("m2", "Second Id")], Some(2)),
            ),
        ])
        .await;

        let updated = server.client().recently_updated(since()).await.unwrap();

        let ids: Vec<&str> = updated.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m2", "m1"]);
        assert_eq!(updated[0].title, "Second Id");

        let requests = server.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].starts_with("/manga?ids%5B%5D=m2&ids%5B%5D=m1&"));
        assert!(requests[1].contains("&limit=2&"));
    }

    #[tokio::test]
    async fn test_chapter_error_skips_batch_request() {
        let server = StubServer::start(vec![("/manga?", collection(&[], Some(0)))]).await;

        let result = server.client().recently_updated(since()).await;

        assert!(matches!(result, Err(dexreader::Error::NotFound(_))));
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_envelope_without_total_keeps_paging() {
        let server = StubServer::start(vec![(
            "/chapter?",
            collection(&[chapter_json("c1", Some("m1")), chapter_json("c2", Some("m1"))], None),
        )])
        .await;
        let client = server.client();
        let mut list = Paginator::new(2);

        let added = list
            .load_chapters(&client, &ChapterQuery::for_manga("m1"))
            .await
            .unwrap();

        assert_eq!(added, 2);
        assert!(list.has_more());
        assert_eq!(list.offset(), 2);
    }
}
