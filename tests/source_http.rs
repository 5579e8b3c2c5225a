//! HTTP error policy of `HttpRecordingSource`, driven against a scripted
//! local server.

use setlist::config::Config;
use setlist::error::ElementError;
use setlist::source::{HttpRecordingSource, RecordingSource};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

// ─── Stub Server ────────────────────────────────────────────────────

/// Responses per path prefix, served in order. The last one repeats.
type Script = Vec<(&'static str, Vec<(u16, &'static str)>)>;

#[derive(Debug, Clone)]
struct Hit {
    method: String,
    path: String,
    body: String,
}

struct StubServer {
    port: u16,
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl StubServer {
    async fn start(script: Script) -> Self {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        std_listener.set_nonblocking(true).unwrap();
        let port = std_listener.local_addr().unwrap().port();
        let listener = TcpListener::from_std(std_listener).unwrap();

        let hits = Arc::new(Mutex::new(Vec::new()));
        let served = hits.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                serve(stream, &script, &served).await;
            }
        });

        Self { port, hits }
    }

    fn hits_for(&self, prefix: &str) -> Vec<Hit> {
        self.hits
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.path.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn config(&self) -> Config {
        let mut config = Config::minimal();
        config.musicbrainz.url = format!("http://127.0.0.1:{}/ws/2", self.port);
        config.listenbrainz.dataset_url = format!("http://127.0.0.1:{}/datasets", self.port);
        config.http.timeout_secs = 5;
        config.http.retry_delay_ms = 10;
        config
    }
}

async fn serve(mut stream: TcpStream, script: &Script, hits: &Mutex<Vec<Hit>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    let hit = Hit {
        method: request_line.next().unwrap_or_default().to_string(),
        path: request_line.next().unwrap_or_default().to_string(),
        body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
    };

    let route = script.iter().find(|(prefix, _)| hit.path.starts_with(prefix));
    let (status, body) = match route {
        Some((prefix, responses)) => {
            let mut hits = hits.lock().unwrap();
            hits.push(hit);
            let seen = hits.iter().filter(|h| h.path.starts_with(prefix)).count();
            responses[(seen - 1).min(responses.len() - 1)]
        }
        None => {
            hits.lock().unwrap().push(hit);
            (404, "not found")
        }
    };

    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        503 => "Service Unavailable",
        _ => "Error",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

// ─── Area Lookup ────────────────────────────────────────────────────

#[tokio::test]
async fn lookup_retries_unavailable_then_succeeds() {
    let server = StubServer::start(vec![(
        "/ws/2/area",
        vec![(503, "slow down"), (200, r#"{"areas": [{"id": "de-mbid"}]}"#)],
    )])
    .await;
    let source = HttpRecordingSource::from_config(&server.config()).unwrap();

    let mbid = source.lookup_area("Germany").await.unwrap();

    assert_eq!(mbid, "de-mbid");
    let hits = server.hits_for("/ws/2/area");
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.method == "GET"));
    assert!(hits[0].path.contains("query=Germany"));
    assert!(hits[0].path.contains("fmt=json"));
}

#[tokio::test]
async fn lookup_other_status_fails_without_retry() {
    let server = StubServer::start(vec![("/ws/2/area", vec![(404, "no such thing")])]).await;
    let source = HttpRecordingSource::from_config(&server.config()).unwrap();

    let err = source.lookup_area("Atlantis").await.unwrap_err();

    assert!(matches!(err, ElementError::DataSource { status: 404, .. }));
    assert_eq!(server.hits_for("/ws/2/area").len(), 1);
}

#[tokio::test]
async fn lookup_without_areas_is_empty_response() {
    let server = StubServer::start(vec![("/ws/2/area", vec![(200, r#"{"areas": []}"#)])]).await;
    let source = HttpRecordingSource::from_config(&server.config()).unwrap();

    let err = source.lookup_area("Atlantis").await.unwrap_err();
    assert!(matches!(err, ElementError::EmptyResponse(_)));
}

// ─── Bulk Fetch ─────────────────────────────────────────────────────

#[tokio::test]
async fn bulk_fetch_unavailable_is_not_retried() {
    let server = StubServer::start(vec![(
        "/datasets/popular-recordings-by-country/json",
        vec![(503, "maintenance"), (200, "[]")],
    )])
    .await;
    let source = HttpRecordingSource::from_config(&server.config()).unwrap();

    let err = source
        .popular_recordings_by_country("de-mbid")
        .await
        .unwrap_err();

    assert!(matches!(err, ElementError::DataSource { status: 503, .. }));
    assert_eq!(server.hits_for("/datasets").len(), 1);
}

#[tokio::test]
async fn bulk_fetch_posts_area_and_decodes_rows() {
    let server = StubServer::start(vec![(
        "/datasets/popular-recordings-by-country/json",
        vec![(
            200,
            r#"[
                {"recording_mbid": "r-1", "recording_name": "Da Da Da", "artist_credit_name": "Trio", "listen_count": 42},
                {"recording_mbid": "r-2", "recording_name": "Major Tom", "artist_credit_name": "Peter Schilling", "listen_count": 17}
            ]"#,
        )],
    )])
    .await;
    let source = HttpRecordingSource::from_config(&server.config()).unwrap();

    let rows = source.popular_recordings_by_country("de-mbid").await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].recording_mbid.as_deref(), Some("r-1"));
    assert_eq!(rows[1].listen_count, Some(17));

    let hits = server.hits_for("/datasets");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].method, "POST");
    let body: serde_json::Value = serde_json::from_str(&hits[0].body).unwrap();
    assert_eq!(body[0]["[area_mbid]"], "de-mbid");
}
