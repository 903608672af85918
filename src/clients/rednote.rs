use std::time::Instant;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::{ContentFetcher, FetchError, Note};
use crate::infra::config::FetcherConfig;
use crate::infra::http::headers::{add_standard_headers, generate_request_id};
use crate::infra::runtime::limits::{make_http_client, retry_async};

const METRIC_TOOL: &str = "search_xiaohongshu";

/// Client for the extraction service that drives the platform pages and
/// returns notes as JSON.
#[derive(Clone)]
pub struct RednoteRemote {
    base: String,
    http: Client,
    retries: u32,
}

impl RednoteRemote {
    pub fn from_config(base: impl Into<String>, cfg: &FetcherConfig) -> Result<Self, FetchError> {
        let http = make_http_client(cfg).map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self {
            base: base.into(),
            http,
            retries: cfg.retries,
        })
    }

    pub async fn health(&self) -> bool {
        let url = format!("{}/health", self.base.trim_end_matches('/'));
        let (builder, _rid) = add_standard_headers(self.http.get(url), None);
        match builder.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    pub async fn search_notes(&self, query: &str, count: u32) -> Result<Vec<Note>, FetchError> {
        let url = format!("{}/api/search", self.base.trim_end_matches('/'));
        tracing::debug!(endpoint = %url, "rednote.search request");
        let http = self.http.clone();
        let req_id = generate_request_id();
        let start = Instant::now();
        let res: Result<Vec<NoteWire>, FetchError> =
            retry_async(self.retries, FetchError::is_retryable, move |_| {
                let http = http.clone();
                let url = url.clone();
                let req_id = req_id.clone();
                let payload = SearchReq { keyword: query, count };
                async move {
                    let (builder, _rid) = add_standard_headers(http.post(url), Some(req_id));
                    let resp = builder
                        .json(&payload)
                        .send()
                        .await
                        .map_err(|e| FetchError::Network(e.to_string()))?;
                    if !resp.status().is_success() {
                        return Err(FetchError::Status(resp.status().as_u16()));
                    }
                    resp.json::<Vec<NoteWire>>()
                        .await
                        .map_err(|e| FetchError::Parse(e.to_string()))
                }
            })
            .await;
        if res.is_err() {
            crate::infra::logging::log_counter(METRIC_TOOL, "remote_error_total");
        }
        let wires = res?;
        let elapsed_ms = start.elapsed().as_millis() as f64;
        crate::infra::logging::log_metric(METRIC_TOOL, "remote_latency_ms", elapsed_ms);
        wires.into_iter().map(Note::try_from).collect()
    }
}

#[async_trait::async_trait]
impl ContentFetcher for RednoteRemote {
    async fn search(&self, query: &str, count: u32) -> Result<Vec<Note>, FetchError> {
        self.search_notes(query, count).await
    }
}

#[derive(Serialize, Deserialize, Clone, Copy)]
struct SearchReq<'a> {
    keyword: &'a str,
    count: u32,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct NoteWire {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    author_desc: Option<String>,
    #[serde(default, alias = "desc")]
    content: Option<String>,
    #[serde(default)]
    likes: Option<CountWire>,
    #[serde(default)]
    collects: Option<CountWire>,
    #[serde(default)]
    comments: Option<CountWire>,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    link: Option<String>,
}

/// Interaction counts arrive either as numbers or as display strings.
#[derive(Serialize, Deserialize, Clone)]
#[serde(untagged)]
enum CountWire {
    Int(u64),
    Text(String),
}

impl CountWire {
    fn resolve(&self, field: &str) -> Result<Option<u64>, FetchError> {
        match self {
            CountWire::Int(n) => Ok(Some(*n)),
            CountWire::Text(s) if s.trim().is_empty() => Ok(None),
            CountWire::Text(s) => parse_display_count(s)
                .map(Some)
                .ok_or_else(|| FetchError::Parse(format!("invalid {field} count: {s:?}"))),
        }
    }
}

/// Parse counts such as `1234`, `1,234`, `1.2万`, `3.4k`, `2w` or `10万+`.
fn parse_display_count(raw: &str) -> Option<u64> {
    let cleaned = raw.trim().replace(',', "");
    let s = cleaned.trim_end_matches('+').trim_end();
    let (num, scale) = if let Some(n) = s.strip_suffix('万') {
        (n, 10_000.0)
    } else if let Some(n) = s.strip_suffix(|c: char| c == 'w' || c == 'W') {
        (n, 10_000.0)
    } else if let Some(n) = s.strip_suffix(|c: char| c == 'k' || c == 'K') {
        (n, 1_000.0)
    } else {
        (s, 1.0)
    };
    let num = num.trim();
    if let Ok(n) = num.parse::<u64>() {
        return n.checked_mul(scale as u64);
    }
    let f: f64 = num.parse().ok()?;
    if !f.is_finite() || f < 0.0 {
        return None;
    }
    Some((f * scale).round() as u64)
}

fn required(value: Option<String>, field: &str) -> Result<String, FetchError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| FetchError::Parse(format!("note is missing {field}")))
}

impl TryFrom<NoteWire> for Note {
    type Error = FetchError;

    fn try_from(w: NoteWire) -> Result<Self, Self::Error> {
        let title = required(w.title, "title")?;
        let link = required(w.link, "link")?;
        let resolve = |c: &Option<CountWire>, field: &str| match c {
            Some(c) => c.resolve(field),
            None => Ok(None),
        };
        Ok(Note {
            title,
            author: w.author.unwrap_or_default(),
            author_desc: w.author_desc.filter(|d| !d.trim().is_empty()),
            content: w.content.unwrap_or_default(),
            likes: resolve(&w.likes, "likes")?,
            collects: resolve(&w.collects, "collects")?,
            comments: resolve(&w.comments, "comments")?,
            images: w.images,
            tags: w
                .tags
                .into_iter()
                .map(|t| t.trim().trim_start_matches('#').to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            link,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn fast(base: String, retries: u32) -> RednoteRemote {
        let cfg = FetcherConfig {
            retries,
            timeout_ms: 2_000,
            ..FetcherConfig::default()
        };
        RednoteRemote::from_config(base, &cfg).unwrap()
    }

    #[tokio::test]
    async fn it_maps_notes_from_remote_array() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/api/search")
                .json_body_obj(&SearchReq { keyword: "coffee", count: 3 });
            then.status(200).json_body(json!([{
                "title": "Morning Brew",
                "author": "J",
                "authorDesc": "barista",
                "content": "  Great roast  ",
                "likes": 5,
                "collects": "1.2万",
                "images": ["http://img/1.png", "http://img/2.png"],
                "tags": ["#coffee", "cafe"],
                "link": "http://x/1"
            }]));
        });

        let cli = fast(server.base_url(), 0);
        let out = cli.search_notes("coffee", 3).await.unwrap();
        m.assert();

        assert_eq!(out.len(), 1);
        let note = &out[0];
        assert_eq!(note.title, "Morning Brew");
        assert_eq!(note.author_desc.as_deref(), Some("barista"));
        assert_eq!(note.content, "  Great roast  ");
        assert_eq!(note.likes, Some(5));
        assert_eq!(note.collects, Some(12_000));
        assert_eq!(note.comments, None);
        assert_eq!(note.images, vec!["http://img/1.png", "http://img/2.png"]);
        assert_eq!(note.tags, vec!["coffee", "cafe"]);
    }

    #[tokio::test]
    async fn it_accepts_desc_alias_and_blank_counts() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/search");
            then.status(200).json_body(json!([{
                "title": "t", "author": "a", "desc": "body", "likes": "", "link": "http://x/2"
            }]));
        });
        let out = fast(server.base_url(), 0).search_notes("q", 1).await.unwrap();
        assert_eq!(out[0].content, "body");
        assert_eq!(out[0].likes, None);
    }

    #[tokio::test]
    async fn it_retries_server_errors_then_fails() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST).path("/api/search");
            then.status(502).body("bad gateway");
        });
        let err = fast(server.base_url(), 2).search_notes("q", 1).await.unwrap_err();
        assert_eq!(err, FetchError::Status(502));
        m.assert_hits(3);
    }

    #[tokio::test]
    async fn it_does_not_retry_client_errors() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST).path("/api/search");
            then.status(400).body("bad");
        });
        let err = fast(server.base_url(), 3).search_notes("q", 1).await.unwrap_err();
        assert!(err.to_string().contains("upstream status 400"));
        m.assert_hits(1);
    }

    #[tokio::test]
    async fn it_rejects_malformed_payloads() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/search");
            then.status(200).json_body(json!({"notes": "nope"}));
        });
        let err = fast(server.base_url(), 0).search_notes("q", 1).await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn it_rejects_notes_without_link() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/search");
            then.status(200).json_body(json!([{"title": "t", "author": "a", "content": "c"}]));
        });
        let err = fast(server.base_url(), 0).search_notes("q", 1).await.unwrap_err();
        assert_eq!(err, FetchError::Parse("note is missing link".into()));
    }

    #[tokio::test]
    async fn it_rejects_unparseable_counts() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/search");
            then.status(200).json_body(json!([{
                "title": "t", "author": "a", "content": "c", "comments": "lots", "link": "l"
            }]));
        });
        let err = fast(server.base_url(), 0).search_notes("q", 1).await.unwrap_err();
        assert!(err.to_string().contains("invalid comments count"));
    }

    #[tokio::test]
    async fn network_failure_is_reported() {
        let err = fast("http://127.0.0.1:9".into(), 0).search_notes("q", 1).await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }

    #[tokio::test]
    async fn it_sets_request_id_header() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/api/search")
                .header_exists("x-request-id")
                .header_exists("user-agent");
            then.status(200).json_body(json!([]));
        });
        let out = fast(server.base_url(), 0).search_notes("q", 1).await.unwrap();
        assert!(out.is_empty());
        m.assert();
    }

    #[tokio::test]
    async fn health_gets_200() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/health").header_exists("x-request-id");
            then.status(200).body("ok");
        });
        assert!(fast(server.base_url(), 0).health().await);
        m.assert();
    }

    #[test]
    fn display_counts() {
        assert_eq!(parse_display_count("1234"), Some(1234));
        assert_eq!(parse_display_count("1,234"), Some(1234));
        assert_eq!(parse_display_count("1.2万"), Some(12_000));
        assert_eq!(parse_display_count("3.4k"), Some(3_400));
        assert_eq!(parse_display_count("2w"), Some(20_000));
        assert_eq!(parse_display_count("10+"), Some(10));
        assert_eq!(parse_display_count("10万+"), Some(100_000));
        assert_eq!(parse_display_count("1k+"), Some(1_000));
        assert_eq!(parse_display_count("-3"), None);
        assert_eq!(parse_display_count("many"), None);
    }
}
