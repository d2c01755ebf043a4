use super::{StatsSource, VideoItem, VideoListResponse};
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Proxy};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Maximum characters of an error body surfaced to the user
const ERROR_BODY_EXCERPT: usize = 300;

/// Parts requested from videos.list
const PARTS: &str = "snippet,statistics";

/// videos.list client with a fixed backoff schedule
pub struct YouTubeClient {
    client: Client,
    base_url: Url,
    api_key: String,
    retry_delays: Vec<Duration>,
}

impl YouTubeClient {
    pub fn new(config: &ApiConfig, api_key: String) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;

        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true);
        if let Some(proxy) = &config.proxy {
            let proxy = Proxy::all(proxy)
                .map_err(|e| Error::Config(format!("Invalid api.proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        } else if !config.use_env_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key,
            retry_delays: config.retry_delays(),
        })
    }

    fn request(&self, video_ids: &[String]) -> reqwest::RequestBuilder {
        let ids = video_ids.join(",");
        self.client.get(self.base_url.clone()).query(&[
            ("part", PARTS),
            ("id", ids.as_str()),
            ("key", self.api_key.as_str()),
        ])
    }

    /// One attempt per entry of the delay schedule. HTTP error statuses are
    /// returned at once; transport failures are retried.
    async fn send_with_retry(&self, video_ids: &[String]) -> Result<VideoListResponse> {
        let attempts = self.retry_delays.len();
        let mut last_err: Option<reqwest::Error> = None;

        for (attempt, delay) in self.retry_delays.iter().enumerate() {
            if !delay.is_zero() {
                debug!("Waiting {:?} before attempt {}", delay, attempt + 1);
                tokio::time::sleep(*delay).await;
            }

            let response = match self.request(video_ids).send().await {
                Ok(response) => response,
                Err(e) if is_transient(&e) => {
                    warn!(
                        "videos.list attempt {}/{} failed: {}",
                        attempt + 1,
                        attempts,
                        e
                    );
                    last_err = Some(e);
                    continue;
                }
                Err(e) => return Err(Error::Http(e)),
            };

            let status = response.status();
            if status.is_client_error() || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Upstream {
                    status: status.as_u16(),
                    body: excerpt(&body, ERROR_BODY_EXCERPT),
                });
            }

            match response.json::<VideoListResponse>().await {
                Ok(parsed) => return Ok(parsed),
                Err(e) => {
                    warn!(
                        "videos.list attempt {}/{} returned an unreadable body: {}",
                        attempt + 1,
                        attempts,
                        e
                    );
                    last_err = Some(e);
                }
            }
        }

        Err(Error::Transport {
            attempts,
            message: last_err
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempt was made".to_string()),
        })
    }
}

#[async_trait]
impl StatsSource for YouTubeClient {
    async fn fetch_batch(&self, video_ids: &[String]) -> Result<Vec<VideoItem>> {
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }
        let response = self.send_with_retry(video_ids).await?;
        debug!(
            "videos.list returned {} of {} requested items",
            response.items.len(),
            video_ids.len()
        );
        Ok(response.items)
    }
}

fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() || e.is_decode()
}

/// First `max` characters of `body`, trimmed
fn excerpt(body: &str, max: usize) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_config(base_url: String) -> ApiConfig {
        ApiConfig {
            base_url,
            timeout_secs: 1,
            retry_delays_secs: vec![0, 0, 0],
            use_env_proxy: false,
            ..ApiConfig::default()
        }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_fetch_batch_sends_ids_and_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/videos"))
            .and(query_param("part", "snippet,statistics"))
            .and(query_param("id", "AAAAAAAAAAA,BBBBBBBBBBB"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": "AAAAAAAAAAA", "statistics": {"viewCount": "10"}},
                    {"id": "BBBBBBBBBBB", "statistics": {"viewCount": "20"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = YouTubeClient::new(
            &api_config(format!("{}/youtube/v3/videos", server.uri())),
            "test-key".to_string(),
        )
        .unwrap();
        let items = client
            .fetch_batch(&ids(&["AAAAAAAAAAA", "BBBBBBBBBBB"]))
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[1].id.as_deref(), Some("BBBBBBBBBBB"));
    }

    #[tokio::test]
    async fn test_http_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(403).set_body_string("{\"error\": \"quotaExceeded\"}"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = YouTubeClient::new(&api_config(server.uri()), "k".to_string()).unwrap();
        let err = client.fetch_batch(&ids(&["AAAAAAAAAAA"])).await.unwrap_err();

        match err {
            Error::Upstream { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("quotaExceeded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = YouTubeClient::new(&api_config(server.uri()), "k".to_string()).unwrap();
        let err = client.fetch_batch(&ids(&["AAAAAAAAAAA"])).await.unwrap_err();
        assert!(matches!(err, Error::Upstream { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_timeout_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"items": []}))
                    .set_delay(Duration::from_secs(3)),
            )
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "AAAAAAAAAAA"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = YouTubeClient::new(&api_config(server.uri()), "k".to_string()).unwrap();
        let items = client.fetch_batch(&ids(&["AAAAAAAAAAA"])).await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_connection_failure_exhausts_retries() {
        // nothing listens on port 1
        let client =
            YouTubeClient::new(&api_config("http://127.0.0.1:1/".to_string()), "k".to_string())
                .unwrap();
        let err = client.fetch_batch(&ids(&["AAAAAAAAAAA"])).await.unwrap_err();
        assert!(matches!(err, Error::Transport { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let client = YouTubeClient::new(&api_config(server.uri()), "k".to_string()).unwrap();
        assert!(client.fetch_batch(&[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("  short  ", 300), "short");
        let long = "é".repeat(400);
        let cut = excerpt(&long, 300);
        assert_eq!(cut.chars().count(), 301);
        assert!(cut.ends_with('…'));
    }
}
