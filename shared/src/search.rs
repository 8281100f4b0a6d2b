//! Hot Pepper Gourmet shop search.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info};

use crate::{Error, Result};

/// Genre code for ramen shops.
pub const RAMEN_GENRE: &str = "G013";

/// Search radius tier (5 = 3000m).
pub const SEARCH_RANGE: &str = "5";

/// Search API response.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: SearchResults,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    shop: Vec<ShopRecord>,
    #[serde(default)]
    error: Vec<ApiError>,
}

/// Error entry reported inside a 200 response (e.g. invalid key).
#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<u32>,
}

/// A shop as returned by the search API.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ShopRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub photo: Photo,
    #[serde(default)]
    pub urls: Urls,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Photo {
    #[serde(default)]
    pub mobile: MobilePhoto,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MobilePhoto {
    /// Large mobile photo URL
    #[serde(default)]
    pub l: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Urls {
    /// Detail page for desktop browsers
    #[serde(default)]
    pub pc: String,
}

impl ShopRecord {
    pub fn photo_url(&self) -> &str {
        &self.photo.mobile.l
    }

    pub fn detail_url(&self) -> &str {
        &self.urls.pc
    }
}

/// Source of nearby shops for a coordinate pair.
#[async_trait]
pub trait ShopSearch: Send + Sync {
    /// Search shops around `lat`/`lng`; an empty Vec means nothing was found.
    async fn search(&self, lat: &str, lng: &str) -> Result<Vec<ShopRecord>>;
}

/// Client for the Hot Pepper Gourmet search endpoint.
pub struct HotPepperClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HotPepperClient {
    /// Create a new search client with the given request timeout.
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl ShopSearch for HotPepperClient {
    async fn search(&self, lat: &str, lng: &str) -> Result<Vec<ShopRecord>> {
        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[
                ("format", "json"),
                ("genre", RAMEN_GENRE),
                ("range", SEARCH_RANGE),
                ("key", self.api_key.as_str()),
                ("lat", lat),
                ("lng", lng),
            ])
            .send()
            .await
            .map_err(|e| Error::Search(format!("Failed to call search API: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Search(format!("Failed to read search response: {}", e)))?;

        if !status.is_success() {
            error!(status = %status, "Search API returned non-success status");
            return Err(Error::Search(format!("Search API failed: {}", status)));
        }

        let shops = decode_response(&body)?;
        info!(lat, lng, shops = shops.len(), "Shop search complete");
        Ok(shops)
    }
}

fn decode_response(body: &[u8]) -> Result<Vec<ShopRecord>> {
    let response: SearchResponse = serde_json::from_slice(body)
        .map_err(|e| Error::Search(format!("Failed to parse search response: {}", e)))?;

    if let Some(api_error) = response.results.error.first() {
        return Err(Error::Search(format!(
            "Search API error {}: {}",
            api_error.code.unwrap_or_default(),
            api_error.message
        )));
    }

    Ok(response.results.shop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<HashMap<String, String>>>>;

    const TWO_SHOPS: &str = r#"{
        "results": {
            "api_version": "1.26",
            "results_available": 2,
            "shop": [
                {
                    "id": "J001",
                    "name": "Menya Ichi",
                    "address": "Tokyo-to Chiyoda-ku Marunouchi 1-1",
                    "photo": {"pc": {"l": "https://img/pc1.jpg"}, "mobile": {"l": "https://img/m1.jpg", "s": "https://img/s1.jpg"}},
                    "urls": {"pc": "https://www.hotpepper.jp/strJ001/"}
                },
                {
                    "id": "J002",
                    "name": "Ramen Ni",
                    "address": "Tokyo-to Chuo-ku Yaesu 2-2",
                    "photo": {"mobile": {"l": "https://img/m2.jpg"}},
                    "urls": {"pc": "https://www.hotpepper.jp/strJ002/"}
                }
            ]
        }
    }"#;

    async fn spawn_stub(status: StatusCode, body: &'static str) -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route(
                "/gourmet/v1/",
                get(
                    move |State(captured): State<Captured>,
                          Query(params): Query<HashMap<String, String>>| async move {
                        captured.lock().unwrap().push(params);
                        (status, body)
                    },
                ),
            )
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        (format!("http://{}/gourmet/v1/", addr), captured)
    }

    fn client(url: String) -> HotPepperClient {
        HotPepperClient::new(url, "test-key".to_string(), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_search_sends_fixed_query_and_decodes_shops() {
        let (url, captured) = spawn_stub(StatusCode::OK, TWO_SHOPS).await;

        let shops = client(url).search("35.68", "139.77").await.unwrap();

        assert_eq!(shops.len(), 2);
        assert_eq!(shops[0].name, "Menya Ichi");
        assert_eq!(shops[0].photo_url(), "https://img/m1.jpg");
        assert_eq!(shops[1].detail_url(), "https://www.hotpepper.jp/strJ002/");

        let requests = captured.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let params = &requests[0];
        assert_eq!(params["format"], "json");
        assert_eq!(params["genre"], "G013");
        assert_eq!(params["range"], "5");
        assert_eq!(params["key"], "test-key");
        assert_eq!(params["lat"], "35.68");
        assert_eq!(params["lng"], "139.77");
    }

    #[tokio::test]
    async fn test_search_zero_shops_is_empty_not_error() {
        let (url, _) = spawn_stub(
            StatusCode::OK,
            r#"{"results":{"results_available":0,"shop":[]}}"#,
        )
        .await;

        let shops = client(url).search("0.00", "0.00").await.unwrap();
        assert!(shops.is_empty());
    }

    #[tokio::test]
    async fn test_search_http_500_is_search_error() {
        let (url, _) = spawn_stub(StatusCode::INTERNAL_SERVER_ERROR, "oops").await;

        let err = client(url).search("35.68", "139.77").await.unwrap_err();
        assert!(matches!(err, Error::Search(ref msg) if msg.contains("500")));
    }

    #[tokio::test]
    async fn test_search_malformed_json_is_search_error() {
        let (url, _) = spawn_stub(StatusCode::OK, r#"{"results":"#).await;

        let err = client(url).search("35.68", "139.77").await.unwrap_err();
        assert!(matches!(err, Error::Search(_)));
    }

    #[tokio::test]
    async fn test_search_unreachable_is_search_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(format!("http://{}/", addr))
            .search("35.68", "139.77")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Search(_)));
    }

    #[test]
    fn test_api_reported_error() {
        let body = br#"{"results":{"api_version":"1.26","error":[{"message":"invalid key","code":2000}]}}"#;
        let err = decode_response(body).unwrap_err();
        assert!(matches!(err, Error::Search(ref msg) if msg.contains("2000") && msg.contains("invalid key")));
    }

    #[test]
    fn test_missing_nested_fields_default_to_empty() {
        let body = br#"{"results":{"shop":[{"name":"Bare"}]}}"#;
        let shops = decode_response(body).unwrap();
        assert_eq!(shops[0].name, "Bare");
        assert_eq!(shops[0].address, "");
        assert_eq!(shops[0].photo_url(), "");
        assert_eq!(shops[0].detail_url(), "");
    }
}
