//! Market Data - GeckoTerminal-style pool API
//!
//! Fetches name, symbol, token icons and 24h statistics for the *real* pool
//! address (the one the pool proxy maps to).
//!
//! API: {base}/networks/{network}/pools/{address}?include=base_token,quote_token
//!
//! The payload is validated against typed structs at this boundary; any
//! shape mismatch becomes `ResolutionError::MalformedResponse`.

use alloy_primitives::Address;
use async_trait::async_trait;
use eyre::Result;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::ResolutionError;
use crate::types::MarketMetadata;

// ============================================
// API RESPONSE TYPES
// ============================================

#[derive(Debug, Deserialize)]
struct PoolDocument {
    data: PoolResource,
    included: Option<Vec<IncludedResource>>,
}

#[derive(Debug, Deserialize)]
struct PoolResource {
    attributes: PoolAttributes,
}

#[derive(Debug, Deserialize)]
struct PoolAttributes {
    name: Option<String>,
    pool_name: Option<String>,
    price_change_percentage: Option<Timeframes>,
    volume_usd: Option<Timeframes>,
    market_cap_usd: Option<String>,
    fdv_usd: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Timeframes {
    h24: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IncludedResource {
    attributes: IncludedAttributes,
}

#[derive(Debug, Deserialize)]
struct IncludedAttributes {
    image_url: Option<String>,
}

// ============================================
// SOURCE TRAIT
// ============================================

#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Metadata for the pool the market data API indexes
    async fn fetch_pool(&self, real_pool: Address) -> Result<MarketMetadata, ResolutionError>;
}

/// Parse and validate a pool document
pub fn parse_pool_document(body: &str) -> Result<MarketMetadata, ResolutionError> {
    let doc: PoolDocument = serde_json::from_str(body)
        .map_err(|e| ResolutionError::MalformedResponse(format!("invalid pool document: {}", e)))?;

    let attrs = doc.data.attributes;
    let name = required(attrs.name, "data.attributes.name")?;
    let symbol = required(attrs.pool_name, "data.attributes.pool_name")?;

    let included = doc.included.unwrap_or_default();
    let icon0 = included
        .first()
        .and_then(|t| t.attributes.image_url.clone())
        .ok_or_else(|| {
            ResolutionError::MalformedResponse("missing included[0].attributes.image_url".into())
        })?;
    // Second token icon is optional
    let icon1 = included.get(1).and_then(|t| t.attributes.image_url.clone());

    let change_24h = parse_stat(
        attrs.price_change_percentage.and_then(|t| t.h24),
        "price_change_percentage.h24",
    )?;
    let volume_24h_usd = parse_stat(attrs.volume_usd.and_then(|t| t.h24), "volume_usd.h24")?;
    let market_cap_usd = match parse_stat(attrs.market_cap_usd, "market_cap_usd")? {
        Some(cap) => Some(cap),
        None => parse_stat(attrs.fdv_usd, "fdv_usd")?,
    };

    Ok(MarketMetadata {
        name,
        symbol,
        icon0,
        icon1,
        change_24h,
        market_cap_usd,
        volume_24h_usd,
    })
}

fn required(value: Option<String>, field: &str) -> Result<String, ResolutionError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ResolutionError::MalformedResponse(format!("missing {}", field))),
    }
}

/// Statistics are decimal strings; absent is fine, garbage is not
fn parse_stat(value: Option<String>, field: &str) -> Result<Option<f64>, ResolutionError> {
    match value {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<f64>().map(Some).map_err(|_| {
            ResolutionError::MalformedResponse(format!("{} is not numeric: {:?}", field, raw))
        }),
    }
}

// ============================================
// HTTP CLIENT
// ============================================

pub struct GeckoTerminalClient {
    http_client: Client,
    base_url: String,
    network: String,
}

impl GeckoTerminalClient {
    pub fn new(base_url: &str, network: &str, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            network: network.to_string(),
        })
    }

    pub fn pool_url(&self, real_pool: Address) -> String {
        format!(
            "{}/networks/{}/pools/{}?include=base_token,quote_token",
            self.base_url,
            self.network,
            real_pool.to_checksum(None)
        )
    }
}

#[async_trait]
impl MarketDataSource for GeckoTerminalClient {
    async fn fetch_pool(&self, real_pool: Address) -> Result<MarketMetadata, ResolutionError> {
        let url = self.pool_url(real_pool);
        debug!("🌐 Fetching market data from {}", url);

        let response = self
            .http_client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ResolutionError::MetadataFetch {
                status: e.status().map(|s| s.as_u16()),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolutionError::MetadataFetch {
                status: Some(status.as_u16()),
                reason: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ResolutionError::MetadataFetch {
                status: Some(status.as_u16()),
                reason: format!("failed to read body: {}", e),
            })?;

        parse_pool_document(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Answer a single HTTP request with a canned response.
    /// Yields the base URL and the request line that was received.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let (request_tx, request_rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]);
            let request_line = request.lines().next().unwrap_or_default().to_string();
            let _ = request_tx.send(request_line);

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        (base_url, request_rx)
    }

    const FULL_DOCUMENT: &str = r#"{
        "data": {
            "id": "sepolia_0xabc",
            "type": "pool",
            "attributes": {
                "name": "WETH / USDC 0.05%",
                "pool_name": "WETH / USDC",
                "market_cap_usd": null,
                "fdv_usd": "200000.0",
                "price_change_percentage": { "m5": "0.1", "h24": "-2.4" },
                "volume_usd": { "h24": "12000000.5" }
            }
        },
        "included": [
            { "id": "a", "type": "token", "attributes": { "image_url": "https://img/weth.png" } },
            { "id": "b", "type": "token", "attributes": { "image_url": "https://img/usdc.png" } }
        ]
    }"#;

    #[test]
    fn test_parse_full_document() {
        let meta = parse_pool_document(FULL_DOCUMENT).unwrap();
        assert_eq!(meta.name, "WETH / USDC 0.05%");
        assert_eq!(meta.symbol, "WETH / USDC");
        assert_eq!(meta.icon0, "https://img/weth.png");
        assert_eq!(meta.icon1.as_deref(), Some("https://img/usdc.png"));
        assert_eq!(meta.change_24h, Some(-2.4));
        // market cap is null, FDV fills in
        assert_eq!(meta.market_cap_usd, Some(200000.0));
        assert_eq!(meta.volume_24h_usd, Some(12000000.5));
    }

    #[test]
    fn test_second_icon_is_optional() {
        let body = r#"{
            "data": { "attributes": { "name": "X", "pool_name": "X / Y" } },
            "included": [ { "attributes": { "image_url": "https://img/x.png" } } ]
        }"#;
        let meta = parse_pool_document(body).unwrap();
        assert_eq!(meta.icon1, None);
        assert_eq!(meta.change_24h, None);
        assert_eq!(meta.market_cap_usd, None);
    }

    #[test]
    fn test_missing_first_icon_is_malformed() {
        let body = r#"{ "data": { "attributes": { "name": "X", "pool_name": "X / Y" } } }"#;
        let err = parse_pool_document(body).unwrap_err();
        assert!(matches!(err, ResolutionError::MalformedResponse(_)));
    }

    #[test]
    fn test_missing_name_is_malformed() {
        let body = r#"{
            "data": { "attributes": { "pool_name": "X / Y" } },
            "included": [ { "attributes": { "image_url": "https://img/x.png" } } ]
        }"#;
        let err = parse_pool_document(body).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::MalformedResponse("missing data.attributes.name".into())
        );
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        assert!(matches!(
            parse_pool_document(r#"{ "errors": [ { "status": "404" } ] }"#),
            Err(ResolutionError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_pool_document("<html>rate limited</html>"),
            Err(ResolutionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_non_numeric_stat_is_malformed() {
        let body = r#"{
            "data": { "attributes": { "name": "X", "pool_name": "X / Y", "volume_usd": { "h24": "lots" } } },
            "included": [ { "attributes": { "image_url": "https://img/x.png" } } ]
        }"#;
        assert!(matches!(
            parse_pool_document(body),
            Err(ResolutionError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_pool_not_found_carries_status() {
        let (base_url, _request) = serve_once("404 Not Found", r#"{"errors":[]}"#).await;
        let client =
            GeckoTerminalClient::new(&base_url, "sepolia-testnet", Duration::from_secs(5)).unwrap();

        let err = client
            .fetch_pool(Address::with_last_byte(0x99))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ResolutionError::MetadataFetch {
                status: Some(404),
                reason: "Not Found".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_pool_parses_document() {
        let (base_url, request) = serve_once("200 OK", FULL_DOCUMENT).await;
        let client =
            GeckoTerminalClient::new(&base_url, "sepolia-testnet", Duration::from_secs(5)).unwrap();
        let real_pool = Address::with_last_byte(0x99);

        let meta = client.fetch_pool(real_pool).await.unwrap();

        assert_eq!(meta.name, "WETH / USDC 0.05%");
        assert_eq!(meta.symbol, "WETH / USDC");
        assert_eq!(meta.icon0, "https://img/weth.png");
        assert_eq!(meta.icon1.as_deref(), Some("https://img/usdc.png"));
        assert_eq!(meta.volume_24h_usd, Some(12000000.5));

        let request_line = request.await.unwrap();
        assert!(request_line.starts_with(&format!(
            "GET /networks/sepolia-testnet/pools/{}?include=base_token,quote_token",
            real_pool.to_checksum(None)
        )));
    }

    #[tokio::test]
    async fn test_fetch_pool_malformed_body() {
        let (base_url, _request) = serve_once("200 OK", "<html>rate limited</html>").await;
        let client =
            GeckoTerminalClient::new(&base_url, "sepolia-testnet", Duration::from_secs(5)).unwrap();

        let err = client
            .fetch_pool(Address::with_last_byte(0x99))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::MalformedResponse(_)));
    }

    #[test]
    fn test_pool_url() {
        let client = GeckoTerminalClient::new(
            "https://api.geckoterminal.com/api/v2/",
            "sepolia-testnet",
            Duration::from_secs(5),
        )
        .unwrap();
        let url = client.pool_url(Address::with_last_byte(0xab));
        assert_eq!(
            url,
            format!(
                "https://api.geckoterminal.com/api/v2/networks/sepolia-testnet/pools/{}?include=base_token,quote_token",
                Address::with_last_byte(0xab).to_checksum(None)
            )
        );
    }
}
