//! Price Oracle Client
//!
//! Fetches the token's current USD exchange rate from the configured
//! price-feed endpoint. The payload shape is `{ <token_key>: { "usd": n } }`.
//!
//! Any failure - transport error, non-2xx status, unparseable body, missing
//! key - yields `0.0` to signal "unknown". The caller decides whether a
//! cached value can stand in.

use tracing::warn;

#[derive(Debug, Clone)]
pub struct PriceOracleClient {
    http: reqwest::Client,
    url: String,
    token_key: String,
}

impl PriceOracleClient {
    pub fn new(url: impl Into<String>, token_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            token_key: token_key.into(),
        }
    }

    /// Current token price in USD, or `0.0` when no fresh quote is available.
    /// Never errors.
    pub async fn get_token_price_usd(&self) -> f64 {
        let response = match self.http.get(&self.url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Oracle request failed: {e}");
                return 0.0;
            }
        };

        if !response.status().is_success() {
            warn!("Oracle returned status {}", response.status());
            return 0.0;
        }

        let body: serde_json::Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!("Oracle payload was not valid JSON: {e}");
                return 0.0;
            }
        };

        body.get(&self.token_key)
            .and_then(|quote| quote.get("usd"))
            .and_then(|usd| usd.as_f64())
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_quoted_price() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "dante": { "usd": 0.05 } })),
            )
            .mount(&server)
            .await;

        let client = PriceOracleClient::new(server.uri(), "dante");
        assert_eq!(client.get_token_price_usd().await, 0.05);
    }

    #[tokio::test]
    async fn returns_zero_on_missing_token_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "bitcoin": { "usd": 60000.0 } })),
            )
            .mount(&server)
            .await;

        let client = PriceOracleClient::new(server.uri(), "dante");
        assert_eq!(client.get_token_price_usd().await, 0.0);
    }

    #[tokio::test]
    async fn returns_zero_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = PriceOracleClient::new(server.uri(), "dante");
        assert_eq!(client.get_token_price_usd().await, 0.0);
    }

    #[tokio::test]
    async fn returns_zero_on_garbage_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = PriceOracleClient::new(server.uri(), "dante");
        assert_eq!(client.get_token_price_usd().await, 0.0);
    }

    #[tokio::test]
    async fn returns_zero_when_unreachable() {
        // Port 1 is a safe dead end
        let client = PriceOracleClient::new("http://127.0.0.1:1", "dante");
        assert_eq!(client.get_token_price_usd().await, 0.0);
    }
}
