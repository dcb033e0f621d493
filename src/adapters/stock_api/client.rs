//! Stock API Client
//!
//! HTTP client for the price provider's REST API.
//! Handles the credential exchange, the ticker catalogue and price history.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;

use crate::domain::{Series, Ticker, TickerListing, Window};
use crate::ports::{AccessToken, AuthError, CredentialProvider, MarketDataError, MarketDataPort};
use super::types::{AuthRequest, AuthResponse, PriceHistoryResponse, StocksResponse};

/// Stock API client configuration
#[derive(Debug, Clone)]
pub struct StockApiConfig {
    /// Base URL, e.g. `http://host/evaluation-service`
    pub base_url: String,
    /// Client id for `POST /auth`
    pub client_id: Option<String>,
    /// Client secret for `POST /auth`
    pub client_secret: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Number of attempts per request
    pub max_retries: u32,
}

impl Default for StockApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/evaluation-service".to_string(),
            client_id: None,
            client_secret: None,
            timeout: Duration::from_secs(10),
            max_retries: 3,
        }
    }
}

/// What to do with a response of a given status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Hand the response to the caller
    Accept,
    /// Wait and try again
    RetryAfter(Duration),
}

/// Retry policy: 429 backs off exponentially (2s, 4s, 8s), 5xx linearly,
/// everything else is returned as-is. The last of `max_attempts` is always
/// accepted so the caller maps its status instead of sleeping for nothing.
pub fn retry_decision(status: StatusCode, attempt: u32, max_attempts: u32) -> RetryDecision {
    if attempt + 1 >= max_attempts {
        RetryDecision::Accept
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        RetryDecision::RetryAfter(Duration::from_secs(2u64.pow(attempt + 1)))
    } else if status.is_server_error() {
        RetryDecision::RetryAfter(Duration::from_millis(500 * (attempt as u64 + 1)))
    } else {
        RetryDecision::Accept
    }
}

/// Price provider client
#[derive(Debug, Clone)]
pub struct StockApiClient {
    config: StockApiConfig,
    http: Client,
}

impl StockApiClient {
    pub fn new(config: StockApiConfig) -> Result<Self, MarketDataError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MarketDataError::RestError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    /// Get the configured API base URL
    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Exchange client credentials for a bearer token
    pub async fn authenticate(&self) -> Result<AccessToken, AuthError> {
        let (Some(client_id), Some(client_secret)) =
            (self.config.client_id.clone(), self.config.client_secret.clone())
        else {
            return Err(AuthError::MissingCredential(
                "client_id and client_secret are required to authenticate".into(),
            ));
        };

        let url = format!("{}/auth", self.base_url());
        let body = AuthRequest { client_id, client_secret };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected(format!("{}: {}", status, text)));
        }

        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|e| AuthError::RequestFailed(format!("Failed to parse auth response: {}", e)))?;

        tracing::info!("Obtained {} access token", auth.token_type.as_deref().unwrap_or("bearer"));
        Ok(auth.into_token(Utc::now()))
    }

    /// Execute request with retry logic and rate limit handling
    async fn execute_with_retry(&self, request: RequestBuilder) -> Result<reqwest::Response, MarketDataError> {
        let max_attempts = self.config.max_retries.max(1);
        let mut last_error = None;

        for attempt in 0..max_attempts {
            let attempt_request = request
                .try_clone()
                .ok_or_else(|| MarketDataError::RestError("Failed to clone request".into()))?;

            match attempt_request.send().await {
                Ok(response) => match retry_decision(response.status(), attempt, max_attempts) {
                    RetryDecision::Accept => return Ok(response),
                    RetryDecision::RetryAfter(backoff) => {
                        tracing::warn!(
                            "Provider returned {}, retrying in {:?} (attempt {}/{})",
                            response.status(), backoff, attempt + 1, max_attempts
                        );
                        last_error = Some(if response.status() == StatusCode::TOO_MANY_REQUESTS {
                            MarketDataError::RateLimited
                        } else {
                            MarketDataError::RestError(format!("Server error: {}", response.status()))
                        });
                        tokio::time::sleep(backoff).await;
                    }
                },
                Err(e) => {
                    last_error = Some(MarketDataError::RestError(e.to_string()));
                    if attempt + 1 < max_attempts {
                        tokio::time::sleep(Duration::from_millis(500 * (attempt as u64 + 1))).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| MarketDataError::RestError("Max retries exceeded".into())))
    }

    /// Handle API response and deserialize
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
        subject: &str,
    ) -> Result<T, MarketDataError> {
        let status = response.status();

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(MarketDataError::Unauthorized(format!("{} for {}", status, subject)));
            }
            StatusCode::NOT_FOUND => return Err(MarketDataError::UnknownTicker(subject.to_string())),
            StatusCode::TOO_MANY_REQUESTS => return Err(MarketDataError::RateLimited),
            _ => {}
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MarketDataError::RestError(format!("API error {}: {}", status, error_text)));
        }

        response
            .json()
            .await
            .map_err(|e| MarketDataError::ParseError(format!("Failed to parse {} response: {}", subject, e)))
    }
}

#[async_trait]
impl MarketDataPort for StockApiClient {
    async fn list_tickers(&self, credential: &AccessToken)
        -> Result<Vec<TickerListing>, MarketDataError> {
        let url = format!("{}/stocks", self.base_url());
        let request = self.http.get(&url).bearer_auth(credential.secret());

        let response = self.execute_with_retry(request).await?;
        let stocks: StocksResponse = self.handle_response(response, "stocks").await?;

        Ok(stocks.into_listings())
    }

    async fn get_series(&self, credential: &AccessToken, ticker: &Ticker, window: Window)
        -> Result<Series, MarketDataError> {
        let url = format!("{}/stocks/{}", self.base_url(), ticker);
        let request = self
            .http
            .get(&url)
            .query(&[("minutes", window.minutes())])
            .bearer_auth(credential.secret());

        let response = self.execute_with_retry(request).await?;
        let history: PriceHistoryResponse = self.handle_response(response, ticker.as_str()).await?;

        let (series, dropped) = history.into_series();
        if dropped > 0 {
            tracing::warn!("Dropped {} invalid price points for {}", dropped, ticker);
        }

        Ok(series)
    }
}

#[async_trait]
impl CredentialProvider for StockApiClient {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        self.authenticate().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_api_config_default() {
        let config = StockApiConfig::default();
        assert!(config.client_id.is_none());
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_client_creation() {
        let client = StockApiClient::new(StockApiConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = StockApiClient::new(StockApiConfig {
            base_url: "http://example.test/api/".into(),
            ..StockApiConfig::default()
        })
        .unwrap();

        assert_eq!(client.base_url(), "http://example.test/api");
    }

    #[test]
    fn test_retry_decisions() {
        assert_eq!(retry_decision(StatusCode::OK, 0, 5), RetryDecision::Accept);
        assert_eq!(retry_decision(StatusCode::UNAUTHORIZED, 0, 5), RetryDecision::Accept);
        assert_eq!(retry_decision(StatusCode::NOT_FOUND, 2, 5), RetryDecision::Accept);
        assert_eq!(
            retry_decision(StatusCode::TOO_MANY_REQUESTS, 0, 5),
            RetryDecision::RetryAfter(Duration::from_secs(2))
        );
        assert_eq!(
            retry_decision(StatusCode::TOO_MANY_REQUESTS, 2, 5),
            RetryDecision::RetryAfter(Duration::from_secs(8))
        );
        assert_eq!(
            retry_decision(StatusCode::BAD_GATEWAY, 1, 5),
            RetryDecision::RetryAfter(Duration::from_millis(1000))
        );
    }

    #[test]
    fn test_final_attempt_never_backs_off() {
        assert_eq!(retry_decision(StatusCode::TOO_MANY_REQUESTS, 2, 3), RetryDecision::Accept);
        assert_eq!(retry_decision(StatusCode::SERVICE_UNAVAILABLE, 2, 3), RetryDecision::Accept);
        assert_eq!(retry_decision(StatusCode::TOO_MANY_REQUESTS, 0, 1), RetryDecision::Accept);
        assert_eq!(
            retry_decision(StatusCode::TOO_MANY_REQUESTS, 1, 3),
            RetryDecision::RetryAfter(Duration::from_secs(4))
        );
    }

    #[tokio::test]
    async fn test_authenticate_requires_client_credentials() {
        let client = StockApiClient::new(StockApiConfig::default()).unwrap();
        let result = client.authenticate().await;
        assert!(matches!(result, Err(AuthError::MissingCredential(_))));
    }
}
