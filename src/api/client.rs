use crate::feed::{Match, Question};
use crate::infrastructure::http_base;
use crate::types::{Envelope, LiveFeedError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// REST companion to the realtime feed.
///
/// Every endpoint answers with `{success, data}` or `{success, message}`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Client for an HTTP base URL such as `https://api.example.com/`.
    pub fn new(base: impl AsRef<str>) -> Result<Self> {
        let mut base = Url::parse(base.as_ref())?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    /// Client for the HTTP origin behind a realtime endpoint (`wss://host/socket` → `https://host/`).
    pub fn for_endpoint(endpoint: &Url) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            base: http_base(endpoint)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn live_matches(&self) -> Result<Vec<Match>> {
        self.get("api/matches/live").await
    }

    pub async fn refresh_live_matches(&self) -> Result<Option<String>> {
        self.post_ack("api/matches/live/refresh").await
    }

    pub async fn match_questions(&self, match_id: &str) -> Result<Vec<Question>> {
        self.get(&format!("api/matches/{}/questions", match_id)).await
    }

    pub async fn fixture(&self, fixture_id: &str) -> Result<Value> {
        self.get(&format!("api/fixtures/{}", fixture_id)).await
    }

    pub async fn player(&self, player_id: &str) -> Result<Value> {
        self.get(&format!("api/players/{}", player_id)).await
    }

    pub async fn health(&self) -> Result<Value> {
        self.get("api/health").await
    }

    pub async fn monitoring_status(&self) -> Result<Value> {
        self.get("api/monitoring/status").await
    }

    pub async fn test_connection(&self) -> Result<Value> {
        self.get("api/test-connection").await
    }

    /// Asks the backend to generate questions for a match.
    pub async fn generate_questions(&self, match_id: &str) -> Result<Option<String>> {
        self.post_ack(&format!("api/matches/{}/questions/generate", match_id))
            .await
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!("GET {}", url);
        let response = self.http.get(url).send().await?;
        Self::envelope::<T>(path, response).await?.into_result()
    }

    async fn post_ack(&self, path: &str) -> Result<Option<String>> {
        let url = self.url(path)?;
        tracing::debug!("POST {}", url);
        let response = self.http.post(url).send().await?;
        Self::envelope::<Value>(path, response).await?.into_ack()
    }

    async fn envelope<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<Envelope<T>> {
        let status = response.status();
        if !status.is_success() {
            // Error bodies usually still carry `{success: false, message}`
            let message = response
                .json::<Envelope<Value>>()
                .await
                .ok()
                .and_then(|envelope| envelope.message);
            return Err(LiveFeedError::Api(format!(
                "{} failed with status {}{}",
                path,
                status,
                message.map(|m| format!(": {}", m)).unwrap_or_default()
            )));
        }
        Ok(response.json::<Envelope<T>>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_join_under_base() {
        let api = ApiClient::new("https://api.example.com/v1").unwrap();
        assert_eq!(
            api.url("api/matches/live").unwrap().as_str(),
            "https://api.example.com/v1/api/matches/live"
        );
    }

    #[test]
    fn test_base_from_realtime_endpoint() {
        let endpoint = Url::parse("wss://feed.example.com/socket?x=1").unwrap();
        let api = ApiClient::for_endpoint(&endpoint).unwrap();
        assert_eq!(api.base_url().as_str(), "https://feed.example.com/");
        assert_eq!(
            api.url("api/matches/m1/questions").unwrap().as_str(),
            "https://feed.example.com/api/matches/m1/questions"
        );
    }

    #[test]
    fn test_rejects_malformed_base() {
        assert!(ApiClient::new("::nope").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_an_http_error() {
        let api = ApiClient::new("http://127.0.0.1:1/").unwrap();
        assert!(matches!(api.health().await, Err(LiveFeedError::Http(_))));
    }
}
