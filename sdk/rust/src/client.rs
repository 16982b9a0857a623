use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A traffic counter as returned by the stats endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: i64,
}

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("user API returned status {0}")]
    Status(StatusCode),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl SdkError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SdkError::Status(code) => Some(*code),
            SdkError::Transport(e) => e.status(),
        }
    }
}

pub struct UserApiClient {
    client: Client,
    base_url: String,
}

impl UserApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .no_proxy()
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn add_user(&self, email: &str, uuid: &str) -> Result<(), SdkError> {
        self.get("add-user", &[("email", email), ("uuid", uuid)]).await?;
        Ok(())
    }

    pub async fn remove_user(&self, email: &str) -> Result<(), SdkError> {
        self.get("remove-user", &[("email", email)]).await?;
        Ok(())
    }

    pub async fn query_user_traffic(&self, email: &str) -> Result<Vec<StatRecord>, SdkError> {
        self.stats("query-user-traffic", &[("email", email)]).await
    }

    pub async fn query_traffic(&self) -> Result<Vec<StatRecord>, SdkError> {
        self.stats("query-traffic", &[]).await
    }

    /// Returns the counter values from before the reset.
    pub async fn reset_user_traffic(&self, email: &str) -> Result<Vec<StatRecord>, SdkError> {
        self.stats("reset-user-traffic", &[("email", email)]).await
    }

    /// Returns the counter values from before the reset.
    pub async fn reset_traffic(&self) -> Result<Vec<StatRecord>, SdkError> {
        self.stats("reset-traffic", &[]).await
    }

    /// Issue a raw GET, e.g. to exercise parameter handling.
    pub async fn get_raw(&self, path_and_query: &str) -> Result<Response, reqwest::Error> {
        self.client
            .get(format!("{}{}", self.base_url, path_and_query))
            .send()
            .await
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response, SdkError> {
        let resp = self
            .client
            .get(format!("{}/{}", self.base_url, path))
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SdkError::Status(status));
        }
        Ok(resp)
    }

    async fn stats(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<StatRecord>, SdkError> {
        let resp = self.get(path, query).await?;
        Ok(resp.json().await?)
    }
}
