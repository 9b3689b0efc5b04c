use async_trait::async_trait;
use url::Url;

use crate::config::{AUTH_API_KEY, AUTH_PROJECT_ID, DOCSTORE_API_URL};
use crate::utils::http_client;

use super::errors::ProfileError;
use super::store::{ProfileStore, USERS_COLLECTION};
use super::types::ProfileRecord;

/// Client for the managed document store's REST API.
///
/// Documents are plain JSON addressed as
/// `<base>/projects/<project>/documents/users/<uid>`; a missing document is a
/// 404, a write is a full-replace PUT.
pub struct RestProfileStore {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl RestProfileStore {
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Build a store from the environment-sourced connection parameters.
    pub fn from_env() -> Self {
        let base_url = Url::parse(&format!(
            "{}/projects/{}/documents",
            DOCSTORE_API_URL.trim_end_matches('/'),
            *AUTH_PROJECT_ID
        ))
        .expect("DOCSTORE_API_URL must be a valid URL");
        Self::new(base_url, AUTH_API_KEY.to_string())
    }

    fn document_url(&self, uid: &str) -> String {
        format!(
            "{}/{}/{}?key={}",
            self.base_url.as_str().trim_end_matches('/'),
            USERS_COLLECTION,
            uid,
            self.api_key
        )
    }
}

#[async_trait]
impl ProfileStore for RestProfileStore {
    async fn get(&self, uid: &str) -> Result<Option<ProfileRecord>, ProfileError> {
        let response = self
            .client
            .get(self.document_url(uid))
            .send()
            .await
            .map_err(|e| ProfileError::Storage(e.to_string()))?;

        match response.status() {
            reqwest::StatusCode::OK => {}
            reqwest::StatusCode::NOT_FOUND => return Ok(None),
            status => return Err(ProfileError::Storage(status.to_string())),
        }

        let response_body = response
            .text()
            .await
            .map_err(|e| ProfileError::Storage(e.to_string()))?;
        tracing::debug!("Profile record for {uid}: {response_body}");
        let record = serde_json::from_str(&response_body)
            .map_err(|e| ProfileError::Serde(format!("Failed to deserialize record: {e}")))?;
        Ok(Some(record))
    }

    async fn put(&self, uid: &str, record: &ProfileRecord) -> Result<(), ProfileError> {
        let response = self
            .client
            .put(self.document_url(uid))
            .json(record)
            .send()
            .await
            .map_err(|e| ProfileError::Storage(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProfileError::Storage(response.status().to_string()));
        }
        tracing::debug!("Wrote profile record for {uid}");
        Ok(())
    }

    async fn exists(&self, uid: &str) -> Result<bool, ProfileError> {
        let response = self
            .client
            .head(self.document_url(uid))
            .send()
            .await
            .map_err(|e| ProfileError::Storage(e.to_string()))?;

        match response.status() {
            reqwest::StatusCode::OK => Ok(true),
            reqwest::StatusCode::NOT_FOUND => Ok(false),
            status => Err(ProfileError::Storage(status.to_string())),
        }
    }
}
