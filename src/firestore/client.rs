use henro_core::{Document, DocumentKey, DocumentStore, StoreError};

use super::encode::document_body;
use crate::config::FirestoreConfig;

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
/// Bearer token the emulator accepts as an admin.
const EMULATOR_TOKEN: &str = "owner";

/// Writes documents into one Firestore collection.
#[derive(Debug)]
pub struct FirestoreStore {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    database: String,
    collection: String,
    token: String,
}

impl FirestoreStore {
    /// Creates a store against the production endpoint.
    pub fn new(project_id: String, collection: String, token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id,
            database: "(default)".to_string(),
            collection,
            token,
        }
    }

    /// Creates a store from config.
    ///
    /// Returns an error if the project or the credentials are not configured.
    pub fn from_config(config: &FirestoreConfig) -> Result<Self, StoreError> {
        let project_id = config.project_id.clone().ok_or_else(|| {
            StoreError::Credentials("firestore.project_id is not configured".to_string())
        })?;

        let mut store = match &config.emulator_host {
            Some(host) => Self::new(project_id, config.collection.clone(), EMULATOR_TOKEN.into())
                .with_base_url(format!("http://{}", host)),
            None => Self::new(project_id, config.collection.clone(), access_token(config)?),
        };
        store.database = config.database.clone();

        Ok(store)
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Full REST URL of the document stored under `key`.
    fn document_url(&self, key: &DocumentKey) -> String {
        format!(
            "{}/v1/projects/{}/databases/{}/documents/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            self.database,
            self.collection.trim_matches('/'),
            urlencoding::encode(key.as_str())
        )
    }
}

impl DocumentStore for FirestoreStore {
    async fn set(&mut self, key: &DocumentKey, document: &Document) -> Result<(), StoreError> {
        let url = self.document_url(key);

        let response = self
            .http
            .patch(&url)
            .bearer_auth(&self.token)
            .json(&document_body(document))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(())
    }
}

/// Resolves the bearer token, preferring an inline token over a token file.
fn access_token(config: &FirestoreConfig) -> Result<String, StoreError> {
    if let Some(token) = &config.credentials.access_token {
        return Ok(token.clone());
    }

    let path = config.credentials.access_token_file.as_ref().ok_or_else(|| {
        StoreError::Credentials(
            "set firestore.credentials.access_token or access_token_file".to_string(),
        )
    })?;
    let token = std::fs::read_to_string(path)
        .map_err(|e| StoreError::Credentials(format!("{}: {}", path.display(), e)))?;

    let token = token.trim();
    if token.is_empty() {
        return Err(StoreError::Credentials(format!(
            "{} is empty",
            path.display()
        )));
    }
    Ok(token.to_string())
}

/// Pulls `error.message` out of a Google API error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
