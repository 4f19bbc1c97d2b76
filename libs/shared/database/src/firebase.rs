use anyhow::{Result, anyhow};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Read-only access to the Firebase Realtime Database REST interface.
pub struct FirebaseClient {
    client: Client,
    database_url: String,
    api_key: String,
}

impl FirebaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            database_url: config.firebase_database_url.trim_end_matches('/').to_string(),
            api_key: config.firebase_api_key.clone(),
        }
    }

    pub fn node_url(&self, node_path: &str) -> String {
        format!("{}/{}.json", self.database_url, node_path.trim_matches('/'))
    }

    /// Fetch the value stored at `node_path`. An absent node reads as `None`.
    pub async fn get_value<T>(&self, node_path: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.node_url(node_path);
        debug!("Reading realtime database node {}", url);

        let mut req = self.client.get(&url);
        if !self.api_key.is_empty() {
            req = req.query(&[("auth", self.api_key.as_str())]);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Realtime database error ({}): {}", status, error_text);
            return Err(anyhow!("Realtime database error ({}): {}", status, error_text));
        }

        let value = response.json::<Value>().await?;
        if value.is_null() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_value(value)?))
    }
}
