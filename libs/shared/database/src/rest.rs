use reqwest::{
    Client, Method, Response,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_models::error::AppError;

/// JSON client for the clinic REST API.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.schedule_api_url.trim_end_matches('/').to_string(),
            api_key: config.schedule_api_key.clone(),
        }
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if !self.api_key.is_empty() {
            match HeaderValue::from_str(&self.api_key) {
                Ok(value) => {
                    headers.insert("apikey", value);
                }
                Err(_) => warn!("API key contains invalid header characters, omitting it"),
            }
        }

        headers
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Response, AppError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut req = self.client.request(method, &url).headers(self.get_headers());

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::from_status(status, &error_text));
        }

        Ok(response)
    }

    /// Issue a request and decode the JSON response body.
    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(method, path, body).await?;
        let text = response.text().await?;
        let data = serde_json::from_str::<T>(&text)?;
        Ok(data)
    }

    /// Like [`RestClient::request`], but an empty response body decodes as `None`.
    pub async fn request_optional<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(method, path, body).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str::<T>(&text)?))
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
