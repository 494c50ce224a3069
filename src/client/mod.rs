//! HTTP task source backed by the server's REST API

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::config::AppConfig;
use crate::source::{TaskSource, TransportError};
use crate::task::{TaskDetail, TaskSnapshot};

const API_KEY_HEADER: &str = "X-Octopus-ApiKey";
const PAGE_SIZE: usize = 30;

/// One page of a collection resource
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResourceCollection<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    total_results: usize,
}

/// Task server client
#[derive(Debug, Clone)]
pub struct ServerClient {
    client: Client,
    base_url: Url,
    space_id: String,
    api_key: String,
}

impl ServerClient {
    pub fn new(
        base_url: &str,
        space_id: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(format!("taskwait/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        let base_url = Url::parse(base_url).map_err(|e| {
            TransportError::ConfigError(format!("invalid server URL {}: {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::ConfigError(format!(
                "invalid server URL {}",
                base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            space_id: space_id.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Build a client from application configuration
    pub fn from_config(config: &AppConfig) -> Result<Self, TransportError> {
        let base_url = config.server_url.as_deref().ok_or_else(|| {
            TransportError::ConfigError(
                "server URL is not configured (use --server or OCTOPUS_URL)".to_string(),
            )
        })?;
        let api_key = config.resolve_api_key().ok_or_else(|| {
            TransportError::ConfigError(
                "API key is not configured (use --api-key or OCTOPUS_API_KEY)".to_string(),
            )
        })?;

        Self::new(
            base_url,
            &config.space_id,
            &api_key,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// `{server}/api/{space}/{segments...}`, each segment percent-encoded
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push("api")
                .push(&self.space_id)
                .extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, TransportError> {
        let response = self
            .client
            .get(self.url(segments))
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TransportError::StatusError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl TaskSource for ServerClient {
    async fn fetch_snapshots(&self, task_ids: &[String]) -> Result<Vec<TaskSnapshot>, TransportError> {
        let ids = task_ids.join(",");
        let mut tasks = Vec::new();

        loop {
            let page: ResourceCollection<TaskSnapshot> = self
                .get_json(
                    &["tasks"],
                    &[
                        ("ids", ids.clone()),
                        ("skip", tasks.len().to_string()),
                        ("take", PAGE_SIZE.to_string()),
                    ],
                )
                .await?;

            let fetched = page.items.len();
            tasks.extend(page.items);

            if fetched == 0 || tasks.len() >= page.total_results {
                break;
            }
        }

        tracing::debug!("Fetched {} task snapshot(s)", tasks.len());
        Ok(tasks)
    }

    async fn fetch_details(&self, task_id: &str) -> Result<TaskDetail, TransportError> {
        self.get_json(
            &["tasks", task_id, "details"],
            &[("verbose", "false".to_string())],
        )
        .await
    }
}
