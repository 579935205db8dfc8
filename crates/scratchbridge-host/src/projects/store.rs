use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use scratchbridge_core::error::{BridgeError, Result};

use super::types::{NewProject, Project, ProjectUpdate};
use crate::config::StoreSection;

/// Project persistence backend.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Project>;
    async fn create(&self, project: &NewProject) -> Result<Project>;
    async fn update(&self, id: &str, update: &ProjectUpdate) -> Result<Project>;
}

/// `ProjectStore` over the platform's REST API (`/projects`).
pub struct RestProjectStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl RestProjectStore {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BridgeError::Store(format!("http client init failed: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_section(section: &StoreSection) -> Result<Self> {
        Self::new(section.base_url.as_str(), section.resolved_token())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T> {
        let resp = self
            .authed(req)
            .send()
            .await
            .map_err(|e| BridgeError::Store(format!("{what}: request failed: {e}")))?;
        read_json(resp, what).await
    }
}

async fn read_json<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(BridgeError::Unauthorized);
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(BridgeError::Store(format!("{what}: {status}: {body}")));
    }
    resp.json::<T>()
        .await
        .map_err(|e| BridgeError::Store(format!("{what}: invalid response body: {e}")))
}

#[async_trait]
impl ProjectStore for RestProjectStore {
    async fn get(&self, id: &str) -> Result<Project> {
        let req = self.client.get(self.url(&format!("projects/{id}")));
        self.send(req, "get project").await
    }

    async fn create(&self, project: &NewProject) -> Result<Project> {
        let req = self.client.post(self.url("projects")).json(project);
        self.send(req, "create project").await
    }

    async fn update(&self, id: &str, update: &ProjectUpdate) -> Result<Project> {
        let req = self.client.put(self.url(&format!("projects/{id}"))).json(update);
        self.send(req, "update project").await
    }
}
