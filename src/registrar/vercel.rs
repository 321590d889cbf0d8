use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::{json, Value};

use super::{DomainRegistrar, RegistrarError};
use crate::config::RegistrarConfig;

/// Client for a Vercel-style project domains API.
pub struct HttpRegistrar {
    client: reqwest::Client,
    base_url: Url,
    token: String,
    project_id: String,
    team_id: Option<String>,
}

impl HttpRegistrar {
    pub fn new(config: &RegistrarConfig) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| format!("Failed to build registrar client: {e}"))?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| format!("Invalid registrar base URL {}: {e}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(format!("Invalid registrar base URL {}", config.base_url));
        }

        Ok(Self {
            client,
            base_url,
            token: config.token.clone(),
            project_id: config.project_id.clone(),
            team_id: config.team_id.clone(),
        })
    }

    fn domains_url(&self, domain: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v9", "projects", self.project_id.as_str(), "domains"]);
            if let Some(domain) = domain {
                segments.push(domain);
            }
        }
        if let Some(team_id) = &self.team_id {
            url.query_pairs_mut().append_pair("teamId", team_id);
        }
        url
    }
}

/// Pull the registrar's own error message out of a response body, if it sent one.
fn error_message(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    if error.is_null() {
        return None;
    }
    Some(
        error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Domain request was rejected")
            .to_string(),
    )
}

#[async_trait]
impl DomainRegistrar for HttpRegistrar {
    async fn add_domain(&self, domain: &str) -> Result<Value, RegistrarError> {
        let resp = self
            .client
            .post(self.domains_url(None))
            .bearer_auth(&self.token)
            .json(&json!({ "name": domain }))
            .send()
            .await
            .map_err(|e| RegistrarError::Transport(format!("add domain request failed: {e}")))?;

        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(Value::Null);

        if let Some(message) = error_message(&body) {
            tracing::info!(%domain, %status, "Registrar rejected domain: {message}");
            return Err(RegistrarError::Rejected(message));
        }
        if status.is_server_error() {
            return Err(RegistrarError::Transport(format!(
                "registrar responded with {status}"
            )));
        }
        if !status.is_success() {
            return Err(RegistrarError::Rejected(format!(
                "Domain could not be added ({status})"
            )));
        }

        tracing::debug!(%domain, "Domain reserved with registrar");
        Ok(body)
    }

    async fn remove_domain(&self, domain: &str) -> Result<(), RegistrarError> {
        let resp = self
            .client
            .delete(self.domains_url(Some(domain)))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| RegistrarError::Transport(format!("remove domain request failed: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            tracing::debug!(%domain, "Domain released with registrar");
            return Ok(());
        }

        let body: Value = resp.json().await.unwrap_or(Value::Null);
        let message =
            error_message(&body).unwrap_or_else(|| format!("registrar responded with {status}"));
        if status.is_server_error() {
            Err(RegistrarError::Transport(message))
        } else {
            Err(RegistrarError::Rejected(message))
        }
    }
}
