//! Outbound request to the trigger endpoint.

use reqwest::{Client, StatusCode, Url};
use tracing::{info, warn};

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::event::{DeployEvent, PREVIEW_CONTEXT};

/// Sent as `sha` when the deploy event carries no commit.
pub const MISSING_COMMIT: &str = "not-available";

/// Normalized fields forwarded for one preview deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerRequest {
    pub sha: String,
    pub environment_url: String,
    pub environment_name: &'static str,
    pub deployment_id: Option<String>,
}

impl TriggerRequest {
    pub fn from_event(event: &DeployEvent) -> Self {
        let environment_url = event.deploy_url().unwrap_or_default();
        if environment_url.is_empty() {
            warn!("Preview deploy event has no deploy URL; forwarding an empty environmentUrl");
        }

        Self {
            sha: event.commit().unwrap_or(MISSING_COMMIT).to_string(),
            environment_url: environment_url.to_string(),
            environment_name: PREVIEW_CONTEXT,
            deployment_id: event.deployment_id().map(String::from),
        }
    }

    /// Query parameters in the order they are sent.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![
            ("sha", self.sha.as_str()),
            ("environmentUrl", self.environment_url.as_str()),
            ("environmentName", self.environment_name),
        ];
        if let Some(deployment_id) = &self.deployment_id {
            pairs.push(("deployment", "true"));
            pairs.push(("deploymentId", deployment_id.as_str()));
        }
        pairs
    }

    /// Appends the parameters to `base`, keeping any query it already has.
    pub fn to_url(&self, base: &str) -> Result<Url> {
        let mut url = Url::parse(base).map_err(|e| RelayError::InvalidTriggerUrl {
            url: base.to_string(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut().extend_pairs(self.query_pairs());
        Ok(url)
    }
}

/// HTTP client for the trigger endpoint.
#[derive(Debug, Clone)]
pub struct TriggerClient {
    client: Client,
    base_url: String,
}

impl TriggerClient {
    /// No timeout is configured; the transport default applies.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().build().map_err(RelayError::Transport)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        Self::new(config.trigger_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues a single GET. Any HTTP status counts as delivered; only a
    /// request that could not be sent is an error.
    pub async fn send(&self, request: &TriggerRequest) -> Result<(Url, StatusCode)> {
        let url = request.to_url(&self.base_url)?;
        info!("Forwarding preview deploy to {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status.is_success() {
            info!("Trigger endpoint responded with status {}", status);
        } else {
            warn!("Trigger endpoint responded with status {}", status);
        }

        Ok((url, status))
    }
}
