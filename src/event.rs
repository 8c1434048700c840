//! Inbound deploy event structures

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

/// Context tag the hosting platform sends for preview deployments.
pub const PREVIEW_CONTEXT: &str = "deploy-preview";

/// Wrapper the hosting platform puts around the deploy payload.
#[derive(Debug, Deserialize, Default)]
struct RequestBody {
    #[serde(default)]
    payload: DeployEvent,
}

/// Superset of every payload variant the platform has sent for a
/// successful deploy. Fields missing from older variants stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeployEvent {
    #[serde(default, deserialize_with = "string_or_none")]
    pub context: Option<String>,
    /// Oldest variant carried the live URL here.
    #[serde(default, deserialize_with = "string_or_none")]
    pub deploy_url: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub deploy_ssl_url: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub review_url: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub commit_ref: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub deploy_id: Option<String>,
}

/// A field of the wrong JSON type is dropped on its own; the rest of the
/// event still decodes.
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        Value::Null => Ok(None),
        other => {
            warn!("Ignoring non-string deploy event field: {}", other);
            Ok(None)
        }
    }
}

impl DeployEvent {
    pub fn context(&self) -> &str {
        self.context.as_deref().unwrap_or("")
    }

    /// Returns true only for an exact match on the preview context tag.
    pub fn is_preview(&self) -> bool {
        self.context() == PREVIEW_CONTEXT
    }

    /// Live URL of the deploy, preferring the https one.
    pub fn deploy_url(&self) -> Option<&str> {
        non_empty(&self.deploy_ssl_url).or_else(|| non_empty(&self.deploy_url))
    }

    pub fn commit(&self) -> Option<&str> {
        non_empty(&self.commit_ref)
    }

    pub fn deployment_id(&self) -> Option<&str> {
        non_empty(&self.deploy_id)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Decode the inbound body. Anything that does not decode yields an empty
/// event, which never classifies as a preview.
pub fn parse_event(body: &[u8]) -> DeployEvent {
    match serde_json::from_slice::<RequestBody>(body) {
        Ok(request) => {
            if let Some(review_url) = &request.payload.review_url {
                debug!("Review URL: {}", review_url);
            }
            request.payload
        }
        Err(e) => {
            warn!("Could not parse deploy event body: {}", e);
            DeployEvent::default()
        }
    }
}
