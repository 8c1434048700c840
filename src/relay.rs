//! Deploy event relay: parse, classify, and forward preview deploys.

use reqwest::{StatusCode, Url};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::error::Result;
use crate::event::parse_event;
use crate::trigger::{TriggerClient, TriggerRequest};

/// Acknowledgment body returned to the hosting platform.
pub const ACKNOWLEDGMENT: &str = "Success";

/// How one invocation ended, short of a transport failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Context was not a preview deploy; nothing was sent.
    Skipped { context: String },
    /// The trigger request was sent. `status` is whatever the endpoint
    /// answered, success or not.
    Forwarded { url: Url, status: StatusCode },
}

/// Runs one invocation against `body`. An `Err` means the trigger request
/// could not be sent at all.
pub async fn relay(client: &TriggerClient, body: &[u8]) -> Result<RelayOutcome> {
    let invocation_id = Uuid::now_v7();
    let span = info_span!("relay", %invocation_id);

    async move {
        let event = parse_event(body);

        if !event.is_preview() {
            info!("context {:?} detected, skipping", event.context());
            return Ok(RelayOutcome::Skipped {
                context: event.context().to_string(),
            });
        }

        let request = TriggerRequest::from_event(&event);
        let (url, status) = client.send(&request).await?;
        Ok(RelayOutcome::Forwarded { url, status })
    }
    .instrument(span)
    .await
}
