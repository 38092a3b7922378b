use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde_json::Value;
use snafu::ResultExt;
use tracing::debug;

use crate::error::{ActionRejectedSnafu, LoadFailureSnafu, SyncError, TransportFailureSnafu};
use crate::models::Roster;

/// Thin client for the activities backend.
#[derive(Debug, Clone)]
pub struct ActivitiesClient {
    http: Client,
    base_url: Url,
}

/// A signup the backend accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupAccepted {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: Option<String>,
}

impl ActivitiesClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// `GET /activities`
    pub async fn list_activities(&self) -> Result<Roster, SyncError> {
        let url = self.endpoint(&["activities"]);
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .context(TransportFailureSnafu { url: url.as_str() })?;

        let status = resp.status();
        if !status.is_success() {
            return LoadFailureSnafu {
                reason: format!("HTTP {}", status),
            }
            .fail();
        }

        let body = resp
            .bytes()
            .await
            .context(TransportFailureSnafu { url: url.as_str() })?;
        let roster = Roster::from_json_slice(&body).map_err(|e| {
            LoadFailureSnafu {
                reason: format!("malformed listing: {}", e),
            }
            .build()
        })?;
        debug!(activities = roster.len(), "activities listing received");
        Ok(roster)
    }

    /// `POST /activities/{name}/signup?email={email}`
    pub async fn signup(&self, activity: &str, email: &str) -> Result<SignupAccepted, SyncError> {
        let url = self.endpoint(&["activities", activity, "signup"]);
        let resp = self
            .http
            .post(url.clone())
            .query(&[("email", email)])
            .send()
            .await
            .context(TransportFailureSnafu { url: url.as_str() })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(rejected("signup", resp).await);
        }

        // The signup already happened once we see 2xx, so an odd body only loses the text.
        let message = match resp.json::<MessageBody>().await {
            Ok(body) => body.message,
            Err(e) => {
                debug!(error = %e, "signup response had no readable message");
                None
            }
        };
        Ok(SignupAccepted { message })
    }

    /// `DELETE /activities/{name}/participants/{email}`
    pub async fn remove_participant(&self, activity: &str, email: &str) -> Result<(), SyncError> {
        let url = self.endpoint(&["activities", activity, "participants", email]);
        let resp = self
            .http
            .delete(url.clone())
            .send()
            .await
            .context(TransportFailureSnafu { url: url.as_str() })?;

        if !resp.status().is_success() {
            return Err(rejected("removal", resp).await);
        }
        Ok(())
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Base URLs are validated as http(s) when configured, so this cannot fail.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

async fn rejected(action: &'static str, resp: Response) -> SyncError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    ActionRejectedSnafu {
        action,
        status,
        detail: extract_detail(&body),
    }
    .build()
}

/// Pulls a string `detail` out of an error body, verbatim. Validation errors
/// carry a list under `detail`; those yield `None`.
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(|d| d.as_str())
        .map(|s| s.to_string())
}
