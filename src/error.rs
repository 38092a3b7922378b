use snafu::Snafu;

/// Failures of the three roster operations.
///
/// Every variant is turned into a notice where it happens; the operations
/// still return it so callers can log.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SyncError {
    /// The listing came back with a non-2xx status or an unreadable body.
    #[snafu(display("activities could not be loaded: {reason}"))]
    LoadFailure { reason: String },

    /// The backend declined a signup or removal.
    #[snafu(display(
        "{action} rejected with HTTP {status}: {}",
        detail.as_deref().unwrap_or("no detail")
    ))]
    ActionRejected {
        action: &'static str,
        status: u16,
        detail: Option<String>,
    },

    #[snafu(display("request to {url} failed: {source}"))]
    TransportFailure { url: String, source: reqwest::Error },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("invalid {key} {value:?}: {reason}"))]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}
