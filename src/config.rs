use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, InvalidValueSnafu};
use crate::services::roster_sync_service::{ActionOrdering, SyncOptions};

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_MESSAGE_TTL_MS: u64 = 5000;
const DEFAULT_OUTPUT_PATH: &str = "board.html";

#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub api_url: Url,
    pub output_path: PathBuf,
    pub sync: SyncOptions,
}

impl BoardConfig {
    /// Reads `ACTIVITIES_API_URL`, `MESSAGE_TTL_MS`, `BOARD_OUTPUT_PATH` and
    /// `SERIALIZE_ACTIONS` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = parse_api_url(
            &lookup("ACTIVITIES_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        )?;

        let message_ttl = match lookup("MESSAGE_TTL_MS") {
            Some(raw) => {
                let ms = raw.trim().parse::<u64>().map_err(|_| {
                    InvalidValueSnafu {
                        key: "MESSAGE_TTL_MS",
                        value: raw.clone(),
                        reason: "expected milliseconds",
                    }
                    .build()
                })?;
                Duration::from_millis(ms)
            }
            None => Duration::from_millis(DEFAULT_MESSAGE_TTL_MS),
        };

        let output_path = lookup("BOARD_OUTPUT_PATH")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string());

        let ordering = match lookup("SERIALIZE_ACTIONS") {
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => ActionOrdering::PerActivity,
                "0" | "false" | "no" | "off" | "" => ActionOrdering::Overlapping,
                _ => {
                    return InvalidValueSnafu {
                        key: "SERIALIZE_ACTIONS",
                        value: raw,
                        reason: "expected true or false",
                    }
                    .fail()
                }
            },
            None => ActionOrdering::Overlapping,
        };

        Ok(Self {
            api_url,
            output_path: PathBuf::from(output_path),
            sync: SyncOptions {
                message_ttl,
                ordering,
            },
        })
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        InvalidValueSnafu {
            key: "ACTIVITIES_API_URL",
            value: raw,
            reason: e.to_string(),
        }
        .build()
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return InvalidValueSnafu {
            key: "ACTIVITIES_API_URL",
            value: raw,
            reason: "expected an http(s) base URL",
        }
        .fail();
    }
    Ok(url)
}
