use std::fmt;
use std::time::Duration;

use crate::poll::PollConfig;

/// Environment variable holding the BFL API key.
pub const API_KEY_ENV: &str = "BFL_API_KEY";

/// Default model endpoint.
pub const DEFAULT_API_URL: &str = "https://api.bfl.ai/v1/flux-kontext-pro";

/// Image provider configuration loaded from environment variables.
///
/// A missing API key is not a startup error: the server still runs and
/// each generation request reports the missing credential instead.
#[derive(Clone)]
pub struct BflConfig {
    /// `x-key` credential. `None` when unset or blank.
    pub api_key: Option<String>,
    /// Model endpoint jobs are submitted to.
    pub api_url: String,
    /// Poll interval and per-job deadline.
    pub poll: PollConfig,
}

impl BflConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                                   |
    /// |--------------------------|-------------------------------------------|
    /// | `BFL_API_KEY`            | unset                                     |
    /// | `BFL_API_URL`            | `https://api.bfl.ai/v1/flux-kontext-pro`  |
    /// | `BFL_POLL_INTERVAL_MS`   | `500`                                     |
    /// | `BFL_POLL_DEADLINE_SECS` | `90`                                      |
    pub fn from_env() -> Self {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let api_url = std::env::var("BFL_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());

        let defaults = PollConfig::default();

        let interval = env_positive_u64("BFL_POLL_INTERVAL_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.interval);

        let deadline = env_positive_u64("BFL_POLL_DEADLINE_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.deadline);

        Self {
            api_key,
            api_url,
            poll: PollConfig { interval, deadline },
        }
    }
}

/// Read `var` as a positive integer, or `None` when unset.
///
/// Panics on an unparseable or zero value so misconfiguration fails at
/// startup. A zero interval would poll the provider in a tight loop.
fn env_positive_u64(var: &str) -> Option<u64> {
    let raw = std::env::var(var).ok()?;
    Some(parse_positive_u64(var, &raw).unwrap_or_else(|e| panic!("{e}")))
}

fn parse_positive_u64(var: &str, raw: &str) -> Result<u64, String> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(format!("{var} must be greater than zero")),
        Ok(value) => Ok(value),
        Err(_) => Err(format!("{var} must be a valid u64, got '{raw}'")),
    }
}

impl fmt::Debug for BflConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BflConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("poll", &self.poll)
            .finish()
    }
}
