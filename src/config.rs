//! Bridge configuration

use reqwest::Url;

/// Endpoint used when none is configured
pub const DEFAULT_ENDPOINT: &str = "/chat";

/// Origin that relative endpoints resolve against
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Where the agent lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Absolute URL, or a path resolved against `base_url`
    pub endpoint: String,
    pub base_url: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            endpoint: var("AGENT_BRIDGE_ENDPOINT")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.endpoint),
            base_url: var("AGENT_BRIDGE_BASE_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.base_url),
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The URL requests are posted to.
    ///
    /// An endpoint that is already absolute is used as-is. Anything that
    /// cannot be resolved is returned unchanged and fails on first use.
    pub fn endpoint_url(&self) -> String {
        if Url::parse(&self.endpoint).is_ok() {
            return self.endpoint.clone();
        }
        Url::parse(&self.base_url)
            .and_then(|base| base.join(&self.endpoint))
            .map_or_else(|_| self.endpoint.clone(), String::from)
    }
}
