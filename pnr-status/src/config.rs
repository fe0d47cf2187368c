use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_PARTNER_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_ENQUIRY_TIMEOUT_SECS: u64 = 15;
pub const MAX_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Invalid PORT override: {0}")]
    InvalidPortOverride(String),

    #[error("Unsupported upstream URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Upstream timeout must be between 1 and 120 seconds, got {0}")]
    InvalidTimeout(u64),

    #[error("Empty {0} header for the enquiry upstream")]
    EmptyHeader(&'static str),
}

/// Gateway configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for incoming status requests
    #[serde(default)]
    pub listener: Listener,
    /// The upstream status provider. Exactly one is active per process.
    pub upstream: UpstreamConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.upstream.validate()
    }

    /// Applies the value of the `PORT` environment variable, if set.
    pub fn apply_port_override(&mut self, value: Option<&str>) -> Result<(), ValidationError> {
        let Some(value) = value else {
            return Ok(());
        };

        match value.trim().parse::<u16>() {
            Ok(port) if port != 0 => {
                self.listener.port = port;
                Ok(())
            }
            _ => Err(ValidationError::InvalidPortOverride(value.to_string())),
        }
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "0.0.0.0".into(),
            port: 5000,
        }
    }
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpstreamConfig {
    /// Partner status API, takes the PNR encrypted in a POST body.
    Partner {
        /// Full endpoint URL, e.g. `https://<partner host>/Train/PnrchkStatus`
        url: Url,
        #[serde(default = "default_partner_timeout")]
        timeout_secs: u64,
    },
    /// Government enquiry API, takes the plain PNR as the last path segment.
    Enquiry {
        /// Base URL the PNR is appended to, e.g.
        /// `https://<gov host>/enquiry/PNR/GetPnrStatus/`
        url: Url,
        #[serde(default = "default_enquiry_timeout")]
        timeout_secs: u64,
        #[serde(default = "default_user_agent")]
        user_agent: String,
        /// The enquiry host rejects requests without a matching referer.
        referer: String,
    },
}

impl UpstreamConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let (url, timeout_secs) = match self {
            UpstreamConfig::Partner { url, timeout_secs } => (url, *timeout_secs),
            UpstreamConfig::Enquiry {
                url,
                timeout_secs,
                user_agent,
                referer,
            } => {
                if user_agent.trim().is_empty() {
                    return Err(ValidationError::EmptyHeader("User-Agent"));
                }
                if referer.trim().is_empty() {
                    return Err(ValidationError::EmptyHeader("Referer"));
                }
                (url, *timeout_secs)
            }
        };

        match url.scheme() {
            "http" | "https" => {}
            scheme => return Err(ValidationError::UnsupportedScheme(scheme.to_string())),
        }

        if timeout_secs == 0 || timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ValidationError::InvalidTimeout(timeout_secs));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        match self {
            UpstreamConfig::Partner { timeout_secs, .. }
            | UpstreamConfig::Enquiry { timeout_secs, .. } => Duration::from_secs(*timeout_secs),
        }
    }
}

fn default_partner_timeout() -> u64 {
    DEFAULT_PARTNER_TIMEOUT_SECS
}

fn default_enquiry_timeout() -> u64 {
    DEFAULT_ENQUIRY_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
