use crate::config::UpstreamConfig;
use crate::crypto;
use crate::normalize::{self, NormalizeError};
use crate::pnr::PnrQuery;
use async_trait::async_trait;
use http::StatusCode;
use http::header::{ACCEPT, REFERER, USER_AGENT};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum UpstreamError {
    #[error("Upstream request timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("API connection error: {0}")]
    ConnectionFailed(#[from] reqwest::Error),

    #[error("API connection error: upstream responded with {0}")]
    HttpError(StatusCode),

    #[error("Invalid API response: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid API response: body exceeds {0} bytes")]
    BodyTooLarge(usize),
}

impl UpstreamError {
    /// Short tag for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::ConnectionFailed(_) => "connection_failed",
            UpstreamError::HttpError(_) => "http_error",
            UpstreamError::InvalidJson(_) => "invalid_json",
            UpstreamError::BodyTooLarge(_) => "body_too_large",
        }
    }
}

/// A third-party system that knows the booking status of a PNR.
#[async_trait]
pub trait StatusProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Makes a single upstream call for the PNR and returns the parsed body.
    /// No retries.
    async fn fetch(&self, pnr: &PnrQuery) -> Result<Value, UpstreamError>;

    /// Reshapes the upstream body into the JSON object returned to clients.
    fn normalize(&self, raw: Value) -> Result<Map<String, Value>, NormalizeError>;
}

/// Builds the provider selected in the config.
pub fn from_config(config: &UpstreamConfig) -> Result<Arc<dyn StatusProvider>, reqwest::Error> {
    let provider: Arc<dyn StatusProvider> = match config {
        UpstreamConfig::Partner { url, .. } => {
            Arc::new(PartnerProvider::new(url.clone(), config.timeout())?)
        }
        UpstreamConfig::Enquiry {
            url,
            user_agent,
            referer,
            ..
        } => Arc::new(EnquiryProvider::new(
            url.clone(),
            config.timeout(),
            user_agent.clone(),
            referer.clone(),
        )?),
    };
    Ok(provider)
}

/// Largest upstream response body that will be buffered.
pub const MAX_UPSTREAM_BODY_BYTES: usize = 1024 * 1024;

/// Sends the request and collects a JSON body, all within `limit`.
///
/// The limit covers connecting, sending, response headers and the complete
/// body. On expiry the in-flight request is dropped.
async fn send_json(
    request: reqwest::RequestBuilder,
    limit: Duration,
) -> Result<Value, UpstreamError> {
    let exchange = async {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::HttpError(status));
        }

        let body = read_body(response, MAX_UPSTREAM_BODY_BYTES).await?;
        Ok::<Value, UpstreamError>(serde_json::from_slice(&body)?)
    };

    timeout(limit, exchange)
        .await
        .map_err(|_| UpstreamError::Timeout(limit))?
}

/// Buffers the response body, giving up as soon as it grows past `max` bytes.
async fn read_body(
    mut response: reqwest::Response,
    max: usize,
) -> Result<Vec<u8>, UpstreamError> {
    if response.content_length().is_some_and(|len| len > max as u64) {
        return Err(UpstreamError::BodyTooLarge(max));
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > max {
            return Err(UpstreamError::BodyTooLarge(max));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PartnerRequest {
    pnr_number: String,
}

/// Partner status API. The PNR travels AES encrypted in a JSON POST body and
/// the response is already in client shape.
pub struct PartnerProvider {
    client: reqwest::Client,
    url: Url,
    timeout: Duration,
}

impl PartnerProvider {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(PartnerProvider {
            client: reqwest::Client::builder().build()?,
            url,
            timeout,
        })
    }
}

#[async_trait]
impl StatusProvider for PartnerProvider {
    fn name(&self) -> &'static str {
        "partner"
    }

    async fn fetch(&self, pnr: &PnrQuery) -> Result<Value, UpstreamError> {
        let body = PartnerRequest {
            pnr_number: crypto::encrypt(pnr.as_str()),
        };
        let request = self.client.post(self.url.clone()).json(&body);

        send_json(request, self.timeout).await
    }

    fn normalize(&self, raw: Value) -> Result<Map<String, Value>, NormalizeError> {
        normalize::passthrough(raw)
    }
}

/// Government enquiry API. Plain GET with the PNR in the path; the host only
/// answers requests that look like they come from its own web page.
pub struct EnquiryProvider {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    user_agent: String,
    referer: String,
}

impl EnquiryProvider {
    pub fn new(
        base_url: Url,
        timeout: Duration,
        user_agent: String,
        referer: String,
    ) -> Result<Self, reqwest::Error> {
        Ok(EnquiryProvider {
            client: reqwest::Client::builder().build()?,
            base_url,
            timeout,
            user_agent,
            referer,
        })
    }

    /// The PNR becomes the last path segment; any query string is kept.
    fn status_url(&self, pnr: &PnrQuery) -> Url {
        let mut url = self.base_url.clone();
        // Only cannot-be-a-base URLs lack segments, and config allows http(s) only
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(pnr.as_str());
        }
        url
    }
}

#[async_trait]
impl StatusProvider for EnquiryProvider {
    fn name(&self) -> &'static str {
        "enquiry"
    }

    async fn fetch(&self, pnr: &PnrQuery) -> Result<Value, UpstreamError> {
        let request = self
            .client
            .get(self.status_url(pnr))
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json")
            .header(REFERER, &self.referer);

        send_json(request, self.timeout).await
    }

    fn normalize(&self, raw: Value) -> Result<Map<String, Value>, NormalizeError> {
        let journey = normalize::normalize_enquiry(&raw)?;
        normalize::journey_to_body(&journey)
    }
}
