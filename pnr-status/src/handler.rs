use crate::errors::Result;
use crate::metrics_defs::{UPSTREAM_DURATION, UPSTREAM_ERRORS};
use crate::pnr::PnrQuery;
use crate::upstream::StatusProvider;
use crate::{counter, histogram};
use serde_json::{Map, Value, json};
use std::time::{Duration, Instant};

pub const PROCESSING_TIME_FIELD: &str = "processingTimeSeconds";

/// Runs one status check: validate, call the upstream, normalize.
///
/// Validation failures return before any upstream call. The upstream call is
/// timed from just before dispatch (including encryption for the partner API)
/// until it returns, and the result is attached as `processingTimeSeconds`.
pub async fn check_pnr(
    provider: &dyn StatusProvider,
    raw_pnr: &str,
) -> Result<Map<String, Value>> {
    let pnr = PnrQuery::parse(raw_pnr)?;
    tracing::debug!(%pnr, provider = provider.name(), "Checking PNR status");

    let started = Instant::now();
    let fetched = provider.fetch(&pnr).await;
    let elapsed = started.elapsed();

    let outcome = match &fetched {
        Ok(_) => "success",
        Err(e) => {
            counter!(UPSTREAM_ERRORS, "provider" => provider.name(), "kind" => e.kind())
                .increment(1);
            tracing::warn!(
                %pnr,
                provider = provider.name(),
                error = %e,
                "Upstream status call failed"
            );
            "failure"
        }
    };
    histogram!(UPSTREAM_DURATION, "provider" => provider.name(), "outcome" => outcome)
        .record(elapsed.as_secs_f64());

    let mut body = provider.normalize(fetched?)?;
    body.insert(
        PROCESSING_TIME_FIELD.to_string(),
        json!(round_to_millis(elapsed)),
    );

    Ok(body)
}

/// Seconds, rounded to three decimal places.
fn round_to_millis(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0).round() / 1000.0
}
