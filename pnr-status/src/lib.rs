pub mod api;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod fields;
pub mod handler;
pub mod metrics_defs;
pub mod normalize;
pub mod pnr;
pub mod upstream;

#[cfg(test)]
mod testutils;

pub use errors::GatewayError;
pub use pnr::PnrQuery;

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("could not build upstream client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error(transparent)]
    Api(#[from] api::ApiError),
}

/// Builds the configured upstream provider and serves `/check-pnr` until
/// `shutdown` resolves.
pub async fn run<F>(config: config::Config, shutdown: F) -> Result<(), RunError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let provider = upstream::from_config(&config.upstream)?;
    api::serve(&config.listener, provider, shutdown).await?;
    tracing::info!("PNR gateway stopped");
    Ok(())
}
