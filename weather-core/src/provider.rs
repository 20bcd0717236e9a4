use crate::{Config, FetchError, Snapshot, provider::weatherapi::WeatherApiProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod weatherapi;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions and the first forecast day for `location`.
    ///
    /// The location is passed to the upstream service as-is.
    async fn fetch(&self, location: &str) -> Result<Snapshot, FetchError>;
}

/// Construct the WeatherAPI.com provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.resolve_api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for WeatherAPI.com.\n\
                 Hint: run `weather configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    let provider =
        WeatherApiProvider::with_base_url(api_key, config.base_url.clone(), config.timeout())?;

    Ok(Box::new(provider))
}
