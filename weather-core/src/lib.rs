//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The provider abstraction and the WeatherAPI.com client
//! - The flat [`Snapshot`] model the presenter works from
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;

pub use config::Config;
pub use error::FetchError;
pub use model::{HourlyForecast, Snapshot};
pub use provider::{WeatherProvider, provider_from_config};
