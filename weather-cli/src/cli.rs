use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use std::{
    io::{self, BufReader},
    path::PathBuf,
    process::ExitCode,
};
use tracing::info;
use weather_core::{Config, provider_from_config};

use crate::{
    render::{Presenter, color_enabled},
    session::Session,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather",
    version,
    about = "Current weather and the rest of today's hourly forecast, with rainy hours in red",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Location to query (city, "lat,lon", postcode...). When given, it is
    /// used for every lookup in the session.
    pub location: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com key and default location.
    Configure,
}

impl Cli {
    pub async fn run(self) -> ExitCode {
        let result = match self.command {
            Some(Command::Configure) => configure().map(|path| {
                println!("Configuration saved to {}", path.display());
                ExitCode::SUCCESS
            }),
            None => show(self.location).await,
        };

        result.unwrap_or_else(|err| {
            println!("Error: {err:#}");
            ExitCode::FAILURE
        })
    }
}

async fn show(location: Option<String>) -> anyhow::Result<ExitCode> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    info!(base_url = %config.base_url, timeout_secs = config.timeout_secs, "provider ready");

    let presenter = Presenter::local(config.rain_threshold, color_enabled());
    let session =
        Session::new(provider.as_ref(), presenter, config.default_location.clone()).pinned(location);

    session.interrupt_on_ctrl_c();

    let stdin = BufReader::new(io::stdin());
    let mut stdout = io::stdout().lock();

    Ok(session.run_to_exit(stdin, &mut stdout).await)
}

fn configure() -> anyhow::Result<PathBuf> {
    let config = Config::load()?;

    let api_key = Password::new("WeatherAPI.com API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Get a free key at https://www.weatherapi.com/")
        .prompt()
        .context("Failed to read API key")?;

    let location = Text::new("Default location:")
        .with_default(&config.default_location)
        .prompt()
        .context("Failed to read default location")?;

    let config = apply_answers(config, &api_key, &location)?;
    config.save()
}

fn apply_answers(mut config: Config, api_key: &str, location: &str) -> anyhow::Result<Config> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }
    config.api_key = Some(api_key.to_string());

    let location = location.trim();
    if !location.is_empty() {
        config.default_location = location.to_string();
    }

    Ok(config)
}
