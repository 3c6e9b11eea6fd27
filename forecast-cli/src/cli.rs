use anyhow::Context;
use clap::{Parser, Subcommand};
use forecast_core::{
    Config, Coordinates, Forecast, ForecastDays, ForecastService, provider::source_from_config,
};
use inquire::{CustomType, Text};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Weather forecast CLI using the Open-Meteo API")]
pub struct Cli {
    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Location override as "longitude,latitude", e.g. "14.446,49.922".
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub coord: Option<Coordinates>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the default location. Prompts for anything not given as a flag.
    Configure {
        #[arg(long, allow_hyphen_values = true)]
        latitude: Option<f64>,

        #[arg(long, allow_hyphen_values = true)]
        longitude: Option<f64>,

        /// IANA timezone name, e.g. "Europe/Berlin".
        #[arg(long)]
        timezone: Option<String>,

        /// Default number of days for `show` (1-7).
        #[arg(long)]
        days: Option<u8>,
    },

    /// Current conditions, hourly forecast and sunrise/sunset.
    Show {
        /// Number of days (1-7); defaults to the configured value or 7.
        #[arg(long)]
        days: Option<i64>,
    },

    /// Today's detailed forecast.
    Today,

    /// Seven daily summaries starting today.
    Week,

    /// Statistics over the whole forecast.
    Summary,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let Cli {
            json,
            verbose,
            coord,
            command,
        } = self;
        let mut config = Config::load()?;

        match command {
            Command::Configure {
                latitude,
                longitude,
                timezone,
                days,
            } => {
                configure(&mut config, latitude, longitude, timezone, days)?;
                let path = config.save()?;
                println!("Saved configuration to {}", path.display());
            }
            Command::Show { days } => {
                let days = match days {
                    Some(d) => ForecastDays::try_from(d)?,
                    None => config.default_days()?,
                };
                let forecast = load_forecast(&config, coord).await?;
                output::report(&forecast.report(days), json, verbose)?;
            }
            Command::Today => {
                let forecast = load_forecast(&config, coord).await?;
                let today = forecast.today()?;
                output::today(forecast.location(), &today, json, verbose)?;
            }
            Command::Week => {
                let forecast = load_forecast(&config, coord).await?;
                output::week(&forecast.week(), json)?;
            }
            Command::Summary => {
                let forecast = load_forecast(&config, coord).await?;
                let summary = forecast.summary()?;
                output::summary(forecast.location(), &summary, json)?;
            }
        }

        Ok(())
    }
}

fn configure(
    config: &mut Config,
    latitude: Option<f64>,
    longitude: Option<f64>,
    timezone: Option<String>,
    days: Option<u8>,
) -> anyhow::Result<()> {
    let interactive = latitude.is_none() && longitude.is_none() && timezone.is_none();
    let current = config.location.clone();

    let (latitude, longitude, timezone) = if interactive {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_default(current.latitude)
            .prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_default(current.longitude)
            .prompt()?;
        let timezone = Text::new("Timezone:").with_default(&current.timezone).prompt()?;
        (latitude, longitude, timezone)
    } else {
        (
            latitude.unwrap_or(current.latitude),
            longitude.unwrap_or(current.longitude),
            timezone.unwrap_or(current.timezone),
        )
    };

    // reuse the command-line parser for range checks
    let coords: Coordinates = format!("{longitude},{latitude}")
        .parse()
        .context("Refusing to save location")?;
    config.set_location(coords.latitude, coords.longitude, timezone);

    if let Some(days) = days {
        ForecastDays::try_from(i64::from(days))?;
        config.default_days = Some(days);
    }

    Ok(())
}

async fn load_forecast(config: &Config, coord: Option<Coordinates>) -> anyhow::Result<Forecast> {
    let mut request = config.forecast_request();
    if let Some(c) = coord {
        request.latitude = c.latitude;
        request.longitude = c.longitude;
    }
    tracing::debug!(?request, "Using forecast location");

    let source = source_from_config(config)?;
    ForecastService::new(source, request).load().await
}
