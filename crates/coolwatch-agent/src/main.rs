mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use async_trait::async_trait;
use chrono::Utc;
use clap::Parser;
use coolwatch_alert::engine::DecisionEngine;
use coolwatch_alert::state::StateStore;
use coolwatch_alert::TemperatureSource;
use coolwatch_common::types::Measurement;
use coolwatch_influx::InfluxClient;
use coolwatch_notify::{build_channel, NotificationChannel};
use tracing_subscriber::EnvFilter;

use crate::config::AgentConfig;

/// Sends a push notification when it is cooler outside than inside.
#[derive(Debug, Parser)]
#[command(name = "coolwatch-agent", version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

struct InfluxSource {
    client: InfluxClient,
}

#[async_trait]
impl TemperatureSource for InfluxSource {
    async fn last_value(&self, measurement: &Measurement) -> anyhow::Result<Option<f64>> {
        Ok(self.client.last_value(measurement).await?)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_directive = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("coolwatch-agent failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = AgentConfig::load(&cli.config)?;
    tracing::info!(config = %cli.config.display(), "coolwatch-agent starting");

    let source = InfluxSource {
        client: InfluxClient::new(
            &config.influxdb.host,
            config.influxdb.port,
            &config.influxdb.database,
        ),
    };
    let channels: Vec<Box<dyn NotificationChannel>> =
        config.notifiers.iter().map(build_channel).collect();
    let store = StateStore::new(
        &config.state_file,
        config.notification.rapid_change_event.window_minutes,
    );
    let settings = config.alert_settings();

    let engine = DecisionEngine::new(&settings, &store, &channels);
    let outcome = engine
        .run(&source, &config.influxdb.measurements, Utc::now())
        .await?;
    tracing::info!(%outcome, "Invocation complete");
    Ok(())
}
