//! Cliniko API demo
//!
//! Runs example scenarios against a Cliniko account.

use cliniko_client::ClinikoClient;
use cliniko_demo::config::Settings;
use cliniko_demo::demo::{Command, Demo, USAGE};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let arg = std::env::args().nth(1);
    let command = Command::parse(arg.as_deref());
    if command == Command::Usage {
        println!("{}", USAGE);
        return Ok(());
    }

    let settings = Settings::discover()?;
    let client = ClinikoClient::new(settings.client_config()?)?;
    info!(base_url = %client.base_url(), ?command, "Starting Cliniko demo");

    let failures = Demo::new(&client, &settings.demo).run(command).await;
    if failures > 0 {
        info!(failures, "Demo finished with failed steps");
    }

    Ok(())
}
