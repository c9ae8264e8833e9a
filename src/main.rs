use anyhow::Context;
use clap::Parser;

use planner_mux::app::Multiplexer;
use planner_mux::cli::Cli;
use planner_mux::logging::init_tracing;
use planner_mux::shutdown::ShutdownHandle;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli
        .load_config()
        .with_context(|| format!("loading {}", cli.config_path().display()))?;

    let shutdown = ShutdownHandle::new();
    let mux = Multiplexer::bind(&config, shutdown.clone()).await?;

    let signals = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = signals.wait_for_signal().await {
            tracing::error!(error = %err, "Failed to install signal handlers");
            signals.signal();
        }
    });

    mux.run().await?;
    Ok(())
}
