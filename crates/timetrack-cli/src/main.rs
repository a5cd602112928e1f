use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use timetrack_cli::{App, Cli, Commands, Config, commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init: tests may have installed a subscriber already
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(run(command, &config, cli.json))
}

async fn run(command: Commands, config: &Config, json: bool) -> Result<()> {
    let app = App::open(config).await?;
    let result = commands::run(
        &app,
        command,
        json,
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )
    .await;
    app.shutdown().await;
    result
}
