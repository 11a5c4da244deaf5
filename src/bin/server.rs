use anyhow::Context;
use bookshelf::{cli_args::CliArgs, config::ServerConfig, server::Server};
use clap::Parser;

fn init_tracing() -> anyhow::Result<()> {
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt::Subscriber::builder()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .finish(),
    )
    .context("Failed to set global tracing subscriber")?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "server=debug,bookshelf=debug,tower_http=debug");
    }

    init_tracing()?;

    let cli_args = CliArgs::parse();

    tracing::info!("Starting ...");

    let config = ServerConfig::load(cli_args).await?;

    tracing::debug!(?config, "Loaded configuration");

    Server::new(config).run().await?;

    Ok(())
}
