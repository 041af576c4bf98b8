use clap::Parser;
use dummy::config::{Cli, Command, Config};
use dummy::{AppState, openapi, server};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let Cli {
        command: Command::Server(args),
    } = Cli::parse();
    let config = Config::from_args(args)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from_level(config.log_level).into())
                .from_env_lossy(),
        )
        .init();

    tracing::info!("dummy starting");
    config.log_startup();

    let api = openapi::load(&config.spec_path)?;
    tracing::info!(routes = api.routes().len(), "Specification loaded");

    server::run(&config, server::router(AppState::new(api))).await
}
