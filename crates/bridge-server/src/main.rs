use clap::Parser;

use bridge_core::BridgeConfig;
use bridge_server::state::AppState;

#[derive(Parser)]
#[command(
    name = "bytebridge",
    about = "Sync database change requests between an intake tracker and a change-execution system",
    version
)]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value = "3141", env = "BRIDGE_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    let config = BridgeConfig::from_env()?;
    let state = AppState::new(config)?;
    bridge_server::serve(state, cli.port).await
}
