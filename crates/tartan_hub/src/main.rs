use anyhow::Context;
use clap::Parser;
use tartan_hub::Args;
use tartan_hub::Config;
use tartan_hub::House;
use tartan_hub::HouseState;
use tartan_hub::Server;
use tartan_hub::Terminal;
use tracing_subscriber::filter::LevelFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from(Args::parse());

    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from(config.logging.level))
        .init();

    tracing::info!("Starting house simulator hub");

    let house = House::new(HouseState::new());
    let terminal = Terminal::spawn().context("Failed to start console reader")?;

    let server = Server::bind(&config, house, terminal.factory())
        .await
        .with_context(|| format!("Failed to listen on {}", config.bind_address()))?;

    let run = server.run();
    tokio::pin!(run);

    tokio::select! {
        result = &mut run => {
            result.context("Hub server stopped")?;
        }
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => tracing::info!("Received shutdown signal"),
                Err(e) => {
                    // Without a signal handler the hub runs until killed
                    tracing::error!("Failed to listen for shutdown signal: {}", e);
                    run.await.context("Hub server stopped")?;
                }
            }
        }
    }

    tracing::info!("Hub shutdown complete");

    Ok(())
}
