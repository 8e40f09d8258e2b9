use thali_server::{Server, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, config, logging)
    let config = setup_environment()?;

    print_banner();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Thali server starting...");

    // 2. State is initialized inside run(); background tasks start with it
    let server = Server::new(config);

    if let Err(e) = server.run().await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    Ok(())
}
