use anyhow::Result;
use browser_connector::ConnectorServer;
use tokio::signal;

pub async fn run_http_server(connector: ConnectorServer) -> Result<()> {
    tracing::info!(
        "Extension endpoint: ws://{}/extension-ws (Ctrl+C to stop)",
        connector.local_addr()
    );

    connector
        .serve(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal (Ctrl+C), initiating graceful shutdown...");
        })
        .await?;

    tracing::info!("Browser connector stopped");
    Ok(())
}
