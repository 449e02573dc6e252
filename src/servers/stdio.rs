use anyhow::Result;
use browser_connector::{ConnectorMcpServer, ConnectorServer};
use rmcp::{ServiceExt, transport::stdio};
use tokio::{signal, sync::oneshot};

pub async fn run_stdio_server(connector: ConnectorServer) -> Result<()> {
    let bridge = connector.bridge();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    // The extension still needs its socket while the MCP client talks over stdio.
    let connector_task = tokio::spawn(connector.serve(async move {
        let _ = stop_rx.await;
    }));

    tracing::info!("Browser connector MCP server listening on stdio (Ctrl+C to stop)");

    let server = ConnectorMcpServer::new(bridge);
    let outcome: Result<()> = tokio::select! {
        result = server.serve(stdio()) => {
            match result {
                Ok(service) => match service.waiting().await {
                    Ok(_) => Ok(()),
                    Err(e) => {
                        tracing::error!("Service error: {}", e);
                        Err(e.into())
                    }
                },
                Err(e) => {
                    tracing::error!("Server serve error: {}", e);
                    Err(e.into())
                }
            }
        }
        _ = signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping server...");
            Ok(())
        }
    };

    let _ = stop_tx.send(());
    match connector_task.await {
        Ok(Err(e)) => tracing::error!("Connector error: {}", e),
        Err(e) => tracing::error!("Connector task failed: {}", e),
        Ok(Ok(())) => {}
    }

    tracing::info!("Browser connector stopped");
    outcome
}
