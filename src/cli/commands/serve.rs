use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use super::build_app;
use crate::adapters::http::HttpServer;
use crate::domain::models::Config;

/// Handle the serve command. Runs until Ctrl-C.
pub async fn execute(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let server_config = config.server.clone();
    let app = Arc::new(build_app(config)?);

    HttpServer::new(app, server_config)
        .serve_with_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received");
            }
        })
        .await
}
