mod config;
mod service;

use clap::Parser;
use config::Config;
use service::DasNodeService;
use std::sync::Arc;
use std::time::Duration;
use task_executor::TaskExecutor;

#[tokio::main]
async fn main() {
    let config = Config::parse();
    let _guard = logging::init_tracing(config.logging_config());

    let executor = TaskExecutor::from_current();

    let service = match DasNodeService::new(&config, executor.clone()) {
        Ok(service) => Arc::new(service),
        Err(err) => {
            tracing::error!(error = %err, "failed to construct node service");
            std::process::exit(1);
        }
    };

    tracing::info!(
        node_id = %service.node_id,
        spec_columns = service.spec.number_of_columns,
        "starting das-node"
    );

    service.spawn();

    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("failed to install ctrl-c handler, shutting down immediately");
    } else {
        tracing::info!("received shutdown signal");
    }

    executor.shutdown();
    // Give spawned tasks a brief grace period to observe the cancellation and wind down
    // their bounded channels before the process exits.
    tokio::time::sleep(Duration::from_millis(200)).await;
}
