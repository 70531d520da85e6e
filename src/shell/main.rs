use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt};

use ticket_time::shared::infrastructure::key_value_store::in_memory::InMemoryKeyValueStore;
use ticket_time::shared::infrastructure::key_value_store::json_file::JsonFileKeyValueStore;
use ticket_time::shared::infrastructure::key_value_store::{KeyValueStore, STORE_NAMESPACE};
use ticket_time::shell::config::{Config, StorageMode};
use ticket_time::shell::http::router;
use ticket_time::shell::state::build_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,ticket_time=debug"));
    fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    let store: Arc<dyn KeyValueStore> = match config.storage {
        StorageMode::File => Arc::new(
            JsonFileKeyValueStore::open(&config.data_dir, STORE_NAMESPACE)
                .await
                .with_context(|| format!("opening data directory {}", config.data_dir.display()))?,
        ),
        StorageMode::Memory => Arc::new(InMemoryKeyValueStore::new(STORE_NAMESPACE)),
    };

    let (state, writer) = build_state(store, &config).await;
    let writer = tokio::spawn(writer.run());

    let app = router(state);
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, storage = ?config.storage, "ticket tracker listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    // The router owned the last queue handles, so the writer drains and exits.
    if tokio::time::timeout(Duration::from_secs(5), writer).await.is_err() {
        tracing::warn!("persistence writer did not finish; latest changes may be lost");
    }
    Ok(())
}
