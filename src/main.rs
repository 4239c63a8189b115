use std::sync::Arc;

use roi_email_edge::assets::{AssetStore, KvAssetStore};
use roi_email_edge::config::{AppState, Config};
use roi_email_edge::generation::GeminiClient;
use roi_email_edge::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;
    logger::init(&cfg)?;

    // Size the runtime from `server.workers`, defaulting to one thread per core
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    let assets = KvAssetStore::load(&cfg.assets.directory).map_err(|e| {
        format!(
            "Failed to load static bundle from '{}': {e}",
            cfg.assets.directory
        )
    })?;
    let generator = GeminiClient::from_config(&cfg.generation)?;
    let asset_count = assets.len();

    let listener = server::create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &cfg, asset_count);

    let state = Arc::new(AppState::new(cfg, Arc::new(generator), Arc::new(assets)));
    server::run(listener, state, server::signal::shutdown_signal()).await
}
