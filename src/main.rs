use tokio::io::{BufReader, stdin, stdout};
use tracing_subscriber::EnvFilter;

use todolist::{
    config,
    handlers::terminal,
    repository::RestStore,
    service::NoteListController,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Log setup, kept off stdout so it does not interleave with the list
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load config
    let cfg = config::load_config()?;
    tracing::info!("Successfully loaded todolist config");
    tracing::info!(
        "Configured store: {} (table '{}')",
        cfg.store.url,
        cfg.store.table
    );

    // Store and controller creation
    let store = RestStore::new(&cfg.store, cfg.request_timeout)?;
    let controller = NoteListController::new(store);

    controller.initialize().await;

    terminal::run(&controller, BufReader::new(stdin()), stdout()).await?;

    controller.dispose();
    Ok(())
}
