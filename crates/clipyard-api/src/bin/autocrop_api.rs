use clipyard_api::setup::{self, server, telemetry, AUTOCROP_DEFAULT_PORT};
use clipyard_api::state::AUTOCROP_SERVICE;
use clipyard_core::Config;

// Use mimalloc as the global allocator for lower fragmentation in long-running containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env(AUTOCROP_DEFAULT_PORT)?;
    telemetry::init_tracing(config.server.json_logs);

    let router = setup::initialize_autocrop(&config).await?;
    server::start_server(AUTOCROP_SERVICE, &config, router).await?;

    Ok(())
}
