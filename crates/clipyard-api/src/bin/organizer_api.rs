use clipyard_api::setup::{self, server, telemetry, ORGANIZER_DEFAULT_PORT};
use clipyard_api::state::ORGANIZER_SERVICE;
use clipyard_core::Config;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env(ORGANIZER_DEFAULT_PORT)?;
    telemetry::init_tracing(config.server.json_logs);

    let router = setup::initialize_organizer(&config).await?;
    server::start_server(ORGANIZER_SERVICE, &config, router).await?;

    Ok(())
}
