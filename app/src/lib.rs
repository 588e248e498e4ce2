pub mod app;
pub mod config;
pub mod server;

use config::AppConfig;

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Load `.env`, then build the runtime config from the environment.
pub fn init_config() -> AppConfig {
    load_dotenv();

    let config = AppConfig::load();
    tracing::info!(
        port = config.server_port,
        bind = %config.bind_address,
        module_size = config.module_size,
        border = config.border,
        "Settings loaded"
    );
    config
}
