use std::process::ExitCode;
use std::sync::Arc;

use station_server::config::ServerConfig;
use station_server::server::StationServer;
use station_server::store::{JsonScheduleFile, ScheduleStore};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();

    // Live copy is reset from the master on every start
    let backend = JsonScheduleFile::new(&config.live_file, &config.master_file);
    let store = Arc::new(ScheduleStore::new(Arc::new(backend)));
    match store.load_all() {
        Ok(count) => info!(count, "timetable ready"),
        Err(e) => error!(error = %e, "could not load timetable, serving an empty schedule"),
    }

    let server = match StationServer::bind(&config, store).await {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "startup failed");
            return ExitCode::FAILURE;
        }
    };

    match server.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server stopped");
            ExitCode::FAILURE
        }
    }
}
