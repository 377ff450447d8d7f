//! # Hash Server - Entry Point
//! src/main.rs
//!
//! Lee la configuración (CLI + variables de entorno), inicializa el
//! logging y levanta el servidor. SIGINT/SIGTERM lo detienen esperando
//! los hashes en curso; una segunda señal sale de inmediato.

use hash_server::config::Config;
use hash_server::server::Server;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    let config = Config::new();

    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .init();

    config.print_summary();

    let server = match Server::new(config) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "failed to start server");
            std::process::exit(1);
        }
    };

    let shutdown = server.shutdown_handle();
    let installed = ctrlc::set_handler(move || {
        if shutdown.is_requested() {
            warn!("second shutdown signal received, exiting without waiting");
            std::process::exit(130);
        }
        info!("shutdown signal received (SIGINT/SIGTERM), stopping server");
        shutdown.trigger();
    });
    if let Err(e) = installed {
        warn!(error = %e, "could not install signal handler");
    }

    if let Err(e) = server.run() {
        error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}
