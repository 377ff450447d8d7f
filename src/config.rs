//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor de hashes con soporte
//! para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./hash_server --port 8000 \
//!   --max-workers 3 \
//!   --compute-secs 65 \
//!   --storage file --jobs-storage ./data/hash_jobs.json
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! APP_PORT=8000 HASH_MAX_WORKERS=5 RUST_LOG=debug ./hash_server
//! ```

use crate::error::ConfigError;
use clap::{Parser, ValueEnum};
use std::time::Duration;
use tracing::info;

/// Backend de persistencia de los jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    /// Solo en memoria, se pierde al reiniciar
    Memory,
    /// Archivo JSON en disco
    File,
}

/// Configuración del servidor de hashes
#[derive(Debug, Clone, Parser)]
#[command(name = "hash_server")]
#[command(about = "Servidor HTTP/1.0 para cálculo asíncrono de hashes con control de admisión")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8000", env = "APP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "APP_HOST")]
    pub host: String,

    // === Admisión ===

    /// Máximo de hashes calculándose simultáneamente
    #[arg(long = "max-workers", default_value = "3", env = "HASH_MAX_WORKERS")]
    pub max_workers: usize,

    // === Motor de cómputo ===

    /// Duración total del cálculo de cada hash, en segundos
    #[arg(long = "compute-secs", default_value = "65", env = "HASH_COMPUTE_SECS")]
    pub compute_secs: u64,

    /// Intervalo de perturbación con el timestamp actual, en segundos
    #[arg(long = "tick-secs", default_value = "5", env = "HASH_TICK_SECS")]
    pub tick_secs: u64,

    // === Storage ===

    /// Backend de persistencia de jobs
    #[arg(long, value_enum, default_value = "file", env = "HASH_STORAGE")]
    pub storage: StorageBackend,

    /// Ruta del archivo de persistencia de jobs (backend `file`)
    #[arg(long = "jobs-storage", default_value = "./data/hash_jobs.json", env = "JOBS_STORAGE")]
    pub jobs_storage_path: String,

    // === HTTP ===

    /// Tamaño máximo del body de un request
    #[arg(long = "max-body-bytes", default_value = "65536", env = "MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    /// Filtro de logging (sintaxis de `tracing_subscriber::EnvFilter`)
    #[arg(long = "log-filter", default_value = "info", env = "RUST_LOG")]
    pub log_filter: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use hash_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8000");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn compute_duration(&self) -> Duration {
        Duration::from_secs(self.compute_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_secs)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.compute_secs == 0 {
            return Err(ConfigError::ZeroComputeDuration);
        }
        if self.tick_secs == 0 {
            return Err(ConfigError::ZeroTick);
        }
        if self.tick_secs > self.compute_secs {
            return Err(ConfigError::TickExceedsCompute {
                tick: self.tick_secs,
                compute: self.compute_secs,
            });
        }
        if self.storage == StorageBackend::File && self.jobs_storage_path.trim().is_empty() {
            return Err(ConfigError::EmptyStoragePath);
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::ZeroBodyLimit);
        }

        Ok(())
    }

    /// Registra un resumen de la configuración al arrancar
    pub fn print_summary(&self) {
        info!(address = %self.address(), "network");
        info!(
            max_workers = self.max_workers,
            compute_secs = self.compute_secs,
            tick_secs = self.tick_secs,
            "hash engine"
        );
        match self.storage {
            StorageBackend::Memory => info!(backend = "memory", "job storage"),
            StorageBackend::File => {
                info!(backend = "file", path = %self.jobs_storage_path, "job storage")
            }
        }
        info!(max_body_bytes = self.max_body_bytes, "http limits");
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8000,
            host: "127.0.0.1".to_string(),
            max_workers: 3,
            compute_secs: 65,
            tick_secs: 5,
            storage: StorageBackend::File,
            jobs_storage_path: "./data/hash_jobs.json".to_string(),
            max_body_bytes: 65_536,
            log_filter: "info".to_string(),
        }
    }
}
