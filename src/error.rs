//! # Errores del Servidor
//! src/error.rs
//!
//! Taxonomía de errores del sistema de hashes. Cada capa tiene su propio
//! enum y la conversión hacia arriba se hace con `#[from]`.

use thiserror::Error;

/// Errores del contrato `JobStore`
#[derive(Error, Debug)]
pub enum StoreError {
    /// No existe un registro con ese ID
    #[error("hash job not found: {0}")]
    NotFound(u64),

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Lock envenenado o backend caído
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errores del orquestador de hashes
#[derive(Error, Debug)]
pub enum HashError {
    /// El texto no cumple con la longitud requerida (1..=255 caracteres)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Todos los slots de cómputo están ocupados
    #[error("the workers' pool is full (capacity: {capacity})")]
    CapacityExceeded { capacity: usize },

    #[error("hash job not found: {0}")]
    NotFound(u64),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// Cualquier otra falla interna (p. ej. no se pudo lanzar el thread)
    #[error("internal error: {0}")]
    Internal(String),
}

impl HashError {
    /// Indica si el error es culpa del cliente (4xx)
    pub fn is_client_error(&self) -> bool {
        matches!(self, HashError::InvalidInput(_) | HashError::NotFound(_))
    }
}

/// Errores de validación de la configuración
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max workers must be >= 1")]
    NoWorkers,

    #[error("compute duration must be > 0")]
    ZeroComputeDuration,

    #[error("tick interval must be > 0")]
    ZeroTick,

    #[error("tick interval ({tick}s) must not exceed compute duration ({compute}s)")]
    TickExceedsCompute { tick: u64, compute: u64 },

    #[error("jobs storage path must not be empty")]
    EmptyStoragePath,

    #[error("max body bytes must be > 0")]
    ZeroBodyLimit,
}

/// Errores al levantar el servidor
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to open job store: {0}")]
    Store(#[from] StoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
