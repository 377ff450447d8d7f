//! # Hash Server
//! src/lib.rs
//!
//! Servidor HTTP/1.0 que calcula hashes largos en segundo plano con un
//! límite fijo de cálculos simultáneos. Un cliente registra un texto,
//! recibe un ID al instante y consulta el resultado más tarde.
//!
//! ## Arquitectura
//!
//! - `http`: Parsing y construcción de mensajes HTTP/1.0
//! - `server`: Listener TCP y manejo de conexiones
//! - `router`: Enrutamiento por método y patrón de path
//! - `jobs`: Admisión, motor de cómputo, persistencia y orquestador
//! - `metrics`: Contadores de requests y de jobs
//! - `config`: CLI y variables de entorno
//! - `error`: Tipos de error de cada capa
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use hash_server::config::Config;
//! use hash_server::server::Server;
//!
//! let config = Config::default();
//! let server = Server::new(config).expect("invalid configuration");
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod jobs;
pub mod metrics;
pub mod router;
pub mod server;
