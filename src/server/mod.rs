//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Servidor TCP que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones entrantes (un thread por conexión)
//! 3. Lee y parsea requests HTTP
//! 4. Despacha al router y envía la response
//! 5. Se detiene ordenadamente con `ShutdownHandle`

pub mod shutdown;
pub mod tcp;

pub use shutdown::ShutdownHandle;
pub use tcp::Server;
