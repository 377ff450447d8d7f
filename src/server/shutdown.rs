//! # Apagado del Servidor
//! src/server/shutdown.rs
//!
//! `ShutdownHandle` le avisa al loop de `accept` que deje de aceptar
//! conexiones. Como `TcpListener::incoming` bloquea, `trigger` abre una
//! conexión local para despertarlo.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

const WAKE_TIMEOUT: Duration = Duration::from_secs(1);

/// Señal de apagado compartida entre el servidor y quien lo detiene
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    inner: Arc<ShutdownState>,
}

#[derive(Debug, Default)]
struct ShutdownState {
    requested: AtomicBool,

    /// Dirección del listener activo, para despertarlo
    listening_on: Mutex<Option<SocketAddr>>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_requested(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    /// Pide el apagado. Llamarlo más de una vez no tiene efecto extra.
    pub fn trigger(&self) {
        if self.inner.requested.swap(true, Ordering::SeqCst) {
            return;
        }

        let addr = *self
            .inner
            .listening_on
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(addr) = addr {
            // La conexión solo sirve para que `accept` retorne
            if let Err(e) = TcpStream::connect_timeout(&wake_address(addr), WAKE_TIMEOUT) {
                debug!(error = %e, "could not wake accept loop");
            }
        }
    }

    /// Registra el listener. Retorna `true` si el apagado ya fue pedido.
    pub(crate) fn attach(&self, addr: SocketAddr) -> bool {
        *self
            .inner
            .listening_on
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(addr);
        self.is_requested()
    }
}

/// `0.0.0.0`/`::` no son destinos válidos: se usa loopback
fn wake_address(addr: SocketAddr) -> SocketAddr {
    match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), addr.port())
        }
        IpAddr::V6(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), addr.port())
        }
        _ => addr,
    }
}
