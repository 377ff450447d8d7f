//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Servidor HTTP/1.0 que atiende cada conexión en su propio thread.
//! Una conexión = un request: se lee la cabecera, luego el body según
//! `Content-Length`, se responde y se cierra.
//!
//! Al pedirse el apagado (`ShutdownHandle::trigger`) deja de aceptar
//! conexiones y espera a que terminen los hashes en curso.

use crate::config::Config;
use crate::error::ServerError;
use crate::http::{header_end, Method, Request, Response, StatusCode};
use crate::jobs::handlers::{calc_handler, metrics_handler, result_handler};
use crate::jobs::{open_store, HashService, PerturbedCrc64};
use crate::metrics::MetricsCollector;
use crate::router::{add_common_headers, Router, UNMATCHED_ROUTE};
use crate::server::shutdown::ShutdownHandle;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info, warn};

/// Tamaño máximo de la cabecera (request line + headers)
const MAX_HEADER_BYTES: usize = 8192;

/// Tiempo máximo esperando bytes del cliente
const READ_TIMEOUT: Duration = Duration::from_secs(30);

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Servidor HTTP/1.0 concurrente
pub struct Server {
    config: Config,
    router: Arc<Router<HashService>>,
    service: HashService,
    shutdown: ShutdownHandle,
}

/// Resultado de leer una conexión
#[derive(Debug)]
enum Incoming {
    /// El cliente cerró sin mandar nada
    Closed,
    Request(Request),
    /// Request inválido; se responde sin pasar por el router
    Rejected(Response),
}

impl Server {
    /// Arma el servidor completo a partir de la configuración:
    /// store, motor de cómputo, orquestador y rutas.
    pub fn new(config: Config) -> Result<Self, ServerError> {
        config.validate()?;

        let store = open_store(&config)?;
        let engine = PerturbedCrc64::new(config.compute_duration(), config.tick_interval());
        let service = HashService::new(store, Arc::new(engine), config.max_workers)
            .with_metrics(MetricsCollector::new());

        Ok(Self::with_service(config, service))
    }

    /// Usa un orquestador ya construido (tests, motores alternativos)
    pub fn with_service(config: Config, service: HashService) -> Self {
        Self {
            config,
            router: Arc::new(build_router()),
            service,
            shutdown: ShutdownHandle::new(),
        }
    }

    pub fn service(&self) -> &HashService {
        &self.service
    }

    /// Handle para detener `run`/`serve` desde otro thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Bind en `host:port` y atiende conexiones hasta que se pida el apagado
    pub fn run(&self) -> Result<(), ServerError> {
        let address = self.config.address();
        let listener = TcpListener::bind(&address)?;
        self.serve(listener)
    }

    /// Atiende conexiones de un listener ya abierto.
    ///
    /// Retorna después de un apagado, cuando ya terminaron todos los
    /// cálculos lanzados.
    pub fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        let local: SocketAddr = listener.local_addr()?;
        if self.shutdown.attach(local) {
            info!("shutdown requested before serving");
            self.drain();
            return Ok(());
        }
        info!(address = %local, capacity = self.service.capacity(), "server listening");

        for stream in listener.incoming() {
            if self.shutdown.is_requested() {
                break;
            }

            match stream {
                Ok(stream) => {
                    let router = Arc::clone(&self.router);
                    let service = self.service.clone();
                    let max_body = self.config.max_body_bytes;

                    let peer = stream
                        .peer_addr()
                        .map(|addr| addr.to_string())
                        .unwrap_or_else(|_| "unknown".to_string());
                    debug!(peer = %peer, "new connection");

                    thread::spawn(move || {
                        if let Err(e) = handle_connection(stream, &router, &service, max_body) {
                            warn!(peer = %peer, error = %e, "connection error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                }
            }
        }

        info!("stopped accepting connections");
        self.drain();
        Ok(())
    }

    fn drain(&self) {
        let active = self.service.active_jobs();
        if active > 0 {
            info!(active, "waiting for in-flight hash jobs");
        }
        self.service.drain();
        info!("server stopped");
    }
}

/// Rutas de la API
fn build_router() -> Router<HashService> {
    let mut router = Router::new();
    router.register(Method::POST, "/hash/calc", calc_handler);
    router.register(Method::GET, "/hash/result/{id}", result_handler);
    router.register(Method::GET, "/metrics", metrics_handler);
    router
}

fn next_request_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    let mut hasher = DefaultHasher::new();
    nanos.hash(&mut hasher);
    REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed).hash(&mut hasher);
    thread::current().id().hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

fn handle_connection(
    mut stream: TcpStream,
    router: &Router<HashService>,
    service: &HashService,
    max_body: usize,
) -> io::Result<()> {
    let start = Instant::now();
    let request_id = next_request_id();
    stream.set_read_timeout(Some(READ_TIMEOUT))?;

    let (response, method, path, route) = match read_request(&mut stream, max_body)? {
        Incoming::Closed => {
            debug!("connection closed without data");
            return Ok(());
        }
        Incoming::Request(request) => {
            let (response, route) = router.dispatch(&request, service);
            (response, request.method().as_str(), request.path().to_string(), route)
        }
        Incoming::Rejected(mut response) => {
            add_common_headers(&mut response);
            (response, "-", "-".to_string(), UNMATCHED_ROUTE)
        }
    };

    let mut response = response;
    response.add_header("X-Request-Id", &request_id);

    stream.write_all(&response.to_bytes())?;
    stream.flush()?;

    let latency = start.elapsed();
    let status = response.status();
    service.metrics().record_request(route, status.as_u16(), latency);

    if status.is_server_error() {
        error!(request_id = %request_id, method, path = %path, status = status.as_u16(), latency_ms = latency.as_secs_f64() * 1000.0, "request failed");
    } else {
        info!(request_id = %request_id, method, path = %path, status = status.as_u16(), latency_ms = latency.as_secs_f64() * 1000.0, "request served");
    }

    Ok(())
}

/// Lee un request completo: cabecera hasta `\r\n\r\n` y luego
/// exactamente `Content-Length` bytes de body.
fn read_request<R: Read>(stream: &mut R, max_body: usize) -> io::Result<Incoming> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 4096];

    // 1. Cabecera
    let head_end = loop {
        if let Some(end) = header_end(&buffer) {
            break end;
        }
        if buffer.len() > MAX_HEADER_BYTES {
            return Ok(Incoming::Rejected(Response::error(
                StatusCode::BadRequest,
                "Request headers too large",
            )));
        }

        let n = stream.read(&mut chunk)?;
        if n == 0 {
            if buffer.is_empty() {
                return Ok(Incoming::Closed);
            }
            // Sin línea vacía: se intenta con lo que llegó
            break buffer.len();
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    let head = match Request::parse(&buffer[..head_end]) {
        Ok(head) => head,
        Err(e) => {
            debug!(error = %e, "malformed request");
            return Ok(Incoming::Rejected(Response::error(
                StatusCode::BadRequest,
                &format!("Invalid: {}", e),
            )));
        }
    };

    // 2. Body
    let body_len = match head.header("Content-Length") {
        None => 0,
        Some(_) => match head.content_length() {
            Some(len) => len,
            None => {
                return Ok(Incoming::Rejected(Response::error(
                    StatusCode::BadRequest,
                    "Invalid Content-Length",
                )))
            }
        },
    };

    if body_len > max_body {
        warn!(body_len, max_body, "request body too large");
        return Ok(Incoming::Rejected(Response::error(
            StatusCode::PayloadTooLarge,
            &format!("Request body exceeds {} bytes", max_body),
        )));
    }

    let total = head_end + body_len;
    while buffer.len() < total {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            return Ok(Incoming::Rejected(Response::error(
                StatusCode::BadRequest,
                "Incomplete request body",
            )));
        }
        buffer.extend_from_slice(&chunk[..n]);
    }

    match Request::parse(&buffer[..total]) {
        Ok(request) => Ok(Incoming::Request(request)),
        Err(e) => Ok(Incoming::Rejected(Response::error(
            StatusCode::BadRequest,
            &format!("Invalid: {}", e),
        ))),
    }
}
