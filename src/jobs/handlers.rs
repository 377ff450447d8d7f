//! # Handlers HTTP para Hash Jobs
//! src/jobs/handlers.rs
//!
//! Implementa los endpoints del sistema de hashes:
//! - `POST /hash/calc`
//! - `GET /hash/result/{id}`
//! - `GET /metrics`

use crate::error::HashError;
use crate::http::{Request, Response, StatusCode};
use crate::jobs::job::{SubmitRequest, SubmitResponse};
use crate::jobs::service::HashService;
use crate::router::RouteParams;
use tracing::{debug, warn};

/// Mensaje para el cliente cuando no hay slots libres
pub const CAPACITY_MESSAGE: &str =
    "The maximum number of hashes that can be computed simultaneously has been reached, try again later";

/// Segundos sugeridos en `Retry-After` al rechazar por capacidad
pub const RETRY_AFTER_SECS: u64 = 5;

/// Handler para `POST /hash/calc`
///
/// Body: `{"input_str": "..."}`. Retorna el ID del job apenas queda
/// registrado como PENDING.
///
/// # Ejemplo de response
/// ```json
/// {"id": 1}
/// ```
pub fn calc_handler(req: &Request, _params: &RouteParams, service: &HashService) -> Response {
    let submit: SubmitRequest = match serde_json::from_slice(req.body()) {
        Ok(submit) => submit,
        Err(e) => {
            warn!(error = %e, "rejected hash request with malformed body");
            return Response::error(StatusCode::BadRequest, &format!("Invalid request payload: {}", e));
        }
    };

    match service.submit(&submit.input_str) {
        Ok(id) => Response::serialize(StatusCode::Ok, &SubmitResponse { id }),
        Err(e) => error_response(e),
    }
}

/// Handler para `GET /hash/result/{id}`
///
/// Retorna el registro completo del job, esté PENDING o no.
///
/// # Ejemplo de response
/// ```json
/// {
///   "id": 1,
///   "input_str": "abc",
///   "hash": "PENDING",
///   "created_at": "2024-05-01T10:00:00Z",
///   "calculated_at": "0001-01-01T00:00:00Z"
/// }
/// ```
pub fn result_handler(_req: &Request, params: &RouteParams, service: &HashService) -> Response {
    let raw_id = params.get("id").unwrap_or("");

    // Un ID que no es un entero positivo no puede existir
    let id = match raw_id.parse::<u64>() {
        Ok(id) if id > 0 => id,
        _ => {
            debug!(raw_id, "hash result requested with non numeric id");
            return Response::error(StatusCode::NotFound, &format!("Hash not found: {}", raw_id));
        }
    };

    match service.get_status(id) {
        Ok(job) => Response::serialize(StatusCode::Ok, &job),
        Err(e) => error_response(e),
    }
}

/// Handler para `GET /metrics`
pub fn metrics_handler(_req: &Request, _params: &RouteParams, service: &HashService) -> Response {
    let body = service
        .metrics()
        .to_json(service.active_jobs(), service.capacity());
    Response::json(&body.to_string())
}

/// Traduce un `HashError` a su respuesta HTTP
fn error_response(err: HashError) -> Response {
    if err.is_client_error() {
        warn!(error = %err, "client error");
    }

    match err {
        HashError::InvalidInput(msg) => Response::error(StatusCode::BadRequest, &msg),
        HashError::NotFound(id) => {
            Response::error(StatusCode::NotFound, &format!("Hash not found: {}", id))
        }
        HashError::CapacityExceeded { .. } => {
            let mut response = Response::error(StatusCode::ServiceUnavailable, CAPACITY_MESSAGE);
            response.add_header("Retry-After", &RETRY_AFTER_SECS.to_string());
            response
        }
        // Ya se loguearon con error! en el servicio
        HashError::Storage(e) => Response::error(StatusCode::InternalServerError, &e.to_string()),
        HashError::Internal(msg) => Response::error(StatusCode::InternalServerError, &msg),
    }
}
