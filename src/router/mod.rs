//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea `(método, patrón)` a handlers.
//!
//! ```text
//! Request → Router → Handler(&Request, &RouteParams, &S) → Response
//! ```
//!
//! Los patrones admiten segmentos `{nombre}` que capturan el valor del
//! path (ej: `/hash/result/{id}`). Si ninguna ruta coincide con el path se
//! responde 404; si el path coincide pero no el método, 405.
//!
//! Además de la respuesta, el router devuelve una etiqueta estable para
//! métricas: el patrón registrado o `UNMATCHED_ROUTE`.

use crate::http::{Method, Request, Response, StatusCode};
use std::collections::HashMap;

/// Valor del header `Server` en todas las respuestas
pub const SERVER_NAME: &str = "HashServer/1.0";

/// Etiqueta de métricas para requests que no llegan a ningún handler
pub const UNMATCHED_ROUTE: &str = "<unmatched>";

/// Parámetros capturados de los segmentos `{nombre}`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RouteParams {
    values: HashMap<String, String>,
}

impl RouteParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|s| s.as_str())
    }
}

/// Tipo de función handler
///
/// Recibe el request, los parámetros capturados y el estado compartido.
pub type Handler<S> = fn(&Request, &RouteParams, &S) -> Response;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

struct Route<S> {
    method: Method,
    pattern: String,
    segments: Vec<Segment>,
    handler: Handler<S>,
}

impl<S> Route<S> {
    fn matches(&self, parts: &[&str]) -> Option<RouteParams> {
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = RouteParams::default();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.values.insert(name.clone(), (*part).to_string());
                }
            }
        }
        Some(params)
    }
}

/// Router que mapea rutas a handlers sobre un estado `S`
pub struct Router<S> {
    routes: Vec<Route<S>>,
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|part| !part.is_empty()).collect()
}

impl<S> Router<S> {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registra una ruta con su handler
    ///
    /// # Ejemplo
    /// ```
    /// use hash_server::router::{RouteParams, Router};
    /// use hash_server::http::{Method, Request, Response};
    ///
    /// fn echo_handler(_req: &Request, params: &RouteParams, _state: &()) -> Response {
    ///     Response::json(&format!(r#"{{"id": "{}"}}"#, params.get("id").unwrap_or("")))
    /// }
    ///
    /// let mut router = Router::new();
    /// router.register(Method::GET, "/echo/{id}", echo_handler);
    /// ```
    pub fn register(&mut self, method: Method, pattern: &str, handler: Handler<S>) {
        let segments = split_path(pattern)
            .into_iter()
            .map(|part| {
                match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                    Some(name) => Segment::Param(name.to_string()),
                    None => Segment::Literal(part.to_string()),
                }
            })
            .collect();

        self.routes.push(Route {
            method,
            pattern: pattern.to_string(),
            segments,
            handler,
        });
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    pub fn route(&self, request: &Request, state: &S) -> Response {
        self.dispatch(request, state).0
    }

    /// Como `route`, pero devuelve también la etiqueta de la ruta: el
    /// patrón registrado (`/hash/result/{id}`) o `UNMATCHED_ROUTE`.
    ///
    /// `HEAD` se atiende con el handler de `GET` de la misma ruta y se
    /// responde sin body.
    pub fn dispatch<'r>(&'r self, request: &Request, state: &S) -> (Response, &'r str) {
        let parts = split_path(request.path());
        let wanted = match request.method() {
            Method::HEAD => Method::GET,
            other => other,
        };

        let mut path_known = false;
        let mut response = None;

        for route in &self.routes {
            if let Some(params) = route.matches(&parts) {
                if route.method == wanted {
                    response = Some(((route.handler)(request, &params, state), route.pattern.as_str()));
                    break;
                }
                path_known = true;
            }
        }

        let (mut response, label) = response.unwrap_or_else(|| {
            let response = if path_known {
                Response::error(
                    StatusCode::MethodNotAllowed,
                    &format!("Method {} not allowed on {}", request.method().as_str(), request.path()),
                )
            } else {
                Response::error(
                    StatusCode::NotFound,
                    &format!("Route not found: {}", request.path()),
                )
            };
            (response, UNMATCHED_ROUTE)
        });

        if request.method() == Method::HEAD {
            response.strip_body();
        }

        add_common_headers(&mut response);
        (response, label)
    }
}

/// Agrega headers comunes a todas las respuestas, pasen o no por el router
pub fn add_common_headers(response: &mut Response) {
    response.add_header("Server", SERVER_NAME);
    response.add_header("Connection", "close");
}

impl<S> Default for Router<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_handler(_req: &Request, _params: &RouteParams, _state: &u32) -> Response {
        Response::json(r#"{"test": "ok"}"#)
    }

    fn param_handler(_req: &Request, params: &RouteParams, state: &u32) -> Response {
        let body = format!(
            r#"{{"id": "{}", "state": {}}}"#,
            params.get("id").unwrap_or(""),
            state
        );
        Response::json(&body)
    }

    fn route(router: &Router<u32>, raw: &[u8]) -> Response {
        let request = Request::parse(raw).unwrap();
        router.route(&request, &7)
    }

    #[test]
    fn test_router_creation() {
        let router: Router<u32> = Router::new();
        assert_eq!(router.routes.len(), 0);
    }

    #[test]
    fn test_route_found() {
        let mut router = Router::new();
        router.register(Method::POST, "/hash/calc", ok_handler);

        let response = route(&router, b"POST /hash/calc HTTP/1.0\r\n\r\n");
        assert_eq!(response.status(), StatusCode::Ok);
    }

    #[test]
    fn test_route_not_found() {
        let router: Router<u32> = Router::new();

        let response = route(&router, b"GET /nonexistent HTTP/1.0\r\n\r\n");
        assert_eq!(response.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_param_capture_and_state() {
        let mut router = Router::new();
        router.register(Method::GET, "/hash/result/{id}", param_handler);

        let response = route(&router, b"GET /hash/result/42 HTTP/1.0\r\n\r\n");
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), br#"{"id": "42", "state": 7}"#);
    }

    #[test]
    fn test_param_requires_segment() {
        let mut router = Router::new();
        router.register(Method::GET, "/hash/result/{id}", param_handler);

        let response = route(&router, b"GET /hash/result HTTP/1.0\r\n\r\n");
        assert_eq!(response.status(), StatusCode::NotFound);

        let response = route(&router, b"GET /hash/result/1/extra HTTP/1.0\r\n\r\n");
        assert_eq!(response.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_wrong_method_is_405() {
        let mut router = Router::new();
        router.register(Method::POST, "/hash/calc", ok_handler);

        let response = route(&router, b"GET /hash/calc HTTP/1.0\r\n\r\n");
        assert_eq!(response.status(), StatusCode::MethodNotAllowed);
    }

    #[test]
    fn test_head_uses_get_handler() {
        let mut router = Router::new();
        router.register(Method::GET, "/metrics", ok_handler);

        let response = route(&router, b"HEAD /metrics HTTP/1.0\r\n\r\n");
        assert_eq!(response.status(), StatusCode::Ok);
        assert!(response.body().is_empty());
        assert_eq!(
            response.headers().get("Content-Length").map(String::as_str),
            Some(r#"{"test": "ok"}"#.len().to_string().as_str())
        );
    }

    #[test]
    fn test_dispatch_labels_by_pattern() {
        let mut router = Router::new();
        router.register(Method::GET, "/hash/result/{id}", param_handler);
        router.register(Method::POST, "/hash/calc", ok_handler);

        let cases: [(&[u8], &str); 5] = [
            (b"GET /hash/result/1 HTTP/1.0\r\n\r\n", "/hash/result/{id}"),
            (b"GET /hash/result/98765 HTTP/1.0\r\n\r\n", "/hash/result/{id}"),
            (b"POST /hash/calc HTTP/1.0\r\n\r\n", "/hash/calc"),
            (b"GET /hash/calc HTTP/1.0\r\n\r\n", UNMATCHED_ROUTE),
            (b"GET /random/junk/path HTTP/1.0\r\n\r\n", UNMATCHED_ROUTE),
        ];

        for (raw, expected) in cases {
            let request = Request::parse(raw).unwrap();
            let (_, label) = router.dispatch(&request, &7);
            assert_eq!(label, expected);
        }
    }

    #[test]
    fn test_common_headers() {
        let mut router = Router::new();
        router.register(Method::GET, "/metrics", ok_handler);

        for raw in [&b"GET /metrics HTTP/1.0\r\n\r\n"[..], b"GET /missing HTTP/1.0\r\n\r\n"] {
            let response = route(&router, raw);
            assert_eq!(response.headers().get("Server").map(String::as_str), Some(SERVER_NAME));
            assert_eq!(response.headers().get("Connection").map(String::as_str), Some("close"));
        }
    }
}
