//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! Este módulo proporciona una API para construir respuestas HTTP/1.0
//! de forma programática y convertirlas a bytes para enviar al cliente.
//!
//! ## Formato de una respuesta HTTP/1.0
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 13\r\n
//! X-Request-Id: abc123\r\n
//! \r\n
//! {"ok": true}
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use hash_server::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "application/json")
//!     .with_body(r#"{"id": 1}"#);
//!
//! let bytes = response.to_bytes();
//! // Ahora puedes enviar `bytes` por el socket
//! ```

use super::StatusCode;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;

/// Representa una respuesta HTTP/1.0 completa
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado HTTP (200, 404, etc.)
    status: StatusCode,
    
    /// Headers HTTP (Content-Type, Content-Length, etc.)
    /// Usamos HashMap para evitar duplicados
    headers: HashMap<String, String>,
    
    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una nueva respuesta con el código de estado especificado
    /// 
    /// Por defecto, la respuesta no tiene headers ni body.
    /// 
    /// # Ejemplo
    /// ```
    /// use hash_server::http::{Response, StatusCode};
    /// 
    /// let response = Response::new(StatusCode::Ok);
    /// ```
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }
    
    /// Agrega un header a la respuesta
    /// 
    /// Si el header ya existe, se sobrescribe.
    /// 
    /// # Ejemplo
    /// ```
    /// use hash_server::http::{Response, StatusCode};
    /// 
    /// let response = Response::new(StatusCode::Ok)
    ///     .with_header("Content-Type", "application/json");
    /// ```
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }
    
    /// Agrega un header a una respuesta existente (versión mutable)
    /// 
    /// # Ejemplo
    /// ```
    /// use hash_server::http::{Response, StatusCode};
    /// 
    /// let mut response = Response::new(StatusCode::Ok);
    /// response.add_header("Content-Type", "application/json");
    /// ```
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }
    
    /// Establece el cuerpo de la respuesta desde un string
    /// 
    /// Automáticamente calcula y agrega el header `Content-Length`.
    /// 
    /// # Ejemplo
    /// ```
    /// use hash_server::http::{Response, StatusCode};
    /// 
    /// let response = Response::new(StatusCode::Ok)
    ///     .with_body("Hello World");
    /// ```
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.as_bytes().to_vec();
        self.headers.insert(
            "Content-Length".to_string(),
            self.body.len().to_string()
        );
        self
    }
    
    /// Crea una respuesta JSON exitosa (200 OK)
    /// 
    /// Automáticamente establece `Content-Type: application/json`.
    /// 
    /// # Ejemplo
    /// ```
    /// use hash_server::http::Response;
    /// 
    /// let response = Response::json(r#"{"status": "ok"}"#);
    /// ```
    pub fn json(body: &str) -> Self {
        Self::json_with_status(StatusCode::Ok, body)
    }

    /// Respuesta JSON con un código de estado arbitrario
    pub fn json_with_status(status: StatusCode, body: &str) -> Self {
        Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(body)
    }

    /// Serializa `value` como body JSON
    ///
    /// Si la serialización falla se responde 500.
    pub fn serialize<T: Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self::json_with_status(status, &body),
            Err(e) => Self::error(
                StatusCode::InternalServerError,
                &format!("cannot encode response: {}", e),
            ),
        }
    }

    /// Crea una respuesta de error con mensaje JSON
    /// 
    /// Formato del JSON: `{"code": 400, "message": "mensaje"}`
    /// 
    /// # Ejemplo
    /// ```
    /// use hash_server::http::{Response, StatusCode};
    /// 
    /// let response = Response::error(StatusCode::BadRequest, "Bad Request");
    /// assert_eq!(response.body(), br#"{"code":400,"message":"Bad Request"}"#);
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = json!({"code": status.as_u16(), "message": message});
        Self::json_with_status(status, &body.to_string())
    }
    
    /// Descarta el body conservando los headers (respuestas a `HEAD`).
    ///
    /// `Content-Length` sigue indicando el tamaño que tendría con `GET`.
    pub fn strip_body(&mut self) {
        self.body.clear();
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    /// 
    /// Genera el formato completo HTTP/1.0:
    /// - Status line: `HTTP/1.0 200 OK\r\n`
    /// - Headers: `Header-Name: Value\r\n`
    /// - Línea vacía: `\r\n`
    /// - Body: contenido binario
    /// 
    /// # Ejemplo
    /// ```
    /// use hash_server::http::{Response, StatusCode};
    /// 
    /// let response = Response::new(StatusCode::Ok)
    ///     .with_body("Hello");
    /// 
    /// let bytes = response.to_bytes();
    /// // bytes contiene: "HTTP/1.0 200 OK\r\n...\r\n\r\nHello"
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::new();
        
        // 1. Status line
        // Formato: HTTP/1.0 200 OK\r\n
        let status_line = format!(
            "HTTP/1.0 {}\r\n",
            self.status
        );
        result.extend_from_slice(status_line.as_bytes());
        
        // 2. Headers
        // Formato: Header-Name: Value\r\n
        for (name, value) in &self.headers {
            let header_line = format!("{}: {}\r\n", name, value);
            result.extend_from_slice(header_line.as_bytes());
        }
        
        // 3. Línea vacía que separa headers del body
        result.extend_from_slice(b"\r\n");
        
        // 4. Body (si existe)
        result.extend_from_slice(&self.body);
        
        result
    }
    
    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }
    
    /// Obtiene una referencia a los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }
    
    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
