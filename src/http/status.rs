//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Códigos que puede devolver la API de hashes:
//!
//! - **2xx**: Éxito (200 OK)
//! - **4xx**: Error del cliente (400, 404, 405, 413)
//! - **5xx**: Error del servidor (500, 503)

/// Representa los códigos de estado HTTP que soporta nuestro servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK - La petición fue exitosa
    Ok = 200,
    
    /// 400 Bad Request - Parámetros inválidos o malformados
    BadRequest = 400,
    
    /// 404 Not Found - Ruta o recurso no encontrado
    NotFound = 404,
    
    /// 405 Method Not Allowed - La ruta existe pero no con ese método
    MethodNotAllowed = 405,
    
    /// 413 Payload Too Large - Body mayor al límite configurado
    PayloadTooLarge = 413,
    
    /// 500 Internal Server Error - Error interno del servidor
    InternalServerError = 500,
    
    /// 503 Service Unavailable - Todos los slots de cómputo ocupados
    ServiceUnavailable = 503,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    /// 
    /// # Ejemplo
    /// ```
    /// use hash_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
    
    /// Retorna el texto de razón (reason phrase) asociado al código
    /// 
    /// Estos textos están definidos en el RFC 1945 y son estándares.
    /// 
    /// # Ejemplo
    /// ```
    /// use hash_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }
    
    /// Verifica si el código indica éxito (2xx)
    /// 
    /// # Ejemplo
    /// ```
    /// use hash_server::http::StatusCode;
    /// assert!(StatusCode::Ok.is_success());
    /// assert!(!StatusCode::NotFound.is_success());
    /// ```
    pub fn is_success(&self) -> bool {
        matches!(self, StatusCode::Ok)
    }
    
    /// Verifica si el código indica error del cliente (4xx)
    /// 
    /// # Ejemplo
    /// ```
    /// use hash_server::http::StatusCode;
    /// assert!(StatusCode::BadRequest.is_client_error());
    /// assert!(!StatusCode::Ok.is_client_error());
    /// ```
    pub fn is_client_error(&self) -> bool {
        let code = self.as_u16();
        (400..500).contains(&code)
    }
    
    /// Verifica si el código indica error del servidor (5xx)
    /// 
    /// # Ejemplo
    /// ```
    /// use hash_server::http::StatusCode;
    /// assert!(StatusCode::InternalServerError.is_server_error());
    /// assert!(!StatusCode::BadRequest.is_server_error());
    /// ```
    pub fn is_server_error(&self) -> bool {
        let code = self.as_u16();
        (500..600).contains(&code)
    }
}

impl std::fmt::Display for StatusCode {
    /// Formatea el código de estado para mostrarlo
    /// 
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
