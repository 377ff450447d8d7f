//! # Módulo HTTP
//! src/http/mod.rs
//!
//! Implementación mínima de HTTP/1.0 sobre `TcpStream`, sin frameworks:
//!
//! - Parsing de requests (request line, headers y body)
//! - Construcción de responses
//! - Códigos de estado
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 8\r\n
//! \r\n
//! {"id":1}
//! ```

pub mod request;
pub mod response;
pub mod status;

pub use request::{header_end, Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
