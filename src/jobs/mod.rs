//! # Sistema de Hash Jobs
//! src/jobs/mod.rs
//!
//! Cálculo asíncrono de hashes largos sin bloquear las conexiones HTTP.
//!
//! ## Endpoints
//!
//! - `POST /hash/calc` - Registrar un cálculo (`{"input_str": "..."}`)
//! - `GET /hash/result/{id}` - Consultar el job (PENDING o resultado)
//! - `GET /metrics` - Contadores de requests y jobs
//!
//! ## Componentes
//!
//! - `admission`: límite de cálculos simultáneos, sin cola
//! - `engine`: CRC-64 perturbado por el reloj y popcount
//! - `store`: contrato de persistencia y backends
//! - `service`: orquestador (submit, hilo de cálculo, lectura de estado)

pub mod admission;
pub mod engine;
pub mod handlers;
pub mod job;
pub mod service;
pub mod store;

pub use admission::{AdmissionController, AdmissionPermit};
pub use engine::{HashComputer, PerturbedCrc64};
pub use job::{HashJob, SubmitRequest, SubmitResponse, PENDING};
pub use service::{HashService, DEFAULT_CAPACITY};
pub use store::{open_store, FileJobStore, JobStore, MemoryJobStore};
