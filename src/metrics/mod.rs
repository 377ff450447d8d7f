//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Recolección de métricas del servidor:
//! - Contadores de requests y latencias (p50, p95, p99)
//! - Ciclo de vida de los hash jobs (aceptados, rechazados, completados)

pub mod collector;

pub use collector::{JobCounters, MetricsCollector};
