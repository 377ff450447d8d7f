//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Recolecta métricas del servidor en tiempo real: requests HTTP,
//! latencias y el ciclo de vida de los hash jobs.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Collector de métricas thread-safe
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsData>>,
    start_time: Instant,
}

/// Datos internos de métricas
#[derive(Default)]
struct MetricsData {
    /// Contador total de requests
    total_requests: u64,

    /// Requests por código de estado
    status_codes: HashMap<u16, u64>,

    /// Latencias registradas (en microsegundos)
    latencies: Vec<u64>,

    /// Requests por patrón de ruta (`/hash/result/{id}`), no por path
    /// concreto: la cantidad de claves queda acotada por las rutas
    /// registradas.
    requests_per_route: HashMap<String, u64>,

    jobs: JobCounters,
}

/// Contadores del ciclo de vida de los jobs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobCounters {
    /// Jobs aceptados (registro creado y thread lanzado)
    pub submitted: u64,

    /// Rechazados por falta de capacidad
    pub rejected: u64,

    /// Resultado escrito en el store
    pub completed: u64,

    /// Resultado calculado pero no se pudo escribir (job queda PENDING)
    pub update_failures: u64,
}

/// Máximo de latencias a guardar (para calcular percentiles)
const MAX_LATENCIES: usize = 10_000;

impl MetricsCollector {
    /// Crea un nuevo collector de métricas
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsData::default())),
            start_time: Instant::now(),
        }
    }

    fn data(&self) -> MutexGuard<'_, MetricsData> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registra un request HTTP atendido. `route` es la etiqueta que
    /// devuelve el router, nunca el path crudo.
    pub fn record_request(&self, route: &str, status_code: u16, latency: Duration) {
        let mut data = self.data();

        data.total_requests += 1;
        *data.status_codes.entry(status_code).or_insert(0) += 1;

        // Ventana de las últimas MAX_LATENCIES
        if data.latencies.len() >= MAX_LATENCIES {
            data.latencies.remove(0);
        }
        data.latencies.push(latency.as_micros() as u64);

        *data.requests_per_route.entry(route.to_string()).or_insert(0) += 1;
    }

    pub fn record_job_submitted(&self) {
        self.data().jobs.submitted += 1;
    }

    pub fn record_job_rejected(&self) {
        self.data().jobs.rejected += 1;
    }

    pub fn record_job_completed(&self) {
        self.data().jobs.completed += 1;
    }

    pub fn record_update_failure(&self) {
        self.data().jobs.update_failures += 1;
    }

    pub fn job_counters(&self) -> JobCounters {
        self.data().jobs
    }

    /// Métricas actuales en JSON. `active`/`capacity` los aporta el
    /// control de admisión.
    pub fn to_json(&self, active: usize, capacity: usize) -> Value {
        let data = self.data();
        let (p50, p95, p99, avg) = calculate_percentiles(&data.latencies);

        // Top 10 rutas más accedidas
        let mut routes: Vec<_> = data.requests_per_route.iter().collect();
        routes.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        let top_routes: Vec<Value> = routes
            .iter()
            .take(10)
            .map(|(route, count)| json!({"route": route, "count": count}))
            .collect();

        let status_codes: serde_json::Map<String, Value> = data
            .status_codes
            .iter()
            .map(|(code, count)| (code.to_string(), json!(count)))
            .collect();

        json!({
            "server": {
                "uptime_seconds": self.start_time.elapsed().as_secs(),
            },
            "requests": {
                "total": data.total_requests,
                "status_codes": status_codes,
                "top_routes": top_routes,
            },
            "latency_us": {
                "p50": p50,
                "p95": p95,
                "p99": p99,
                "avg": avg,
                "samples": data.latencies.len(),
            },
            "hash_jobs": {
                "submitted": data.jobs.submitted,
                "rejected": data.jobs.rejected,
                "completed": data.jobs.completed,
                "update_failures": data.jobs.update_failures,
                "active": active,
                "capacity": capacity,
            },
        })
    }
}

/// Calcula percentiles de latencia
fn calculate_percentiles(latencies: &[u64]) -> (u64, u64, u64, u64) {
    if latencies.is_empty() {
        return (0, 0, 0, 0);
    }

    let mut sorted = latencies.to_vec();
    sorted.sort_unstable();

    let len = sorted.len();
    let p50 = sorted[len * 50 / 100];
    let p95 = sorted[len * 95 / 100];
    let p99 = sorted[len * 99 / 100];
    let avg = sorted.iter().sum::<u64>() / len as u64;

    (p50, p95, p99, avg)
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
