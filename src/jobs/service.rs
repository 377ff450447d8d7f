//! # Orquestador de Hash Jobs
//! src/jobs/service.rs
//!
//! Une admisión, persistencia y ejecución en segundo plano:
//!
//! ```text
//! submit ─▶ validar ─▶ try_acquire ─▶ store.create (PENDING) ─▶ thread
//!                                                               │
//!            compute (65 s) ─▶ store.update ─▶ liberar slot ◀───┘
//! ```
//!
//! La lectura de estado (`get_status`) es independiente y se puede
//! llamar en cualquier momento.

use crate::error::{HashError, StoreError};
use crate::jobs::admission::{AdmissionController, AdmissionPermit};
use crate::jobs::engine::HashComputer;
use crate::jobs::job::{validate_input, HashJob};
use crate::jobs::store::JobStore;
use crate::metrics::MetricsCollector;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use tracing::{error, info, warn};

/// Capacidad por defecto: hashes calculándose a la vez
pub const DEFAULT_CAPACITY: usize = 3;

/// Orquestador del ciclo de vida de los hash jobs
#[derive(Clone)]
pub struct HashService {
    store: Arc<dyn JobStore>,
    computer: Arc<dyn HashComputer>,
    admission: AdmissionController,
    metrics: MetricsCollector,

    /// Threads de cálculo lanzados y aún no joineados
    in_flight: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl HashService {
    pub fn new(
        store: Arc<dyn JobStore>,
        computer: Arc<dyn HashComputer>,
        capacity: usize,
    ) -> Self {
        Self {
            store,
            computer,
            admission: AdmissionController::new(capacity),
            metrics: MetricsCollector::new(),
            in_flight: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Usa un collector compartido (el del servidor)
    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = metrics;
        self
    }

    /// Acepta un texto para hashear y retorna el ID del job.
    ///
    /// Retorna en cuanto el registro PENDING existe; el cálculo sigue en
    /// un thread propio. Validación y admisión fallan sin crear nada.
    pub fn submit(&self, input: &str) -> Result<u64, HashError> {
        validate_input(input)?;

        let permit = match self.admission.try_acquire() {
            Some(permit) => permit,
            None => {
                self.metrics.record_job_rejected();
                warn!(
                    capacity = self.admission.capacity(),
                    "hash job rejected: workers' pool is full"
                );
                return Err(HashError::CapacityExceeded {
                    capacity: self.admission.capacity(),
                });
            }
        };

        // Si falla, `permit` se descarta aquí y el slot queda libre
        let job = self.store.create(input).map_err(|e| {
            error!(error = %e, "failed to create hash job");
            HashError::Storage(e)
        })?;
        let job_id = job.id;

        let handle = self.spawn_computation(job, permit)?;
        self.track(handle);

        self.metrics.record_job_submitted();
        info!(
            job_id,
            input_len = input.chars().count(),
            active = self.admission.active(),
            "start calculate hash"
        );

        Ok(job_id)
    }

    /// Lanza el thread que calcula y guarda el resultado.
    ///
    /// El permit se mueve al thread y se libera al terminar, también
    /// cuando `update` falla o el cómputo hace panic.
    fn spawn_computation(
        &self,
        mut job: HashJob,
        permit: AdmissionPermit,
    ) -> Result<JoinHandle<()>, HashError> {
        let store = Arc::clone(&self.store);
        let computer = Arc::clone(&self.computer);
        let metrics = self.metrics.clone();
        let job_id = job.id;

        thread::Builder::new()
            .name(format!("hash-job-{}", job_id))
            .spawn(move || {
                let _permit = permit;

                let bits = computer.compute(&job.input_str);
                job.complete(bits);

                match store.update(&job) {
                    Ok(()) => {
                        metrics.record_job_completed();
                        info!(job_id = job.id, hash = %job.hash, "hash calculated successfully");
                    }
                    Err(e) => {
                        // Nadie más se entera: el job queda PENDING para siempre
                        metrics.record_update_failure();
                        error!(job_id = job.id, error = %e, "failed to store hash result, job left PENDING");
                    }
                }
            })
            .map_err(|e| {
                error!(job_id, error = %e, "failed to spawn hash thread, job left PENDING");
                HashError::Internal(format!("cannot spawn hash thread: {}", e))
            })
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        in_flight.retain(|h| !h.is_finished());
        in_flight.push(handle);
    }

    /// Estado actual de un job, esté PENDING o no
    pub fn get_status(&self, id: u64) -> Result<HashJob, HashError> {
        self.store.get(id).map_err(|e| match e {
            StoreError::NotFound(id) => HashError::NotFound(id),
            other => {
                error!(job_id = id, error = %other, "failed to read hash job");
                HashError::Storage(other)
            }
        })
    }

    /// Espera a que terminen todos los cálculos lanzados hasta ahora
    /// (y los que se lancen mientras tanto).
    pub fn drain(&self) {
        loop {
            let handles: Vec<JoinHandle<()>> = {
                let mut in_flight = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
                in_flight.drain(..).collect()
            };
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                if handle.join().is_err() {
                    error!("hash thread panicked");
                }
            }
        }
    }

    /// Jobs calculándose ahora mismo
    pub fn active_jobs(&self) -> usize {
        self.admission.active()
    }

    pub fn capacity(&self) -> usize {
        self.admission.capacity()
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }
}
