//! # Control de Admisión
//! src/jobs/admission.rs
//!
//! Limita cuántos hashes se calculan a la vez. No hay cola: si no hay
//! slot libre el trabajo se rechaza y el cliente decide si reintenta.

use std::sync::{Arc, Mutex, MutexGuard};

/// Contador de slots activos contra una capacidad fija
#[derive(Debug, Clone)]
pub struct AdmissionController {
    inner: Arc<Slots>,
}

#[derive(Debug)]
struct Slots {
    capacity: usize,
    active: Mutex<usize>,
}

impl Slots {
    fn active(&self) -> MutexGuard<'_, usize> {
        // Un panic con el lock tomado no deja el contador a medias:
        // las operaciones son un solo incremento o decremento.
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AdmissionController {
    /// Crea un controlador con `capacity` slots (mínimo 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Slots {
                capacity: capacity.max(1),
                active: Mutex::new(0),
            }),
        }
    }

    /// Intenta ocupar un slot sin bloquear.
    ///
    /// Retorna `None` si todos los slots están ocupados. El slot se libera
    /// cuando se descarta el `AdmissionPermit`.
    pub fn try_acquire(&self) -> Option<AdmissionPermit> {
        let mut active = self.inner.active();
        if *active >= self.inner.capacity {
            return None;
        }

        *active += 1;
        Some(AdmissionPermit {
            slots: Arc::clone(&self.inner),
        })
    }

    /// Slots ocupados actualmente
    pub fn active(&self) -> usize {
        *self.inner.active()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Slots libres
    pub fn available(&self) -> usize {
        self.inner.capacity.saturating_sub(self.active())
    }
}

/// Slot ocupado. Liberarlo es descartarlo, así que se libera exactamente
/// una vez sin importar cómo termine el job.
#[derive(Debug)]
pub struct AdmissionPermit {
    slots: Arc<Slots>,
}

impl AdmissionPermit {
    /// Libera el slot explícitamente
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        let mut active = self.slots.active();
        *active = active.saturating_sub(1);
    }
}
