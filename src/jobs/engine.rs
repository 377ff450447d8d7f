//! # Motor de Cómputo
//! src/jobs/engine.rs
//!
//! Calcula el "hash" de un texto:
//!
//! 1. Semilla: CRC-64 (polinomio ISO) de los bytes UTF-8 del texto.
//! 2. Durante `duration`, cada `tick` se hace AND del valor con el
//!    timestamp actual en nanosegundos.
//! 3. Resultado: cantidad de bits encendidos del valor final (0..=64).
//!
//! El paso 2 depende del reloj, así que el resultado NO es reproducible
//! entre ejecuciones con la misma entrada.

use crc::{Crc, CRC_64_GO_ISO};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::trace;

/// Duración por defecto del cálculo (1 min + 5 s)
pub const DEFAULT_DURATION: Duration = Duration::from_secs(65);

/// Intervalo por defecto de la perturbación
pub const DEFAULT_TICK: Duration = Duration::from_secs(5);

/// Misma tabla que `crc64.MakeTable(crc64.ISO)` + `crc64.Checksum`
const CRC64_ISO: Crc<u64> = Crc::<u64>::new(&CRC_64_GO_ISO);

/// Algo que sabe calcular el hash de un texto. Bloquea el thread que lo
/// llama durante todo el cálculo.
pub trait HashComputer: Send + Sync {
    fn compute(&self, input: &str) -> u32;
}

/// CRC-64 perturbado por el reloj
#[derive(Debug, Clone, Copy)]
pub struct PerturbedCrc64 {
    duration: Duration,
    tick: Duration,
}

impl PerturbedCrc64 {
    pub fn new(duration: Duration, tick: Duration) -> Self {
        Self {
            duration,
            tick: tick.max(Duration::from_millis(1)),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// CRC-64 ISO del texto
    pub fn seed(input: &str) -> u64 {
        CRC64_ISO.checksum(input.as_bytes())
    }

    /// Loop de perturbación. Corre hasta recibir la señal de stop (o que
    /// el emisor desaparezca) y retorna el valor final.
    fn perturb(mut value: u64, tick: Duration, stop: mpsc::Receiver<()>) -> u64 {
        loop {
            match stop.recv_timeout(tick) {
                Err(RecvTimeoutError::Timeout) => {
                    value &= now_nanos();
                    trace!(value, "perturbation tick");
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return value,
            }
        }
    }
}

impl Default for PerturbedCrc64 {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION, DEFAULT_TICK)
    }
}

impl HashComputer for PerturbedCrc64 {
    fn compute(&self, input: &str) -> u32 {
        let seed = Self::seed(input);
        let tick = self.tick;

        // El ticker vive dentro del scope: cuando `compute` retorna ya
        // terminó y fue joineado.
        let value = thread::scope(|scope| {
            let (stop_tx, stop_rx) = mpsc::channel();
            let ticker = scope.spawn(move || Self::perturb(seed, tick, stop_rx));

            thread::sleep(self.duration);
            let _ = stop_tx.send(());

            // Si el ticker hiciera panic nos quedamos con la semilla
            ticker.join().unwrap_or(seed)
        });

        value.count_ones()
    }
}

/// Timestamp actual en nanosegundos desde UNIX_EPOCH
fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_seed_matches_crc64_iso() {
        // Vector de verificación del catálogo CRC-64/GO-ISO
        assert_eq!(PerturbedCrc64::seed("123456789"), 0xb90956c775a41001);
    }

    #[test]
    fn test_seed_is_deterministic() {
        assert_eq!(PerturbedCrc64::seed("Hello"), PerturbedCrc64::seed("Hello"));
        assert_ne!(PerturbedCrc64::seed("Hello"), PerturbedCrc64::seed("hello"));
    }

    #[test]
    fn test_defaults() {
        let engine = PerturbedCrc64::default();
        assert_eq!(engine.duration(), Duration::from_secs(65));
        assert_eq!(engine.tick(), Duration::from_secs(5));
    }

    #[test]
    fn test_compute_in_range() {
        let engine = PerturbedCrc64::new(Duration::from_millis(60), Duration::from_millis(10));
        let bits = engine.compute("Hello");
        assert!(bits <= 64);
    }

    #[test]
    fn test_compute_without_ticks_is_popcount_of_seed() {
        // Duración menor que el tick: ningún AND llega a ejecutarse
        let engine = PerturbedCrc64::new(Duration::from_millis(5), Duration::from_secs(10));
        let expected = PerturbedCrc64::seed("abc").count_ones();
        assert_eq!(engine.compute("abc"), expected);
    }

    #[test]
    fn test_perturbation_only_clears_bits() {
        let engine = PerturbedCrc64::new(Duration::from_millis(50), Duration::from_millis(5));
        let upper = PerturbedCrc64::seed("abc").count_ones();
        assert!(engine.compute("abc") <= upper);
    }

    #[test]
    fn test_compute_returns_after_duration() {
        let engine = PerturbedCrc64::new(Duration::from_millis(80), Duration::from_millis(20));

        let start = Instant::now();
        engine.compute("timing");
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(80));
        // El ticker se detiene enseguida, no espera otro tick completo de más
        assert!(elapsed < Duration::from_secs(2));
    }

    #[test]
    fn test_perturb_stops_on_signal() {
        let (tx, rx) = mpsc::channel();
        tx.send(()).unwrap();
        assert_eq!(PerturbedCrc64::perturb(u64::MAX, Duration::from_secs(60), rx), u64::MAX);
    }

    #[test]
    fn test_perturb_stops_when_sender_dropped() {
        let (tx, rx) = mpsc::channel::<()>();
        drop(tx);
        assert_eq!(PerturbedCrc64::perturb(7, Duration::from_secs(60), rx), 7);
    }
}
