//! # Estructura de un Hash Job
//! src/jobs/job.rs
//!
//! Registro persistido de un cálculo de hash. El campo `hash` contiene
//! `"PENDING"` mientras el cálculo está en curso y el número decimal de
//! bits encendidos cuando termina.

use crate::error::HashError;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Valor centinela mientras el hash no se ha calculado
pub const PENDING: &str = "PENDING";

/// Longitud máxima del texto de entrada, en caracteres
pub const MAX_INPUT_CHARS: usize = 255;

/// Un cálculo de hash y su estado
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashJob {
    /// ID asignado por el store, inmutable
    pub id: u64,

    /// Texto de entrada
    pub input_str: String,

    /// `PENDING` o el resultado decimal (0..=64)
    pub hash: String,

    pub created_at: DateTime<Utc>,

    /// Se serializa como `0001-01-01T00:00:00Z` mientras está pendiente
    #[serde(
        serialize_with = "serialize_calculated_at",
        deserialize_with = "deserialize_calculated_at"
    )]
    pub calculated_at: Option<DateTime<Utc>>,
}

impl HashJob {
    /// Crea un job pendiente recién registrado
    pub fn pending(id: u64, input_str: &str) -> Self {
        Self {
            id,
            input_str: input_str.to_string(),
            hash: PENDING.to_string(),
            created_at: Utc::now(),
            calculated_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.hash == PENDING
    }

    /// Registra el resultado del cálculo.
    ///
    /// La transición PENDING → resultado ocurre una sola vez: si el job ya
    /// tenía resultado no se modifica nada y retorna `false`.
    pub fn complete(&mut self, bits: u32) -> bool {
        if !self.is_pending() {
            return false;
        }

        self.hash = bits.to_string();
        self.calculated_at = Some(Utc::now());
        true
    }
}

/// Valida el texto a hashear: requerido, 1..=255 caracteres
pub fn validate_input(input: &str) -> Result<(), HashError> {
    let chars = input.chars().count();

    if chars == 0 {
        return Err(HashError::InvalidInput("input_str is required".to_string()));
    }
    if chars > MAX_INPUT_CHARS {
        return Err(HashError::InvalidInput(format!(
            "input_str must be at most {} characters, got {}",
            MAX_INPUT_CHARS, chars
        )));
    }

    Ok(())
}

/// Body de `POST /hash/calc`
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub input_str: String,
}

/// Respuesta de `POST /hash/calc`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub id: u64,
}

fn zero_time() -> DateTime<Utc> {
    // 0001-01-01T00:00:00Z siempre es representable
    Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn serialize_calculated_at<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    value.unwrap_or_else(zero_time).serialize(serializer)
}

fn deserialize_calculated_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<DateTime<Utc>>::deserialize(deserializer)?;
    Ok(value.filter(|t| *t != zero_time()))
}
