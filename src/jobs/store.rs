//! # Persistencia de Hash Jobs
//! src/jobs/store.rs
//!
//! Contrato `JobStore` que consume el orquestador y sus dos backends:
//! - `MemoryJobStore`: HashMap protegido por Mutex
//! - `FileJobStore`: cache en memoria respaldada por un archivo JSON
//!
//! El store asigna los IDs (secuenciales desde 1) y el `created_at`.

use crate::config::{Config, StorageBackend};
use crate::error::StoreError;
use crate::jobs::job::HashJob;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Operaciones de persistencia que necesita el orquestador
pub trait JobStore: Send + Sync {
    /// Crea un registro pendiente y retorna el job con su ID asignado
    fn create(&self, input_str: &str) -> Result<HashJob, StoreError>;

    /// Obtiene un job por ID; `StoreError::NotFound` si no existe
    fn get(&self, id: u64) -> Result<HashJob, StoreError>;

    /// Escribe `hash` y `calculated_at`. El resto del registro no cambia.
    fn update(&self, job: &HashJob) -> Result<(), StoreError>;
}

/// Abre el backend indicado en la configuración
pub fn open_store(config: &Config) -> Result<Arc<dyn JobStore>, StoreError> {
    match config.storage {
        StorageBackend::Memory => Ok(Arc::new(MemoryJobStore::new())),
        StorageBackend::File => Ok(Arc::new(FileJobStore::open(&config.jobs_storage_path)?)),
    }
}

/// Tabla de jobs compartida por ambos backends
#[derive(Debug, Default)]
struct JobTable {
    jobs: HashMap<u64, HashJob>,
    next_id: u64,
}

impl JobTable {
    fn from_jobs(jobs: HashMap<u64, HashJob>) -> Self {
        let next_id = jobs.keys().max().copied().unwrap_or(0) + 1;
        Self { jobs, next_id }
    }

    fn insert_pending(&mut self, input_str: &str) -> HashJob {
        if self.next_id == 0 {
            self.next_id = 1;
        }
        let job = HashJob::pending(self.next_id, input_str);
        self.next_id += 1;
        self.jobs.insert(job.id, job.clone());
        job
    }

    fn get(&self, id: u64) -> Result<HashJob, StoreError> {
        self.jobs.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn apply_update(&mut self, job: &HashJob) -> Result<(), StoreError> {
        let stored = self.jobs.get_mut(&job.id).ok_or(StoreError::NotFound(job.id))?;
        stored.hash = job.hash.clone();
        stored.calculated_at = job.calculated_at;
        Ok(())
    }
}

fn lock(table: &Mutex<JobTable>) -> Result<MutexGuard<'_, JobTable>, StoreError> {
    table
        .lock()
        .map_err(|_| StoreError::Unavailable("job table lock poisoned".to_string()))
}

/// Store solo en memoria
#[derive(Debug, Default, Clone)]
pub struct MemoryJobStore {
    table: Arc<Mutex<JobTable>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Número de jobs almacenados
    pub fn count(&self) -> usize {
        self.table.lock().map(|t| t.jobs.len()).unwrap_or(0)
    }
}

impl JobStore for MemoryJobStore {
    fn create(&self, input_str: &str) -> Result<HashJob, StoreError> {
        Ok(lock(&self.table)?.insert_pending(input_str))
    }

    fn get(&self, id: u64) -> Result<HashJob, StoreError> {
        lock(&self.table)?.get(id)
    }

    fn update(&self, job: &HashJob) -> Result<(), StoreError> {
        lock(&self.table)?.apply_update(job)
    }
}

/// Store respaldado por un archivo JSON.
///
/// Cada mutación reescribe el archivo completo de forma atómica
/// (archivo temporal + rename). Los jobs que quedaron `PENDING` en un
/// proceso anterior se cargan tal cual: nadie los retoma.
#[derive(Debug, Clone)]
pub struct FileJobStore {
    /// Ruta al archivo de persistencia
    path: PathBuf,

    /// Cache en memoria de los jobs
    table: Arc<Mutex<JobTable>>,
}

impl FileJobStore {
    /// Abre el archivo (o lo crea vacío) y carga los jobs existentes
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let jobs = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            HashMap::new()
        };
        debug!(path = %path.display(), jobs = jobs.len(), "job store loaded");

        Ok(Self {
            path,
            table: Arc::new(Mutex::new(JobTable::from_jobs(jobs))),
        })
    }

    fn load_from_file(path: &Path) -> Result<HashMap<u64, HashJob>, StoreError> {
        let reader = BufReader::new(File::open(path)?);

        match serde_json::from_reader::<_, Vec<HashJob>>(reader) {
            Ok(jobs) => Ok(jobs.into_iter().map(|job| (job.id, job)).collect()),
            Err(e) => {
                // Archivo corrupto: empezar limpio
                warn!(path = %path.display(), error = %e, "corrupted job store, starting empty");
                Ok(HashMap::new())
            }
        }
    }

    /// Guarda todos los jobs al archivo. Se llama con el lock tomado.
    fn save_to_file(&self, table: &JobTable) -> Result<(), StoreError> {
        let mut jobs: Vec<&HashJob> = table.jobs.values().collect();
        jobs.sort_by_key(|job| job.id);

        let temp_path = self.path.with_extension("json.tmp");
        let mut writer = BufWriter::new(File::create(&temp_path)?);
        serde_json::to_writer_pretty(&mut writer, &jobs)?;
        writer.flush()?;
        drop(writer);

        // Renombrar (atómico en sistemas Unix)
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.table.lock().map(|t| t.jobs.len()).unwrap_or(0)
    }
}

impl JobStore for FileJobStore {
    fn create(&self, input_str: &str) -> Result<HashJob, StoreError> {
        let mut table = lock(&self.table)?;
        let job = table.insert_pending(input_str);

        if let Err(e) = self.save_to_file(&table) {
            // Sin persistencia no hay registro
            table.jobs.remove(&job.id);
            return Err(e);
        }
        Ok(job)
    }

    fn get(&self, id: u64) -> Result<HashJob, StoreError> {
        lock(&self.table)?.get(id)
    }

    fn update(&self, job: &HashJob) -> Result<(), StoreError> {
        let mut table = lock(&self.table)?;
        let previous = table.get(job.id)?;
        table.apply_update(job)?;

        if let Err(e) = self.save_to_file(&table) {
            table.jobs.insert(previous.id, previous);
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("hash_server_{}_{}.json", name, std::process::id()));
        let _ = fs::remove_file(&path);
        path
    }

    // ==================== MemoryJobStore ====================

    #[test]
    fn test_memory_ids_are_sequential() {
        let store = MemoryJobStore::new();
        assert_eq!(store.create("a").unwrap().id, 1);
        assert_eq!(store.create("b").unwrap().id, 2);
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn test_memory_get_pending() {
        let store = MemoryJobStore::new();
        let job = store.create("Hello").unwrap();

        let fetched = store.get(job.id).unwrap();
        assert!(fetched.is_pending());
        assert_eq!(fetched.input_str, "Hello");
    }

    #[test]
    fn test_memory_get_nonexistent() {
        let store = MemoryJobStore::new();
        assert!(matches!(store.get(42), Err(StoreError::NotFound(42))));
    }

    #[test]
    fn test_memory_update_only_touches_result() {
        let store = MemoryJobStore::new();
        let created = store.create("abc").unwrap();

        let mut changed = created.clone();
        changed.input_str = "tampered".to_string();
        changed.complete(12);
        store.update(&changed).unwrap();

        let fetched = store.get(created.id).unwrap();
        assert_eq!(fetched.hash, "12");
        assert_eq!(fetched.input_str, "abc");
        assert_eq!(fetched.created_at, created.created_at);
        assert!(fetched.calculated_at.is_some());
    }

    #[test]
    fn test_memory_update_nonexistent() {
        let store = MemoryJobStore::new();
        let job = HashJob::pending(9, "x");
        assert!(matches!(store.update(&job), Err(StoreError::NotFound(9))));
    }

    // ==================== FileJobStore ====================

    #[test]
    fn test_file_persistence() {
        let path = temp_path("persist");

        let id = {
            let store = FileJobStore::open(&path).unwrap();
            let mut job = store.create("persist me").unwrap();
            job.complete(5);
            store.update(&job).unwrap();
            job.id
        };

        // Segunda instancia: debe cargar el job guardado
        let store = FileJobStore::open(&path).unwrap();
        let job = store.get(id).unwrap();
        assert_eq!(job.hash, "5");
        assert_eq!(job.input_str, "persist me");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_resumes_id_counter() {
        let path = temp_path("resume");

        {
            let store = FileJobStore::open(&path).unwrap();
            store.create("one").unwrap();
            store.create("two").unwrap();
        }

        let store = FileJobStore::open(&path).unwrap();
        assert_eq!(store.create("three").unwrap().id, 3);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_pending_survives_restart() {
        let path = temp_path("pending");

        {
            let store = FileJobStore::open(&path).unwrap();
            store.create("abandoned").unwrap();
        }

        let store = FileJobStore::open(&path).unwrap();
        assert!(store.get(1).unwrap().is_pending());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_corrupted_starts_empty() {
        let path = temp_path("corrupted");
        fs::write(&path, b"{ this is not valid json }").unwrap();

        let store = FileJobStore::open(&path).unwrap();
        assert_eq!(store.count(), 0);
        assert_eq!(store.create("fresh").unwrap().id, 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_creates_parent_dir() {
        let dir = std::env::temp_dir().join(format!("hash_server_dir_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("jobs.json");

        let store = FileJobStore::open(&path).unwrap();
        store.create("x").unwrap();
        assert!(path.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_file_clone_shares_state() {
        let path = temp_path("clone");

        let store = FileJobStore::open(&path).unwrap();
        let clone = store.clone();
        clone.create("shared").unwrap();
        assert_eq!(store.count(), 1);

        let _ = fs::remove_file(&path);
    }
}
