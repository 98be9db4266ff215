use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use hirelens_core::JobId;
use hirelens_logging::{lens_debug, lens_info, lens_warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

pub const STATE_FILENAME: &str = ".hirelens_state.ron";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("state directory missing or not writable: {0}")]
    StateDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("could not serialize state: {0}")]
    Serialize(String),
}

/// Ensure the state directory exists; create if missing.
pub fn ensure_state_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::StateDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::StateDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::StateDir(e.to_string()))?;
    }
    Ok(())
}

/// Write `{dir}/{filename}` through a temp file and rename, so readers never
/// see a half-written file.
pub fn write_atomically(dir: &Path, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
    ensure_state_dir(dir)?;

    let target = dir.join(filename);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
    Ok(target)
}

/// Remembers the last started job so a restart can catch up on its results.
pub trait JobIdStore: Send {
    /// Missing or unreadable state yields `None`.
    fn load(&self) -> Option<JobId>;
    fn save(&self, job_id: &str) -> Result<(), PersistError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedState {
    last_job_id: Option<String>,
}

/// Stores the job id as RON in `{dir}/.hirelens_state.ron`.
#[derive(Debug, Clone)]
pub struct RonJobIdStore {
    dir: PathBuf,
}

impl RonJobIdStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STATE_FILENAME)
    }
}

impl JobIdStore for RonJobIdStore {
    fn load(&self) -> Option<JobId> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                lens_debug!("no persisted state at {:?}", path);
                return None;
            }
            Err(err) => {
                lens_warn!("Failed to read persisted state from {:?}: {}", path, err);
                return None;
            }
        };

        let state: PersistedState = match ron::from_str(&content) {
            Ok(state) => state,
            Err(err) => {
                lens_warn!("Failed to parse persisted state from {:?}: {}", path, err);
                return None;
            }
        };
        state.last_job_id.filter(|id| !id.trim().is_empty())
    }

    fn save(&self, job_id: &str) -> Result<(), PersistError> {
        let state = PersistedState {
            last_job_id: Some(job_id.to_string()),
        };
        let content = ron::ser::to_string_pretty(&state, ron::ser::PrettyConfig::new())
            .map_err(|err| PersistError::Serialize(err.to_string()))?;
        let path = write_atomically(&self.dir, STATE_FILENAME, &content)?;
        lens_info!("Saved job id {} to {:?}", job_id, path);
        Ok(())
    }
}
