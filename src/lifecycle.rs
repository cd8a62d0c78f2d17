//! Event lifecycle controller.
//!
//! Owns the single process-wide [`EventStatus`] and serializes the
//! `start` / `end` transitions. When a state file is configured, each
//! transition is persisted before it becomes visible in memory so a restart
//! resumes the last confirmed status.

use crate::error::AppError;
use crate::models::EventStatus;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// On-disk form of the event status.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStatus {
    status: EventStatus,
    updated_at: DateTime<Utc>,
}

/// JSON file holding the last confirmed event status.
#[derive(Debug, Clone)]
pub struct StatusFile {
    path: PathBuf,
}

impl StatusFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored status. A missing or unreadable file yields `Idle`.
    pub fn load(&self) -> EventStatus {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No state file at {}, starting idle", self.path.display());
                return EventStatus::Idle;
            }
            Err(e) => {
                warn!("Failed to read state file {}: {}", self.path.display(), e);
                return EventStatus::Idle;
            }
        };

        match serde_json::from_str::<PersistedStatus>(&content) {
            Ok(persisted) => persisted.status,
            Err(e) => {
                warn!("Ignoring corrupt state file {}: {}", self.path.display(), e);
                EventStatus::Idle
            }
        }
    }

    /// Write the status through a synced temp file and rename it into place.
    pub fn save(&self, status: EventStatus) -> Result<(), AppError> {
        let persisted = PersistedStatus {
            status,
            updated_at: Utc::now(),
        };

        let tmp_path = self.path.with_extension("tmp");
        let result = write_synced(&tmp_path, &persisted)
            .and_then(|()| fs::rename(&tmp_path, &self.path).map_err(AppError::from));

        if let Err(e) = result {
            if tmp_path.exists() {
                if let Err(rm) = fs::remove_file(&tmp_path) {
                    warn!("Failed to remove {}: {}", tmp_path.display(), rm);
                }
            }
            return Err(AppError::InternalFault(format!(
                "Failed to persist event status to {}: {}",
                self.path.display(),
                e
            )));
        }

        Ok(())
    }
}

fn write_synced(path: &Path, persisted: &PersistedStatus) -> Result<(), AppError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, persisted)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(())
}

/// Owner of the event status.
#[derive(Debug)]
pub struct EventController {
    status: Mutex<EventStatus>,
    store: Option<StatusFile>,
}

impl Default for EventController {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl EventController {
    /// Controller whose status lives only for the process lifetime.
    pub fn in_memory() -> Self {
        Self {
            status: Mutex::new(EventStatus::Idle),
            store: None,
        }
    }

    /// Controller backed by a state file, restoring the stored status.
    pub fn with_state_file(store: StatusFile) -> Self {
        let restored = store.load();
        info!(
            "Restored event status '{}' from {}",
            restored,
            store.path().display()
        );

        Self {
            status: Mutex::new(restored),
            store: Some(store),
        }
    }

    /// Mark the event as running. Idempotent.
    pub fn start(&self) -> Result<EventStatus, AppError> {
        self.transition(EventStatus::Running)
    }

    /// Mark the event as idle. Idempotent.
    pub fn end(&self) -> Result<EventStatus, AppError> {
        self.transition(EventStatus::Idle)
    }

    /// Whether transitions write to a state file.
    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    /// Current status.
    pub fn status(&self) -> EventStatus {
        *self.status.lock()
    }

    fn transition(&self, next: EventStatus) -> Result<EventStatus, AppError> {
        let mut current = self.status.lock();

        // Persist first: a failed write must leave the flag untouched.
        if let Some(ref store) = self.store {
            store.save(next)?;
        }

        let previous = *current;
        *current = next;

        if previous == next {
            debug!("Event already {}", next);
        } else {
            info!("Event status {} -> {}", previous, next);
        }

        Ok(next)
    }
}
