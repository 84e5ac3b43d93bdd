use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ExperimentSession, SessionDocument};
use crate::domain::ports::SessionStore;

/// One pretty-printed JSON file per session under a directory
#[derive(Debug, Clone)]
pub struct JsonSessionStore {
    directory: PathBuf,
}

impl JsonSessionStore {
    /// Open the store, creating `directory` when missing
    pub async fn new(directory: impl Into<PathBuf>) -> DomainResult<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory).await.map_err(|e| {
            DomainError::Storage(format!(
                "cannot create session directory {}: {e}",
                directory.display()
            ))
        })?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// `{directory}/{session_id}.json`
    pub fn path_for(&self, session_id: &str) -> PathBuf {
        self.directory.join(format!("{session_id}.json"))
    }
}

#[async_trait]
impl SessionStore for JsonSessionStore {
    async fn save(&self, session: &ExperimentSession) -> DomainResult<PathBuf> {
        let path = self.path_for(&session.session_id);
        let json = serde_json::to_string_pretty(&session.to_document())?;
        fs::write(&path, json).await?;
        debug!(path = %path.display(), attempts = session.attempts.len(), "session saved");
        Ok(path)
    }

    async fn load(&self, session_id: &str) -> DomainResult<SessionDocument> {
        let path = self.path_for(session_id);
        let json = fs::read_to_string(&path).await.map_err(|e| {
            DomainError::Storage(format!("cannot read session {}: {e}", path.display()))
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}
