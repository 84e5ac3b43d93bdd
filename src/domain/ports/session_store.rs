use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::errors::DomainResult;
use crate::domain::models::{ExperimentSession, SessionDocument};

/// Persistence port for experiment sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Write the full session, replacing any previous snapshot; returns its location
    async fn save(&self, session: &ExperimentSession) -> DomainResult<PathBuf>;

    /// Read a stored session back
    async fn load(&self, session_id: &str) -> DomainResult<SessionDocument>;
}
