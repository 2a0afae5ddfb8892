// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::{AuthService, JwtAuthService};
use crate::storage::{Database, StorageResult};

/// Token lifetime used by [`AppState::in_memory`].
const IN_MEMORY_TOKEN_TTL_SECONDS: u64 = 30 * 60;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub auth: Arc<dyn AuthService>,
    /// Directory the database lives in, reported by the health checks.
    pub data_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(db: Arc<Database>, auth: Arc<dyn AuthService>) -> Self {
        Self {
            db,
            auth,
            data_dir: None,
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }

    /// State over a fresh in-memory database with JWT auth signed by `secret`.
    pub fn in_memory(secret: &[u8]) -> StorageResult<Self> {
        let db = Arc::new(Database::in_memory()?);
        let auth = Arc::new(JwtAuthService::new(
            db.clone(),
            secret,
            IN_MEMORY_TOKEN_TTL_SECONDS,
        ));
        Ok(Self::new(db, auth))
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self::in_memory(b"unit-test-secret-0123456789abcdef").unwrap()
    }
}
