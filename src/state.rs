use std::path::PathBuf;
use std::sync::Arc;
use crate::config::Config;
use crate::file::Storage;

/// Shared by every handler. Holds only read-only locations; each request is
/// served independently.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub public_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(storage: Storage, public_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage: Arc::new(storage),
            public_dir: Arc::new(public_dir.into()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Storage::new(&config.storage), &config.public)
    }
}
