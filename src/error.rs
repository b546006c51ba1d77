use std::io;

use crate::config::ConfigError;
use crate::score::StoreError;
use crate::spawn::SpawnError;

/// Everything that can stop the binary outside of normal play.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("score storage: {0}")]
    Store(#[from] StoreError),
    #[error("cannot lay out board: {0}")]
    Spawn(#[from] SpawnError),
    #[error("cannot start logger: {0}")]
    Logger(#[from] log::SetLoggerError),
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
}
