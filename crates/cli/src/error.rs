use canvass_storage::StorageError;

use crate::config::ConfigError;
use crate::take::TakeError;

/// Anything that ends a command with a non-zero exit.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Take(#[from] TakeError),

    #[error("server error: {0}")]
    Serve(String),

    #[error("could not encode output: {0}")]
    Encode(#[from] serde_json::Error),
}
