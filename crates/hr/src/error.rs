//! CLI error types.

use hr_agent::EndpointError;
use hr_config::ConfigError;

use crate::reload::ReloadError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Endpoint(#[from] EndpointError),

    #[error("{0}")]
    Reload(#[from] ReloadError),
}
