//! CLI error types.

use tagdown_config::ConfigError;
use tagdown_links::SidebarError;

use crate::site::BuildError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Sidebar(#[from] SidebarError),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Failed(String),
}
