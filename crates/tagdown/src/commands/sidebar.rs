//! `tagdown sidebar` command implementation.

use std::path::PathBuf;

use clap::Args;
use console::Term;
use tagdown_config::Config;
use tagdown_links::SidebarTable;

use crate::error::CliError;

/// Arguments for the sidebar command.
#[derive(Args)]
pub(crate) struct SidebarArgs {
    /// Sidebar file to normalize (default: `docs.sidebar` from config).
    sidebar: Option<PathBuf>,

    /// Print only the flattened key → path map.
    #[arg(long, conflicts_with = "expanded")]
    flattened: bool,

    /// Print only the expanded tree.
    #[arg(long)]
    expanded: bool,

    /// Path to configuration file (default: auto-discover tagdown.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl SidebarArgs {
    /// Print the normalized sidebar as JSON on stdout.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let path = match self.sidebar {
            Some(path) => path,
            None => Config::load(self.config.as_deref(), None)?.docs_resolved.sidebar,
        };

        let paths = SidebarTable::load(&path)?.normalize();
        let json = if self.flattened {
            serde_json::to_string_pretty(&paths.flattened)?
        } else if self.expanded {
            serde_json::to_string_pretty(&paths.expanded)?
        } else {
            serde_json::to_string_pretty(&paths)?
        };

        Term::stdout().write_line(&json)?;
        Ok(())
    }
}
