//! `tagdown build` command implementation.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use clap::Args;
use tagdown_cache::{Cache, FileCache, MemoryCache};
use tagdown_config::{CliSettings, Config, Environment};
use tagdown_directives::{BadgeStyle, DirectiveKind, RegistryOptions, default_registry};
use tagdown_links::{HttpFetcher, LinkResolver, SidebarTable};

use crate::error::CliError;
use crate::output::Output;
use crate::site::SiteBuilder;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover tagdown.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Markdown source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory for the transformed tree (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Deployment environment: development, staging or production.
    #[arg(long, env = "TAGDOWN_ENV", value_parser = Environment::from_str)]
    env: Option<Environment>,

    /// Validate links (default: only in staging and production).
    #[arg(long)]
    validate: bool,

    /// Skip link validation.
    #[arg(long, conflicts_with = "validate")]
    no_validate: bool,

    /// Directory for the link resolution cache (default: in-memory).
    #[arg(long, env = "TAGDOWN_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Enable verbose output (show INFO logs).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            environment: self.env,
            validate: self.no_validate.then_some(false).or(self.validate.then_some(true)),
            // An empty TAGDOWN_CACHE_DIR selects the in-memory cache.
            cache_dir: self.cache_dir.filter(|dir| !dir.as_os_str().is_empty()),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let docs = &config.docs_resolved;
        let links = &config.links_resolved;

        output.info(&format!("Source: {}", docs.source_dir.display()));
        output.info(&format!("Output: {}", docs.output_dir.display()));
        output.info(&format!("Environment: {}", config.environment_resolved));

        let table = SidebarTable::load(&docs.sidebar)?;

        let cache: Box<dyn Cache> = match &links.cache_dir {
            Some(dir) => {
                tracing::info!(path = %dir.display(), "Using file cache");
                Box::new(FileCache::new(dir.clone(), version))
            }
            None => Box::new(MemoryCache::new()),
        };

        let resolver = LinkResolver::new(table.normalize(), cache.bucket("links", links.cache_ttl))
            .with_validation(config.validate_links())
            .with_source_dir(&docs.source_dir)
            .with_fetcher(HttpFetcher::new(links.timeout));

        let registry = default_registry(
            RegistryOptions::new(Arc::new(resolver))
                .with_badge(badge_style(config.output.badge))
                .with_partials_dir(&docs.partials_dir)
                .with_changelog_dir(&docs.changelog_dir)
                .with_changelog_limit(config.changelog_limit()),
        );
        tracing::debug!(
            leaves = ?registry.names(DirectiveKind::Leaf),
            containers = ?registry.names(DirectiveKind::Container),
            "Registered directives"
        );

        let report = SiteBuilder::new(&registry, &docs.source_dir, &docs.output_dir).build()?;

        for document in &report.documents {
            if let Some(failure) = &document.failure {
                output.error(failure);
            }
            for diagnostic in &document.diagnostics {
                output.diagnostic(diagnostic);
            }
        }

        let errors = report.error_count();
        let warnings = report.warning_count();
        let summary = format!(
            "Processed {} documents: {errors} errors, {warnings} warnings",
            report.documents.len()
        );
        if errors > 0 {
            return Err(CliError::Failed(summary));
        }

        output.success(&summary);
        Ok(())
    }
}

fn badge_style(style: tagdown_config::BadgeStyle) -> BadgeStyle {
    match style {
        tagdown_config::BadgeStyle::Component => BadgeStyle::Component,
        tagdown_config::BadgeStyle::Legacy => BadgeStyle::Legacy,
    }
}
