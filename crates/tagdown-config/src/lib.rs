//! Configuration management for tagdown.
//!
//! Parses `tagdown.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `environment`
//! - `docs.source_dir`, `docs.output_dir`
//! - `links.cache_dir` (an empty result disables the file cache)

mod expand;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "tagdown.toml";

const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CHANGELOG_LIMIT: usize = 10;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override deployment environment.
    pub environment: Option<Environment>,
    /// Override link validation.
    pub validate: Option<bool>,
    /// Override the link cache directory.
    pub cache_dir: Option<PathBuf>,
}

/// Deployment environment the build targets.
///
/// Staging and production builds validate links by default and never
/// truncate the changelog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Name as written in configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    /// Whether this environment publishes to readers.
    #[must_use]
    pub fn is_deployed(self) -> bool {
        matches!(self, Self::Staging | Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::Validation(format!(
                "unknown environment '{other}' (expected development, staging or production)"
            ))),
        }
    }
}

/// How `badge` directives are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeStyle {
    /// `<Badge type="...">` component.
    #[default]
    Component,
    /// Bootstrap `<span class="badge badge-pill ...">` markup.
    Legacy,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Environment name before expansion.
    environment: String,
    /// Documentation paths (relative strings from TOML).
    docs: DocsConfigRaw,
    /// Link resolution settings as parsed from TOML.
    links: LinksConfigRaw,
    /// Changelog aggregation settings.
    pub changelog: ChangelogConfig,
    /// Output markup settings.
    pub output: OutputConfig,

    /// Resolved environment (set after loading).
    #[serde(skip)]
    pub environment_resolved: Environment,
    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Resolved links configuration (set after loading).
    #[serde(skip)]
    pub links_resolved: LinksConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    output_dir: Option<String>,
    partials_dir: Option<String>,
    changelog_dir: Option<String>,
    sidebar: Option<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default, Clone)]
pub struct DocsConfig {
    /// Source tree of `.md`/`.mdx` documents.
    pub source_dir: PathBuf,
    /// Output directory receiving the mirrored, transformed tree.
    pub output_dir: PathBuf,
    /// Directory holding `{% partial name %}` fragments.
    pub partials_dir: PathBuf,
    /// Directory holding changelog fragments.
    pub changelog_dir: PathBuf,
    /// Sidebar/link table (YAML or JSON).
    pub sidebar: PathBuf,
}

/// Raw links configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct LinksConfigRaw {
    validate: Option<bool>,
    cache_dir: Option<String>,
    cache_ttl_secs: Option<u64>,
    timeout_secs: Option<u64>,
}

/// Resolved link resolution configuration.
#[derive(Debug, Clone)]
pub struct LinksConfig {
    /// Explicit validation setting; `None` follows the environment.
    pub validate: Option<bool>,
    /// Directory for the file-backed resolution cache, if any.
    pub cache_dir: Option<PathBuf>,
    /// Lifetime of resolution cache entries.
    pub cache_ttl: Duration,
    /// Timeout for external link validation requests.
    pub timeout: Duration,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            validate: None,
            cache_dir: None,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Changelog aggregation configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Number of most recent entries kept outside deployed environments.
    pub limit: usize,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_CHANGELOG_LIMIT,
        }
    }
}

/// Output markup configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Badge rendering style.
    pub badge: BadgeStyle,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`links.cache_dir`").
        field: String,
        /// Error message (e.g., "${`TAGDOWN_CACHE_DIR`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `tagdown.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Whether links should be validated for this run.
    ///
    /// An explicit setting wins; otherwise only deployed environments validate.
    #[must_use]
    pub fn validate_links(&self) -> bool {
        self.links_resolved
            .validate
            .unwrap_or_else(|| self.environment_resolved.is_deployed())
    }

    /// Changelog truncation for this run, `None` when every entry is kept.
    #[must_use]
    pub fn changelog_limit(&self) -> Option<usize> {
        (!self.environment_resolved.is_deployed()).then_some(self.changelog.limit)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.docs_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(environment) = settings.environment {
            self.environment_resolved = environment;
        }
        if let Some(validate) = settings.validate {
            self.links_resolved.validate = Some(validate);
        }
        if let Some(cache_dir) = &settings.cache_dir {
            self.links_resolved.cache_dir = Some(cache_dir.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            environment: Environment::default().as_str().to_owned(),
            docs: DocsConfigRaw::default(),
            links: LinksConfigRaw::default(),
            changelog: ChangelogConfig::default(),
            output: OutputConfig::default(),
            environment_resolved: Environment::default(),
            docs_resolved: DocsConfig {
                source_dir: base.join("docs"),
                output_dir: base.join("build"),
                partials_dir: base.join("docs/_partials"),
                changelog_dir: base.join("docs/_changelogs"),
                sidebar: base.join("sidebar.yml"),
            },
            links_resolved: LinksConfig::default(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.links_resolved.cache_ttl.is_zero() {
            return Err(ConfigError::Validation(
                "links.cache_ttl_secs must be greater than 0".to_owned(),
            ));
        }
        if self.links_resolved.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "links.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if self.changelog.limit == 0 {
            return Err(ConfigError::Validation(
                "changelog.limit must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.environment = expand::expand_env(&self.environment, "environment")?;

        if let Some(ref dir) = self.docs.source_dir {
            self.docs.source_dir = Some(expand::expand_env(dir, "docs.source_dir")?);
        }
        if let Some(ref dir) = self.docs.output_dir {
            self.docs.output_dir = Some(expand::expand_env(dir, "docs.output_dir")?);
        }
        if let Some(ref dir) = self.links.cache_dir {
            self.links.cache_dir = expand::expand_optional(dir, "links.cache_dir")?;
        }

        Ok(())
    }

    /// Parse the environment and resolve relative paths against the config directory.
    fn resolve(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        self.environment_resolved = self.environment.parse()?;

        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.docs_resolved = DocsConfig {
            source_dir: resolve(self.docs.source_dir.as_deref(), "docs"),
            output_dir: resolve(self.docs.output_dir.as_deref(), "build"),
            partials_dir: resolve(self.docs.partials_dir.as_deref(), "docs/_partials"),
            changelog_dir: resolve(self.docs.changelog_dir.as_deref(), "docs/_changelogs"),
            sidebar: resolve(self.docs.sidebar.as_deref(), "sidebar.yml"),
        };

        self.links_resolved = LinksConfig {
            validate: self.links.validate,
            cache_dir: self.links.cache_dir.as_deref().map(|d| config_dir.join(d)),
            cache_ttl: Duration::from_secs(
                self.links.cache_ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS),
            ),
            timeout: Duration::from_secs(self.links.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        };

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn parse(toml: &str, base: &str) -> Config {
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve(Path::new(base)).unwrap();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.environment_resolved, Environment::Development);
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/test/docs"));
        assert_eq!(config.docs_resolved.output_dir, PathBuf::from("/test/build"));
        assert_eq!(
            config.docs_resolved.partials_dir,
            PathBuf::from("/test/docs/_partials")
        );
        assert_eq!(config.docs_resolved.sidebar, PathBuf::from("/test/sidebar.yml"));
        assert_eq!(config.links_resolved.cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.links_resolved.cache_dir, None);
        assert_eq!(config.changelog.limit, 10);
        assert_eq!(config.output.badge, BadgeStyle::Component);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parse("", "/project");
        assert_eq!(config.environment_resolved, Environment::Development);
        assert_eq!(
            config.docs_resolved.changelog_dir,
            PathBuf::from("/project/docs/_changelogs")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
environment = "staging"

[docs]
source_dir = "content"
output_dir = "dist"
partials_dir = "content/_partials"
changelog_dir = "content/_changelogs"
sidebar = "data/sidebar.json"

[links]
validate = false
cache_dir = ".tagdown/cache"
cache_ttl_secs = 60
timeout_secs = 5

[changelog]
limit = 3

[output]
badge = "legacy"
"#;
        let config = parse(toml, "/project");

        assert_eq!(config.environment_resolved, Environment::Staging);
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/project/content"));
        assert_eq!(config.docs_resolved.output_dir, PathBuf::from("/project/dist"));
        assert_eq!(
            config.docs_resolved.sidebar,
            PathBuf::from("/project/data/sidebar.json")
        );
        assert_eq!(config.links_resolved.validate, Some(false));
        assert_eq!(
            config.links_resolved.cache_dir,
            Some(PathBuf::from("/project/.tagdown/cache"))
        );
        assert_eq!(config.links_resolved.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.links_resolved.timeout, Duration::from_secs(5));
        assert_eq!(config.changelog.limit, 3);
        assert_eq!(config.output.badge, BadgeStyle::Legacy);
    }

    #[test]
    fn test_unknown_environment_rejected() {
        let mut config: Config = toml::from_str(r#"environment = "qa""#).unwrap();
        let err = config.resolve(Path::new("/project")).unwrap_err();
        assert!(err.to_string().contains("unknown environment 'qa'"));
    }

    #[test]
    fn test_environment_aliases() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert!(Environment::Staging.is_deployed());
        assert!(!Environment::Development.is_deployed());
    }

    #[test]
    fn test_validate_links_follows_environment() {
        let mut config = Config::default_with_base(Path::new("/p"));
        assert!(!config.validate_links());

        config.environment_resolved = Environment::Production;
        assert!(config.validate_links());

        config.links_resolved.validate = Some(false);
        assert!(!config.validate_links());
    }

    #[test]
    fn test_changelog_limit_only_outside_deployed() {
        let mut config = Config::default_with_base(Path::new("/p"));
        assert_eq!(config.changelog_limit(), Some(10));

        config.environment_resolved = Environment::Staging;
        assert_eq!(config.changelog_limit(), None);
    }

    #[test]
    fn test_apply_cli_settings_multiple() {
        let mut config = Config::default_with_base(Path::new("/p"));
        let settings = CliSettings {
            source_dir: Some(PathBuf::from("/other/docs")),
            output_dir: None,
            environment: Some(Environment::Production),
            validate: Some(false),
            cache_dir: Some(PathBuf::from("/tmp/cache")),
        };
        config.apply_cli_settings(&settings);

        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/other/docs"));
        assert_eq!(config.docs_resolved.output_dir, PathBuf::from("/p/build"));
        assert_eq!(config.environment_resolved, Environment::Production);
        assert_eq!(config.links_resolved.validate, Some(false));
        assert_eq!(config.links_resolved.cache_dir, Some(PathBuf::from("/tmp/cache")));
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/p"));
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/p/docs"));
        assert_eq!(config.links_resolved.validate, None);
    }

    #[test]
    fn test_expand_env_vars_environment_and_cache_dir() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("TAGDOWN_CFG_TEST_ENV", "production");
            std::env::remove_var("TAGDOWN_CFG_TEST_CACHE");
        }
        let toml = r#"
environment = "${TAGDOWN_CFG_TEST_ENV}"

[links]
cache_dir = "${TAGDOWN_CFG_TEST_CACHE:-}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        config.resolve(Path::new("/project")).unwrap();

        assert_eq!(config.environment_resolved, Environment::Production);
        assert_eq!(config.links_resolved.cache_dir, None);
        unsafe {
            std::env::remove_var("TAGDOWN_CFG_TEST_ENV");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("TAGDOWN_CFG_TEST_MISSING");
        }
        let toml = r#"
[docs]
output_dir = "${TAGDOWN_CFG_TEST_MISSING}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();
        assert!(err.to_string().contains("docs.output_dir"));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = Config::default_with_base(Path::new("/p"));
        config.links_resolved.cache_ttl = Duration::ZERO;
        assert!(config.validate().unwrap_err().to_string().contains("cache_ttl_secs"));

        let mut config = Config::default_with_base(Path::new("/p"));
        config.links_resolved.timeout = Duration::ZERO;
        assert!(config.validate().unwrap_err().to_string().contains("timeout_secs"));

        let mut config = Config::default_with_base(Path::new("/p"));
        config.changelog.limit = 0;
        assert!(config.validate().unwrap_err().to_string().contains("changelog.limit"));
    }

    #[test]
    fn test_load_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[docs]\nsource_dir = \"src\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.docs_resolved.source_dir, tmp.path().join("src"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_path() {
        let err = Config::load(Some(Path::new("/nonexistent/tagdown.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[links\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
