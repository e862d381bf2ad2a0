//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Bare `$VAR` is left alone so that literal dollar signs in paths survive.

use crate::ConfigError;

/// Expand environment variable references in a configuration value.
///
/// `field` is the dotted config path used in error messages
/// (e.g. `links.cache_dir`).
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Expand a value that may legitimately come out empty.
///
/// Returns `None` when the expanded value is empty or only whitespace, which is
/// how `cache_dir = "${TAGDOWN_CACHE_DIR:-}"` switches the external cache off.
pub(crate) fn expand_optional(value: &str, field: &str) -> Result<Option<String>, ConfigError> {
    let expanded = expand_env(value, field)?;
    let trimmed = expanded.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_owned()))
}

/// Name of an environment variable that was referenced but not set.
struct UnsetVar(String);
