//! Sidebar link table.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

/// Error loading a sidebar file.
#[derive(Debug, thiserror::Error)]
pub enum SidebarError {
    #[error("Failed to read sidebar {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid YAML in sidebar: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid JSON in sidebar: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sidebar entry '{path}' must be a path string or a mapping, found {found}")]
    InvalidLeaf { path: String, found: &'static str },
}

/// Nested mapping of section → category → slug → page path.
///
/// ```yaml
/// api:
///   commands:
///     and: and.html
///     as: as.html
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SidebarTable {
    root: Map<String, Value>,
}

/// Both derived views of a [`SidebarTable`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPaths {
    /// Leaf key → full path. Later duplicates replace earlier ones.
    pub flattened: BTreeMap<String, String>,
    /// Original shape with every leaf replaced by its full path.
    pub expanded: Value,
}

impl SidebarTable {
    /// Load a sidebar from a `.json`, `.yml` or `.yaml` file.
    pub fn load(path: &Path) -> Result<Self, SidebarError> {
        let content = std::fs::read_to_string(path).map_err(|source| SidebarError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, SidebarError> {
        Self::from_value(serde_yaml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self, SidebarError> {
        Self::from_value(serde_json::from_str(content)?)
    }

    /// Validate a parsed table: every leaf must be a string.
    pub fn from_value(value: Value) -> Result<Self, SidebarError> {
        match value {
            Value::Object(root) => {
                validate(&root, "")?;
                Ok(Self { root })
            }
            // An empty YAML document
            Value::Null => Ok(Self { root: Map::new() }),
            other => Err(SidebarError::InvalidLeaf {
                path: String::new(),
                found: type_name(&other),
            }),
        }
    }

    /// Compute the flattened and expanded views in one pass.
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    /// use tagdown_links::SidebarTable;
    ///
    /// let table = SidebarTable::from_value(json!({"a": {"b": {"c": "c.html"}}})).unwrap();
    /// let paths = table.normalize();
    /// assert_eq!(paths.flattened["c"], "a/b/c.html");
    /// assert_eq!(paths.expanded, json!({"a": {"b": {"c": "a/b/c.html"}}}));
    /// ```
    #[must_use]
    pub fn normalize(&self) -> NormalizedPaths {
        let mut flattened = BTreeMap::new();
        let mut prefix = Vec::new();
        let expanded = expand(&self.root, &mut prefix, &mut flattened);
        NormalizedPaths {
            flattened,
            expanded: Value::Object(expanded),
        }
    }
}

impl NormalizedPaths {
    /// Look `key` up in the flattened view, then as a dotted path
    /// (`api.commands.and`) in the expanded view.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&str> {
        if let Some(path) = self.flattened.get(key) {
            return Some(path.as_str());
        }
        key.split('.')
            .try_fold(&self.expanded, |node, segment| node.get(segment))?
            .as_str()
    }
}

fn expand<'a>(
    map: &'a Map<String, Value>,
    prefix: &mut Vec<&'a str>,
    flattened: &mut BTreeMap<String, String>,
) -> Map<String, Value> {
    let mut expanded = Map::new();
    for (key, value) in map {
        match value {
            Value::String(leaf) => {
                let mut full = prefix.join("/");
                if !full.is_empty() {
                    full.push('/');
                }
                full.push_str(leaf);
                flattened.insert(key.clone(), full.clone());
                expanded.insert(key.clone(), Value::String(full));
            }
            Value::Object(children) => {
                prefix.push(key);
                let child = expand(children, prefix, flattened);
                prefix.pop();
                expanded.insert(key.clone(), Value::Object(child));
            }
            _ => {}
        }
    }
    expanded
}

fn validate(map: &Map<String, Value>, parent: &str) -> Result<(), SidebarError> {
    for (key, value) in map {
        let path = if parent.is_empty() {
            key.clone()
        } else {
            format!("{parent}.{key}")
        };
        match value {
            Value::String(_) => {}
            Value::Object(children) => validate(children, &path)?,
            other => {
                return Err(SidebarError::InvalidLeaf {
                    path,
                    found: type_name(other),
                });
            }
        }
    }
    Ok(())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
