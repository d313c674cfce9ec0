//! Configuration loading.

use aspx_symbols::{ControlInfo, ControlRegistry, DataType, QualifiedName};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use thiserror::Error;

/// Name of the configuration file looked up in the workspace root.
pub const CONFIG_FILE_NAME: &str = "aspx.config.json";

/// Extensions checked when the configuration names none.
const DEFAULT_EXTENSIONS: &[&str] = &[".aspx", ".ascx", ".master"];

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    /// The file is not a valid configuration.
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },
}

/// Project configuration, read from `aspx.config.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AspxConfig {
    /// File extensions to process.
    pub extensions: Vec<String>,

    /// Glob patterns to exclude, relative to the workspace.
    pub exclude: Vec<String>,

    /// Seed the registry with the built-in `asp:` controls.
    pub standard_controls: bool,

    /// Extra control registrations.
    pub controls: Vec<ControlConfig>,
}

/// One control registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ControlConfig {
    /// Tag prefix, e.g. `ajax`.
    pub prefix: String,

    /// Tag name, e.g. `UpdatePanel`.
    pub name: String,

    /// Fully qualified type name.
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default)]
    pub children_as_properties: bool,

    /// Attribute and property types by name.
    #[serde(default)]
    pub data_types: IndexMap<String, DataType>,
}

impl Default for AspxConfig {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
            exclude: Vec::new(),
            standard_controls: true,
            controls: Vec::new(),
        }
    }
}

impl AspxConfig {
    /// Loads the configuration.
    ///
    /// An explicit path must exist. Without one, `aspx.config.json` in the
    /// workspace root is used when present, and defaults otherwise.
    pub fn load(workspace: &Utf8Path, explicit: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) if path.is_relative() => workspace.join(path),
            Some(path) => path.to_owned(),
            None => {
                let path = workspace.join(CONFIG_FILE_NAME);
                if !path.exists() {
                    tracing::debug!(%workspace, "no {CONFIG_FILE_NAME}, using defaults");
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(
            %path,
            controls = config.controls.len(),
            exclude = config.exclude.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Parses configuration text. Comments are allowed.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(&remove_json_comments(content))
    }

    /// Returns the file extensions to process.
    pub fn file_extensions(&self) -> Vec<&str> {
        if self.extensions.is_empty() {
            DEFAULT_EXTENSIONS.to_vec()
        } else {
            self.extensions.iter().map(|s| s.as_str()).collect()
        }
    }

    /// Builds the control registry every page is resolved against.
    pub fn registry(&self) -> ControlRegistry {
        let mut registry = if self.standard_controls {
            ControlRegistry::with_standard_controls()
        } else {
            ControlRegistry::new()
        };

        for control in &self.controls {
            let info = control.data_types.iter().fold(
                ControlInfo::new(QualifiedName::parse(&control.type_name))
                    .with_children_as_properties(control.children_as_properties),
                |info, (name, data_type)| info.with_data_type(name, data_type.clone()),
            );
            registry.register(&control.prefix, &control.name, info);
        }

        registry
    }
}

/// Removes single-line and multi-line comments from JSON.
fn remove_json_comments(json: &str) -> String {
    let mut result = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            result.push(c);
            if c == '"' {
                in_string = false;
            } else if c == '\\' {
                if let Some(next) = chars.next() {
                    result.push(next);
                }
            }
        } else if c == '"' {
            result.push(c);
            in_string = true;
        } else if c == '/' {
            match chars.peek() {
                Some('/') => {
                    chars.next();
                    while let Some(&next) = chars.peek() {
                        if next == '\n' {
                            break;
                        }
                        chars.next();
                    }
                }
                Some('*') => {
                    chars.next();
                    while let Some(next) = chars.next() {
                        if next == '*' && chars.peek() == Some(&'/') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {
                    result.push(c);
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}
