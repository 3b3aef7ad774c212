use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IoResultExt, Result, ServanteError};

pub const DESCRIPTOR_FILE: &str = "plugin.json";

/// One `plugin.json`. Fields beyond the three required ones are kept
/// verbatim in `metadata`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDescriptor {
    pub plugin_type: String,
    pub name: String,
    pub display_name: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
    #[serde(skip)]
    pub source: PathBuf,
}

impl PluginDescriptor {
    pub fn read(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_path(path)?;
        Self::parse(&raw, path)
    }

    pub fn parse(raw: &str, path: &Path) -> Result<Self> {
        let mut descriptor = serde_json::from_str::<PluginDescriptor>(raw).map_err(|source| {
            ServanteError::MalformedDescriptor {
                path: path.to_path_buf(),
                source,
            }
        })?;
        descriptor.source = path.to_path_buf();
        Ok(descriptor)
    }

    /// `<plugins_root>/<pluginType>/<name>/templates/init`
    pub fn template_root(&self, plugins_root: &Path) -> PathBuf {
        plugins_root
            .join(&self.plugin_type)
            .join(&self.name)
            .join("templates")
            .join("init")
    }

    pub fn description(&self) -> Option<&str> {
        self.metadata.get("description").and_then(Value::as_str)
    }
}
