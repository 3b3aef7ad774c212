use std::path::PathBuf;

use crate::plugin::PluginDescriptor;

/// Everything one scaffold run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaffoldRequest {
    pub project_name: String,
    pub project_path: PathBuf,
    pub plugin: PluginDescriptor,
}

impl ScaffoldRequest {
    pub fn new(project_name: String, project_path: PathBuf, plugin: PluginDescriptor) -> Self {
        Self {
            project_name,
            project_path,
            plugin,
        }
    }
}

/// Blank input falls back to `default_name`.
pub fn resolve_project_name(input: &str, default_name: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        default_name.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Blank input falls back to `./<project_name>`.
pub fn resolve_project_path(input: &str, project_name: &str) -> PathBuf {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        default_project_path(project_name)
    } else {
        PathBuf::from(trimmed)
    }
}

pub fn default_project_path(project_name: &str) -> PathBuf {
    PathBuf::from(".").join(project_name)
}
