use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::error::{Result, ServanteError};
use crate::plugin::descriptor::{DESCRIPTOR_FILE, PluginDescriptor};

/// All plugins sharing one `pluginType`, in discovery order.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    pub label: String,
    pub value: String,
    pub children: Vec<PluginDescriptor>,
}

impl CategoryGroup {
    fn new(descriptor: PluginDescriptor) -> Self {
        Self {
            label: descriptor.plugin_type.clone(),
            value: descriptor.plugin_type.clone(),
            children: vec![descriptor],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    groups: Vec<CategoryGroup>,
}

impl Catalog {
    /// Groups descriptors by exact `pluginType`. Groups are created in the
    /// order their category is first seen; duplicates are kept as siblings.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = PluginDescriptor>) -> Self {
        let mut catalog = Self::default();

        for descriptor in descriptors {
            match catalog
                .groups
                .iter_mut()
                .find(|group| group.label == descriptor.plugin_type)
            {
                Some(group) => group.children.push(descriptor),
                None => catalog.groups.push(CategoryGroup::new(descriptor)),
            }
        }

        catalog
    }

    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    pub fn group(&self, index: usize) -> Option<&CategoryGroup> {
        self.groups.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn plugin_count(&self) -> usize {
        self.groups.iter().map(|group| group.children.len()).sum()
    }
}

/// Reads every `plugin.json` at any depth under `plugins_root`.
/// A single unreadable or malformed descriptor fails the whole build.
pub fn build_catalog(plugins_root: &Path) -> Result<Catalog> {
    if !plugins_root.is_dir() {
        return Err(ServanteError::MissingPluginsRoot {
            path: plugins_root.to_path_buf(),
        });
    }

    let descriptors = discover_descriptor_files(plugins_root)?
        .iter()
        .map(|path| PluginDescriptor::read(path))
        .collect::<Result<Vec<_>>>()?;

    let catalog = Catalog::from_descriptors(descriptors);
    tracing::info!(
        "catalog built from {}: {} plugins in {} categories",
        plugins_root.display(),
        catalog.plugin_count(),
        catalog.groups().len()
    );

    Ok(catalog)
}

fn discover_descriptor_files(plugins_root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkBuilder::new(plugins_root)
        .standard_filters(false)
        .follow_links(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build()
    {
        let entry = entry?;
        if entry.file_name() != DESCRIPTOR_FILE {
            continue;
        }

        if entry.file_type().is_some_and(|kind| kind.is_file()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
