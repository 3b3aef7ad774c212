pub mod catalog;
pub mod descriptor;

pub use catalog::{Catalog, CategoryGroup, build_catalog};
pub use descriptor::PluginDescriptor;
