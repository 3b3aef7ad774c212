use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServanteError>;

/// Failures of a catalog build or a scaffold run. All of them abort the
/// operation they occur in.
#[derive(Debug, Error)]
pub enum ServanteError {
    #[error("plugins directory not found: {}", path.display())]
    MissingPluginsRoot { path: PathBuf },

    #[error("malformed plugin descriptor {}: {source}", path.display())]
    MalformedDescriptor {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("plugin has no template root at {}", path.display())]
    MissingTemplateRoot { path: PathBuf },

    #[error("cannot render template {}: {message}", path.display())]
    Template { path: PathBuf, message: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("directory walk failed: {0}")]
    Walk(#[from] ignore::Error),
}

pub(crate) trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| ServanteError::Io {
            path: path.into(),
            source,
        })
    }
}
