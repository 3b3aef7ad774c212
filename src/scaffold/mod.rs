pub mod render;

use futures::future::try_join_all;
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{IoResultExt, Result, ServanteError};
use crate::model::request::ScaffoldRequest;
use render::Context;

pub const DEFAULT_BINARY_EXTENSIONS: [&str; 11] = [
    "gif", "jpg", "jpeg", "bmp", "png", "eot", "ttf", "woff", "woff2", "wav", "pdf",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Copied byte for byte.
    Binary,
    /// Rendered through the template tags.
    Text,
}

/// Extensions (without the dot, case-sensitive) that are never rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExtensions(HashSet<String>);

impl BinaryExtensions {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_string())
                .collect(),
        )
    }

    pub fn classify(&self, path: &Path) -> FileKind {
        let is_binary = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.0.contains(ext));

        if is_binary {
            FileKind::Binary
        } else {
            FileKind::Text
        }
    }
}

impl Default for BinaryExtensions {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY_EXTENSIONS)
    }
}

#[derive(Debug, Clone)]
struct TemplateFile {
    source: PathBuf,
    relative: PathBuf,
    kind: FileKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldReport {
    pub destination: PathBuf,
    pub rendered: usize,
    pub copied: usize,
}

/// Materializes a plugin's `templates/init` tree into a new project directory.
#[derive(Debug, Clone)]
pub struct Scaffolder {
    plugins_root: PathBuf,
    binary_extensions: BinaryExtensions,
}

impl Scaffolder {
    pub fn new(plugins_root: PathBuf, binary_extensions: BinaryExtensions) -> Self {
        Self {
            plugins_root,
            binary_extensions,
        }
    }

    /// Every file is processed concurrently. The first failure fails the run;
    /// files already written stay on disk, and existing files are overwritten.
    pub async fn run(&self, request: &ScaffoldRequest) -> Result<ScaffoldReport> {
        let destination = std::path::absolute(&request.project_path)
            .with_path(&request.project_path)?;
        let template_root = request.plugin.template_root(&self.plugins_root);
        tracing::info!(
            "scaffolding {}/{} into {}",
            request.plugin.plugin_type,
            request.plugin.name,
            destination.display()
        );

        if !template_root.is_dir() {
            tracing::error!("missing template root {}", template_root.display());
            return Err(ServanteError::MissingTemplateRoot {
                path: template_root,
            });
        }

        let files = self.enumerate(&template_root)?;
        tracing::info!("processing {} template files", files.len());

        let context = Context::new().with("name", request.project_name.as_str());
        let kinds = try_join_all(
            files
                .iter()
                .map(|file| process_file(file, &destination, &context)),
        )
        .await
        .inspect_err(|err| tracing::error!("scaffold failed: {err}"))?;

        let copied = kinds.iter().filter(|kind| **kind == FileKind::Binary).count();
        let report = ScaffoldReport {
            destination,
            rendered: kinds.len() - copied,
            copied,
        };
        tracing::info!(
            "scaffold done: {} rendered, {} copied",
            report.rendered,
            report.copied
        );

        Ok(report)
    }

    fn enumerate(&self, template_root: &Path) -> Result<Vec<TemplateFile>> {
        let mut files = Vec::new();

        for entry in WalkBuilder::new(template_root)
            .standard_filters(false)
            .follow_links(true)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build()
        {
            let entry = entry?;
            if !entry.file_type().is_some_and(|kind| kind.is_file()) {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(template_root) else {
                continue;
            };

            files.push(TemplateFile {
                relative: relative.to_path_buf(),
                kind: self.binary_extensions.classify(entry.path()),
                source: entry.path().to_path_buf(),
            });
        }

        Ok(files)
    }
}

async fn process_file(
    file: &TemplateFile,
    destination: &Path,
    context: &Context,
) -> Result<FileKind> {
    let target = destination.join(&file.relative);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).await.with_path(parent)?;
    }

    let bytes = fs::read(&file.source).await.with_path(&file.source)?;
    match file.kind {
        FileKind::Binary => fs::write(&target, bytes).await.with_path(&target)?,
        FileKind::Text => {
            let rendered = render::render(&String::from_utf8_lossy(&bytes), context).map_err(
                |err| ServanteError::Template {
                    path: file.source.clone(),
                    message: format!("{err:?}"),
                },
            )?;
            fs::write(&target, rendered).await.with_path(&target)?;
        }
    }

    tracing::debug!("{:?} {}", file.kind, target.display());
    Ok(file.kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::PluginDescriptor;
    use std::fs as std_fs;

    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', b'<', b'%', b'%', b' ', b'n', 0xff];

    fn plugin(plugins_root: &Path) -> PluginDescriptor {
        let raw = r#"{ "pluginType": "slides", "name": "reveal", "displayName": "Reveal.js" }"#;
        let source = plugins_root.join("slides/reveal/plugin.json");
        PluginDescriptor::parse(raw, &source).unwrap()
    }

    fn write_template(plugins_root: &Path, relative: &str, contents: &[u8]) {
        let path = plugins_root
            .join("slides/reveal/templates/init")
            .join(relative);
        std_fs::create_dir_all(path.parent().unwrap()).unwrap();
        std_fs::write(path, contents).unwrap();
    }

    fn request(plugins_root: &Path, destination: &Path, name: &str) -> ScaffoldRequest {
        ScaffoldRequest {
            project_name: name.to_string(),
            project_path: destination.to_path_buf(),
            plugin: plugin(plugins_root),
        }
    }

    fn scaffolder(plugins_root: &Path) -> Scaffolder {
        Scaffolder::new(plugins_root.to_path_buf(), BinaryExtensions::default())
    }

    #[test]
    fn classifies_by_extension() {
        let binary = BinaryExtensions::default();

        assert_eq!(binary.classify(Path::new("logo.png")), FileKind::Binary);
        assert_eq!(binary.classify(Path::new("fonts/a.woff2")), FileKind::Binary);
        assert_eq!(binary.classify(Path::new("README.md")), FileKind::Text);
        assert_eq!(binary.classify(Path::new("LOGO.PNG")), FileKind::Text);
        assert_eq!(binary.classify(Path::new("Makefile")), FileKind::Text);
    }

    #[test]
    fn configured_extensions_accept_leading_dot() {
        let binary = BinaryExtensions::new([".svg"]);

        assert_eq!(binary.classify(Path::new("a.svg")), FileKind::Binary);
        assert_eq!(binary.classify(Path::new("a.png")), FileKind::Text);
    }

    #[tokio::test]
    async fn renders_text_and_copies_binary() {
        let plugins = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_template(plugins.path(), "README.md", b"Hello <%% name %%>!");
        write_template(plugins.path(), "img/logo.png", PNG_BYTES);
        write_template(plugins.path(), "css/deep/theme.css", b"body {}\n");
        let destination = out.path().join("Foo");

        let report = scaffolder(plugins.path())
            .run(&request(plugins.path(), &destination, "Foo"))
            .await
            .unwrap();

        assert_eq!(report.rendered, 2);
        assert_eq!(report.copied, 1);
        assert_eq!(report.destination, destination);
        assert_eq!(
            std_fs::read_to_string(destination.join("README.md")).unwrap(),
            "Hello Foo!"
        );
        assert_eq!(std_fs::read(destination.join("img/logo.png")).unwrap(), PNG_BYTES);
        assert_eq!(
            std_fs::read_to_string(destination.join("css/deep/theme.css")).unwrap(),
            "body {}\n"
        );
    }

    #[tokio::test]
    async fn dotfiles_are_scaffolded() {
        let plugins = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_template(plugins.path(), ".gitignore", b"node_modules\n");
        write_template(plugins.path(), "node_modules/keep.txt", b"kept");

        scaffolder(plugins.path())
            .run(&request(plugins.path(), out.path(), "Foo"))
            .await
            .unwrap();

        assert!(out.path().join(".gitignore").is_file());
        assert!(out.path().join("node_modules/keep.txt").is_file());
    }

    #[tokio::test]
    async fn second_run_overwrites_existing_files() {
        let plugins = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_template(plugins.path(), "README.md", b"# <%% name %%>");
        let scaffolder = scaffolder(plugins.path());

        scaffolder
            .run(&request(plugins.path(), out.path(), "First"))
            .await
            .unwrap();
        std_fs::write(out.path().join("README.md"), "local edits").unwrap();
        scaffolder
            .run(&request(plugins.path(), out.path(), "Second"))
            .await
            .unwrap();

        assert_eq!(
            std_fs::read_to_string(out.path().join("README.md")).unwrap(),
            "# Second"
        );
    }

    #[tokio::test]
    async fn missing_template_root_fails_run() {
        let plugins = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std_fs::create_dir_all(plugins.path().join("slides/reveal")).unwrap();

        let err = scaffolder(plugins.path())
            .run(&request(plugins.path(), &out.path().join("p"), "Foo"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServanteError::MissingTemplateRoot { .. }));
        assert!(!out.path().join("p").exists());
    }

    #[tokio::test]
    async fn write_failure_fails_run() {
        let plugins = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_template(plugins.path(), "docs/a.md", b"a");
        // a regular file where a directory is needed
        std_fs::write(out.path().join("docs"), "blocker").unwrap();

        let err = scaffolder(plugins.path())
            .run(&request(plugins.path(), out.path(), "Foo"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServanteError::Io { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinked_template_files_are_followed() {
        let plugins = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_template(plugins.path(), "shared.md", b"# <%% name %%>");
        let init = plugins.path().join("slides/reveal/templates/init");
        std::os::unix::fs::symlink(init.join("shared.md"), init.join("README.md")).unwrap();

        let report = scaffolder(plugins.path())
            .run(&request(plugins.path(), out.path(), "Foo"))
            .await
            .unwrap();

        assert_eq!(report.rendered, 2);
        assert_eq!(
            std_fs::read_to_string(out.path().join("README.md")).unwrap(),
            "# Foo"
        );
    }

    #[tokio::test]
    async fn relative_project_path_resolves_to_absolute_destination() {
        let plugins = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir_in(".").unwrap();
        write_template(plugins.path(), "README.md", b"<%% name %%>");
        let relative = out.path().join("talk");
        assert!(relative.is_relative());

        let report = scaffolder(plugins.path())
            .run(&request(plugins.path(), &relative, "Foo"))
            .await
            .unwrap();

        assert!(report.destination.is_absolute());
        assert!(report.destination.ends_with("talk"));
        assert_eq!(
            std_fs::read_to_string(report.destination.join("README.md")).unwrap(),
            "Foo"
        );
    }

    #[tokio::test]
    async fn empty_template_root_writes_nothing() {
        let plugins = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std_fs::create_dir_all(plugins.path().join("slides/reveal/templates/init")).unwrap();
        let destination = out.path().join("talk");

        let report = scaffolder(plugins.path())
            .run(&request(plugins.path(), &destination, "Foo"))
            .await
            .unwrap();

        assert_eq!((report.rendered, report.copied), (0, 0));
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn broken_template_fails_run() {
        let plugins = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_template(plugins.path(), "README.md", b"<%%#name%%> never closed");

        let err = scaffolder(plugins.path())
            .run(&request(plugins.path(), out.path(), "Foo"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServanteError::Template { .. }));
    }
}
