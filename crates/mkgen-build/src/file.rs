//! Discovered files and the arena that owns them.

use crate::kind::Kind;
use crate::registry::KindRegistry;
use crate::Result;
use mkgen_common::{SourceFile, Spanned};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Stable index of a file in its [`FileSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The identity of a file: its source-relative path split into parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilePath {
    /// Full relative path, e.g. `net/socket.cc`.
    pub path: String,
    /// Directory, e.g. `net`; empty at the top level.
    pub dir: String,
    /// Path without the extension, e.g. `net/socket`.
    pub base: String,
    /// Final extension including the dot, e.g. `.cc`; empty if none.
    pub extension: String,
}

impl FilePath {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let dir = crate::config::dirname(&path).to_string();
        let name_start = path.rfind('/').map_or(0, |i| i + 1);
        // A leading dot names a hidden file, not an extension.
        let (base, extension) = match path[name_start..].rfind('.') {
            Some(dot) if dot > 0 => {
                let at = name_start + dot;
                (path[..at].to_string(), path[at..].to_string())
            }
            _ => (path.clone(), String::new()),
        };
        Self {
            path,
            dir,
            base,
            extension,
        }
    }

    /// The base path with a different extension.
    pub fn swap_extension(&self, extension: &str) -> String {
        format!("{}{}", self.base, extension)
    }

    /// The base path with each of `extensions` appended.
    pub fn variants(&self, extensions: &[&str]) -> Vec<String> {
        extensions.iter().map(|e| self.swap_extension(e)).collect()
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// What a kind extracts from a file's text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Raw include/import names, in source order.
    pub includes: Vec<Spanned<String>>,
    /// `@compileargs` flag text, in source order.
    pub compile_args: Vec<String>,
    /// `@linkargs` flag text, in source order.
    pub link_args: Vec<String>,
    /// Whether the file declares a program entry point.
    pub entry_point: bool,
}

/// One discovered file.
///
/// Metadata is fixed at construction. The dependency list is filled in
/// once by [`crate::graph::resolve_edges`] and read-only afterwards.
pub struct File {
    id: FileId,
    path: FilePath,
    source: SourceFile,
    kind: Arc<dyn Kind>,
    metadata: Metadata,
    dependencies: Vec<FileId>,
}

impl File {
    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn path(&self) -> &FilePath {
        &self.path
    }

    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    pub fn kind(&self) -> &dyn Kind {
        self.kind.as_ref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Direct dependencies, in include order.
    pub fn dependencies(&self) -> &[FileId] {
        &self.dependencies
    }

    /// Logical names this file may be included by.
    pub fn aliases(&self) -> Vec<String> {
        self.kind.aliases(&self.path)
    }

    /// The name other files' recipes list when they depend on this one.
    pub fn compile_name(&self) -> Option<String> {
        self.aliases().pop()
    }

    /// Build products this file's own recipe creates.
    pub fn artifacts(&self) -> Vec<String> {
        self.kind.artifacts(&self.path)
    }

    pub(crate) fn set_dependencies(&mut self, dependencies: Vec<FileId>) {
        self.dependencies = dependencies;
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("path", &self.path.path)
            .field("kind", &self.kind.name())
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// All discovered files, in discovery order.
#[derive(Debug, Default)]
pub struct FileSet {
    files: Vec<File>,
    by_path: FxHashMap<String, FileId>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from sources already in discovery order.
    pub fn load(
        registry: &KindRegistry,
        sources: impl IntoIterator<Item = SourceFile>,
    ) -> Result<Self> {
        let mut files = Self::new();
        for source in sources {
            files.add(registry, source)?;
        }
        Ok(files)
    }

    /// Add one file, parsing it with the kind its extension selects.
    ///
    /// Adding a path twice replaces nothing; the existing id is returned.
    pub fn add(&mut self, registry: &KindRegistry, source: SourceFile) -> Result<FileId> {
        if let Some(&id) = self.by_path.get(&source.path) {
            return Ok(id);
        }

        let path = FilePath::new(source.path.clone());
        let kind = registry.lookup(&path)?;
        let metadata = kind.parse(&path, &source.content);

        let id = FileId(self.files.len() as u32);
        tracing::debug!(
            file = %path,
            kind = kind.name(),
            includes = metadata.includes.len(),
            entry_point = metadata.entry_point,
            "loaded"
        );
        self.by_path.insert(path.path.clone(), id);
        self.files.push(File {
            id,
            path,
            source,
            kind,
            metadata,
            dependencies: Vec::new(),
        });
        Ok(id)
    }

    pub fn get(&self, id: FileId) -> &File {
        &self.files[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: FileId) -> &mut File {
        &mut self.files[id.index()]
    }

    pub fn find(&self, path: &str) -> Option<&File> {
        self.by_path.get(path).map(|&id| self.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &File> {
        self.files.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = FileId> {
        (0..self.files.len() as u32).map(FileId)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_path_parts() {
        let p = FilePath::new("net/socket.cc");
        assert_eq!(p.dir, "net");
        assert_eq!(p.base, "net/socket");
        assert_eq!(p.extension, ".cc");
        assert_eq!(p.swap_extension(".h"), "net/socket.h");

        let top = FilePath::new("main.cc");
        assert_eq!(top.dir, "");
        assert_eq!(top.base, "main");
    }

    #[test]
    fn test_only_last_extension_is_split() {
        let p = FilePath::new("api/service.pb.h");
        assert_eq!(p.base, "api/service.pb");
        assert_eq!(p.extension, ".h");
        assert_eq!(
            p.variants(&[".o", ".d"]),
            vec!["api/service.pb.o", "api/service.pb.d"]
        );
    }

    #[test]
    fn test_hidden_file_has_no_extension() {
        let p = FilePath::new("conf/.clang-format");
        assert_eq!(p.extension, "");
        assert_eq!(p.base, "conf/.clang-format");
    }

    #[test]
    fn test_add_is_idempotent_per_path() {
        let registry = KindRegistry::standard();
        let mut files = FileSet::new();
        let a = files
            .add(&registry, SourceFile::new("a.h", "int a();\n"))
            .unwrap();
        let again = files
            .add(&registry, SourceFile::new("a.h", "int b();\n"))
            .unwrap();
        assert_eq!(a, again);
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_unknown_extension_fails() {
        let registry = KindRegistry::standard();
        let err = FileSet::load(&registry, [SourceFile::new("notes.txt", "")]).unwrap_err();
        match err {
            crate::BuildError::UnknownKind { path, extension } => {
                assert_eq!(path, "notes.txt");
                assert_eq!(extension, ".txt");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
