//! Source tree enumeration.

use mkgen_build::{BuildError, FilePath, KindRegistry};
use mkgen_common::SourceFile;
use miette::{miette, Result};
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// `a/b/c` form of a path relative to the source root.
fn to_posix(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// `path` with `.` components removed.
fn lexical(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Where `skip` sits inside `src_root`, in [`to_posix`] form, or `None`
/// when it lies outside the tree.
///
/// `mkgen . out` walks `./out` while the build root reads `out`, so the
/// two are compared relative to the root. Canonical paths are used when
/// both exist, which also covers a mix of absolute and relative roots.
fn relative_skip(src_root: &Path, skip: &Path) -> Option<String> {
    let rel = match (src_root.canonicalize(), skip.canonicalize()) {
        (Ok(root), Ok(skip)) => skip.strip_prefix(&root).ok().map(to_posix),
        _ => lexical(skip)
            .strip_prefix(lexical(src_root))
            .ok()
            .map(to_posix),
    };
    rel.filter(|rel| !rel.is_empty())
}

/// Every file under `src_root` whose extension has a registered kind,
/// read into memory.
///
/// Entries are visited sorted by name at each level, which makes the
/// order lexicographic by path component and stable across runs and
/// platforms. Hidden entries and `skip` (typically a build root nested
/// inside the source tree) are not descended into.
pub fn discover(src_root: &Path, skip: Option<&Path>, registry: &KindRegistry) -> Result<Vec<SourceFile>> {
    let skip = skip.and_then(|skip| relative_skip(src_root, skip));
    let is_skipped = |entry: &DirEntry| {
        skip.as_deref().is_some_and(|skip| {
            entry.depth() > 0
                && entry
                    .path()
                    .strip_prefix(src_root)
                    .is_ok_and(|rel| to_posix(rel) == skip)
        })
    };
    let walker = WalkDir::new(src_root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry) && !is_skipped(entry));

    let mut sources = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| miette!("Failed to walk {}: {}", src_root.display(), e))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = entry.path().strip_prefix(src_root).unwrap_or(entry.path());
        let rel = to_posix(rel);
        if !registry.handles(&FilePath::new(rel.as_str()).extension) {
            tracing::trace!(file = %rel, "skipped");
            continue;
        }

        let content = std::fs::read_to_string(entry.path()).map_err(|source| {
            BuildError::ReadSource {
                path: entry.path().display().to_string(),
                source,
            }
        })?;
        sources.push(SourceFile::new(rel, content));
    }

    tracing::debug!(root = %src_root.display(), files = sources.len(), "discovered");
    Ok(sources)
}
