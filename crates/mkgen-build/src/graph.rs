//! Dependency edges and their transitive closure.
//!
//! Edge construction needs the finished [`AliasMap`]; closure needs every
//! edge. Both run over the whole [`FileSet`] before any rule is written.

use crate::alias::AliasMap;
use crate::error::{BuildError, Result};
use crate::file::{File, FileId, FileSet};
use indexmap::IndexSet;
use rustc_hash::FxHashSet;

/// Turn each file's include names into edges to the files owning them.
///
/// Includes that resolve to the including file itself are dropped.
pub fn resolve_edges(files: &mut FileSet, aliases: &AliasMap) -> Result<()> {
    let mut resolved = Vec::with_capacity(files.len());
    for file in files.iter() {
        let mut edges = Vec::new();
        for include in &file.metadata().includes {
            let target = aliases
                .resolve(&include.node)
                .ok_or_else(|| unresolved(file, &include.node, include.span))?;
            if target != file.id() {
                edges.push(target);
            }
        }
        resolved.push((file.id(), edges));
    }

    for (id, edges) in resolved {
        files.get_mut(id).set_dependencies(edges);
    }
    Ok(())
}

fn unresolved(file: &File, name: &str, span: mkgen_common::Span) -> BuildError {
    let source = file.source();
    let (line, _) = source.line_col(span.start);
    BuildError::UnresolvedInclude {
        file: file.path().path.clone(),
        line: line + 1,
        name: name.to_string(),
        src: source.named_source(),
        span: span.into(),
    }
}

/// Every file reachable from `root`, each once, in depth-first pre-order
/// over include order. `root` itself is never part of the result, even
/// when a cycle leads back to it.
pub fn closure(files: &FileSet, root: FileId) -> Vec<FileId> {
    let mut seen = FxHashSet::default();
    seen.insert(root);
    let mut order = Vec::new();
    // Each frame is a file and the index of its next edge to follow.
    let mut stack: Vec<(FileId, usize)> = vec![(root, 0)];

    while let Some(frame) = stack.last_mut() {
        let (id, next) = *frame;
        let Some(&dep) = files.get(id).dependencies().get(next) else {
            stack.pop();
            continue;
        };
        frame.1 += 1;

        if dep == root {
            tracing::debug!(
                file = %files.get(root).path(),
                via = %files.get(id).path(),
                "include cycle"
            );
        }
        if seen.insert(dep) {
            order.push(dep);
            stack.push((dep, 0));
        }
    }
    order
}

/// The closure of one file and the name lists derived from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    /// Reachable files in traversal order.
    pub files: Vec<FileId>,
    /// The last alias of each reachable file; the names a compile recipe
    /// needs present.
    pub compile: Vec<String>,
    /// The artifacts of each reachable file; what a link recipe needs.
    pub link: Vec<String>,
    /// Link flags of each reachable file, first occurrence kept.
    pub link_args: Vec<String>,
}

impl Dependencies {
    /// Derive the name lists for `root` from its closure.
    pub fn of(files: &FileSet, root: FileId) -> Result<Self> {
        let reachable = closure(files, root);
        let mut compile = Vec::new();
        let mut link = Vec::new();
        let mut link_args = IndexSet::new();

        for &id in &reachable {
            let file = files.get(id);
            compile.extend(file.compile_name());
            link.extend(file.artifacts());
            link_args.extend(file.metadata().link_args.iter().cloned());
        }

        let owner = &files.get(root).path().path;
        ensure_unique(owner, "compile-time", &compile)?;
        ensure_unique(owner, "link-time", &link)?;

        Ok(Self {
            files: reachable,
            compile,
            link,
            link_args: link_args.into_iter().collect(),
        })
    }
}

fn ensure_unique(file: &str, view: &'static str, names: &[String]) -> Result<()> {
    let mut seen = FxHashSet::default();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(BuildError::InvariantViolation {
                file: file.to_string(),
                view,
                name: name.clone(),
            });
        }
    }
    Ok(())
}

/// Dependencies of every file, indexed by [`FileId`].
pub fn all_dependencies(files: &FileSet) -> Result<Vec<Dependencies>> {
    files.ids().map(|id| Dependencies::of(files, id)).collect()
}
