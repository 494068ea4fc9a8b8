//! Extension to kind lookup.

use crate::error::{BuildError, Result};
use crate::file::FilePath;
use crate::kind::Kind;
use crate::kinds::{CompositeUnit, CompiledUnit, Header, ProtobufSchema};
use indexmap::IndexMap;
use smol_str::SmolStr;
use std::sync::Arc;

/// Maps file extensions to the kind that handles them.
///
/// Filled once before discovery and only read afterwards.
#[derive(Debug, Default, Clone)]
pub struct KindRegistry {
    kinds: IndexMap<SmolStr, Arc<dyn Kind>>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in kinds: C++ and C units, headers, `.cch` composite
    /// units and protobuf schemas.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(CompiledUnit::cxx());
        registry.register(CompiledUnit::c());
        registry.register(Header);
        registry.register(CompositeUnit);
        registry.register(ProtobufSchema);
        registry
    }

    /// Register a kind under its extension. A later registration for the
    /// same extension wins.
    pub fn register(&mut self, kind: impl Kind + 'static) -> &mut Self {
        let extension = SmolStr::new(kind.extension());
        tracing::debug!(
            extension = %extension,
            kind = kind.name(),
            produces = ?kind.produces(),
            "registering kind"
        );
        if let Some(previous) = self.kinds.insert(extension.clone(), Arc::new(kind)) {
            tracing::debug!(extension = %extension, replaced = previous.name(), "kind replaced");
        }
        self
    }

    /// Kind for an extension such as `.cc`.
    pub fn get(&self, extension: &str) -> Option<&Arc<dyn Kind>> {
        self.kinds.get(extension)
    }

    pub fn handles(&self, extension: &str) -> bool {
        self.kinds.contains_key(extension)
    }

    /// Kind for `path`'s extension, or [`BuildError::UnknownKind`] naming
    /// the file.
    pub fn lookup(&self, path: &FilePath) -> Result<Arc<dyn Kind>> {
        self.get(&path.extension)
            .cloned()
            .ok_or_else(|| BuildError::UnknownKind {
                path: path.path.clone(),
                extension: path.extension.clone(),
            })
    }

    /// Registered extensions, in registration order.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(|k| k.as_str())
    }
}
