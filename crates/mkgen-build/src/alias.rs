//! Logical name to owning file resolution.
//!
//! A file may be reachable under several names: `net/io.cc` also answers
//! to `net/io.h`, a schema to its generated headers. When two files claim
//! one name, the current owner's [`Kind::relation`] settles it. Because
//! the outcome depends on who claimed first, the map must be built over
//! the complete file set in discovery order.
//!
//! [`Kind::relation`]: crate::kind::Kind::relation

use crate::error::{BuildError, Result};
use crate::file::{FileId, FileSet};
use crate::kind::Relation;
use indexmap::IndexMap;
use smol_str::SmolStr;

#[derive(Debug, Default)]
pub struct AliasMap {
    owners: IndexMap<SmolStr, FileId>,
}

impl AliasMap {
    /// Claim every alias of every file, in discovery order.
    pub fn build(files: &FileSet) -> Result<Self> {
        let mut map = Self::default();
        for file in files.iter() {
            for alias in file.aliases() {
                map.claim(files, SmolStr::new(&alias), file.id())?;
            }
        }
        tracing::debug!(aliases = map.len(), files = files.len(), "alias map built");
        Ok(map)
    }

    fn claim(&mut self, files: &FileSet, alias: SmolStr, incoming: FileId) -> Result<()> {
        let Some(&current) = self.owners.get(&alias) else {
            self.owners.insert(alias, incoming);
            return Ok(());
        };

        let existing = files.get(current);
        let new = files.get(incoming);
        match existing.kind().relation(existing.path(), new.path()) {
            Relation::Incompatible => Err(BuildError::DuplicateAlias {
                alias: alias.to_string(),
                existing: existing.path().path.clone(),
                existing_kind: existing.kind().name(),
                incoming: new.path().path.clone(),
                incoming_kind: new.kind().name(),
            }),
            Relation::Drop => {
                tracing::debug!(%alias, owner = %existing.path(), dropped = %new.path(), "alias kept");
                Ok(())
            }
            Relation::Replace => {
                tracing::debug!(%alias, owner = %new.path(), replaced = %existing.path(), "alias replaced");
                self.owners.insert(alias, incoming);
                Ok(())
            }
        }
    }

    /// The file an include name refers to.
    pub fn resolve(&self, name: &str) -> Option<FileId> {
        self.owners.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::KindRegistry;
    use mkgen_common::SourceFile;

    fn load(paths: &[&str]) -> FileSet {
        let registry = KindRegistry::standard();
        FileSet::load(
            &registry,
            paths.iter().map(|p| SourceFile::new(*p, "")),
        )
        .unwrap()
    }

    fn owner<'a>(files: &'a FileSet, map: &AliasMap, name: &str) -> &'a str {
        &files.get(map.resolve(name).unwrap()).path().path
    }

    #[test]
    fn test_unit_discovered_before_header() {
        let files = load(&["x.cc", "x.h"]);
        let map = AliasMap::build(&files).unwrap();
        assert_eq!(owner(&files, &map, "x.h"), "x.cc");
        assert_eq!(owner(&files, &map, "x.cc"), "x.cc");
    }

    #[test]
    fn test_header_discovered_before_unit() {
        let files = load(&["x.h", "x.cc"]);
        let map = AliasMap::build(&files).unwrap();
        assert_eq!(owner(&files, &map, "x.h"), "x.cc");
    }

    #[test]
    fn test_c_unit_subsumes_header() {
        let files = load(&["lib/buf.h", "lib/buf.c"]);
        let map = AliasMap::build(&files).unwrap();
        assert_eq!(owner(&files, &map, "lib/buf.h"), "lib/buf.c");
    }

    #[test]
    fn test_unit_and_c_unit_with_same_base_collide() {
        let files = load(&["x.c", "x.cc"]);
        let err = AliasMap::build(&files).unwrap_err();
        match err {
            BuildError::DuplicateAlias {
                alias,
                existing,
                incoming,
                ..
            } => {
                assert_eq!(alias, "x.h");
                assert_eq!(existing, "x.c");
                assert_eq!(incoming, "x.cc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_schema_header_collides_with_plain_header() {
        let files = load(&["api/user.pb.h", "api/user.proto"]);
        let err = AliasMap::build(&files).unwrap_err();
        assert!(matches!(
            err,
            BuildError::DuplicateAlias { ref alias, .. } if alias == "api/user.pb.h"
        ));
    }

    #[test]
    fn test_schema_aliases() {
        let files = load(&["api/user.proto"]);
        let map = AliasMap::build(&files).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(owner(&files, &map, "api/user.grpc.pb.h"), "api/user.proto");
        assert!(map.resolve("api/user.h").is_none());
    }
}
