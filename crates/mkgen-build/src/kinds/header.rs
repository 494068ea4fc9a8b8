use super::{pattern_path, without_self};
use crate::emit::RuleWriter;
use crate::file::{File, FilePath, Metadata};
use crate::graph::Dependencies;
use crate::kind::{EmitContext, Emitted, Kind, Relation};
use mkgen_common::scan;

/// A `.h` file. Builds nothing itself; a pattern rule copies headers
/// into the build tree next to generated ones.
///
/// Link flags are collected so that a header-only wrapper can pass e.g.
/// `-lz` on to every program that includes it.
#[derive(Debug, Clone, Copy)]
pub struct Header;

impl Kind for Header {
    fn name(&self) -> &'static str {
        "header"
    }

    fn extension(&self) -> &'static str {
        ".h"
    }

    fn parse(&self, path: &FilePath, content: &str) -> Metadata {
        Metadata {
            includes: without_self(scan::includes(content), &self.aliases(path)),
            link_args: scan::link_args(content),
            ..Metadata::default()
        }
    }

    fn relation(&self, existing: &FilePath, incoming: &FilePath) -> Relation {
        if existing.base == incoming.base && matches!(incoming.extension.as_str(), ".cc" | ".c") {
            Relation::Replace
        } else {
            Relation::Incompatible
        }
    }

    fn emit(
        &self,
        file: &File,
        _deps: &Dependencies,
        ctx: EmitContext<'_>,
        _out: &mut RuleWriter,
    ) -> Emitted {
        let dir = &file.path().dir;
        let build_dir = ctx.layout.out(dir);
        let pattern = format!(
            "{}: {}\n\tcp $< $@\n",
            pattern_path(&build_dir, "%.h"),
            pattern_path(&ctx.layout.src(dir), "%.h"),
        );

        Emitted {
            directories: vec![build_dir],
            patterns: vec![pattern],
            ..Emitted::default()
        }
    }
}
