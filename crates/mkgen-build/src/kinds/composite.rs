use super::{pattern_path, without_self};
use crate::compile_commands::{CompileStep, Tool};
use crate::emit::RuleWriter;
use crate::file::{File, FilePath, Metadata};
use crate::graph::Dependencies;
use crate::kind::{EmitContext, Emitted, Kind};
use mkgen_common::scan;

/// A `.cch` file: one source holding both a header and an implementation,
/// split by the `$(CCH)` generator into `x.cch.h` and `x.cch.cc`.
///
/// Composite units never produce programs.
#[derive(Debug, Clone, Copy)]
pub struct CompositeUnit;

impl Kind for CompositeUnit {
    fn name(&self) -> &'static str {
        "composite unit"
    }

    fn extension(&self) -> &'static str {
        ".cch"
    }

    fn produces(&self) -> &'static [&'static str] {
        &[".cch.o"]
    }

    fn parse(&self, path: &FilePath, content: &str) -> Metadata {
        Metadata {
            includes: without_self(scan::includes(content), &self.aliases(path)),
            compile_args: scan::compile_args(content),
            link_args: scan::link_args(content),
            entry_point: false,
        }
    }

    fn aliases(&self, path: &FilePath) -> Vec<String> {
        vec![path.path.clone(), format!("{}.h", path.path)]
    }

    fn emit(
        &self,
        file: &File,
        deps: &Dependencies,
        ctx: EmitContext<'_>,
        out: &mut RuleWriter,
    ) -> Emitted {
        let layout = ctx.layout;
        let path = file.path();
        let build_dir = layout.out(&path.dir);
        let output_base = pattern_path(&build_dir, "%.cch");
        let pattern = format!(
            "{output_base}.cc {output_base}.h: {}\n\t$(CCH) --input $< --include={} --output={}\n",
            pattern_path(&layout.src(&path.dir), "%.cch"),
            pattern_path(&path.dir, "%f"),
            pattern_path(&build_dir, "%f"),
        );

        let mut flags = vec![
            format!("-I{}", layout.src_root),
            format!("-I{}", layout.build_root),
        ];
        flags.extend(file.metadata().compile_args.iter().cloned());
        let step = CompileStep {
            tool: Tool::Cxx,
            source: layout.out(&path.swap_extension(".cch.cc")),
            output: layout.out(&path.swap_extension(".cch.o")),
            flags,
        };
        out.compile(&step, deps.compile.iter().map(|name| layout.out(name)));
        out.blank();

        Emitted {
            directories: vec![build_dir],
            patterns: vec![pattern],
            compiles: vec![step],
            ..Emitted::default()
        }
    }
}
