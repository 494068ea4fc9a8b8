use super::header_of;
use crate::compile_commands::{CompileStep, Tool};
use crate::config::dirname;
use crate::emit::RuleWriter;
use crate::file::{File, FilePath, Metadata};
use crate::graph::Dependencies;
use crate::kind::{EmitContext, Emitted, Kind, Relation};
use mkgen_common::scan;

/// Source language of a compiled unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Cxx,
    C,
}

/// A `.cc` or `.c` file: compiled to one object, linked into a program
/// when it defines `main`.
///
/// A unit also answers to its same-named header, so `#include "net/io.h"`
/// makes the includer depend on `net/io.cc` and, through it, link against
/// `net/io.o`.
#[derive(Debug, Clone, Copy)]
pub struct CompiledUnit {
    dialect: Dialect,
}

impl CompiledUnit {
    pub fn cxx() -> Self {
        Self {
            dialect: Dialect::Cxx,
        }
    }

    pub fn c() -> Self {
        Self { dialect: Dialect::C }
    }

    fn tool(&self) -> Tool {
        match self.dialect {
            Dialect::Cxx => Tool::Cxx,
            Dialect::C => Tool::Cc,
        }
    }

    fn link_recipe(&self, link_args: &[String]) -> String {
        let args = link_args.join(" ");
        match self.dialect {
            Dialect::Cxx => RuleWriter::spaced([
                "$(CXX) $(CXXFLAGS) -o $@ $^ $(PB_LIBS)",
                args.as_str(),
                "-pthread",
            ]),
            Dialect::C => RuleWriter::spaced(["$(CC) $(CFLAGS) -o $@ $^", args.as_str()]),
        }
    }
}

impl Kind for CompiledUnit {
    fn name(&self) -> &'static str {
        match self.dialect {
            Dialect::Cxx => "c++ unit",
            Dialect::C => "c unit",
        }
    }

    fn extension(&self) -> &'static str {
        match self.dialect {
            Dialect::Cxx => ".cc",
            Dialect::C => ".c",
        }
    }

    fn produces(&self) -> &'static [&'static str] {
        &[".o"]
    }

    fn parse(&self, _path: &FilePath, content: &str) -> Metadata {
        Metadata {
            includes: scan::includes(content),
            compile_args: scan::compile_args(content),
            link_args: scan::link_args(content),
            entry_point: scan::has_entry_point(content),
        }
    }

    fn aliases(&self, path: &FilePath) -> Vec<String> {
        vec![path.path.clone(), header_of(path)]
    }

    fn relation(&self, existing: &FilePath, incoming: &FilePath) -> Relation {
        if header_of(existing) == incoming.path {
            Relation::Drop
        } else {
            Relation::Incompatible
        }
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
        let meta = file.metadata();
        let object = layout.out(&path.swap_extension(".o"));

        let include_dirs = [
            format!("-I{}", layout.src_root),
            format!("-I{}", layout.build_root),
        ];
        let flags: Vec<String> = match self.dialect {
            Dialect::Cxx => meta.compile_args.iter().cloned().chain(include_dirs).collect(),
            Dialect::C => include_dirs
                .into_iter()
                .chain(meta.compile_args.iter().cloned())
                .collect(),
        };
        let step = CompileStep {
            tool: self.tool(),
            source: layout.src(&path.path),
            output: object.clone(),
            flags,
        };
        out.compile(&step, deps.compile.iter().map(|name| layout.out(name)));
        out.blank();

        let mut emitted = Emitted {
            directories: vec![dirname(&object).to_string()],
            compiles: vec![step],
            ..Emitted::default()
        };

        if meta.entry_point {
            let executable = layout.out(&path.base);
            let link_args: Vec<String> = deps
                .link_args
                .iter()
                .chain(&meta.link_args)
                .cloned()
                .collect();
            let prereqs = deps
                .link
                .iter()
                .map(|name| layout.out(name))
                .chain(std::iter::once(object));
            out.rule(&executable, prereqs, &[self.link_recipe(&link_args)]);
            out.blank();
            emitted.executables.push(executable);
        }

        emitted
    }
}
