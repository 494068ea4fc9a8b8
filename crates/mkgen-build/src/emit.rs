//! Makefile rendering.
//!
//! Kinds write their own rule blocks through a [`RuleWriter`]; the
//! [`Makefile`] wraps those blocks with the preamble and the aggregate
//! targets built from what every kind reported.

use crate::compile_commands::CompileStep;
use crate::config::{dirname, BuildConfig, Layout};
use crate::file::{File, FileSet};
use crate::graph::{self, Dependencies};
use crate::kind::{EmitContext, Emitted};
use crate::Result;
use indexmap::{IndexMap, IndexSet};
use std::collections::BTreeSet;

/// Append-only Makefile text buffer.
#[derive(Debug, Default, Clone)]
pub struct RuleWriter {
    buf: String,
}

impl RuleWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the non-empty parts with single spaces.
    pub fn spaced<I, S>(parts: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = String::new();
        for part in parts {
            let part = part.as_ref();
            if part.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(part);
        }
        out
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        self.buf.push_str(text.as_ref());
        self.buf.push('\n');
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// `targets: prereqs` followed by one tab-indented line per recipe.
    pub fn rule<I, S>(&mut self, targets: &str, prereqs: I, recipes: &[String])
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prereqs = Self::spaced(prereqs);
        if prereqs.is_empty() {
            self.line(format!("{targets}:"));
        } else {
            self.line(format!("{targets}: {prereqs}"));
        }
        for recipe in recipes {
            self.line(format!("\t{recipe}"));
        }
    }

    /// The rule for one compile step: the object depends on its source and
    /// on every compile-time dependency.
    pub fn compile<I, S>(&mut self, step: &CompileStep, prereqs: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prereqs = Self::spaced(prereqs);
        self.rule(
            &step.output,
            [step.source.as_str(), prereqs.as_str()],
            &[step.recipe()],
        );
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

/// A rendered Makefile and the side artifacts gathered while writing it.
#[derive(Debug, Clone, Default)]
pub struct Generated {
    pub text: String,
    /// Build directories to create, sorted.
    pub directories: Vec<String>,
    /// Linked programs, in emission order.
    pub executables: Vec<String>,
    pub compiles: Vec<CompileStep>,
}

/// Accumulates per-file rule blocks and what they report.
#[derive(Debug)]
pub struct Makefile<'a> {
    config: &'a BuildConfig,
    layout: &'a Layout,
    body: RuleWriter,
    directories: BTreeSet<String>,
    executables: Vec<String>,
    patterns: IndexSet<String>,
    by_directory: IndexMap<String, Vec<String>>,
    compiles: Vec<CompileStep>,
}

impl<'a> Makefile<'a> {
    pub fn new(config: &'a BuildConfig, layout: &'a Layout) -> Self {
        Self {
            config,
            layout,
            body: RuleWriter::new(),
            directories: BTreeSet::new(),
            executables: Vec::new(),
            patterns: IndexSet::new(),
            by_directory: IndexMap::new(),
            compiles: Vec::new(),
        }
    }

    /// Write one file's rules.
    pub fn add(&mut self, file: &File, deps: &Dependencies) {
        let ctx = EmitContext {
            layout: self.layout,
        };
        let emitted = file.kind().emit(file, deps, ctx, &mut self.body);
        tracing::debug!(
            file = %file.path(),
            compile_deps = deps.compile.len(),
            link_deps = deps.link.len(),
            executables = emitted.executables.len(),
            "emitted"
        );
        self.absorb(emitted);
    }

    fn absorb(&mut self, emitted: Emitted) {
        self.directories.extend(emitted.directories);
        self.patterns.extend(emitted.patterns);
        for executable in emitted.executables {
            self.by_directory
                .entry(dirname(&executable).to_string())
                .or_default()
                .push(executable.clone());
            self.executables.push(executable);
        }
        self.compiles.extend(emitted.compiles);
    }

    fn preamble(&self) -> RuleWriter {
        let config = self.config;
        let mut out = RuleWriter::new();
        out.line(format!("CC ?= {}", config.toolchain.cc));
        out.line(format!("CXX ?= {}", config.toolchain.cxx));
        out.line(format!("CCH ?= {}", config.toolchain.cch));
        out.line(format!("CFLAGS = {}", config.cflags().join(" ")));
        out.line(format!("CXXFLAGS = {}", config.cxxflags().join(" ")));
        out.blank();
        out.line(format!("PROTOC ?= {}", config.toolchain.protoc));
        out.blank();
        out.line(format!("PB_INCLUDES = {}", config.protobuf.includes));
        out.line(format!("PB_LIBS = {}", config.protobuf.libs));
        out.blank();
        out.line(".PHONY: default");
        out.line("default: all");
        out.blank();
        out.line(".PHONY: clean");
        out.rule("clean", [""], &[format!("rm -rf {}", self.layout.build_root)]);
        out.blank();
        out
    }

    /// Assemble the final document.
    pub fn finish(self) -> Generated {
        let mut out = self.preamble();
        out.buf.push_str(self.body.as_str());

        for pattern in &self.patterns {
            out.line(pattern.trim_end_matches('\n'));
            out.blank();
        }

        for (dir, executables) in &self.by_directory {
            out.rule(&format!("{dir} {dir}/"), executables, &[]);
            out.blank();
        }

        let directories: Vec<String> = self.directories.into_iter().collect();
        out.line(".PHONY: builddirs");
        if directories.is_empty() {
            out.line("builddirs:");
        } else {
            out.rule(
                "builddirs",
                [""],
                &[format!("@mkdir -p {}", directories.join(" "))],
            );
        }
        out.blank();

        out.line(".PHONY: all");
        if self.executables.is_empty() {
            out.line("all:");
        } else {
            let listed: Vec<String> = self
                .executables
                .iter()
                .map(|exe| format!("\t{exe}"))
                .collect();
            out.line(format!("all: \\\n{}", listed.join(" \\\n")));
        }

        Generated {
            text: out.into_string(),
            directories,
            executables: self.executables,
            compiles: self.compiles,
        }
    }
}

/// Compute every closure, then render every file's rules in discovery
/// order.
pub fn generate(files: &FileSet, config: &BuildConfig, layout: &Layout) -> Result<Generated> {
    let dependencies = graph::all_dependencies(files)?;

    let mut makefile = Makefile::new(config, layout);
    for (file, deps) in files.iter().zip(&dependencies) {
        makefile.add(file, deps);
    }
    Ok(makefile.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::AliasMap;
    use crate::graph::resolve_edges;
    use crate::registry::KindRegistry;
    use mkgen_common::SourceFile;

    fn small_config() -> BuildConfig {
        let mut config = BuildConfig::default();
        config.toolchain.protoc = "protoc".to_string();
        config.protobuf.includes = "-Ipb".to_string();
        config.protobuf.libs = "-lprotobuf".to_string();
        config
    }

    fn render(sources: &[(&str, &str)]) -> Generated {
        let registry = KindRegistry::standard();
        let mut files = FileSet::load(
            &registry,
            sources.iter().map(|(p, c)| SourceFile::new(*p, *c)),
        )
        .unwrap();
        let aliases = AliasMap::build(&files).unwrap();
        resolve_edges(&mut files, &aliases).unwrap();
        generate(&files, &small_config(), &Layout::new("src", "build")).unwrap()
    }

    #[test]
    fn test_spaced_skips_empty_parts() {
        assert_eq!(RuleWriter::spaced(["a", "", "b", ""]), "a b");
        assert_eq!(RuleWriter::spaced(Vec::<String>::new()), "");
    }

    #[test]
    fn test_rule_without_prereqs() {
        let mut out = RuleWriter::new();
        out.rule("x", Vec::<&str>::new(), &["touch $@".to_string()]);
        assert_eq!(out.as_str(), "x:\n\ttouch $@\n");
    }

    #[test]
    fn test_full_document() {
        let generated = render(&[
            (
                "app/main.cc",
                "#include \"util/log.h\"\n// @compileargs -DAPP\nint main() {\n  return 0;\n}\n",
            ),
            ("util/log.cc", "// @linkargs -lz\n#include \"util/log.h\"\n"),
            ("util/log.h", ""),
        ]);

        insta::assert_snapshot!(generated.text, @r#"
CC ?= gcc
CXX ?= g++
CCH ?= cch
CFLAGS = -std=c11 -O2 -Wall -Wextra -Werror
CXXFLAGS = -g -std=c++11 -O2 -Wall -Wextra -Werror -Wno-unused-parameter -Wno-sign-compare

PROTOC ?= protoc

PB_INCLUDES = -Ipb
PB_LIBS = -lprotobuf

.PHONY: default
default: all

.PHONY: clean
clean:
	rm -rf build

build/app/main.o: src/app/main.cc build/util/log.h
	$(CXX) $(CXXFLAGS) $(PB_INCLUDES) -DAPP -Isrc -Ibuild -c $< -o $@

build/app/main: build/util/log.o build/app/main.o
	$(CXX) $(CXXFLAGS) -o $@ $^ $(PB_LIBS) -lz -pthread

build/util/log.o: src/util/log.cc
	$(CXX) $(CXXFLAGS) $(PB_INCLUDES) -Isrc -Ibuild -c $< -o $@

build/util/%.h: src/util/%.h
	cp $< $@

build/app build/app/: build/app/main

.PHONY: builddirs
builddirs:
	@mkdir -p build/app build/util

.PHONY: all
all: \
	build/app/main
"#);

        assert_eq!(generated.directories, vec!["build/app", "build/util"]);
        assert_eq!(generated.executables, vec!["build/app/main"]);
        assert_eq!(generated.compiles.len(), 2);
    }

    #[test]
    fn test_no_entry_point_means_no_link_rule() {
        let generated = render(&[("lib/math.cc", "int add(int a, int b) { return a + b; }\n")]);
        assert!(generated.text.contains("build/lib/math.o: src/lib/math.cc\n"));
        assert!(!generated.text.contains("build/lib/math:"));
        assert!(generated.executables.is_empty());
        assert!(generated.text.ends_with(".PHONY: all\nall:\n"));
    }

    #[test]
    fn test_flag_propagation() {
        let generated = render(&[(
            "tool.cc",
            "// @compileargs -Ivendor/json\n// @compileargs -DNDEBUG\n// @linkargs -lcurl\nint main(int argc, char** argv) {}\n",
        )]);
        assert!(generated.text.contains(
            "\t$(CXX) $(CXXFLAGS) $(PB_INCLUDES) -Ivendor/json -DNDEBUG -Isrc -Ibuild -c $< -o $@\n"
        ));
        assert!(generated.text.contains("build/tool: build/tool.o\n"));
        assert!(generated
            .text
            .contains("\t$(CXX) $(CXXFLAGS) -o $@ $^ $(PB_LIBS) -lcurl -pthread\n"));
    }

    #[test]
    fn test_c_unit_rules() {
        let generated = render(&[(
            "c/hello.c",
            "// @compileargs -DLOUD\nint main(void) { return 0; }\n",
        )]);
        assert!(generated.text.contains(
            "build/c/hello.o: src/c/hello.c\n\t$(CC) $(CFLAGS) -Isrc -Ibuild -DLOUD -c $< -o $@\n"
        ));
        assert!(generated
            .text
            .contains("build/c/hello: build/c/hello.o\n\t$(CC) $(CFLAGS) -o $@ $^\n"));
    }

    #[test]
    fn test_generated_sources() {
        let generated = render(&[
            ("api/user.proto", ""),
            ("db/table.cch", "#include \"api/user.pb.h\"\n"),
        ]);
        let text = &generated.text;

        assert!(text.contains(
            "build/api/%.grpc.pb.cc build/api/%.grpc.pb.h build/api/%.pb.cc build/api/%.pb.h: src/api/%.proto\n\
             \t$(PROTOC) --grpc_out=build --cpp_out=build -Isrc $<\n"
        ));
        assert!(text.contains(
            "build/api/user.pb.o: build/api/user.pb.cc\n\t$(CXX) $(CXXFLAGS) $(PB_INCLUDES) -Ibuild -c $< -o $@\n\
             build/api/user.grpc.pb.o: build/api/user.grpc.pb.cc\n"
        ));
        assert!(text.contains(
            "build/db/%.cch.cc build/db/%.cch.h: src/db/%.cch\n\
             \t$(CCH) --input $< --include=db/%f --output=build/db/%f\n"
        ));
        assert!(text.contains("build/db/table.cch.o: build/db/table.cch.cc build/api/user.grpc.pb.h\n"));
        assert!(generated.executables.is_empty());
        assert_eq!(generated.compiles.len(), 3);
    }

    #[test]
    fn test_shared_patterns_written_once() {
        let generated = render(&[("inc/a.h", ""), ("inc/b.h", "")]);
        assert_eq!(generated.text.matches("build/inc/%.h: src/inc/%.h").count(), 1);
        assert_eq!(generated.directories, vec!["build/inc"]);
    }

    #[test]
    fn test_executables_grouped_by_directory() {
        let generated = render(&[
            ("tools/a.cc", "int main() {}\n"),
            ("tools/b.cc", "int main() {}\n"),
            ("x.cc", "int main() {}\n"),
        ]);
        assert!(generated
            .text
            .contains("build/tools build/tools/: build/tools/a build/tools/b\n"));
        assert!(generated.text.contains("build build/: build/x\n"));
        assert!(generated
            .text
            .ends_with("all: \\\n\tbuild/tools/a \\\n\tbuild/tools/b \\\n\tbuild/x\n"));
    }
}
