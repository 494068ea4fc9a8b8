use super::pattern_path;
use crate::compile_commands::{CompileStep, Tool};
use crate::emit::RuleWriter;
use crate::file::{File, FilePath, Metadata};
use crate::graph::Dependencies;
use crate::kind::{EmitContext, Emitted, Kind};
use mkgen_common::scan;

/// A `.proto` schema compiled by `$(PROTOC)` into message and gRPC
/// service stubs, each built into its own object.
#[derive(Debug, Clone, Copy)]
pub struct ProtobufSchema;

const GENERATED: [&str; 4] = ["%.grpc.pb.cc", "%.grpc.pb.h", "%.pb.cc", "%.pb.h"];

impl Kind for ProtobufSchema {
    fn name(&self) -> &'static str {
        "protobuf schema"
    }

    fn extension(&self) -> &'static str {
        ".proto"
    }

    fn produces(&self) -> &'static [&'static str] {
        &[".grpc.pb.o", ".pb.o"]
    }

    fn parse(&self, _path: &FilePath, content: &str) -> Metadata {
        Metadata {
            includes: scan::imports(content),
            ..Metadata::default()
        }
    }

    fn aliases(&self, path: &FilePath) -> Vec<String> {
        vec![
            path.path.clone(),
            path.swap_extension(".pb.h"),
            path.swap_extension(".grpc.pb.h"),
        ]
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
        let generated: Vec<String> = GENERATED
            .iter()
            .map(|g| pattern_path(&build_dir, g))
            .collect();
        let pattern = format!(
            "{}: {}\n\t$(PROTOC) --grpc_out={out} --cpp_out={out} -I{src} $<\n",
            generated.join(" "),
            pattern_path(&layout.src(&path.dir), "%.proto"),
            out = layout.build_root,
            src = layout.src_root,
        );

        let mut compiles = Vec::new();
        for stub in [".pb", ".grpc.pb"] {
            let step = CompileStep {
                tool: Tool::Cxx,
                source: layout.out(&path.swap_extension(&format!("{stub}.cc"))),
                output: layout.out(&path.swap_extension(&format!("{stub}.o"))),
                flags: vec![format!("-I{}", layout.build_root)],
            };
            out.compile(&step, deps.compile.iter().map(|name| layout.out(name)));
            compiles.push(step);
        }
        out.blank();

        Emitted {
            directories: vec![build_dir],
            patterns: vec![pattern],
            compiles,
            ..Emitted::default()
        }
    }
}
