//! Makefile generation for C/C++ source trees.
//!
//! This crate provides:
//! - A registry of file kinds keyed by extension (`.cc`, `.c`, `.h`,
//!   `.cch`, `.proto` out of the box)
//! - Alias resolution, so a unit answers to its own header name
//! - Dependency closure over `#include`/`import` edges
//! - Rule emission and Makefile assembly
//! - Configuration (`mkgen.toml`) and compile_commands.json output
//!
//! # Pipeline
//!
//! ```text
//! SourceFile* → FileSet → AliasMap → edges → closures → Makefile
//! ```
//!
//! Each stage needs the previous one complete over every file: alias
//! collisions are settled in discovery order, and closures walk edges
//! that must already exist.
//!
//! # Example
//!
//! ```toml
//! # mkgen.toml
//! [toolchain]
//! cxx = "clang++"
//!
//! [flags]
//! std = "c++20"
//! optimization = "0"
//! ```

mod alias;
mod compile_commands;
mod config;
mod emit;
mod error;
mod file;
pub mod graph;
mod kind;
pub mod kinds;
mod registry;

pub use alias::AliasMap;
pub use compile_commands::{CompileCommand, CompileCommands, CompileStep, Tool};
pub use config::{join, BuildConfig, FlagsConfig, Layout, ProtobufConfig, ToolchainConfig};
pub use emit::{generate, Generated, Makefile, RuleWriter};
pub use error::{BuildError, Result};
pub use file::{File, FileId, FilePath, FileSet, Metadata};
pub use graph::Dependencies;
pub use kind::{EmitContext, Emitted, Kind, Relation};
pub use registry::KindRegistry;
