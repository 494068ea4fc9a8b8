//! The per-extension behavior interface.
//!
//! A [`Kind`] decides how a file is parsed, which names it answers to,
//! how it settles a contested name, what it builds and how its rules are
//! written. The resolver and the emitter only ever talk to this trait, so
//! adding a file type means implementing it and registering the value.

use crate::compile_commands::CompileStep;
use crate::config::Layout;
use crate::emit::RuleWriter;
use crate::file::{File, FilePath, Metadata};
use crate::graph::Dependencies;
use std::fmt;

/// Outcome of two files claiming the same alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// The claims cannot coexist; the run fails.
    Incompatible,
    /// The newcomer takes the alias over.
    Replace,
    /// The existing owner keeps the alias; the newcomer's claim is discarded.
    Drop,
}

/// Everything a kind needs besides the file itself to write its rules.
#[derive(Debug, Clone, Copy)]
pub struct EmitContext<'a> {
    pub layout: &'a Layout,
}

/// What a kind reports back after writing its rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emitted {
    /// Build directories the rules write into.
    pub directories: Vec<String>,
    /// Linked programs.
    pub executables: Vec<String>,
    /// Pattern rule blocks, shared between files of the same directory.
    pub patterns: Vec<String>,
    /// Every compile recipe written, for compile_commands.json.
    pub compiles: Vec<CompileStep>,
}

pub trait Kind: fmt::Debug + Send + Sync {
    /// Short human-readable name used in diagnostics.
    fn name(&self) -> &'static str;

    /// File extension handled, including the dot.
    fn extension(&self) -> &'static str;

    /// Extensions of the artifacts a file of this kind builds.
    fn produces(&self) -> &'static [&'static str] {
        &[]
    }

    fn parse(&self, path: &FilePath, content: &str) -> Metadata;

    /// Names the file may be included by. The last one is the name other
    /// files' recipes depend on.
    fn aliases(&self, path: &FilePath) -> Vec<String> {
        vec![path.path.clone()]
    }

    /// Called on the current owner of an alias when `incoming` claims it.
    fn relation(&self, _existing: &FilePath, _incoming: &FilePath) -> Relation {
        Relation::Incompatible
    }

    fn artifacts(&self, path: &FilePath) -> Vec<String> {
        path.variants(self.produces())
    }

    /// Write the file's rules and report what they need and produce.
    fn emit(
        &self,
        file: &File,
        deps: &Dependencies,
        ctx: EmitContext<'_>,
        out: &mut RuleWriter,
    ) -> Emitted;
}
