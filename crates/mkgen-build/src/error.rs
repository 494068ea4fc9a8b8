//! Error types for mkgen-build.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for mkgen-build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors that abort Makefile generation.
///
/// Every variant is fatal: a run that hits one produces no document.
#[derive(Error, Debug, Diagnostic)]
pub enum BuildError {
    /// A file's extension has no registered kind.
    #[error("no file kind registered for extension `{extension}` ({path})")]
    #[diagnostic(code(mkgen::unknown_kind))]
    UnknownKind { path: String, extension: String },

    /// Two files claim the same alias and neither kind yields.
    #[error("alias `{alias}` claimed by {incoming} ({incoming_kind}) is already owned by {existing} ({existing_kind})")]
    #[diagnostic(
        code(mkgen::duplicate_alias),
        help("rename one of the files; only a unit and its own header may share a name")
    )]
    DuplicateAlias {
        alias: String,
        existing: String,
        existing_kind: &'static str,
        incoming: String,
        incoming_kind: &'static str,
    },

    /// An include or import names a file nobody declares.
    #[error("{file}:{line}: references unknown file {name}")]
    #[diagnostic(code(mkgen::unresolved_include))]
    UnresolvedInclude {
        file: String,
        line: u32,
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("no file declares this name")]
        span: SourceSpan,
    },

    /// A computed dependency list repeats a name.
    ///
    /// The closure traversal visits each file once, so this points at a
    /// defect in alias or edge construction rather than at user input.
    #[error("internal error: {view} dependencies of {file} list {name} twice")]
    #[diagnostic(code(mkgen::invariant))]
    InvariantViolation {
        file: String,
        view: &'static str,
        name: String,
    },

    /// A discovered source file could not be read.
    #[error("Failed to read source file {path}: {source}")]
    #[diagnostic(code(mkgen::read_source))]
    ReadSource {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(mkgen::read_config))]
    ReadConfig {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem error writing side outputs.
    #[error("I/O error: {0}")]
    #[diagnostic(code(mkgen::io))]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    #[diagnostic(code(mkgen::config))]
    ParseToml(#[from] toml::de::Error),

    /// Failed to serialize or parse compile_commands.json.
    #[error("Failed to process JSON: {0}")]
    #[diagnostic(code(mkgen::json))]
    Json(#[from] serde_json::Error),
}
