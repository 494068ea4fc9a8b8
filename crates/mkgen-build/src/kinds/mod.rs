//! Built-in file kinds.

mod composite;
mod header;
mod protobuf;
mod unit;

pub use composite::CompositeUnit;
pub use header::Header;
pub use protobuf::ProtobufSchema;
pub use unit::CompiledUnit;

use crate::file::FilePath;
use mkgen_common::Spanned;

/// Drop includes of the file's own aliases; a header guarding itself or a
/// generated unit including its own header is not a dependency.
fn without_self(
    includes: Vec<Spanned<String>>,
    aliases: &[String],
) -> Vec<Spanned<String>> {
    includes
        .into_iter()
        .filter(|include| !aliases.contains(&include.node))
        .collect()
}

/// `dir/pattern` under a root directory, e.g. `build/net/%.h`.
fn pattern_path(root_dir: &str, pattern: &str) -> String {
    crate::config::join(root_dir, pattern)
}

fn header_of(path: &FilePath) -> String {
    path.swap_extension(".h")
}
