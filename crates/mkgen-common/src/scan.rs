//! Directive extraction from raw source text.
//!
//! Everything here is line-oriented and purely textual: no preprocessing,
//! no comment stripping beyond what the patterns themselves require. A
//! directive that is commented out with `//` is therefore ignored, but one
//! inside a `/* ... */` block is not.
//!
//! Two special comments inject flags into the generated recipes:
//!
//! ```text
//! // @compileargs -Ithird-party/libfoo/include/
//! // @linkargs -lz
//! ```

use crate::span::{Span, Spanned};
use regex::Regex;
use std::sync::LazyLock;

static INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^[ \t]*#include[ \t]*"([^"]+)"[ \t\r]*$"#).expect("valid regex"));

static IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^[ \t]*import[ \t]*"([^"]+)"[ \t]*;[ \t\r]*$"#).expect("valid regex"));

static COMPILE_ARGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*//[ \t]*@compileargs[ \t]+(.*?)[ \t\r]*$").expect("valid regex"));

static LINK_ARGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*//[ \t]*@linkargs[ \t]+(.*?)[ \t\r]*$").expect("valid regex"));

static ENTRY_POINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*int\s+main\s*\(\s*(int[^)]*|void\s*)?\)").expect("valid regex"));

fn captures(regex: &Regex, content: &str) -> Vec<Spanned<String>> {
    regex
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            Spanned::new(
                m.as_str().to_string(),
                Span::new(m.start() as u32, m.end() as u32),
            )
        })
        .collect()
}

fn flags(regex: &Regex, content: &str) -> Vec<String> {
    captures(regex, content)
        .into_iter()
        .map(|flag| flag.node)
        .filter(|flag| !flag.is_empty())
        .collect()
}

/// Quoted `#include "name"` directives, in source order.
///
/// Angle-bracket includes name system headers and are not returned.
pub fn includes(content: &str) -> Vec<Spanned<String>> {
    captures(&INCLUDE, content)
}

/// Schema-style `import "name";` statements, in source order.
pub fn imports(content: &str) -> Vec<Spanned<String>> {
    captures(&IMPORT, content)
}

/// Flag text of every `// @compileargs` line, in source order.
pub fn compile_args(content: &str) -> Vec<String> {
    flags(&COMPILE_ARGS, content)
}

/// Flag text of every `// @linkargs` line, in source order.
pub fn link_args(content: &str) -> Vec<String> {
    flags(&LINK_ARGS, content)
}

/// Whether the text declares `int main(...)` at the start of a line.
pub fn has_entry_point(content: &str) -> bool {
    ENTRY_POINT.is_match(content)
}
