mod span;
mod source;
pub mod scan;

pub use span::{Span, Spanned};
pub use source::SourceFile;
