use miette::NamedSource;

/// A discovered source file with its contents.
///
/// `path` is relative to the source root and always uses `/` separators,
/// since it ends up verbatim in the generated Makefile.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
    line_starts: Vec<u32>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i as u32 + 1))
            .collect();

        Self {
            path: path.into(),
            content,
            line_starts,
        }
    }

    /// Get line and column (0-indexed) from byte offset.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let col = offset - self.line_starts[line];
        (line as u32, col)
    }

    /// Package the contents for a miette snippet.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.path, self.content.clone())
    }
}
