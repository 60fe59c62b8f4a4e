//! Source-anchored diagnostics shared by the front end and the CST core.

use std::fmt::Display;

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use text_size::TextRange;

/// A message attached to a byte range of a source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    message: String,
    range: TextRange,
    label: &'static str,
}

impl Diagnostic {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn error(message: impl Into<String>, range: TextRange) -> Self {
        Self { message: message.into(), range, label: "here" }
    }

    /// Replaces the label printed under the annotated span.
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let message = Level::Error.title(&self.message).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(Level::Error.span(self.clamped_range(text)).label(self.label))
                .fold(true),
        );
        renderer.render(message)
    }

    /// The annotated span, clipped to `text` so stale ranges still render.
    fn clamped_range(&self, text: &str) -> std::ops::Range<usize> {
        let len = text.len();
        let start = usize::from(self.range.start()).min(len);
        let end = usize::from(self.range.end()).clamp(start, len);
        start..end
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {:?}", self.message, self.range)
    }
}
