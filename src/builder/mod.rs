// src/builder/mod.rs
pub mod flat;
pub mod html;
pub mod tree;

pub use flat::{FlatBuilder, Region};
pub use html::{escape_html, render_html};
pub use tree::{Host, Node, SOURCE_CODE_CLASS, TreeBuilder, highlight_host};

/// Sink for the tokenizer's event stream.
///
/// Regions nest properly. Consecutive `text` calls belong to the same run and
/// must be buffered until a `start_region`, `end_region` or `finish`.
pub trait Builder {
    type Output;

    fn start_region(&mut self, style: &str);
    fn end_region(&mut self);
    fn text(&mut self, s: &str);

    /// Flush buffered text and hand back the result. Consumes the builder, so
    /// it can only happen once.
    fn finish(self) -> Self::Output
    where
        Self: Sized;
}
