// src/builder/flat.rs
use super::Builder;

/// One run of the flat output: innermost style tag (if any) and its text.
pub type Region = (Option<String>, String);

/// Materializes the event stream as a flat list of `(style, text)` runs,
/// merging neighbours that end up with the same style.
#[derive(Debug, Default)]
pub struct FlatBuilder {
    open: Vec<String>,
    pending: String,
    out: Vec<Region>,
}

impl FlatBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let style = self.open.last().cloned();
        let text = std::mem::take(&mut self.pending);
        if let Some((last_style, last_text)) = self.out.last_mut() {
            if *last_style == style {
                last_text.push_str(&text);
                return;
            }
        }
        self.out.push((style, text));
    }
}

impl Builder for FlatBuilder {
    type Output = Vec<Region>;

    fn start_region(&mut self, style: &str) {
        self.flush();
        self.open.push(style.to_string());
    }

    fn end_region(&mut self) {
        self.flush();
        self.open.pop();
    }

    fn text(&mut self, s: &str) {
        self.pending.push_str(s);
    }

    fn finish(mut self) -> Vec<Region> {
        self.flush();
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(style: Option<&str>, text: &str) -> Region {
        (style.map(str::to_string), text.to_string())
    }

    #[test]
    fn buffers_text_until_boundary() {
        let mut b = FlatBuilder::new();
        b.text("a");
        b.text("b");
        b.start_region("k");
        b.text("c");
        b.end_region();
        assert_eq!(b.finish(), vec![r(None, "ab"), r(Some("k"), "c")]);
    }

    #[test]
    fn merges_same_style_neighbours() {
        let mut b = FlatBuilder::new();
        b.start_region("k");
        b.text("x");
        b.end_region();
        b.start_region("k");
        b.text("y");
        b.end_region();
        b.text("\n");
        b.text("z");
        assert_eq!(b.finish(), vec![r(Some("k"), "xy"), r(None, "\nz")]);
    }

    #[test]
    fn empty_regions_leave_no_trace() {
        let mut b = FlatBuilder::new();
        b.start_region("k");
        b.end_region();
        assert!(b.finish().is_empty());
    }

    #[test]
    fn nested_regions_use_innermost_tag() {
        let mut b = FlatBuilder::new();
        b.start_region("outer");
        b.text("a");
        b.start_region("inner");
        b.text("b");
        b.end_region();
        b.text("c");
        b.end_region();
        assert_eq!(
            b.finish(),
            vec![r(Some("outer"), "a"), r(Some("inner"), "b"), r(Some("outer"), "c")]
        );
    }
}
