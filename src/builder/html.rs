// src/builder/html.rs
use super::tree::{Host, Node};

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn render_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) => out.push_str(&escape_html(t)),
        Node::Span { style, children } => {
            out.push_str("<span class=\"");
            out.push_str(&escape_html(style));
            out.push_str("\">");
            for c in children {
                render_node(c, out);
            }
            out.push_str("</span>");
        }
        Node::Link { href, text } => {
            out.push_str("<a class=\"sh_url\" href=\"");
            out.push_str(&escape_html(href));
            out.push_str("\">");
            out.push_str(&escape_html(text));
            out.push_str("</a>");
        }
    }
}

pub fn render_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for n in nodes {
        render_node(n, &mut out);
    }
    out
}

impl Host {
    /// The host as a `<pre>` element.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<pre");
        if !self.classes.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&escape_html(&self.classes.join(" ")));
            out.push('"');
        }
        out.push('>');
        out.push_str(&render_html(&self.children));
        out.push_str("</pre>");
        out
    }
}
