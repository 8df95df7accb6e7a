// src/lib.rs
//! Regex-driven syntax highlighting with SHJS-compatible grammar tables.
//!
//! A [`Grammar`](lexer::Grammar) is an ordered list of states, each an ordered
//! list of rules. The tokenizer walks the input line by line, picks the
//! leftmost match of the active state, and reports styled runs to a
//! [`Builder`](builder::Builder).

pub mod builder;
pub mod dev;
pub mod error;
pub mod lexer;
pub mod registry;

pub use builder::{Builder, FlatBuilder, Host, Node, TreeBuilder};
pub use error::{EmptyStackError, GrammarError, HighlightError};
pub use lexer::{Grammar, PatternStack, highlight, highlight_into};
pub use registry::{CodeBlock, GrammarRegistry};
