// src/lexer/mod.rs
pub mod highlight;
pub mod stack;
pub mod tables;

pub use highlight::{MAX_ZERO_WIDTH_STEPS, highlight, highlight_into, split_lines};
pub use stack::PatternStack;
pub use tables::{Grammar, Rule, State, Style};
