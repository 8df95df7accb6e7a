// src/error.rs
use std::path::PathBuf;

/// Raised when a rule pops the pattern stack while nothing is pushed.
/// Always points at a broken grammar table; it aborts the highlighting call
/// that hit it and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("pop on empty pattern stack")]
pub struct EmptyStackError;

/// Problems found while loading or compiling a grammar table.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("grammar has no states (state 0 is required)")]
    EmptyGrammar,

    #[error("state {state} rule {rule}: cannot compile regex {pattern:?}: {source}")]
    Regex {
        state: usize,
        rule: usize,
        pattern: String,
        source: onig::Error,
    },

    #[error("state {state} rule {rule}: next={next} is out of range ({len} states)")]
    NextOutOfRange {
        state: usize,
        rule: usize,
        next: usize,
        len: usize,
    },

    #[error("state {state} rule {rule}: {styles} capture styles but the regex has {groups} groups")]
    TooManyCaptureStyles {
        state: usize,
        rule: usize,
        styles: usize,
        groups: usize,
    },

    #[error("failed to parse grammar JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("grammar I/O on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors surfaced by the registry-level entry points.
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    #[error("no grammar registered for language {0:?}")]
    UnknownLanguage(String),

    #[error(transparent)]
    EmptyStack(#[from] EmptyStackError),
}
