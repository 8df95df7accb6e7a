// src/lexer/stack.rs
use super::tables::{Rule, Style};
use crate::error::EmptyStackError;

/// Stack of the rules that opened the currently active lexical contexts.
///
/// The top rule's `next` is the state that governs matching; with nothing
/// pushed that is state 0. Lives for one highlighting call.
#[derive(Debug, Default)]
pub struct PatternStack<'g> {
    stack: Vec<&'g Rule>,
}

impl<'g> PatternStack<'g> {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push(&mut self, rule: &'g Rule) {
        self.stack.push(rule);
    }

    pub fn pop(&mut self) -> Result<(), EmptyStackError> {
        self.stack.pop().map(|_| ()).ok_or(EmptyStackError)
    }

    pub fn top(&self) -> Option<&'g Rule> {
        self.stack.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    #[inline]
    pub fn active_state(&self) -> usize {
        self.top().and_then(|r| r.next).unwrap_or(0)
    }

    /// Style for text that no rule styled explicitly: the top rule's tag,
    /// unless that rule marks a mode (`state`) rather than a delimited span.
    pub fn fallback_style(&self) -> Option<&'g str> {
        let top = self.top()?;
        if top.state.is_some() {
            return None;
        }
        match &top.style {
            Some(Style::Single(tag)) => Some(tag.as_str()),
            _ => None,
        }
    }
}
