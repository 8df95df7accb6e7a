// src/lexer/highlight.rs
// Line-oriented regex tokenizer: picks the leftmost-matching rule of the
// active state, emits styled runs into a Builder and drives the pattern stack.

use onig::Region;

use super::{
    stack::PatternStack,
    tables::{Found, Grammar, State, Style},
};
use crate::{builder::Builder, error::EmptyStackError};

/// Consecutive zero-width matches at one position before the tokenizer
/// forces a character through.
pub const MAX_ZERO_WIDTH_STEPS: usize = 256;

/// Splits input into `(line, terminator)` pairs on `\r\n`, `\r` and `\n`.
/// The last line has an empty terminator when the input does not end in one;
/// empty input yields nothing.
pub fn split_lines(input: &str) -> impl Iterator<Item = (&str, &str)> {
    let mut rest = input;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let (line, term_len) = match rest.find(['\r', '\n']) {
            None => (rest, 0),
            Some(i) => {
                let crlf = rest.as_bytes()[i] == b'\r' && rest.as_bytes().get(i + 1) == Some(&b'\n');
                (&rest[..i], if crlf { 2 } else { 1 })
            }
        };
        let term = &rest[line.len()..line.len() + term_len];
        rest = &rest[line.len() + term_len..];
        Some((line, term))
    })
}

/// Tracks the style of the region currently open in the builder so that
/// equal-styled neighbours coalesce and empty runs never reach it.
struct Emitter<'b, 'g, B: Builder> {
    builder: &'b mut B,
    current: Option<&'g str>,
}

impl<'b, 'g, B: Builder> Emitter<'b, 'g, B> {
    fn emit(&mut self, s: &str, style: Option<&'g str>, stack: &PatternStack<'g>) {
        if s.is_empty() {
            return;
        }
        let style = style
            .filter(|t| !t.is_empty())
            .or_else(|| stack.fallback_style())
            .filter(|t| !t.is_empty());
        if self.current != style {
            if self.current.is_some() {
                self.builder.end_region();
            }
            if let Some(tag) = style {
                self.builder.start_region(tag);
            }
            self.current = style;
        }
        self.builder.text(s);
    }

    fn end_line(&mut self, terminator: &str) {
        if self.current.take().is_some() {
            self.builder.end_region();
        }
        if !terminator.is_empty() {
            self.builder.text(terminator);
        }
    }
}

/// Per-line memo of each rule's last search. A cached result stays valid
/// while the state is unchanged and the cursor has not passed its start.
struct MatchCache {
    state: Option<usize>,
    slots: Vec<Option<Option<Found>>>,
}

impl MatchCache {
    fn new() -> Self {
        Self {
            state: None,
            slots: Vec::new(),
        }
    }

    /// Index of the rule whose match starts leftmost; ties keep the earlier
    /// rule.
    fn best(
        &mut self,
        state_index: usize,
        state: &State,
        line: &str,
        pos: usize,
        region: &mut Region,
    ) -> Option<usize> {
        if self.state != Some(state_index) {
            self.state = Some(state_index);
            self.slots.clear();
            self.slots.resize(state.rules.len(), None);
        }

        let mut best: Option<(usize, usize)> = None;
        for (i, rule) in state.rules.iter().enumerate() {
            let reusable = match &self.slots[i] {
                Some(None) => true,
                Some(Some(found)) => pos <= found.start,
                None => false,
            };
            if !reusable {
                self.slots[i] = Some(rule.search(line, pos, region));
            }
            if let Some(Some(found)) = &self.slots[i] {
                if best.is_none_or(|(_, start)| found.start < start) {
                    best = Some((i, found.start));
                }
            }
        }
        best.map(|(i, _)| i)
    }

    fn get(&self, i: usize) -> Option<&Found> {
        self.slots.get(i).and_then(|s| s.as_ref()).and_then(|f| f.as_ref())
    }
}

/// Emit a match under its rule's style. Per-capture rules emit each group
/// under its tag; text of the match outside any group keeps no explicit
/// style so the output still covers the input byte for byte.
fn emit_match<'g, B: Builder>(
    out: &mut Emitter<'_, 'g, B>,
    line: &str,
    found: &Found,
    style: Option<&'g Style>,
    stack: &PatternStack<'g>,
) {
    match style {
        None => out.emit(&line[found.start..found.end], None, stack),
        Some(Style::Single(tag)) => {
            out.emit(&line[found.start..found.end], Some(tag.as_str()), stack)
        }
        Some(Style::PerCapture(tags)) => {
            let mut at = found.start;
            for (tag, span) in tags.iter().zip(&found.groups) {
                let Some((gs, ge)) = *span else { continue };
                if gs < at {
                    // nested or out-of-order group: already emitted
                    continue;
                }
                out.emit(&line[at..gs], None, stack);
                out.emit(&line[gs..ge], Some(tag.as_str()), stack);
                at = ge;
            }
            out.emit(&line[at..found.end], None, stack);
        }
    }
}

/// Highlight `input` with `grammar`, feeding events to `builder`. Does not
/// call `finish`; see [`highlight`] for the one-shot form.
pub fn highlight_into<B: Builder>(
    input: &str,
    grammar: &Grammar,
    builder: &mut B,
) -> Result<(), EmptyStackError> {
    let mut stack = PatternStack::new();
    let mut out = Emitter {
        builder,
        current: None,
    };
    let mut region = Region::new();

    for (line, terminator) in split_lines(input) {
        let mut cache = MatchCache::new();
        let mut pos = 0usize;
        let mut stalls = 0usize;

        loop {
            let state_index = stack.active_state();
            let state = &grammar.states[state_index];

            let Some(ri) = cache.best(state_index, state, line, pos, &mut region) else {
                out.emit(&line[pos..], None, &stack);
                break;
            };
            let rule = &state.rules[ri];
            let Some(found) = cache.get(ri).cloned() else {
                break;
            };

            if found.start > pos {
                out.emit(&line[pos..found.start], None, &stack);
            }
            emit_match(&mut out, line, &found, rule.style.as_ref(), &stack);

            let depth_before = stack.depth();
            if rule.next.is_some() {
                stack.push(rule);
            } else {
                if rule.exit {
                    stack.pop()?;
                }
                if rule.exitall {
                    while stack.depth() > 0 {
                        stack.pop()?;
                    }
                }
            }
            let moved = rule.next.is_some() || stack.depth() != depth_before;
            pos = found.end;

            if !found.is_empty() {
                stalls = 0;
                continue;
            }
            stalls += 1;
            if moved && stalls < MAX_ZERO_WIDTH_STEPS {
                continue;
            }
            // A zero-width match that changes nothing would repeat forever;
            // let one character through unstyled.
            stalls = 0;
            let Some(c) = line[pos..].chars().next() else {
                break;
            };
            log::warn!(
                "zero-width match of {:?} in state {state_index} cannot advance; skipping {c:?}",
                rule.pattern()
            );
            let next = pos + c.len_utf8();
            out.emit(&line[pos..next], None, &stack);
            pos = next;
        }

        out.end_line(terminator);
    }
    Ok(())
}

/// Highlight `input` and return the builder's finished result.
pub fn highlight<B: Builder>(
    input: &str,
    grammar: &Grammar,
    mut builder: B,
) -> Result<B::Output, EmptyStackError> {
    highlight_into(input, grammar, &mut builder)?;
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        builder::{FlatBuilder, Region as Run},
        lexer::tables::{RuleDisk, build_javascript},
    };

    fn r(style: Option<&str>, text: &str) -> Run {
        (style.map(str::to_string), text.to_string())
    }

    fn styled(regex: &str, style: &str) -> RuleDisk {
        RuleDisk {
            regex: regex.into(),
            style: Some(Style::Single(style.into())),
            ..Default::default()
        }
    }

    fn flat(src: &str, disk: Vec<Vec<RuleDisk>>) -> Vec<Run> {
        let g = Grammar::compile(&disk).unwrap();
        highlight(src, &g, FlatBuilder::new()).unwrap()
    }

    fn js(src: &str) -> Vec<Run> {
        flat(src, build_javascript())
    }

    #[test]
    fn splits_every_terminator_kind() {
        let got: Vec<_> = split_lines("a\r\nb\rc\nd").collect();
        assert_eq!(got, vec![("a", "\r\n"), ("b", "\r"), ("c", "\n"), ("d", "")]);
        let got: Vec<_> = split_lines("\n\n").collect();
        assert_eq!(got, vec![("", "\n"), ("", "\n")]);
        assert_eq!(split_lines("").count(), 0);
    }

    #[test]
    fn earlier_rule_wins_a_tie() {
        let ab_first = vec![vec![styled("ab", "first"), styled("a", "second")]];
        assert_eq!(flat("ab", ab_first), vec![r(Some("first"), "ab")]);

        let a_first = vec![vec![styled("a", "first"), styled("ab", "second")]];
        assert_eq!(
            flat("ab", a_first),
            vec![r(Some("first"), "a"), r(None, "b")]
        );
    }

    #[test]
    fn leftmost_beats_rule_order() {
        let g = vec![vec![styled("b", "late"), styled("a", "early")]];
        assert_eq!(
            flat("xab", g),
            vec![r(None, "x"), r(Some("early"), "a"), r(Some("late"), "b")]
        );
    }

    #[test]
    fn mode_rules_do_not_lend_their_style() {
        let open = |state| RuleDisk {
            next: Some(1),
            state,
            ..styled("<", "tag")
        };
        let close = RuleDisk {
            exit: true,
            ..styled(">", "tag")
        };

        let g = vec![vec![open(Some(1))], vec![close.clone()]];
        assert_eq!(
            flat("<x y>", g),
            vec![r(Some("tag"), "<"), r(None, "x y"), r(Some("tag"), ">")]
        );

        let g = vec![vec![open(None)], vec![close]];
        assert_eq!(flat("<x y>", g), vec![r(Some("tag"), "<x y>")]);
    }

    #[test]
    fn empty_style_falls_back_to_the_open_context() {
        let g = vec![
            vec![RuleDisk {
                next: Some(1),
                ..styled("\"", "sh_string")
            }],
            vec![
                styled("x", ""),
                RuleDisk {
                    exit: true,
                    ..styled("\"", "sh_string")
                },
            ],
        ];
        assert_eq!(flat("\"axb\"", g), vec![r(Some("sh_string"), "\"axb\"")]);
    }

    #[test]
    fn next_takes_precedence_over_exit() {
        let open = |exit, exitall| RuleDisk {
            next: Some(1),
            exit,
            exitall,
            ..styled("<", "tag")
        };
        let inner = vec![
            styled(r"\w+", "word"),
            RuleDisk {
                exit: true,
                ..styled(">", "tag")
            },
        ];
        let want = vec![
            r(Some("tag"), "<"),
            r(Some("word"), "ab"),
            r(Some("tag"), ">"),
            r(None, "c"),
        ];
        // Nothing is pushed yet, so popping instead would fail.
        let g = vec![vec![open(true, false)], inner.clone()];
        assert_eq!(flat("<ab>c", g), want);
        let g = vec![vec![open(false, true)], inner];
        assert_eq!(flat("<ab>c", g), want);
    }

    #[test]
    fn gaps_inside_per_capture_match_are_kept() {
        let g = vec![vec![RuleDisk {
            regex: r"(\w+)\s*(=)".into(),
            style: Some(Style::PerCapture(vec!["sh_type".into(), "sh_symbol".into()])),
            ..Default::default()
        }]];
        assert_eq!(
            flat("x = 1", g),
            vec![r(Some("sh_type"), "x"), r(None, " "), r(Some("sh_symbol"), "="), r(None, " 1")]
        );
    }

    #[test]
    fn zero_width_without_effect_still_advances() {
        let g = vec![vec![styled("(?=b)", "z")]];
        assert_eq!(flat("abc", g), vec![r(None, "abc")]);
    }

    #[test]
    fn zero_width_tie_winner_forces_the_char_unstyled() {
        // The lookahead wins the tie at "b" and changes nothing, so "b" is
        // let through before the later rule gets a chance at it.
        let g = vec![vec![styled("(?=b)", "z"), styled("b", "B")]];
        assert_eq!(flat("ab", g), vec![r(None, "ab")]);
        let g = vec![vec![styled("b", "B"), styled("(?=b)", "z")]];
        assert_eq!(flat("ab", g), vec![r(None, "a"), r(Some("B"), "b")]);
    }

    #[test]
    fn zero_width_self_push_terminates() {
        let g = vec![vec![RuleDisk {
            regex: "(?=x)".into(),
            next: Some(0),
            ..Default::default()
        }]];
        assert_eq!(flat("xx\nx", g), vec![r(None, "xx\nx")]);
    }

    #[test]
    fn unicode_text_is_split_on_char_boundaries() {
        let g = vec![vec![styled("(?=é)", "z")]];
        assert_eq!(flat("aéb", g), vec![r(None, "aéb")]);
        assert_eq!(
            js("var s = 'héllo→';"),
            vec![
                r(Some("sh_keyword"), "var"),
                r(None, " s "),
                r(Some("sh_symbol"), "="),
                r(None, " "),
                r(Some("sh_string"), "'héllo→'"),
                r(Some("sh_symbol"), ";"),
            ]
        );
    }

    #[test]
    fn javascript_statement() {
        assert_eq!(
            js("var x = 1;"),
            vec![
                r(Some("sh_keyword"), "var"),
                r(None, " x "),
                r(Some("sh_symbol"), "="),
                r(None, " "),
                r(Some("sh_number"), "1"),
                r(Some("sh_symbol"), ";"),
            ]
        );
    }

    #[test]
    fn javascript_line_comment_ends_at_eol() {
        assert_eq!(
            js("// hi\nx"),
            vec![r(Some("sh_comment"), "// hi"), r(None, "\nx")]
        );
    }

    #[test]
    fn javascript_block_comment_spans_lines() {
        assert_eq!(
            js("/* a\nb */c"),
            vec![
                r(Some("sh_comment"), "/* a"),
                r(None, "\n"),
                r(Some("sh_comment"), "b */"),
                r(None, "c"),
            ]
        );
    }

    #[test]
    fn javascript_string_escapes() {
        assert_eq!(
            js(r#""a\"b""#),
            vec![
                r(Some("sh_string"), "\"a"),
                r(Some("sh_specialchar"), "\\\""),
                r(Some("sh_string"), "b\""),
            ]
        );
    }

    #[test]
    fn javascript_function_call() {
        assert_eq!(
            js("foo(1)"),
            vec![
                r(Some("sh_function"), "foo"),
                r(Some("sh_symbol"), "("),
                r(Some("sh_number"), "1"),
                r(Some("sh_symbol"), ")"),
            ]
        );
    }

    #[test]
    fn javascript_doc_comment_url() {
        assert_eq!(
            js("/// see http://x.org/a\n"),
            vec![
                r(Some("sh_comment"), "/// see "),
                r(Some("sh_url"), "http://x.org/a"),
                r(None, "\n"),
            ]
        );
    }
}
