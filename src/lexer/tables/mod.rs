// src/lexer/tables/mod.rs
pub mod build;
pub mod io;

use onig::{Regex, RegexOptions, Region, SearchOptions, Syntax};
use serde::{Deserialize, Serialize};

use crate::error::GrammarError;

// Re-exports to keep the external API flat.
pub use build::{BUILTIN_LANGUAGES, build_builtin, build_javascript};
pub use io::{
    GrammarDisk, RuleDisk, load_grammar_json_bytes, load_grammar_json_path, save_grammar_json,
};

/// How a rule colours the text it matched.
///
/// On disk this is either a plain string or an array of strings, one per
/// capture group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Style {
    Single(String),
    PerCapture(Vec<String>),
}

/// One match of a rule against a line. Offsets are bytes into the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    pub start: usize,
    pub end: usize,
    /// Capture spans for groups 1..=k, only filled in for per-capture rules.
    pub groups: Vec<Option<(usize, usize)>>,
}

impl Found {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A compiled rule. The regex is immutable after compilation, so a grammar can
/// be shared between threads; all scanning state lives in the caller's
/// [`Region`].
pub struct Rule {
    regex: Regex,
    source: String,
    flags: Option<String>,
    pub style: Option<Style>,
    pub next: Option<usize>,
    pub exit: bool,
    pub exitall: bool,
    pub state: Option<u32>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("regex", &self.source)
            .field("style", &self.style)
            .field("next", &self.next)
            .field("exit", &self.exit)
            .field("exitall", &self.exitall)
            .field("state", &self.state)
            .finish()
    }
}

/// Isolated option group prepended to every pattern.
const ASCII_CLASSES: &str = "(?WD)";

impl Rule {
    pub fn compile(disk: &RuleDisk) -> Result<Self, onig::Error> {
        let ignore_case = disk.flags.as_deref().is_some_and(|f| f.contains('i'));
        let options = if ignore_case {
            RegexOptions::REGEX_OPTION_IGNORECASE
        } else {
            RegexOptions::REGEX_OPTION_NONE
        };
        // JavaScript keeps `\w`, `\b` and `\d` ASCII-only while `\s` stays
        // Unicode; `(?WD)` gives onig the same split.
        let pattern = format!("{ASCII_CLASSES}{}", disk.regex);
        let regex = Regex::with_options(&pattern, options, Syntax::oniguruma())?;
        Ok(Self {
            regex,
            source: disk.regex.clone(),
            flags: disk.flags.clone(),
            style: disk.style.clone(),
            next: disk.next,
            exit: disk.exit,
            exitall: disk.exitall,
            state: disk.state,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.source
    }

    pub fn captures_len(&self) -> usize {
        self.regex.captures_len()
    }

    /// Leftmost match at or after `from`. The whole line stays visible, so
    /// `^`, `\b` and look-behind see the text before `from`.
    pub fn search(&self, line: &str, from: usize, region: &mut Region) -> Option<Found> {
        self.regex.search_with_options(
            line,
            from,
            line.len(),
            SearchOptions::SEARCH_OPTION_NONE,
            Some(&mut *region),
        )?;
        let (start, end) = region.pos(0)?;
        let groups = match &self.style {
            Some(Style::PerCapture(tags)) => (1..=tags.len()).map(|g| region.pos(g)).collect(),
            _ => Vec::new(),
        };
        Some(Found { start, end, groups })
    }

    pub fn to_disk(&self) -> RuleDisk {
        RuleDisk {
            regex: self.source.clone(),
            style: self.style.clone(),
            next: self.next,
            exit: self.exit,
            exitall: self.exitall,
            state: self.state,
            flags: self.flags.clone(),
        }
    }
}

/// An ordered rule list; list order is the tie-break priority.
#[derive(Debug, Default)]
pub struct State {
    pub rules: Vec<Rule>,
}

/// A compiled grammar table. States are referenced by index only and state 0
/// is where every highlighting call starts.
#[derive(Debug)]
pub struct Grammar {
    pub states: Vec<State>,
}

impl Grammar {
    /// Compile and validate a disk grammar. Every `next` must name an existing
    /// state, so the tokenizer never has to bounds-check a transition.
    pub fn compile(disk: &GrammarDisk) -> Result<Self, GrammarError> {
        if disk.is_empty() {
            return Err(GrammarError::EmptyGrammar);
        }
        let len = disk.len();
        let mut states = Vec::with_capacity(len);
        for (si, rules) in disk.iter().enumerate() {
            let mut compiled = Vec::with_capacity(rules.len());
            for (ri, rd) in rules.iter().enumerate() {
                if let Some(next) = rd.next {
                    if next >= len {
                        return Err(GrammarError::NextOutOfRange {
                            state: si,
                            rule: ri,
                            next,
                            len,
                        });
                    }
                }
                let rule = Rule::compile(rd).map_err(|source| GrammarError::Regex {
                    state: si,
                    rule: ri,
                    pattern: rd.regex.clone(),
                    source,
                })?;
                if let Some(Style::PerCapture(tags)) = &rule.style {
                    let groups = rule.captures_len();
                    if tags.len() > groups {
                        return Err(GrammarError::TooManyCaptureStyles {
                            state: si,
                            rule: ri,
                            styles: tags.len(),
                            groups,
                        });
                    }
                }
                if rd.next.is_some() && (rd.exit || rd.exitall) {
                    log::debug!(
                        "state {si} rule {ri}: declares next together with exit/exitall; next wins"
                    );
                }
                compiled.push(rule);
            }
            states.push(State { rules: compiled });
        }
        log::debug!("compiled grammar with {len} states");
        Ok(Self { states })
    }

    pub fn to_disk(&self) -> GrammarDisk {
        self.states
            .iter()
            .map(|s| s.rules.iter().map(Rule::to_disk).collect())
            .collect()
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_rules(&self) -> usize {
        self.states.iter().map(|s| s.rules.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(regex: &str) -> RuleDisk {
        RuleDisk {
            regex: regex.into(),
            ..Default::default()
        }
    }

    #[test]
    fn rejects_empty_grammar() {
        assert!(matches!(
            Grammar::compile(&Vec::new()),
            Err(GrammarError::EmptyGrammar)
        ));
    }

    #[test]
    fn rejects_next_out_of_range() {
        let disk = vec![vec![rule("a"), RuleDisk { next: Some(3), ..rule("b") }]];
        match Grammar::compile(&disk) {
            Err(GrammarError::NextOutOfRange { state, rule, next, len }) => {
                assert_eq!((state, rule, next, len), (0, 1, 3, 1));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_regex_with_position() {
        let disk = vec![vec![], vec![rule("ok"), rule("(unclosed")]];
        match Grammar::compile(&disk) {
            Err(GrammarError::Regex { state, rule, .. }) => assert_eq!((state, rule), (1, 1)),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rejects_more_capture_styles_than_groups() {
        let disk = vec![vec![RuleDisk {
            style: Some(Style::PerCapture(vec!["a".into(), "b".into()])),
            ..rule("(x)")
        }]];
        assert!(matches!(
            Grammar::compile(&disk),
            Err(GrammarError::TooManyCaptureStyles { styles: 2, groups: 1, .. })
        ));
    }

    #[test]
    fn search_sees_text_before_offset() {
        let r = Rule::compile(&rule(r"\bfoo")).unwrap();
        let mut region = Region::new();
        // "xfoo" has no word boundary before "foo" even when searching from 1.
        assert_eq!(r.search("xfoo foo", 1, &mut region).map(|f| f.start), Some(5));
    }

    #[test]
    fn ignore_case_flag() {
        let r = Rule::compile(&RuleDisk {
            flags: Some("gi".into()),
            ..rule("select")
        })
        .unwrap();
        let mut region = Region::new();
        let f = r.search("SELECT 1", 0, &mut region).unwrap();
        assert_eq!((f.start, f.end), (0, 6));
    }

    #[test]
    fn word_and_digit_classes_are_ascii() {
        let mut region = Region::new();
        let kw = Rule::compile(&rule(r"\bvar\b")).unwrap();
        assert_eq!(kw.search("évar", 0, &mut region).map(|f| f.start), Some(2));
        let word = Rule::compile(&rule(r"\w+")).unwrap();
        assert_eq!(word.search("é", 0, &mut region), None);
        let digit = Rule::compile(&rule(r"\d")).unwrap();
        assert_eq!(digit.search("\u{663}", 0, &mut region), None);
        let space = Rule::compile(&rule(r"\s")).unwrap();
        assert!(space.search("\u{a0}", 0, &mut region).is_some());
        assert_eq!(kw.pattern(), r"\bvar\b");
    }

    #[test]
    fn per_capture_groups_are_reported() {
        let r = Rule::compile(&RuleDisk {
            style: Some(Style::PerCapture(vec!["a".into(), "b".into(), "c".into()])),
            ..rule("(x)(y)?(=)")
        })
        .unwrap();
        let mut region = Region::new();
        let f = r.search("x=", 0, &mut region).unwrap();
        assert_eq!(f.groups, vec![Some((0, 1)), None, Some((1, 2))]);
    }
}
