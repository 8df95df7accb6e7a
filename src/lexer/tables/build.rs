// src/lexer/tables/build.rs
// Built-in grammar tables, constructed in code. `gen_grammars` dumps them to
// JSON so they can be edited and loaded back like any third-party grammar.

use super::{GrammarDisk, RuleDisk, Style};

pub const BUILTIN_LANGUAGES: &[&str] = &["javascript"];

pub fn build_builtin(language: &str) -> Option<GrammarDisk> {
    match language {
        "javascript" => Some(build_javascript()),
        _ => None,
    }
}

fn rule(regex: &str, style: &str) -> RuleDisk {
    RuleDisk {
        regex: regex.to_string(),
        style: Some(Style::Single(style.to_string())),
        ..Default::default()
    }
}

fn plain(regex: &str) -> RuleDisk {
    RuleDisk {
        regex: regex.to_string(),
        ..Default::default()
    }
}

impl RuleDisk {
    fn push(mut self, next: usize) -> Self {
        self.next = Some(next);
        self
    }
    fn exits(mut self) -> Self {
        self.exit = true;
        self
    }
    fn mode(mut self, state: u32) -> Self {
        self.state = Some(state);
        self
    }
}

const EMAIL: &str = r"(?:<?)[A-Za-z0-9_\.\/\-_]+@[A-Za-z0-9_\.\/\-_]+(?:>?)";
const URL: &str = r"(?:<?)[A-Za-z0-9_]+:\/\/[A-Za-z0-9_\.\/\-_]+(?:>?)";
const TODO: &str = r"(?:TODO|FIXME)(?:[:]?)";

fn urls() -> [RuleDisk; 2] {
    [rule(EMAIL, "sh_url"), rule(URL, "sh_url")]
}

/// Markup allowed inside doc comments. `base` is the index of the first of
/// the five helper states this block pushes into:
/// doctype, doctype string, html comment, tag, tag string.
fn doc_markup(base: usize) -> Vec<RuleDisk> {
    vec![
        rule("<!DOCTYPE", "sh_preproc").push(base).mode(1),
        rule("<!--", "sh_comment").push(base + 2),
        rule(r"<(?:\/)?[A-Za-z][A-Za-z0-9]*(?:\/)?>", "sh_keyword"),
        rule(r"<(?:\/)?[A-Za-z][A-Za-z0-9]*", "sh_keyword")
            .push(base + 3)
            .mode(1),
        rule("&(?:[A-Za-z0-9]+);", "sh_preproc"),
        rule("@[A-Za-z]+", "sh_type"),
        rule(TODO, "sh_todo"),
    ]
}

/// The five helper states referenced by [`doc_markup`], starting at `base`.
fn doc_markup_states(base: usize) -> Vec<Vec<RuleDisk>> {
    let quoted = || {
        vec![
            plain(r#"\\(?:\\|")"#),
            rule(r#"""#, "sh_string").exits(),
        ]
    };
    vec![
        // doctype
        vec![
            rule(">", "sh_preproc").exits(),
            rule(r#"""#, "sh_string").push(base + 1),
        ],
        quoted(),
        // nested html comment
        vec![
            rule("-->", "sh_comment").exits(),
            rule("<!--", "sh_comment").push(base + 2),
        ],
        // open tag attributes
        vec![
            rule(r"(?:\/)?>", "sh_keyword").exits(),
            rule(r#"[^=" \t>]+"#, "sh_type"),
            rule("=", "sh_symbol"),
            rule(r#"""#, "sh_string").push(base + 4),
        ],
        quoted(),
    ]
}

pub fn build_javascript() -> GrammarDisk {
    let keywords = r"\b(?:abstract|break|case|catch|class|const|continue|debugger|default|delete|do|else|enum|export|extends|false|final|finally|for|function|goto|if|implements|in|instanceof|interface|native|new|null|private|protected|public|return|static|super|switch|synchronized|throw|throws|this|transient|true|try|typeof|var|volatile|while|with)\b";
    let types = r"\b(?:int|byte|boolean|char|long|float|double|short|void)\b";
    let number = r"\b[+-]?(?:(?:0x[A-Fa-f0-9]+)|(?:(?:[\d]*\.)?[\d]+(?:[eE][+-]?[\d]+)?))u?(?:(?:int(?:8|16|32|64))|L)?\b";
    let symbol = r"~|!|%|\^|\*|\(|\)|-|\+|=|\[|\]|\\|:|;|,|\.|\/|\?|&|<|>|\|";

    let mut g: GrammarDisk = Vec::with_capacity(17);

    // 0: code
    g.push(vec![
        rule(r"\/\/\/", "sh_comment").push(1),
        rule(r"\/\/", "sh_comment").push(7),
        rule(r"\/\*\*", "sh_comment").push(8),
        rule(r"\/\*", "sh_comment").push(14),
        rule(r"\/(?:\\.|[^\\\/])+\/[gim]*(?![*\/])", "sh_regexp"),
        rule(number, "sh_number"),
        rule(r#"""#, "sh_string").push(15),
        rule("'", "sh_string").push(16),
        rule(keywords, "sh_keyword"),
        rule(types, "sh_type"),
        rule(symbol, "sh_symbol"),
        rule(r"\{|\}", "sh_cbracket"),
        rule(r"(?:[A-Za-z]|_|\$)[A-Za-z0-9_\$]*[ \t]*(?=\()", "sh_function"),
    ]);

    // 1: `///` doc line, helpers at 2..=6
    let mut doc_line = vec![plain("$").exits()];
    doc_line.extend(urls());
    doc_line.extend(doc_markup(2));
    g.push(doc_line);
    g.extend(doc_markup_states(2));

    // 7: `//` line comment
    g.push(vec![plain("$").exits()]);

    // 8: `/**` doc block, helpers at 9..=13
    let mut doc_block = vec![rule(r"\*\/", "sh_comment").exits()];
    doc_block.extend(urls());
    doc_block.extend(doc_markup(9));
    g.push(doc_block);
    g.extend(doc_markup_states(9));

    // 14: `/*` block comment
    let mut block = vec![rule(r"\*\/", "sh_comment").exits()];
    block.extend(urls());
    block.push(rule(TODO, "sh_todo"));
    g.push(block);

    // 15, 16: string literals
    g.push(vec![
        rule(r#"""#, "sh_string").exits(),
        rule(r"\\.", "sh_specialchar"),
    ]);
    g.push(vec![
        rule("'", "sh_string").exits(),
        rule(r"\\.", "sh_specialchar"),
    ]);

    debug_assert_eq!(g.len(), 17);
    g
}
