// src/main.rs
// Usage:
//   cargo run                              # highlight a built-in sample
//   cargo run -- javascript path/to/file.js
// Extra grammars: SH_GRAMMAR_DIR=<dir> with sh_<language>.json files.

use std::{env, fs, path::Path};

use anyhow::{Context, Result};
use shjs::{GrammarRegistry, Host};

const SAMPLE: &str = r#"/**
 * Sum two numbers. TODO: overflow <joe@example.com>
 */
function add(a, b) {
    var total = a + b; // 0x10 here is not a number
    return total * 1.5e3 / 2;
}
"#;

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let language = args.next().unwrap_or_else(|| "javascript".to_string());
    let source = match args.next() {
        Some(path) => fs::read_to_string(&path).with_context(|| format!("read {path}"))?,
        None => SAMPLE.to_string(),
    };

    let mut registry = GrammarRegistry::with_builtins()?;
    if let Ok(dir) = env::var("SH_GRAMMAR_DIR") {
        let n = registry
            .load_dir(Path::new(&dir))
            .with_context(|| format!("load grammars from {dir}"))?;
        eprintln!("[shjs] loaded {n} grammar(s) from {dir}");
    }

    let mut hosts = vec![Host::from_text(source).with_class(&format!("sh_{language}"))];
    for r in registry.highlight_hosts(&mut hosts) {
        r.with_context(|| format!("highlight as {language}"))?;
    }
    println!("{}", hosts[0].to_html());
    Ok(())
}
