// src/bin/gen_grammars.rs
// Write the built-in grammars to JSON.
// Usage:
//   cargo run --bin gen_grammars                # writes grammars/sh_<lang>.json
//   cargo run --bin gen_grammars -- /path/out_dir

use std::{env, fs, path::Path};

use shjs::{
    Grammar,
    lexer::tables::{BUILTIN_LANGUAGES, build_builtin, save_grammar_json},
    registry::grammar_file_name,
};

fn main() {
    let out = env::args().nth(1).unwrap_or_else(|| "grammars".to_string());
    let out_dir = Path::new(&out);

    if let Err(e) = fs::create_dir_all(out_dir) {
        eprintln!("error: failed to create {}: {e}", out_dir.display());
        std::process::exit(1);
    }

    for &lang in BUILTIN_LANGUAGES {
        let Some(disk) = build_builtin(lang) else {
            continue;
        };

        // Refuse to write a table that would not load back.
        let grammar = match Grammar::compile(&disk) {
            Ok(g) => g,
            Err(e) => {
                eprintln!("error: builtin {lang} does not compile: {e}");
                std::process::exit(1);
            }
        };
        println!(
            "[gen_grammars] {lang}: {} states, {} rules",
            grammar.num_states(),
            grammar.num_rules()
        );

        let path = out_dir.join(grammar_file_name(lang));
        if let Err(e) = save_grammar_json(&path, &disk) {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
        println!("[gen_grammars] wrote {}", path.display());
    }
}
