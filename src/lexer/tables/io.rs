// src/lexer/tables/io.rs
use std::{
    fs,
    io::{BufWriter, Write},
    path::Path,
    time::Instant,
};

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::{Grammar, Style};
use crate::error::GrammarError;

// -------------------- JSON grammar format --------------------

/// A rule as it appears in a grammar file. Field names follow the
/// long-standing SHJS table layout so existing definitions load unchanged.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDisk {
    pub regex: String,
    pub style: Option<Style>,
    pub next: Option<usize>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub exit: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub exitall: bool,
    pub state: Option<u32>,
    /// Regex flags in JavaScript spelling; only `i` changes matching.
    pub flags: Option<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// States in index order; each state is an ordered rule list.
pub type GrammarDisk = Vec<Vec<RuleDisk>>;

pub fn save_grammar_json(path: &Path, g: &GrammarDisk) -> Result<(), GrammarError> {
    let instant = Instant::now();
    let io_err = |source| GrammarError::Io {
        path: path.to_path_buf(),
        source,
    };
    let f = fs::File::create(path).map_err(io_err)?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, g)?;
    w.write_all(b"\n").map_err(io_err)?;
    w.flush().map_err(io_err)?;
    log::debug!(
        "saved grammar ({} states) to {} in {} ms",
        g.len(),
        path.display(),
        instant.elapsed().as_millis()
    );
    Ok(())
}

pub fn load_grammar_json_bytes(data: &[u8]) -> Result<Grammar, GrammarError> {
    let disk: GrammarDisk = serde_json::from_slice(data)?;
    Grammar::compile(&disk)
}

pub fn load_grammar_json_path(path: &Path) -> Result<Grammar, GrammarError> {
    log::debug!("loading grammar from: {}", path.display());
    let data = fs::read(path).map_err(|source| GrammarError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_grammar_json_bytes(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalar_and_array_styles() {
        let json = br#"[
            [
                {"regex": "//", "style": "sh_comment", "next": 1},
                {"regex": "([a-z]+)(=)", "style": ["sh_type", "sh_symbol"]}
            ],
            [
                {"regex": "$", "exit": true}
            ]
        ]"#;
        let disk: GrammarDisk = serde_json::from_slice(json).unwrap();
        assert_eq!(disk[0][0].style, Some(Style::Single("sh_comment".into())));
        assert_eq!(
            disk[0][1].style,
            Some(Style::PerCapture(vec!["sh_type".into(), "sh_symbol".into()]))
        );
        assert!(disk[1][0].exit);
        assert!(!disk[1][0].exitall);
        assert_eq!(disk[1][0].style, None);

        let g = load_grammar_json_bytes(json).unwrap();
        assert_eq!(g.num_states(), 2);
        assert_eq!(g.num_rules(), 3);
    }

    #[test]
    fn omits_unset_fields_on_save() {
        let disk: GrammarDisk = vec![vec![RuleDisk {
            regex: "$".into(),
            exit: true,
            ..Default::default()
        }]];
        let s = serde_json::to_string(&disk).unwrap();
        assert_eq!(s, r#"[[{"regex":"$","exit":true}]]"#);
    }

    #[test]
    fn save_then_load_keeps_rules() {
        let dir = std::env::temp_dir().join(format!("shjs-io-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sh_tiny.json");

        let disk: GrammarDisk = vec![
            vec![RuleDisk {
                regex: r"/\*".into(),
                style: Some(Style::Single("sh_comment".into())),
                next: Some(1),
                ..Default::default()
            }],
            vec![RuleDisk {
                regex: r"\*/".into(),
                style: Some(Style::Single("sh_comment".into())),
                exit: true,
                ..Default::default()
            }],
        ];
        save_grammar_json(&path, &disk).unwrap();
        let g = load_grammar_json_path(&path).unwrap();
        assert_eq!(g.to_disk(), disk);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn reports_missing_file() {
        let err = load_grammar_json_path(Path::new("/nonexistent/sh_none.json")).unwrap_err();
        assert!(matches!(err, GrammarError::Io { .. }));
    }

    #[test]
    fn reports_malformed_json() {
        let err = load_grammar_json_bytes(b"[[{\"style\": 1}]]").unwrap_err();
        assert!(matches!(err, GrammarError::Json(_)));
    }
}
