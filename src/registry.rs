// src/registry.rs
// Named grammars. Populate first, then share immutably: every highlighting
// entry point takes `&self`, so blocks can be highlighted in parallel.

use std::{
    fs,
    path::{Path, PathBuf},
};

use hashbrown::{HashMap, hash_map::Entry};
use rayon::prelude::*;

use crate::{
    builder::{Builder, Host, highlight_host},
    error::{GrammarError, HighlightError},
    lexer::{
        highlight::highlight,
        tables::{BUILTIN_LANGUAGES, Grammar, build_builtin, load_grammar_json_path},
    },
};

/// A piece of source code tagged with the language it is written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: String,
    pub source: String,
}

impl CodeBlock {
    pub fn new(language: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct GrammarRegistry {
    grammars: HashMap<String, Grammar>,
}

/// File name a grammar for `language` is stored under.
pub fn grammar_file_name(language: &str) -> String {
    format!("sh_{language}.json")
}

impl GrammarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Result<Self, GrammarError> {
        let mut reg = Self::new();
        for &lang in BUILTIN_LANGUAGES {
            if let Some(disk) = build_builtin(lang) {
                reg.insert(lang, Grammar::compile(&disk)?);
            }
        }
        Ok(reg)
    }

    /// Register `grammar` under `name`, returning any grammar it replaces.
    pub fn insert(&mut self, name: impl Into<String>, grammar: Grammar) -> Option<Grammar> {
        let name = name.into().to_ascii_lowercase();
        let old = self.grammars.insert(name.clone(), grammar);
        if old.is_some() {
            log::warn!("grammar {name:?} replaced");
        }
        old
    }

    pub fn get(&self, name: &str) -> Option<&Grammar> {
        self.grammars.get(name.to_ascii_lowercase().as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.grammars.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }

    /// Load `dir/sh_<language>.json`. Languages already registered are left
    /// alone.
    pub fn load_language(&mut self, dir: &Path, language: &str) -> Result<&Grammar, GrammarError> {
        let grammar = match self.grammars.entry(language.to_ascii_lowercase()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let path = dir.join(grammar_file_name(e.key()));
                let grammar = load_grammar_json_path(&path)?;
                log::debug!("loaded {} from {}", e.key(), path.display());
                e.insert(grammar)
            }
        };
        Ok(grammar)
    }

    /// Load every `sh_*.json` in `dir`. Returns how many grammars were added.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, GrammarError> {
        let io_err = |source| GrammarError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let is_grammar = path.extension().and_then(|e| e.to_str()) == Some("json")
                && path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|s| s.starts_with("sh_") && s.len() > 3);
            if is_grammar {
                paths.push(path);
            }
        }
        paths.sort();

        let mut added = 0;
        for path in paths {
            let Some(lang) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.strip_prefix("sh_"))
            else {
                continue;
            };
            let grammar = load_grammar_json_path(&path)?;
            if self.insert(lang, grammar).is_none() {
                added += 1;
            }
        }
        log::debug!("loaded {added} grammar(s) from {}", dir.display());
        Ok(added)
    }

    pub fn highlight<B: Builder>(
        &self,
        language: &str,
        source: &str,
        builder: B,
    ) -> Result<B::Output, HighlightError> {
        let grammar = self
            .get(language)
            .ok_or_else(|| HighlightError::UnknownLanguage(language.to_string()))?;
        Ok(highlight(source, grammar, builder)?)
    }

    /// Highlight independent blocks in parallel. Each block gets its own
    /// builder from `make_builder` and its own result; one failing block does
    /// not affect the others.
    pub fn highlight_blocks_with<F, B>(
        &self,
        blocks: &[CodeBlock],
        make_builder: F,
    ) -> Vec<Result<B::Output, HighlightError>>
    where
        F: Fn() -> B + Sync,
        B: Builder,
        B::Output: Send,
    {
        blocks
            .par_iter()
            .map(|b| self.highlight(&b.language, &b.source, make_builder()))
            .collect()
    }

    /// Highlight every host that names a language through an `sh_<language>`
    /// class, in parallel. Hosts without such a class are left untouched.
    pub fn highlight_hosts(&self, hosts: &mut [Host]) -> Vec<Result<(), HighlightError>> {
        hosts
            .par_iter_mut()
            .map(|host| {
                let Some(lang) = host.language() else {
                    return Ok(());
                };
                let grammar = self
                    .get(&lang)
                    .ok_or(HighlightError::UnknownLanguage(lang))?;
                highlight_host(host, grammar)?;
                Ok(())
            })
            .collect()
    }
}
