// src/bin/perf_one.rs
// Time one highlight pass over a file or generated input, then the same input
// cut into blocks and highlighted sequentially and in parallel.
//
// Env:
//   - PERF_ONE_LEN=<bytes>    generated input size (default 10,000,000)
//   - PERF_ONE_SEED=<u64>     generator seed (default 42)
//   - PERF_ONE_BLOCKS=<n>     blocks for the sequential/parallel comparison (default 64)
//   - PERF_ONE_LANG=<lang>    grammar (default javascript)
use std::{env, fs, path::PathBuf, time::Instant};

use rand::{SeedableRng, rngs::StdRng};
use shjs::{CodeBlock, FlatBuilder, GrammarRegistry, dev::generator::gen_valid_source};

fn fmt_mib(bytes: u64) -> String {
    let mib = (bytes as f64) / (1024.0 * 1024.0);
    format!("{mib:.2} MiB")
}

fn throughput_mibs(bytes: u64, ms: f64) -> f64 {
    if ms <= 0.0 {
        return 0.0;
    }
    (bytes as f64) / (1024.0 * 1024.0) / (ms / 1_000.0)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(default)
}

/// Cut `src` into roughly `n` blocks, each ending on a line boundary.
fn split_blocks(src: &str, n: usize, lang: &str) -> Vec<CodeBlock> {
    let want = (src.len() / n.max(1)).max(1);
    let mut blocks = Vec::with_capacity(n);
    let mut start = 0;
    while start < src.len() {
        let mut end = (start + want).min(src.len());
        while end < src.len() && !src.is_char_boundary(end) {
            end += 1;
        }
        end = match src[end..].find('\n') {
            Some(i) => end + i + 1,
            None => src.len(),
        };
        blocks.push(CodeBlock::new(lang, &src[start..end]));
        start = end;
    }
    blocks
}

fn main() {
    let lang = env::var("PERF_ONE_LANG").unwrap_or_else(|_| "javascript".into());
    let reg = match GrammarRegistry::with_builtins() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("grammar setup failed: {e}");
            std::process::exit(1);
        }
    };

    let (text, src_desc) = if let Some(path) = env::args().nth(1) {
        let p = PathBuf::from(path);
        let load_t0 = Instant::now();
        let src = match fs::read_to_string(&p) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to read {}: {e}", p.display());
                std::process::exit(2);
            }
        };
        let load_ms = load_t0.elapsed().as_secs_f64() * 1e3;
        let bytes = src.len() as u64;
        println!(
            "Input: file={}  ({} | {} bytes)",
            p.display(),
            fmt_mib(bytes),
            bytes
        );
        println!("Load:  {:.3} ms", load_ms);
        (src, "file")
    } else {
        let target_len = env_usize("PERF_ONE_LEN", 10_000_000);
        let seed = env_u64("PERF_ONE_SEED", 42);
        let gen_t0 = Instant::now();
        let mut rng = StdRng::seed_from_u64(seed);
        let src = gen_valid_source(&mut rng, target_len);
        let gen_ms = gen_t0.elapsed().as_secs_f64() * 1e3;
        let bytes = src.len() as u64;
        println!(
            "Input: generated in-memory (len={} | {}) [seed={}]",
            bytes,
            fmt_mib(bytes),
            seed
        );
        println!("Gen:   {:.3} ms", gen_ms);
        (src, "generated")
    };

    let bytes = text.len() as u64;

    // ---------------- whole input ----------------
    let one_t0 = Instant::now();
    let runs = match reg.highlight(&lang, &text, FlatBuilder::new()) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("highlight failed: {e}");
            std::process::exit(1);
        }
    };
    let one_ms = one_t0.elapsed().as_secs_f64() * 1e3;
    println!(
        "Whole: {:.3} ms | runs={} | throughput={:.1} MiB/s",
        one_ms,
        runs.len(),
        throughput_mibs(bytes, one_ms)
    );

    // ---------------- blocks ----------------
    let blocks = split_blocks(&text, env_usize("PERF_ONE_BLOCKS", 64), &lang);

    let seq_t0 = Instant::now();
    let seq: Vec<_> = blocks
        .iter()
        .map(|b| reg.highlight(&b.language, &b.source, FlatBuilder::new()))
        .collect();
    let seq_ms = seq_t0.elapsed().as_secs_f64() * 1e3;

    let par_t0 = Instant::now();
    let par = reg.highlight_blocks_with(&blocks, FlatBuilder::new);
    let par_ms = par_t0.elapsed().as_secs_f64() * 1e3;

    println!(
        "Seq:   {:.3} ms | blocks={} | throughput={:.1} MiB/s",
        seq_ms,
        blocks.len(),
        throughput_mibs(bytes, seq_ms)
    );
    println!(
        "Par:   {:.3} ms | threads={} | throughput={:.1} MiB/s",
        par_ms,
        rayon::current_num_threads(),
        throughput_mibs(bytes, par_ms)
    );

    let seq_runs: Vec<_> = seq.into_iter().map(Result::ok).collect();
    let par_runs: Vec<_> = par.into_iter().map(Result::ok).collect();
    if seq_runs != par_runs {
        eprintln!("NOTE: parallel output differs from sequential [{src_desc}]");
    }

    if par_ms > 0.0 {
        println!("Speedup (Seq_time / Par_time): {:.2}×", seq_ms / par_ms);
    }
}
