// src/bin/fuzz_highlight.rs
// Generate big random inputs, highlight them, and check the output invariants:
// no text lost or added, no two neighbouring runs with the same style, the tree
// builder agrees with the flat builder, and parallel block highlighting agrees
// with sequential highlighting.
//
// Env:
//   - FUZZ_SAVE=1 and FUZZ_DIR=... save generated fuzz cases
//   - FUZZ_INPUT=path         replay a saved case
//   - FUZZ_EX=<files>         comma/colon-separated list of handcrafted .js files
//   - FUZZ_EX_DIR=<dir>       directory of .js files (default: "highlight_tests")
//   - FUZZ_LANG=<language>    grammar to use (default: javascript)
//   - SH_GRAMMAR_DIR=<dir>    extra sh_<language>.json grammars
//
// Handcrafted cases may carry a golden sidecar <case>.regions.json with
// {"regions":[{"style":"sh_keyword"|null, "text":"..."}...]}.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use rand::{SeedableRng, rngs::StdRng};
use shjs::{
    CodeBlock, FlatBuilder, GrammarRegistry, Host, TreeBuilder, builder::Region,
    dev::generator::gen_valid_source,
};

// ------------------ goldens ------------------

#[derive(serde::Deserialize)]
struct Golden {
    regions: Vec<GoldenRegion>,
}
#[derive(serde::Deserialize)]
struct GoldenRegion {
    style: Option<String>,
    text: String,
}

fn load_golden_for(case: &Path) -> Option<Golden> {
    let candidates = [
        case.with_extension("regions.json"),
        case.with_extension("golden.json"),
    ];
    for p in candidates {
        if p.exists() {
            let s = fs::read_to_string(&p).ok()?;
            match serde_json::from_str::<Golden>(&s) {
                Ok(g) => return Some(g),
                Err(e) => {
                    eprintln!("[golden] failed to parse {}: {e}", p.display());
                    return None;
                }
            }
        }
    }
    None
}

fn check_against_golden(label: &str, got: &[Region], golden: &Golden) -> bool {
    if got.len() != golden.regions.len() {
        eprintln!(
            "[golden:{label}] count mismatch: got={} expected={}",
            got.len(),
            golden.regions.len()
        );
        dump_region_diff(got, &golden.regions, 0);
        return false;
    }
    for (i, ((style, text), exp)) in got.iter().zip(golden.regions.iter()).enumerate() {
        if *style != exp.style || *text != exp.text {
            eprintln!(
                "[golden:{label}] mismatch at {i}:\n  got:  style={style:?} text={text:?}\n  want: style={:?} text={:?}",
                exp.style, exp.text
            );
            dump_region_diff(got, &golden.regions, i.saturating_sub(2));
            return false;
        }
    }
    true
}

fn dump_region_diff(got: &[Region], exp: &[GoldenRegion], from: usize) {
    let hi = (from + 6).min(got.len().max(exp.len()));
    eprintln!("--- golden context [{}..{}) ---", from, hi);
    for i in from..hi {
        let g = got.get(i).map(|(s, t)| (s.clone(), t.clone()));
        let e = exp.get(i).map(|r| (r.style.clone(), r.text.clone()));
        let mark = if g == e { "✅" } else { "❌" };
        eprintln!("{mark} #{i:04} GOT={g:?}  WANT={e:?}");
    }
}

// ------------------ invariants ------------------

fn check_invariants(label: &str, src: &str, regions: &[Region]) -> bool {
    let joined: String = regions.iter().map(|(_, t)| t.as_str()).collect();
    if joined != src {
        let at = joined
            .bytes()
            .zip(src.bytes())
            .position(|(a, b)| a != b)
            .unwrap_or(joined.len().min(src.len()));
        eprintln!(
            "[{label}] text mismatch: {} bytes in, {} bytes out, first difference at byte {at}",
            src.len(),
            joined.len()
        );
        return false;
    }
    for (i, w) in regions.windows(2).enumerate() {
        if w[0].0 == w[1].0 {
            eprintln!(
                "[{label}] runs {i} and {} share style {:?}: {:?} | {:?}",
                i + 1,
                w[0].0,
                w[0].1,
                w[1].1
            );
            return false;
        }
    }
    if let Some(i) = regions.iter().position(|(_, t)| t.is_empty()) {
        eprintln!("[{label}] run {i} is empty");
        return false;
    }
    true
}

fn check_tree(label: &str, reg: &GrammarRegistry, lang: &str, src: &str) -> bool {
    let mut host = Host::default();
    match reg.highlight(lang, src, TreeBuilder::new(&mut host)) {
        Ok(h) if h.text() == src => true,
        Ok(_) => {
            eprintln!("[{label}] tree builder text differs from input");
            false
        }
        Err(e) => {
            eprintln!("[{label}] tree builder failed: {e}");
            false
        }
    }
}

fn check_parallel(label: &str, reg: &GrammarRegistry, lang: &str, src: &str) -> bool {
    let blocks: Vec<CodeBlock> = src
        .split_inclusive("\n\n")
        .map(|s| CodeBlock::new(lang, s))
        .collect();
    let sequential: Vec<_> = blocks
        .iter()
        .map(|b| reg.highlight(&b.language, &b.source, FlatBuilder::new()).ok())
        .collect();
    let parallel: Vec<_> = reg
        .highlight_blocks_with(&blocks, FlatBuilder::new)
        .into_iter()
        .map(Result::ok)
        .collect();
    if sequential != parallel {
        let i = sequential
            .iter()
            .zip(&parallel)
            .position(|(a, b)| a != b)
            .unwrap_or(0);
        eprintln!(
            "[{label}] parallel result differs from sequential at block {i} of {}",
            blocks.len()
        );
        return false;
    }
    true
}

// ---------- run one ----------

fn run_once(
    reg: &GrammarRegistry,
    lang: &str,
    src: &str,
    seed: Option<u64>,
    iter: Option<usize>,
    golden_for: Option<&Path>,
) -> bool {
    let label = match (seed, iter) {
        (Some(s), Some(i)) => format!("seed={s} iter={i}"),
        _ => golden_for
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "replay".into()),
    };

    let t0 = Instant::now();
    let regions = match reg.highlight(lang, src, FlatBuilder::new()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("[{label}] highlight failed: {e}");
            return false;
        }
    };
    let ms = t0.elapsed().as_secs_f64() * 1e3;
    eprintln!(
        "[{label}] {} bytes -> {} runs in {ms:.2} ms",
        src.len(),
        regions.len()
    );

    let mut ok = check_invariants(&label, src, &regions)
        && check_tree(&label, reg, lang, src)
        && check_parallel(&label, reg, lang, src);

    if let Some(p) = golden_for {
        match load_golden_for(p) {
            Some(g) => ok &= check_against_golden(&label, &regions, &g),
            None => eprintln!("[golden] no sidecar found for {}", p.display()),
        }
    }
    ok
}

fn main() {
    let lang = std::env::var("FUZZ_LANG").unwrap_or_else(|_| "javascript".into());
    let mut reg = match GrammarRegistry::with_builtins() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    if let Ok(dir) = std::env::var("SH_GRAMMAR_DIR") {
        if let Err(e) = reg.load_dir(Path::new(&dir)) {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
    if !reg.contains(&lang) {
        eprintln!("error: no grammar for {lang:?}; have {:?}", reg.names());
        std::process::exit(1);
    }

    // --- REPLAY A SINGLE CASE ---
    if let Ok(path) = std::env::var("FUZZ_INPUT") {
        eprintln!("[replay] reading {}", path);
        let s = fs::read_to_string(&path).expect("failed to read FUZZ_INPUT");
        if !run_once(&reg, &lang, &s, None, None, None) {
            std::process::exit(1);
        }
        return;
    }

    // --- HANDCRAFTED EXAMPLES (run before fuzzing) ---
    let examples = collect_examples();
    if !examples.is_empty() {
        eprintln!("[ex] running {} handcrafted example(s)…", examples.len());
        for (j, p) in examples.iter().enumerate() {
            match fs::read_to_string(p) {
                Ok(s) => {
                    eprintln!("[ex {j}] {}", p.display());
                    if !run_once(&reg, &lang, &s, None, None, Some(p.as_path())) {
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("[ex {j}] failed to read {}: {e}", p.display());
                    std::process::exit(1);
                }
            }
        }
    }

    // --- FUZZ MODE ---
    let save_cases = std::env::var("FUZZ_SAVE").ok().as_deref() == Some("1");
    let out_dir = std::env::var("FUZZ_DIR").unwrap_or_else(|_| "fuzz-cases".to_string());
    let len: usize = std::env::var("FUZZ_LEN")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1_000_000);
    let iters: usize = std::env::var("FUZZ_ITERS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3);
    let seed: u64 = std::env::var("FUZZ_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);

    eprintln!("[fuzz] lang={lang} len={len} iters={iters} seed={seed}");
    let mut rng = StdRng::seed_from_u64(seed);

    if save_cases {
        if let Err(e) = fs::create_dir_all(&out_dir) {
            eprintln!("error: failed to create {}: {e}", out_dir);
            std::process::exit(1);
        }
    }

    for i in 0..iters {
        let s = gen_valid_source(&mut rng, len);
        eprintln!("[fuzz] iter {i}: generated {} bytes", s.len());

        if save_cases {
            let path = save_case(&out_dir, seed, i, &s);
            eprintln!("[save] wrote {}", path.display());
        }

        if !run_once(&reg, &lang, &s, Some(seed), Some(i), None) {
            std::process::exit(1);
        }
    }
    eprintln!("[fuzz] all iterations passed ✅");
}

fn collect_examples() -> Vec<PathBuf> {
    let mut out = Vec::new();
    if let Ok(list) = std::env::var("FUZZ_EX") {
        for part in list.split([',', ':']) {
            let p = part.trim();
            if !p.is_empty() {
                out.push(PathBuf::from(p));
            }
        }
        return out;
    }

    let dir = std::env::var("FUZZ_EX_DIR").unwrap_or_else(|_| "highlight_tests".into());
    if let Ok(rd) = fs::read_dir(&dir) {
        for e in rd.flatten() {
            let p = e.path();
            if p.extension().and_then(|s| s.to_str()) == Some("js") {
                out.push(p);
            }
        }
        out.sort();
    }
    out
}

#[derive(serde::Serialize)]
struct CaseMeta<'a> {
    unix_ts: u64,
    seed: Option<u64>,
    iter: Option<usize>,
    actual_bytes: usize,
    note: &'a str,
}

fn save_case(dir: &str, seed: u64, iter: usize, src: &str) -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let base = format!("case_s{seed}_i{iter}_n{}.js", src.len());
    let path = Path::new(dir).join(base);

    fs::write(&path, src.as_bytes()).expect("failed to write case file");

    let meta = CaseMeta {
        unix_ts: ts,
        seed: Some(seed),
        iter: Some(iter),
        actual_bytes: src.len(),
        note: "Replay with: FUZZ_INPUT=<this file> cargo run --bin fuzz_highlight",
    };
    let meta_path = path.with_extension("meta.json");
    let mut f = fs::File::create(&meta_path).expect("failed to write meta");
    let _ = writeln!(f, "{}", serde_json::to_string_pretty(&meta).unwrap());

    path
}
