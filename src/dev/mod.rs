// src/dev/mod.rs
// Helpers shared by the fuzz/perf binaries and the integration tests.
pub mod generator;
