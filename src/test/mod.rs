//! End-to-end scenario tests, kept apart from the per-module unit tests
//! the way the teacher separates `src/test/test_*.rs` from in-module
//! `#[cfg(test)]` blocks.

mod test_scenarios;
