//! Property-based tests for the manifest parser.
//!
//! These tests use proptest to generate manifests and archives and verify
//! that the parser's invariants hold for all of them.
