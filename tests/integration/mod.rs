//! Integration tests for the user repository
//!
//! These tests run the repository against a real SQLite file, one
//! temporary database per test.

mod data_source_tests;
