//! Assertion helpers for testing
//!
//! This module provides custom assertion macros and helper functions
//! that make test assertions more readable and provide better error messages.

use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

/// Assert that a file exists
#[macro_export]
macro_rules! assert_file_exists {
    ($path:expr) => {
        assert!($path.exists(), "File should exist: {}", $path.display());
    };
    ($path:expr, $msg:expr) => {
        assert!($path.exists(), "{}: {}", $msg, $path.display());
    };
}

/// Assert that a file does not exist
#[macro_export]
macro_rules! assert_file_not_exists {
    ($path:expr) => {
        assert!(
            !$path.exists(),
            "File should not exist: {}",
            $path.display()
        );
    };
    ($path:expr, $msg:expr) => {
        assert!(!$path.exists(), "{}: {}", $msg, $path.display());
    };
}

/// Assert that file content matches expected content
#[macro_export]
macro_rules! assert_file_content {
    ($path:expr, $expected:expr) => {
        let content = std::fs::read_to_string($path)
            .expect(&format!("Failed to read file: {}", $path.display()));
        assert_eq!(
            content, $expected,
            "File content mismatch in: {}",
            $path.display()
        );
    };
}

/// Custom assertion helpers for working trees
pub struct AssertionHelpers;

impl AssertionHelpers {
    /// Relative path → content for every file under `dir`, skipping top-level `excluded` names
    pub fn tree_snapshot(dir: &Path, excluded: &[&str]) -> BTreeMap<String, Vec<u8>> {
        WalkDir::new(dir)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() != 1
                    || !excluded
                        .iter()
                        .any(|name| entry.file_name().to_string_lossy().starts_with(name))
            })
            .map(|entry| entry.expect("Failed to walk directory"))
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| {
                let relative = entry
                    .path()
                    .strip_prefix(dir)
                    .expect("Walked path should be under the root")
                    .to_string_lossy()
                    .to_string();
                let content = std::fs::read(entry.path()).expect("Failed to read file");
                (relative, content)
            })
            .collect()
    }

    /// Assert that the files under `dir` are exactly `expected` (excluding top-level `excluded`)
    pub fn assert_tree_equals(
        dir: &Path,
        expected: &BTreeMap<String, Vec<u8>>,
        excluded: &[&str],
    ) {
        let actual = Self::tree_snapshot(dir, excluded);
        pretty_assertions::assert_eq!(
            actual.keys().collect::<Vec<_>>(),
            expected.keys().collect::<Vec<_>>(),
            "File set mismatch under {}",
            dir.display()
        );
        for (path, content) in expected {
            assert_eq!(
                actual.get(path),
                Some(content),
                "Content mismatch for {}",
                path
            );
        }
    }
}
