use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{DndToolError, TestCase, TESTCASE_SCHEMA_V1};

/// Reads the one `.xml` exercise definition inside a demo directory.
pub fn read_exercise_from_dir(demo_dir: &Path) -> Result<String, DndToolError> {
    let mut found = Vec::new();

    for entry in WalkDir::new(demo_dir)
        .follow_links(false)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
    {
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "xml")
        {
            found.push(entry.path().to_path_buf());
        }
    }
    found.sort();

    match found.as_slice() {
        [] => Err(DndToolError::SourceEmpty {
            path: demo_dir.to_path_buf(),
        }),
        [path] => fs::read_to_string(path).map_err(|source| DndToolError::ReadFile {
            path: path.clone(),
            source,
        }),
        _ => Err(DndToolError::SourceAmbiguous {
            path: demo_dir.to_path_buf(),
            count: found.len(),
        }),
    }
}

/// Every `testcase.json` under `root`, sorted.
pub fn discover_cases(root: &Path) -> Vec<PathBuf> {
    let mut cases: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == "testcase.json")
        .map(|entry| entry.into_path())
        .collect();
    cases.sort();
    cases
}

pub fn read_test_case(case_path: &Path) -> Result<TestCase, DndToolError> {
    let raw = fs::read_to_string(case_path).map_err(|source| DndToolError::ReadFile {
        path: case_path.to_path_buf(),
        source,
    })?;
    let parsed: TestCase =
        serde_json::from_str(&raw).map_err(|source| DndToolError::ParseCase {
            path: case_path.to_path_buf(),
            source,
        })?;

    if parsed.schema_version != TESTCASE_SCHEMA_V1 {
        return Err(DndToolError::InvalidSchemaVersion {
            expected: TESTCASE_SCHEMA_V1.to_string(),
            found: parsed.schema_version,
        });
    }

    Ok(parsed)
}
