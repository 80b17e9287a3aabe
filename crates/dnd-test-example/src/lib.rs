use std::fs;
use std::path::PathBuf;

pub const EXERCISE_FILE: &str = "exercise.xml";
pub const TESTCASE_FILE: &str = "testcase.json";

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

pub fn demos_root() -> PathBuf {
    workspace_root().join("demos")
}

pub fn demo_dir(name: &str) -> PathBuf {
    demos_root().join(name)
}

pub fn exercise_path(name: &str) -> PathBuf {
    demo_dir(name).join(EXERCISE_FILE)
}

pub fn testcase_path(name: &str) -> PathBuf {
    demo_dir(name).join(TESTCASE_FILE)
}

/// Demo directories holding a testcase, sorted by name.
pub fn demo_dirs() -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(demos_root()) else {
        return Vec::new();
    };
    let mut directories = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.join(TESTCASE_FILE).is_file())
        .collect::<Vec<_>>();
    directories.sort();
    directories
}
