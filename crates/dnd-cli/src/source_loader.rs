use std::fs;
use std::path::PathBuf;

use dnd_core::DndError;

use crate::{map_cli_source_path, map_cli_source_read};

pub(crate) fn resolve_source_path(path: &str) -> Result<PathBuf, DndError> {
    let path = PathBuf::from(path);
    let absolute = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map_err(map_cli_source_path)?
            .join(path)
    };

    if !absolute.exists() {
        return Err(DndError::new(
            "CLI_SOURCE_NOT_FOUND",
            format!("input file does not exist: {}", absolute.display()),
        ));
    }

    if !absolute.is_file() {
        return Err(DndError::new(
            "CLI_SOURCE_NOT_FILE",
            format!("input path is not a file: {}", absolute.display()),
        ));
    }

    Ok(absolute)
}

pub(crate) fn read_source_file(path: &str) -> Result<String, DndError> {
    let resolved = resolve_source_path(path)?;
    fs::read_to_string(&resolved).map_err(map_cli_source_read)
}

pub(crate) fn read_source_files(paths: &[String]) -> Result<Vec<String>, DndError> {
    paths.iter().map(|path| read_source_file(path)).collect()
}
