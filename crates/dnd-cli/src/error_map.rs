use dnd_core::DndError;
use std::fmt::Display;

fn map_error(code: &'static str, error: impl Display) -> DndError {
    DndError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: DndError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
    );
    1
}

pub(crate) fn map_cli_source_path(error: std::io::Error) -> DndError {
    map_error("CLI_SOURCE_PATH", error)
}

pub(crate) fn map_cli_source_read(error: std::io::Error) -> DndError {
    map_error("CLI_SOURCE_READ", error)
}

pub(crate) fn map_cli_output_serialize(error: serde_json::Error) -> DndError {
    map_error("CLI_OUTPUT_SERIALIZE", error)
}

#[cfg(test)]
mod error_map_tests {
    use super::*;

    #[test]
    fn emit_error_returns_non_zero_exit_code() {
        let code = emit_error(DndError::new("ERR", "failed"));
        assert_eq!(code, 1);
    }

    #[test]
    fn mapping_helpers_keep_error_codes() {
        assert_eq!(
            map_cli_source_path(std::io::Error::other("path")).code,
            "CLI_SOURCE_PATH"
        );
        assert_eq!(
            map_cli_source_read(std::io::Error::other("read")).code,
            "CLI_SOURCE_READ"
        );
        let invalid = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        assert_eq!(map_cli_output_serialize(invalid).code, "CLI_OUTPUT_SERIALIZE");
    }
}
