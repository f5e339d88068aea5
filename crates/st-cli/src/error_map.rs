use st_core::SigTableError;
use std::fmt::Display;

fn map_error(code: &'static str, error: impl Display) -> SigTableError {
    SigTableError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: SigTableError) -> i32 {
    eprintln!("ERROR {}: {}", error.code, error.message);
    1
}

pub(crate) fn map_emit_write(error: std::io::Error) -> SigTableError {
    map_error("EMIT_WRITE", error)
}

#[cfg(test)]
mod error_map_tests {
    use super::*;

    #[test]
    fn emit_error_returns_non_zero_exit_code() {
        let code = emit_error(SigTableError::new("SCOPE_NOT_FOUND", "failed"));
        assert_eq!(code, 1);
    }

    #[test]
    fn mapping_helpers_keep_error_codes() {
        let error = map_emit_write(std::io::Error::other("disk full"));
        assert_eq!(error.code, "EMIT_WRITE");
        assert_eq!(error.message, "disk full");
    }
}
