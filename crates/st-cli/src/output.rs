use std::fs;
use std::io::{self, Write};
use std::path::Path;

use st_core::SigTableError;

use crate::map_emit_write;

// Nothing reaches the file unless the whole artifact is available.
pub(crate) fn write_artifact(path: Option<&Path>, artifact: &str) -> Result<(), SigTableError> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(map_emit_write)?;
            }
            fs::write(path, artifact).map_err(map_emit_write)
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(artifact.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(map_emit_write)
        }
    }
}
