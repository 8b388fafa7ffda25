//! Loading of JSON edit scripts.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::application::replay::Operation;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("I/O error reading script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed script JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parses a JSON array of operations.
pub fn parse_script(json: &str) -> Result<Vec<Operation>, ScriptError> {
    Ok(serde_json::from_str(json)?)
}

/// Reads and parses the script at `path`.
///
/// # Errors
///
/// Returns [`ScriptError::Io`] if the file cannot be read and
/// [`ScriptError::Parse`] if it is not a valid operation list.
pub fn load_script(path: &Path) -> Result<Vec<Operation>, ScriptError> {
    let json = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script_reads_operation_list() {
        let ops = parse_script(r#"[{"op":"end_drag"},{"op":"pan","dx":8,"dy":0,"snap":false}]"#)
            .expect("valid script");
        assert_eq!(ops.len(), 2);
        assert_eq!(
            ops[1],
            Operation::Pan {
                dx: 8,
                dy: 0,
                snap: Some(false)
            }
        );
    }

    #[test]
    fn test_unknown_op_is_parse_error() {
        let result = parse_script(r#"[{"op":"teleport"}]"#);
        assert!(matches!(result, Err(ScriptError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_script(Path::new("/nonexistent/screenplan/script.json"));
        assert!(matches!(result, Err(ScriptError::Io { .. })));
    }
}
