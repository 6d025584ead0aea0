//! Reading and writing emoji datastore files (top-level JSON arrays of objects).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

/// One emoji entry as it appears in a datastore file.
pub type Record = Map<String, Value>;

#[derive(Debug, Error)]
pub enum DatastoreError {
    #[error("Input paths not found. en: {}, zh: {}", en.display(), zh.display())]
    MissingInput { en: PathBuf, zh: PathBuf },

    #[error("reading {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a valid emoji datastore: {reason}", path.display())]
    MalformedInput { path: PathBuf, reason: String },

    #[error("serialising merged datastore")]
    Serialize(#[source] serde_json::Error),

    #[error("writing {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DatastoreError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingInput { .. } => 2,
            _ => 1,
        }
    }
}

// Both inputs are checked up front so the error can name the pair.
pub fn ensure_inputs_exist(en: &Path, zh: &Path) -> Result<(), DatastoreError> {
    if en.exists() && zh.exists() {
        return Ok(());
    }
    Err(DatastoreError::MissingInput {
        en: en.to_path_buf(),
        zh: zh.to_path_buf(),
    })
}

pub fn load_json_array(path: &Path) -> Result<Vec<Record>, DatastoreError> {
    let raw = fs::read_to_string(path).map_err(|source| DatastoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let malformed = |reason: String| DatastoreError::MalformedInput {
        path: path.to_path_buf(),
        reason,
    };

    let json: Value = serde_json::from_str(&raw).map_err(|e| malformed(e.to_string()))?;
    let items = match json {
        Value::Array(arr) => arr,
        other => return Err(malformed(format!("expected a JSON array, found {}", kind(&other)))),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(obj) => Ok(obj),
            other => Err(malformed(format!(
                "element {idx} is {}, expected an object",
                kind(&other)
            ))),
        })
        .collect()
}

/// Serialises `records` completely before touching the filesystem, so a failed run
/// never leaves a truncated output behind.
pub fn write_json_array(path: &Path, records: &[Record], minify: bool) -> Result<(), DatastoreError> {
    let bytes = if minify {
        serde_json::to_vec(records)
    } else {
        serde_json::to_vec_pretty(records)
    }
    .map_err(DatastoreError::Serialize)?;

    let write_err = |source: io::Error| DatastoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, bytes).map_err(write_err)
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_array_of_objects() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "en.json", r#"[{"emoji":"😀","order":1},{"emoji":"😺"}]"#);

        let records = load_json_array(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["emoji"], json!("😀"));
        assert_eq!(records[1].get("order"), None);
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "en.json", r#"[{"emoji":"😀""#);

        let err = load_json_array(&path).unwrap_err();
        assert!(matches!(err, DatastoreError::MalformedInput { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_load_rejects_top_level_object() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "zh.json", r#"{"emoji":"😀"}"#);

        let err = load_json_array(&path).unwrap_err();
        assert!(err.to_string().contains("expected a JSON array, found an object"));
    }

    #[test]
    fn test_load_rejects_non_object_element() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "zh.json", r#"[{"emoji":"😀"}, "😺"]"#);

        let err = load_json_array(&path).unwrap_err();
        assert!(matches!(err, DatastoreError::MalformedInput { .. }));
        assert!(err.to_string().contains("element 1 is a string"));
    }

    #[test]
    fn test_missing_input_names_both_paths() {
        let dir = TempDir::new().unwrap();
        let en = write_file(&dir, "en.json", "[]");
        let zh = dir.path().join("zh.json");

        let err = ensure_inputs_exist(&en, &zh).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let msg = err.to_string();
        assert!(msg.contains(&en.display().to_string()));
        assert!(msg.contains(&zh.display().to_string()));

        assert!(ensure_inputs_exist(&en, &en).is_ok());
    }

    #[test]
    fn test_write_creates_parent_dirs_and_keeps_unicode() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested/assets/emoji_merged.json");
        let records = vec![json!({"emoji": "😀", "annotation": "grin 笑"})
            .as_object()
            .cloned()
            .unwrap()];

        write_json_array(&out, &records, true).unwrap();

        let written = fs::read_to_string(&out).unwrap();
        assert_eq!(written, r#"[{"emoji":"😀","annotation":"grin 笑"}]"#);
    }

    #[test]
    fn test_write_pretty_uses_two_space_indent() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("emoji_merged.json");
        let records = vec![json!({"emoji": "😺"}).as_object().cloned().unwrap()];

        write_json_array(&out, &records, false).unwrap();

        let written = fs::read_to_string(&out).unwrap();
        assert_eq!(written, "[\n  {\n    \"emoji\": \"😺\"\n  }\n]");
    }
}
