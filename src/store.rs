use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

pub const STUDENTS_FILE: &str = "students.json";
pub const ATTENDANCE_FILE: &str = "attendance.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid JSON: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Io { .. } | StoreError::Encode { .. } => "io_failed",
            StoreError::Corrupt { .. } => "store_corrupt",
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            StoreError::Io { path, .. }
            | StoreError::Corrupt { path, .. }
            | StoreError::Encode { path, .. } => path,
        }
    }
}

/// One whole-file JSON document.
///
/// `load` re-reads the entire file and `save` rewrites it through a sibling
/// temp file that is fsynced and renamed over the target, so a reader sees
/// either the previous document or the new one.
#[derive(Debug, Clone)]
pub struct JsonDocument<T> {
    path: PathBuf,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _doc: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<T, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(v) => v,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if text.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, doc: &T) -> Result<(), StoreError> {
        let bytes = encode_pretty(doc).map_err(|source| StoreError::Encode {
            path: self.path.clone(),
            source,
        })?;
        write_replace(&self.path, &bytes).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "document saved");
        Ok(())
    }
}

/// Serializes with 4-space indentation, matching the files the service has
/// always written.
pub fn encode_pretty<T: Serialize>(doc: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, fmt);
    doc.serialize(&mut ser)?;
    out.push(b'\n');
    Ok(out)
}

/// Writes `bytes` to `path` via temp file + fsync + rename in the same
/// directory.
pub fn write_replace(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = temp_sibling(path);
    let result = (|| {
        let mut f = File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
        drop(f);
        fs::rename(&tmp, path)
    })();
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4().simple()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let doc: JsonDocument<Vec<u32>> = JsonDocument::new(dir.path().join("none.json"));
        assert!(doc.load().expect("load").is_empty());
    }

    #[test]
    fn save_leaves_no_temp_files_behind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let doc: JsonDocument<BTreeMap<String, u32>> =
            JsonDocument::new(dir.path().join("nested").join("doc.json"));
        let mut m = BTreeMap::new();
        m.insert("a".to_string(), 1);
        doc.save(&m).expect("save");
        doc.save(&m).expect("save again");

        let names: Vec<String> = fs::read_dir(dir.path().join("nested"))
            .expect("read dir")
            .map(|e| e.expect("entry").file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["doc.json".to_string()]);
        assert_eq!(doc.load().expect("load"), m);
    }

    #[test]
    fn pretty_output_uses_four_space_indent() {
        let bytes = encode_pretty(&vec![1, 2]).expect("encode");
        assert_eq!(String::from_utf8(bytes).expect("utf8"), "[\n    1,\n    2\n]\n");
    }

    #[test]
    fn corrupt_json_is_reported_not_replaced() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").expect("write");
        let doc: JsonDocument<Vec<u32>> = JsonDocument::new(path.clone());
        let e = doc.load().expect_err("corrupt");
        assert_eq!(e.code(), "store_corrupt");
        assert_eq!(fs::read_to_string(&path).expect("read"), "{not json");
    }
}
