//! JSON document persistence on the local filesystem.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::save::error::PersistError;
use crate::save::traits::{Persist, PersistFuture};

/// Writes each saved value as a pretty-printed JSON document.
///
/// The document is written to a sibling temporary file and renamed into
/// place, so readers never observe a half-written file.
#[derive(Debug, Clone)]
pub struct JsonFilePersister {
    path: PathBuf,
}

impl JsonFilePersister {
    /// Create a persister writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("document"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Serialize and write `data` to the target path.
    pub async fn write<T: Serialize>(&self, data: &T) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(data)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        log::info!("Saved document to {:?}", self.path);
        Ok(())
    }
}

impl<T: Serialize + 'static> Persist<T> for JsonFilePersister {
    fn persist(&self, data: T) -> PersistFuture<'_> {
        Box::pin(async move { self.write(&data).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        title: String,
        weeks: u32,
    }

    #[tokio::test]
    async fn test_write_creates_parent_and_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.json");
        let persister = JsonFilePersister::new(&path);
        assert_eq!(persister.path(), path);

        let doc = Doc {
            title: "Biology 101".to_string(),
            weeks: 14,
        };
        persister.persist(doc).await.unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        let loaded: Doc = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.title, "Biology 101");
        assert_eq!(loaded.weeks, 14);
        assert!(!persister.temp_path().exists());
    }

    #[tokio::test]
    async fn test_write_replaces_existing_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "stale").unwrap();

        let persister = JsonFilePersister::new(&path);
        persister
            .write(&Doc {
                title: "Chemistry".to_string(),
                weeks: 10,
            })
            .await
            .unwrap();

        let loaded: Doc = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.title, "Chemistry");
    }

    #[tokio::test]
    async fn test_write_below_a_file_fails_with_io() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file cannot act as a directory.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let persister = JsonFilePersister::new(blocker.join("doc.json"));

        let err = persister
            .write(&Doc {
                title: "x".to_string(),
                weeks: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PersistError::Io(_)));
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let persister = JsonFilePersister::new("/data/syllabus.json");
        assert_eq!(persister.temp_path(), PathBuf::from("/data/syllabus.json.tmp"));
    }
}
