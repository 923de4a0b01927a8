use bytes::Bytes;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::Path;

use crate::error::AppError;

/// A byte-bearing file handle selected for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub content: Bytes,
}

impl Debug for SourceFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SourceFile")
            .field("name", &self.name)
            .field("size", &self.content.len())
            .finish()
    }
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read a file from disk; the handle is named after the path's final component.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                AppError::InvalidInput(format!("Path has no file name: {}", path.display()))
            })?
            .to_string();
        let content = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AppError::NotFound(path.display().to_string()),
            _ => AppError::Io(e),
        })?;
        Ok(Self::new(name, content))
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn from_path_uses_file_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.PDF");
        tokio::fs::write(&path, b"%PDF-1.4").await.unwrap();

        let file = SourceFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "report.PDF");
        assert_eq!(file.size(), 8);
    }

    #[tokio::test]
    async fn from_path_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let err = SourceFile::from_path(dir.path().join("nope.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn debug_omits_content() {
        let file = SourceFile::new("a.txt", vec![1u8; 4]);
        assert_eq!(format!("{:?}", file), "SourceFile { name: \"a.txt\", size: 4 }");
    }
}
