//! Staging area for upload content
//!
//! Remote backends take a file path, so content is spilled to disk for the
//! duration of one upload. Every staged file is removed either by an
//! explicit `cleanup()` or, if the upload future is dropped, by `Drop`.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::types::UploadError;

/// Longest display-name fragment kept in a staged file name
const MAX_NAME_LEN: usize = 100;

/// Directory holding staged uploads
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Staged file names start with this prefix for a given digest
    fn prefix_for(digest: &str) -> String {
        format!("temp_{}_", digest)
    }

    /// Write content to a new staged file keyed by digest and display name
    pub async fn stage(
        &self,
        digest: &str,
        display_name: &str,
        content: &[u8],
    ) -> Result<StagedFile, UploadError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            UploadError::TempResource(format!(
                "Failed to create staging directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let file_name = format!(
            "{}{}_{}",
            Self::prefix_for(digest),
            Uuid::new_v4().simple(),
            sanitize_file_name(display_name)
        );
        let staged = StagedFile {
            path: self.dir.join(file_name),
            removed: false,
        };

        // On failure `staged` drops here and removes any partial file
        tokio::fs::write(&staged.path, content).await.map_err(|e| {
            UploadError::TempResource(format!(
                "Failed to write {}: {}",
                staged.path.display(),
                e
            ))
        })?;

        tracing::debug!(
            digest = %digest,
            path = %staged.path.display(),
            size = content.len(),
            "Staged upload content"
        );

        Ok(staged)
    }

    /// Staged files currently on disk for a digest
    pub async fn staged_for(&self, digest: &str) -> Vec<PathBuf> {
        let prefix = Self::prefix_for(digest);
        let mut found = Vec::new();

        let Ok(mut entries) = tokio::fs::read_dir(&self.dir).await else {
            return found;
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            if entry.file_name().to_string_lossy().starts_with(&prefix) {
                found.push(entry.path());
            }
        }

        found
    }
}

/// A staged file owned by one upload
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    removed: bool,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file; a file that is already gone counts as removed
    pub async fn cleanup(mut self) -> Result<(), UploadError> {
        self.removed = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(UploadError::TempResource(format!(
                "Failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.removed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Reduce a display name to a safe file name fragment
fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_NAME_LEN)
        .collect();

    if sanitized.trim_matches('.').is_empty() {
        "file".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_stage_and_cleanup() {
        let temp_dir = TempDir::new().unwrap();
        let staging = StagingArea::new(temp_dir.path());

        let staged = staging.stage("abc123", "notes.txt", b"content").await.unwrap();
        let path = staged.path().to_path_buf();

        assert!(path.exists());
        assert_eq!(std::fs::read(&path).unwrap(), b"content");
        assert_eq!(staging.staged_for("abc123").await, vec![path.clone()]);

        staged.cleanup().await.unwrap();
        assert!(!path.exists());
        assert!(staging.staged_for("abc123").await.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_reports_unremovable_path() {
        let temp_dir = TempDir::new().unwrap();
        let staging = StagingArea::new(temp_dir.path());

        let staged = staging.stage("abc123", "notes.txt", b"content").await.unwrap();
        let path = staged.path().to_path_buf();
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let result = staged.cleanup().await;
        assert!(matches!(result, Err(UploadError::TempResource(_))));
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn test_drop_removes_file() {
        let temp_dir = TempDir::new().unwrap();
        let staging = StagingArea::new(temp_dir.path());

        let path = {
            let staged = staging.stage("abc123", "notes.txt", b"content").await.unwrap();
            staged.path().to_path_buf()
        };

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_same_digest_gets_distinct_files() {
        let temp_dir = TempDir::new().unwrap();
        let staging = StagingArea::new(temp_dir.path());

        let first = staging.stage("abc123", "a.txt", b"x").await.unwrap();
        let second = staging.stage("abc123", "a.txt", b"x").await.unwrap();

        assert_ne!(first.path(), second.path());
        assert_eq!(staging.staged_for("abc123").await.len(), 2);
    }

    #[tokio::test]
    async fn test_cleanup_of_missing_file_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let staging = StagingArea::new(temp_dir.path());

        let staged = staging.stage("abc123", "a.txt", b"x").await.unwrap();
        std::fs::remove_file(staged.path()).unwrap();

        assert!(staged.cleanup().await.is_ok());
    }

    #[tokio::test]
    async fn test_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let staging = StagingArea::new(temp_dir.path().join("nested").join("staging"));

        let staged = staging.stage("abc123", "a.txt", b"x").await.unwrap();
        assert!(staged.path().starts_with(staging.dir()));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name("my file (1).txt"), "my_file__1_.txt");
        assert_eq!(sanitize_file_name(".."), "file");
        assert_eq!(sanitize_file_name(&"a".repeat(300)).len(), MAX_NAME_LEN);
    }
}
