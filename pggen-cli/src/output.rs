//! Writing generated files
//!
//! Files are written one at a time; a failure leaves earlier files in place.

use crate::error::{GenError, Result};
use std::path::Path;
use tokio::fs;

pub async fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| GenError::io(dir, e))
}

pub async fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)
        .await
        .map_err(|e| GenError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_creates_dest() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("src").join("db");

        ensure_dir(&dest).await.unwrap();
        write_file(&dest.join("mod.rs"), "pub mod projects;\n")
            .await
            .unwrap();

        let written = std::fs::read_to_string(dest.join("mod.rs")).unwrap();
        assert_eq!(written, "pub mod projects;\n");
    }

    #[tokio::test]
    async fn test_write_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("projects.rs");

        match write_file(&path, "").await {
            Err(GenError::Io { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("expected io error, got {:?}", other),
        }
    }
}
