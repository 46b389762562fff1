use std::path::{Path, PathBuf};
use tokio::fs;
use crate::utils::{PathError, RecodeError, RecodeResult};

/// Get file size in bytes
pub async fn file_size(path: impl AsRef<Path>) -> RecodeResult<u64> {
    fs::metadata(path.as_ref())
        .await
        .map(|m| m.len())
        .map_err(|e| RecodeError::IO(format!("Failed to get file size: {}", e)))
}

/// Check if file exists
pub async fn file_exists(path: impl AsRef<Path>) -> bool {
    fs::metadata(path.as_ref())
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Verify that `path` exists and is a regular file.
pub async fn validate_input_path(path: impl AsRef<Path>) -> RecodeResult<()> {
    let path = path.as_ref();
    let metadata = match fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(_) => return Err(PathError::NotFound(path.to_path_buf()).into()),
    };
    if !metadata.is_file() {
        return Err(PathError::NotFile(path.to_path_buf()).into());
    }
    Ok(())
}

/// Create the parent directory of `path` if it is missing.
pub async fn ensure_parent_dir(path: impl AsRef<Path>) -> RecodeResult<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| RecodeError::IO(format!("Failed to create directory: {}", e)))?;
        }
    }
    Ok(())
}

/// Recursively collect files whose extension matches one of `extensions`
/// (case-insensitive, without the dot).
///
/// Traversal is iterative; directories that fail to read abort the walk with
/// an IO error rather than being silently skipped.
pub async fn collect_files_with_extensions(
    dir: impl AsRef<Path>,
    extensions: &[&str],
) -> RecodeResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.as_ref().to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut entries = fs::read_dir(&current)
            .await
            .map_err(|e| RecodeError::IO(format!(
                "Failed to read directory {}: {}", current.display(), e
            )))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RecodeError::IO(format!("Failed to read directory entry: {}", e)))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| RecodeError::IO(format!("Failed to stat {}: {}", path.display(), e)))?;

            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                let matches = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| {
                        let e = e.to_lowercase();
                        extensions.iter().any(|want| *want == e)
                    })
                    .unwrap_or(false);
                if matches {
                    found.push(path);
                }
            }
        }
    }

    // Deterministic order for callers that submit the list as a batch.
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collects_matching_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("one.gif"), b"x").unwrap();
        std::fs::write(nested.join("two.GIF"), b"x").unwrap();
        std::fs::write(nested.join("skip.png"), b"x").unwrap();

        let files = collect_files_with_extensions(dir.path(), &["gif"]).await.unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| {
            p.extension().unwrap().to_str().unwrap().eq_ignore_ascii_case("gif")
        }));
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("nope");
        assert!(collect_files_with_extensions(&gone, &["gif"]).await.is_err());
    }
}
