//! 원자적 파일 쓰기.
//!
//! 같은 디렉토리에 임시 파일을 만들어 내용을 쓰고 fsync한 뒤 대상 경로로
//! rename한다. 읽는 쪽은 이전 파일 또는 완성된 새 파일만 본다.

use perch_core::error::CoreError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// 동기 원자적 쓰기
///
/// 실패하면 대상 파일은 이전 내용 그대로 남고 임시 파일은 삭제된다.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), CoreError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| {
        CoreError::Storage(format!("임시 파일 생성 실패: {}: {e}", dir.display()))
    })?;

    tmp.write_all(contents)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| CoreError::Storage(format!("임시 파일 쓰기 실패: {}: {e}", path.display())))?;

    tmp.persist(path).map_err(|e| {
        CoreError::Storage(format!("파일 교체 실패: {}: {}", path.display(), e.error))
    })?;

    Ok(())
}

/// 블로킹 풀에서 원자적 쓰기 실행
pub async fn write_atomic_async(path: PathBuf, contents: Vec<u8>) -> Result<(), CoreError> {
    tokio::task::spawn_blocking(move || write_atomic(&path, &contents))
        .await
        .map_err(|e| CoreError::Internal(format!("쓰기 태스크 실패: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn replaces_existing_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("user.txt");
        std::fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(entries(dir.path()), vec!["user.txt".to_string()]);
    }

    #[test]
    fn failed_replace_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        // 대상 경로가 비어 있지 않은 디렉토리면 rename이 실패한다
        let target = dir.path().join("dock.json");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), "x").unwrap();

        let err = write_atomic(&target, b"[]").unwrap_err();
        assert!(matches!(err, CoreError::Storage(_)));
        assert!(target.join("keep").exists());
        assert_eq!(entries(dir.path()), vec!["dock.json".to_string()]);
    }

    #[test]
    fn missing_directory_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("user.txt");
        assert!(matches!(
            write_atomic(&path, b"x"),
            Err(CoreError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn async_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("layout_mode.txt");
        write_atomic_async(path.clone(), b"list".to_vec())
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "list");
    }
}
