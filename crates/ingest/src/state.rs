//! 상태 파일 -- 커서 저장소와 해제 목록의 JSON 영속화
//!
//! 저장은 임시 파일에 쓴 뒤 rename하므로 쓰기 도중 프로세스가 죽어도
//! 반쯤 쓰인 파일이 남지 않습니다. 없거나 손상된 파일은 호출자가
//! 빈 상태로 시작(콜드 스타트)하도록 처리합니다.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::IngestError;

/// JSON 상태 파일 하나
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// 새 상태 파일 핸들을 생성합니다. 파일은 아직 만들지 않습니다.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 파일을 읽어 역직렬화합니다. 파일이 없으면 `Ok(None)`입니다.
    pub fn load<T: DeserializeOwned>(&self) -> Result<Option<T>, IngestError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(IngestError::io(&self.path, e)),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| self.state_err(e.to_string()))
    }

    /// 파일을 읽고, 없거나 손상되었으면 `fallback`을 사용합니다.
    ///
    /// `validate`가 실패해도 손상으로 간주합니다.
    pub fn load_or_else<T, V, F>(&self, validate: V, fallback: F) -> T
    where
        T: DeserializeOwned,
        V: FnOnce(T) -> Result<T, String>,
        F: FnOnce() -> T,
    {
        match self.load::<T>() {
            Ok(Some(value)) => match validate(value) {
                Ok(value) => {
                    debug!(path = %self.path.display(), "state file loaded");
                    value
                }
                Err(reason) => {
                    warn!(path = %self.path.display(), reason = %reason, "inconsistent state file, starting cold");
                    fallback()
                }
            },
            Ok(None) => fallback(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable state file, starting cold");
                fallback()
            }
        }
    }

    /// 값을 직렬화해 원자적으로 저장합니다.
    pub fn save<T: Serialize>(&self, value: &T) -> Result<(), IngestError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| IngestError::io(parent, e))?;
        }

        let content =
            serde_json::to_vec_pretty(value).map_err(|e| self.state_err(e.to_string()))?;

        let tmp = self.tmp_path();
        std::fs::write(&tmp, content).map_err(|e| IngestError::io(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| IngestError::io(&self.path, e))?;
        Ok(())
    }

    /// 파일을 삭제합니다. 없으면 아무것도 하지 않습니다.
    pub fn remove(&self) -> Result<(), IngestError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(IngestError::io(&self.path, e)),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn state_err(&self, reason: String) -> IngestError {
        IngestError::State {
            path: self.path.display().to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateFile::new(dir.path().join("absent.json"));
        assert!(state.load::<BTreeSet<String>>().unwrap().is_none());
    }

    #[test]
    fn save_then_load_returns_value() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateFile::new(dir.path().join("nested").join("set.json"));
        let value: BTreeSet<String> = ["a".to_owned(), "b".to_owned()].into();
        state.save(&value).unwrap();

        let loaded: BTreeSet<String> = state.load().unwrap().unwrap();
        assert_eq!(loaded, value);
        assert!(!dir.path().join("nested").join("set.json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_a_state_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let state = StateFile::new(&path);
        assert!(matches!(
            state.load::<BTreeSet<String>>(),
            Err(IngestError::State { .. })
        ));
    }

    #[test]
    fn load_or_else_falls_back_on_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "[1, 2").unwrap();
        let state = StateFile::new(&path);
        let value: BTreeSet<String> = state.load_or_else(Ok, BTreeSet::new);
        assert!(value.is_empty());
    }

    #[test]
    fn load_or_else_falls_back_on_failed_validation() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateFile::new(dir.path().join("set.json"));
        let value: BTreeSet<String> = ["x".to_owned()].into();
        state.save(&value).unwrap();

        let loaded: BTreeSet<String> =
            state.load_or_else(|_| Err("rejected".to_owned()), BTreeSet::new);
        assert!(loaded.is_empty());
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateFile::new(dir.path().join("set.json"));
        state.save(&BTreeSet::<String>::new()).unwrap();
        state.remove().unwrap();
        state.remove().unwrap();
        assert!(!state.path().exists());
    }
}
