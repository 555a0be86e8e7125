//! 파일 선택기 -- 로그 디렉토리에서 스캔 대상 윈도우를 고릅니다.
//!
//! [`FileSelector`]는 루트 디렉토리를 재귀적으로 탐색하여 확장자 필터를 통과한
//! 파일을 수집하고, 두 분류로 나눕니다:
//!
//! - [`FileClass::General`]: 대역폭 하위 트리 밖의 일반 로그
//! - [`FileClass::Bandwidth`]: `Bandwidth-SGS-*` 형태 디렉토리 아래의 로그
//!
//! 각 분류는 수정 시각 내림차순(같으면 경로 오름차순)으로 정렬된 후
//! 독립된 윈도우 크기로 잘립니다.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, warn};

use crate::config::EngineConfig;

/// 로그 파일 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileClass {
    /// 일반 로그 (수익, 지갑, 경고)
    General,
    /// 대역폭 측정 로그
    Bandwidth,
}

impl FileClass {
    /// 로깅과 메트릭 레이블에 쓰이는 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Bandwidth => "bandwidth",
        }
    }
}

impl std::fmt::Display for FileClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 선택된 파일과 선택 시점의 수정 시각
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub modified: SystemTime,
    pub class: FileClass,
}

/// 한 사이클의 선택 결과
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// 일반 로그 윈도우 (최신순)
    pub general: Vec<SelectedFile>,
    /// 대역폭 로그 윈도우 (최신순)
    pub bandwidth: Vec<SelectedFile>,
}

impl Selection {
    /// 선택된 파일 총 개수
    pub fn len(&self) -> usize {
        self.general.len() + self.bandwidth.len()
    }

    /// 선택된 파일이 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.general.is_empty() && self.bandwidth.is_empty()
    }
}

/// 파일 선택기
#[derive(Debug, Clone)]
pub struct FileSelector {
    /// 소문자로 정규화한 확장자
    extensions: Vec<String>,
    /// 가지치기할 디렉토리 이름
    excluded_dirs: HashSet<String>,
    /// 대역폭 하위 트리 접두어
    bandwidth_prefix: String,
}

impl FileSelector {
    /// 새 선택기를 생성합니다.
    pub fn new(
        extensions: &[String],
        excluded_dirs: &[String],
        bandwidth_prefix: impl Into<String>,
    ) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            excluded_dirs: excluded_dirs.iter().cloned().collect(),
            bandwidth_prefix: bandwidth_prefix.into(),
        }
    }

    /// 엔진 설정에서 선택기를 생성합니다.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            &config.extensions,
            &config.excluded_dirs,
            config.bandwidth_dir_prefix.clone(),
        )
    }

    /// 일반/대역폭 윈도우를 선택합니다.
    pub fn select(&self, root: &Path, general_window: usize, bandwidth_window: usize) -> Selection {
        let (mut general, mut bandwidth): (Vec<_>, Vec<_>) = self
            .candidates(root)
            .into_iter()
            .partition(|f| f.class == FileClass::General);

        rank_and_truncate(&mut general, general_window);
        rank_and_truncate(&mut bandwidth, bandwidth_window);

        Selection { general, bandwidth }
    }

    /// 일반 로그 윈도우만 선택합니다 (에러 피드용).
    pub fn select_general(&self, root: &Path, window: usize) -> Vec<SelectedFile> {
        let mut general: Vec<_> = self
            .candidates(root)
            .into_iter()
            .filter(|f| f.class == FileClass::General)
            .collect();
        rank_and_truncate(&mut general, window);
        general
    }

    /// 루트 아래 모든 후보 파일을 수집합니다 (정렬되지 않음).
    ///
    /// 읽을 수 없는 디렉토리나 stat에 실패한 파일은 경고 후 건너뜁니다.
    pub fn candidates(&self, root: &Path) -> Vec<SelectedFile> {
        let mut results = Vec::new();

        if !root.is_dir() {
            warn!(dir = %root.display(), "log directory does not exist");
            return results;
        }

        let mut pending = vec![(root.to_path_buf(), false)];

        while let Some((dir, in_bandwidth)) = pending.pop() {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "failed to read directory");
                    continue;
                }
            };

            for entry in entries {
                let entry = match entry {
                    Ok(e) => e,
                    Err(e) => {
                        warn!(error = %e, "failed to read directory entry");
                        continue;
                    }
                };

                let path = entry.path();
                let file_type = match entry.file_type() {
                    Ok(t) => t,
                    Err(e) => {
                        debug!(path = %path.display(), error = %e, "entry vanished, skipping");
                        continue;
                    }
                };

                if file_type.is_dir() {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if self.excluded_dirs.contains(&name) {
                        debug!(dir = %path.display(), "pruning excluded directory");
                        continue;
                    }
                    let bandwidth = in_bandwidth || name.starts_with(&self.bandwidth_prefix);
                    pending.push((path, bandwidth));
                    continue;
                }

                if !self.has_wanted_extension(&path) {
                    continue;
                }

                // 목록 조회와 stat 사이에 사라진 파일은 건너뛴다
                let modified = match std::fs::metadata(&path).and_then(|m| m.modified()) {
                    Ok(t) => t,
                    Err(e) => {
                        debug!(path = %path.display(), error = %e, "failed to stat log file");
                        continue;
                    }
                };

                results.push(SelectedFile {
                    path,
                    modified,
                    class: if in_bandwidth {
                        FileClass::Bandwidth
                    } else {
                        FileClass::General
                    },
                });
            }
        }

        results
    }

    fn has_wanted_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|e| *e == ext))
    }
}

/// 최신순(같으면 경로순)으로 정렬하고 `window`개로 자릅니다.
fn rank_and_truncate(files: &mut Vec<SelectedFile>, window: usize) {
    files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.path.cmp(&b.path)));
    files.truncate(window);
}
