//! 에러 피드 -- 워크로드 실패 경고의 중복 제거 및 해제(dismiss)
//!
//! [`ErrorFeed`]는 일반 로그 윈도우를 매번 처음부터 다시 읽어 워크로드 실패
//! 경고만 추출합니다. 커서를 쓰지 않는 단순한 저빈도 경로입니다.
//!
//! - 중복 제거 키는 타임스탬프 문자열이며, 먼저 본 레코드만 남습니다
//!   (최신 파일부터, 파일 안에서는 위에서 아래로).
//! - 해제된 키는 [`DismissalSet`]에 기록되며 이후 피드에서 제외됩니다.
//!   해제 목록은 줄어들지 않습니다.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use earnwatch_core::event::{ErrorEvent, Event};
use earnwatch_core::metrics as m;
use parking_lot::Mutex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{DISMISSED_FILE, EngineConfig};
use crate::error::IngestError;
use crate::extract::Extractor;
use crate::selector::{FileClass, FileSelector};
use crate::state::StateFile;

/// 해제된 에러 키 집합
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DismissalSet {
    keys: BTreeSet<String>,
}

impl DismissalSet {
    /// 빈 집합을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 키를 추가합니다. 새로 추가되었으면 `true`입니다.
    pub fn insert(&mut self, key: String) -> bool {
        self.keys.insert(key)
    }

    /// 키가 해제되었는지 확인합니다.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// 해제된 키 개수
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// 비어있는지 여부
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// 정렬된 키 목록
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

/// 해제 요청 응답
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DismissAck {
    /// 정제된 키
    #[serde(rename = "dismissed")]
    pub key: String,
    /// 이번 요청으로 새로 추가되었는지 여부
    pub newly_dismissed: bool,
}

/// 에러 피드
pub struct ErrorFeed {
    log_dir: std::path::PathBuf,
    window: usize,
    selector: FileSelector,
    extractor: Extractor,
    markup: Regex,
    dismissed: Mutex<DismissalSet>,
    state: Option<StateFile>,
}

impl ErrorFeed {
    /// 설정을 검증하고 에러 피드를 생성합니다.
    ///
    /// 저장된 해제 목록이 있으면 불러옵니다. 시작 시 상태 삭제 옵션은
    /// 커서 캐시에만 적용되며 해제 목록은 유지됩니다.
    pub fn new(config: &EngineConfig) -> Result<Self, IngestError> {
        config.validate()?;

        let state = config.state_path(DISMISSED_FILE).map(StateFile::new);
        let dismissed = state
            .as_ref()
            .map(|s| s.load_or_else(Ok, DismissalSet::new))
            .unwrap_or_default();

        debug!(dismissed = dismissed.len(), "error feed initialized");

        Ok(Self {
            log_dir: config.log_dir.clone(),
            window: config.error_window,
            selector: FileSelector::from_config(config),
            extractor: Extractor::workload_failures()?,
            markup: Regex::new(r"<[^>]*>")?,
            dismissed: Mutex::new(dismissed),
            state,
        })
    }

    /// 설정된 로그 디렉토리의 에러 피드를 반환합니다.
    pub fn errors(&self) -> Vec<ErrorEvent> {
        self.errors_in(&self.log_dir)
    }

    /// 지정한 루트 디렉토리의 에러 피드를 반환합니다.
    ///
    /// 결과는 해제되지 않은, 중복 제거된 경고를 시각 오름차순으로 담습니다.
    pub fn errors_in(&self, root: &Path) -> Vec<ErrorEvent> {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();

        for file in self.selector.select_general(root, self.window) {
            let content = match std::fs::read(&file.path) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    warn!(path = %file.path.display(), error = %e, "failed to read log file for error feed");
                    metrics::counter!(m::INGEST_FILE_ERRORS_TOTAL).increment(1);
                    continue;
                }
            };

            let extraction = self.extractor.extract(&content, FileClass::General);
            for event in extraction.events {
                if let Event::Error(error) = event {
                    if seen.insert(error.timestamp.key()) {
                        unique.push(error);
                    }
                }
            }
        }

        let dismissed = self.dismissed.lock();
        let before = unique.len();
        unique.retain(|e| !dismissed.contains(&e.timestamp.key()));
        drop(dismissed);

        let suppressed = before - unique.len();
        if suppressed > 0 {
            metrics::counter!(m::ERROR_FEED_SUPPRESSED_TOTAL).increment(suppressed as u64);
        }

        unique.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        debug!(errors = unique.len(), suppressed, "error feed built");
        unique
    }

    /// 외부에서 받은 키를 정제한 뒤 해제 목록에 추가합니다.
    ///
    /// 정제 후 빈 키는 [`IngestError::InvalidKey`]입니다.
    pub fn dismiss(&self, raw_key: &str) -> Result<DismissAck, IngestError> {
        let key = self.sanitize_key(raw_key);
        if key.is_empty() {
            return Err(IngestError::InvalidKey(raw_key.to_owned()));
        }

        let mut dismissed = self.dismissed.lock();
        let newly_dismissed = dismissed.insert(key.clone());

        if newly_dismissed {
            metrics::counter!(m::ERROR_FEED_DISMISSED_TOTAL).increment(1);
            info!(key = %key, "error dismissed");
            if let Some(state) = &self.state {
                if let Err(e) = state.save(&*dismissed) {
                    warn!(path = %state.path().display(), error = %e, "failed to persist dismissed errors");
                }
            }
        }

        Ok(DismissAck {
            key,
            newly_dismissed,
        })
    }

    /// 해제된 키 목록 (정렬됨)
    pub fn dismissed_keys(&self) -> Vec<String> {
        self.dismissed.lock().keys().map(str::to_owned).collect()
    }

    /// 마크업 태그와 제어 문자를 제거하고 앞뒤 공백을 자릅니다.
    pub fn sanitize_key(&self, raw: &str) -> String {
        let stripped = self.markup.replace_all(raw, "");
        stripped
            .chars()
            .filter(|c| !c.is_control())
            .collect::<String>()
            .trim()
            .to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfigBuilder;

    fn failure(ts: &str, machine: &str) -> String {
        format!(
            "{ts} [WRN] Node Compatibility Workload Failure {machine} NodeCompatibilityMessage {{bad driver}}\n"
        )
    }

    fn feed(root: &Path, state_dir: Option<&Path>) -> ErrorFeed {
        let config = EngineConfigBuilder::new()
            .log_dir(root)
            .state_dir(state_dir.map(Path::to_path_buf))
            .build()
            .unwrap();
        ErrorFeed::new(&config).unwrap()
    }

    #[test]
    fn sanitize_strips_markup_and_control_characters() {
        let dir = tempfile::tempdir().unwrap();
        let feed = feed(dir.path(), None);
        assert_eq!(
            feed.sanitize_key("<script>alert(1)</script>2024-01-01 00:00:00.000 -05:00\u{0007}"),
            "alert(1)2024-01-01 00:00:00.000 -05:00"
        );
        assert_eq!(feed.sanitize_key("  <b></b>\n "), "");
    }

    #[test]
    fn dismiss_rejects_empty_key() {
        let dir = tempfile::tempdir().unwrap();
        let feed = feed(dir.path(), None);
        assert!(matches!(
            feed.dismiss("<i></i>"),
            Err(IngestError::InvalidKey(_))
        ));
    }

    #[test]
    fn duplicate_timestamps_keep_first_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        let ts = "2024-01-01 00:00:00.000 -05:00";
        let content = format!("{}{}", failure(ts, "first"), failure(ts, "second"));
        std::fs::write(dir.path().join("a.txt"), content).unwrap();

        let errors = feed(dir.path(), None).errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].machine_name, "first");
    }

    #[test]
    fn dismissed_key_is_suppressed_and_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let ts = "2024-01-01 00:00:00.000 -05:00";
        std::fs::write(
            dir.path().join("a.txt"),
            format!("{}{}", failure(ts, "rig"), failure("2024-01-01 00:00:09.000 -05:00", "rig")),
        )
        .unwrap();

        let feed = feed(dir.path(), None);
        assert_eq!(feed.errors().len(), 2);

        let ack = feed.dismiss(ts).unwrap();
        assert!(ack.newly_dismissed);
        assert_eq!(ack.key, ts);
        let again = feed.dismiss(ts).unwrap();
        assert!(!again.newly_dismissed);
        assert_eq!(feed.dismissed_keys().len(), 1);

        let errors = feed.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].timestamp.to_string(), "2024-01-01 00:00:09.000 -05:00");
    }

    #[test]
    fn dismissals_survive_restart() {
        let logs = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();
        let ts = "2024-01-01 00:00:00.000 -05:00";
        std::fs::write(logs.path().join("a.txt"), failure(ts, "rig")).unwrap();

        feed(logs.path(), Some(data.path())).dismiss(ts).unwrap();

        let restarted = feed(logs.path(), Some(data.path()));
        assert_eq!(restarted.dismissed_keys(), vec![ts.to_owned()]);
        assert!(restarted.errors().is_empty());
    }

    #[test]
    fn ack_serializes_with_dismissed_field() {
        let ack = DismissAck {
            key: "k".to_owned(),
            newly_dismissed: true,
        };
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(json["dismissed"], "k");
        assert_eq!(json["newly_dismissed"], true);
    }
}
