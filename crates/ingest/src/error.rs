//! 로그 수집 엔진 에러 타입
//!
//! [`IngestError`]는 수집 엔진 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<IngestError> for EarnwatchError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use earnwatch_core::error::EarnwatchError;

/// 로그 수집 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// 파일 I/O 실패 (사라진 파일, 권한 거부 등)
    #[error("io error: {path}: {source}")]
    Io {
        /// 대상 경로
        path: String,
        /// 원인 에러
        #[source]
        source: std::io::Error,
    },

    /// 개별 레코드 파싱 실패 (해당 레코드만 버림)
    #[error("malformed {pattern} record: {reason}")]
    Record {
        /// 패턴 이름 (earnings, wallet, bandwidth, error)
        pattern: &'static str,
        /// 실패 사유
        reason: String,
    },

    /// 상태 파일 읽기/쓰기 실패
    #[error("state file error: {path}: {reason}")]
    State {
        /// 상태 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 정제 후 비어있거나 사용할 수 없는 해제 키
    #[error("invalid dismissal key: {0:?}")]
    InvalidKey(String),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl IngestError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl From<IngestError> for EarnwatchError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Io { source, .. } => EarnwatchError::Io(source),
            other => EarnwatchError::Ingest(other.to_string()),
        }
    }
}
