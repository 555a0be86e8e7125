//! 에러 타입 -- 도메인별 에러 정의

/// earnwatch 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum EarnwatchError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 로그 수집 엔진 에러
    #[error("ingest error: {0}")]
    Ingest(String),

    /// 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 상태 저장소 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파싱 에러
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 타임스탬프 형식 불일치
    #[error("invalid timestamp '{input}': {reason}")]
    Timestamp { input: String, reason: String },

    /// 숫자 필드 파싱 실패
    #[error("invalid number for '{field}': {input}")]
    Number { field: String, input: String },
}

/// 상태 저장소 에러
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 상태 파일 직렬화 실패
    #[error("failed to serialize state for {path}: {reason}")]
    Serialize { path: String, reason: String },

    /// 상태 파일 쓰기 실패
    #[error("failed to write state file {path}: {reason}")]
    Write { path: String, reason: String },
}
