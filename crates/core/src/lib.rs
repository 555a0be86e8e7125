//! earnwatch 공통 크레이트
//!
//! 로그 수집 엔진, 데몬, CLI가 함께 사용하는 타입을 정의합니다.
//!
//! - [`config`]: `earnwatch.toml` 파싱, 환경변수 오버라이드, 검증
//! - [`error`]: 도메인별 에러 타입
//! - [`event`]: 로그에서 추출한 텔레메트리 이벤트 모델
//! - [`metrics`]: 메트릭 이름 상수 및 설명 등록

pub mod config;
pub mod error;
pub mod event;
pub mod metrics;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, EarnwatchError, ParseError, StorageError};

// 설정
pub use config::EarnwatchConfig;

// 이벤트
pub use event::{
    BandwidthEvent, EarningsEvent, ErrorEvent, Event, EventKind, Timestamp, WalletEvent,
};
