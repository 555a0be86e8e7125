//! 수집 엔진 설정
//!
//! [`EngineConfig`]는 core의 [`IngestConfig`](earnwatch_core::config::IngestConfig)를
//! 기반으로 엔진이 실제로 사용하는 경로와 상수를 담습니다.
//!
//! # 사용 예시
//! ```ignore
//! use earnwatch_core::config::EarnwatchConfig;
//! use earnwatch_ingest::config::EngineConfig;
//!
//! let core_config = EarnwatchConfig::default();
//! let config = EngineConfig::from_core(&core_config);
//! ```

use std::path::{Path, PathBuf};

use earnwatch_core::config::EarnwatchConfig;

use crate::error::IngestError;

/// 일반 로그 커서 캐시 파일명
pub const GENERAL_CACHE_FILE: &str = "general-cache.json";
/// 대역폭 로그 커서 캐시 파일명
pub const BANDWIDTH_CACHE_FILE: &str = "bandwidth-cache.json";
/// 해제된 에러 키 파일명
pub const DISMISSED_FILE: &str = "dismissed-errors.json";

/// 수집 엔진 설정
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 로그 루트 디렉토리
    pub log_dir: PathBuf,
    /// 수집 대상 확장자 (점 없이, 소문자 비교)
    pub extensions: Vec<String>,
    /// 탐색에서 가지치기할 디렉토리 이름
    pub excluded_dirs: Vec<String>,
    /// 대역폭 하위 트리 이름 접두어
    pub bandwidth_dir_prefix: String,
    /// 일반 로그 윈도우
    pub general_window: usize,
    /// 대역폭 로그 윈도우
    pub bandwidth_window: usize,
    /// 에러 피드 윈도우
    pub error_window: usize,
    /// 일반 커서 저장소 용량
    pub general_capacity: usize,
    /// 대역폭 커서 저장소 용량
    pub bandwidth_capacity: usize,
    /// 대역폭 단위 변환 나눗수
    pub bandwidth_divisor: f64,
    /// 상태 파일 디렉토리 (`None`이면 메모리에만 유지)
    pub state_dir: Option<PathBuf>,
    /// 시작 시 저장된 상태 삭제
    pub reset_state_on_start: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_core(&EarnwatchConfig::default())
    }
}

impl EngineConfig {
    /// core 설정에서 엔진 설정을 생성합니다.
    pub fn from_core(core: &EarnwatchConfig) -> Self {
        let ingest = &core.ingest;
        Self {
            log_dir: PathBuf::from(&ingest.log_dir),
            extensions: ingest.extensions.clone(),
            excluded_dirs: ingest.excluded_dirs.clone(),
            bandwidth_dir_prefix: ingest.bandwidth_dir_prefix.clone(),
            general_window: ingest.general_window,
            bandwidth_window: ingest.bandwidth_window,
            error_window: ingest.error_window,
            general_capacity: ingest.general_capacity,
            bandwidth_capacity: ingest.bandwidth_capacity,
            bandwidth_divisor: ingest.bandwidth_divisor,
            state_dir: ingest
                .persist_state
                .then(|| PathBuf::from(&core.general.data_dir)),
            reset_state_on_start: ingest.reset_state_on_start,
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.log_dir.as_os_str().is_empty() {
            return Err(config_err("log_dir", "must not be empty"));
        }
        if self.extensions.is_empty() {
            return Err(config_err("extensions", "at least one extension is required"));
        }
        if self.bandwidth_dir_prefix.is_empty() {
            return Err(config_err("bandwidth_dir_prefix", "must not be empty"));
        }
        if self.general_window == 0 || self.bandwidth_window == 0 || self.error_window == 0 {
            return Err(config_err("window", "every window must be at least 1"));
        }
        if self.general_capacity < self.general_window {
            return Err(config_err(
                "general_capacity",
                "must be greater than or equal to general_window",
            ));
        }
        if self.bandwidth_capacity < self.bandwidth_window {
            return Err(config_err(
                "bandwidth_capacity",
                "must be greater than or equal to bandwidth_window",
            ));
        }
        if !self.bandwidth_divisor.is_finite() || self.bandwidth_divisor <= 0.0 {
            return Err(config_err("bandwidth_divisor", "must be greater than 0"));
        }
        Ok(())
    }

    /// 상태 파일 경로를 반환합니다.
    pub fn state_path(&self, file_name: &str) -> Option<PathBuf> {
        self.state_dir.as_deref().map(|dir| dir.join(file_name))
    }
}

fn config_err(field: &str, reason: &str) -> IngestError {
    IngestError::Config {
        field: field.to_owned(),
        reason: reason.to_owned(),
    }
}

/// 엔진 설정 빌더
#[derive(Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// 기본값으로 시작하는 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// core 설정에서 시작하는 빌더를 생성합니다.
    pub fn from_core(core: &EarnwatchConfig) -> Self {
        Self {
            config: EngineConfig::from_core(core),
        }
    }

    /// 로그 루트 디렉토리를 설정합니다.
    pub fn log_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.log_dir = dir.as_ref().to_path_buf();
        self
    }

    /// 수집 대상 확장자를 설정합니다.
    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.extensions = extensions;
        self
    }

    /// 제외 디렉토리 이름을 설정합니다.
    pub fn excluded_dirs(mut self, dirs: Vec<String>) -> Self {
        self.config.excluded_dirs = dirs;
        self
    }

    /// 대역폭 하위 트리 접두어를 설정합니다.
    pub fn bandwidth_dir_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.bandwidth_dir_prefix = prefix.into();
        self
    }

    /// 일반 로그 윈도우와 저장소 용량을 함께 설정합니다.
    pub fn general_window(mut self, window: usize) -> Self {
        self.config.general_window = window;
        self.config.general_capacity = window;
        self
    }

    /// 대역폭 로그 윈도우와 저장소 용량을 함께 설정합니다.
    pub fn bandwidth_window(mut self, window: usize) -> Self {
        self.config.bandwidth_window = window;
        self.config.bandwidth_capacity = window;
        self
    }

    /// 에러 피드 윈도우를 설정합니다.
    pub fn error_window(mut self, window: usize) -> Self {
        self.config.error_window = window;
        self
    }

    /// 일반 커서 저장소 용량을 설정합니다.
    pub fn general_capacity(mut self, capacity: usize) -> Self {
        self.config.general_capacity = capacity;
        self
    }

    /// 대역폭 커서 저장소 용량을 설정합니다.
    pub fn bandwidth_capacity(mut self, capacity: usize) -> Self {
        self.config.bandwidth_capacity = capacity;
        self
    }

    /// 대역폭 나눗수를 설정합니다.
    pub fn bandwidth_divisor(mut self, divisor: f64) -> Self {
        self.config.bandwidth_divisor = divisor;
        self
    }

    /// 상태 디렉토리를 설정합니다. `None`이면 영속화하지 않습니다.
    pub fn state_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.config.state_dir = dir;
        self
    }

    /// 시작 시 상태 삭제 여부를 설정합니다.
    pub fn reset_state_on_start(mut self, reset: bool) -> Self {
        self.config.reset_state_on_start = reset;
        self
    }

    /// 설정을 검증하고 `EngineConfig`를 생성합니다.
    pub fn build(self) -> Result<EngineConfig, IngestError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn from_core_respects_persist_flag() {
        let mut core = EarnwatchConfig::default();
        core.general.data_dir = "/var/lib/earnwatch".to_owned();
        let config = EngineConfig::from_core(&core);
        assert_eq!(config.state_dir, Some(PathBuf::from("/var/lib/earnwatch")));
        assert_eq!(
            config.state_path(DISMISSED_FILE),
            Some(PathBuf::from("/var/lib/earnwatch/dismissed-errors.json"))
        );

        core.ingest.persist_state = false;
        let config = EngineConfig::from_core(&core);
        assert!(config.state_dir.is_none());
        assert!(config.state_path(GENERAL_CACHE_FILE).is_none());
    }

    #[test]
    fn builder_creates_valid_config() {
        let config = EngineConfigBuilder::new()
            .log_dir("/srv/logs")
            .general_window(3)
            .bandwidth_window(2)
            .state_dir(None)
            .build()
            .unwrap();
        assert_eq!(config.log_dir, PathBuf::from("/srv/logs"));
        assert_eq!(config.general_capacity, 3);
        assert_eq!(config.bandwidth_capacity, 2);
    }

    #[test]
    fn builder_rejects_capacity_below_window() {
        let result = EngineConfigBuilder::new()
            .general_window(10)
            .general_capacity(4)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_rejects_zero_divisor() {
        let result = EngineConfigBuilder::new().bandwidth_divisor(0.0).build();
        assert!(result.is_err());
    }
}
