//! 설정 관리 -- earnwatch.toml 파싱 및 런타임 설정
//!
//! [`EarnwatchConfig`]는 모든 구성 요소의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`EARNWATCH_INGEST_LOG_DIR=/logs` 형식)
//! 3. 설정 파일 (`earnwatch.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), earnwatch_core::error::EarnwatchError> {
//! use earnwatch_core::config::EarnwatchConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = EarnwatchConfig::load("earnwatch.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = EarnwatchConfig::parse("[ingest]\ngeneral_window = 10")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, EarnwatchError};

/// earnwatch 통합 설정
///
/// `earnwatch.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 구성 요소는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EarnwatchConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 로그 수집 엔진 설정
    #[serde(default)]
    pub ingest: IngestConfig,
    /// HTTP 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl EarnwatchConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, EarnwatchError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, EarnwatchError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EarnwatchError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                EarnwatchError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일이 없으면 기본값을 사용합니다.
    ///
    /// 파일이 존재하지만 잘못된 경우에는 에러를 반환합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, EarnwatchError> {
        match Self::load(path.as_ref()).await {
            Err(EarnwatchError::Config(ConfigError::FileNotFound { path })) => {
                warn!(path = %path, "config file not found, using defaults");
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, EarnwatchError> {
        toml::from_str(toml_str).map_err(|e| {
            EarnwatchError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `EARNWATCH_{SECTION}_{FIELD}`
    /// 예: `EARNWATCH_INGEST_LOG_DIR=/srv/logs`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "EARNWATCH_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "EARNWATCH_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.data_dir, "EARNWATCH_GENERAL_DATA_DIR");

        // Ingest
        override_string(&mut self.ingest.log_dir, "EARNWATCH_INGEST_LOG_DIR");
        override_csv(&mut self.ingest.extensions, "EARNWATCH_INGEST_EXTENSIONS");
        override_csv(
            &mut self.ingest.excluded_dirs,
            "EARNWATCH_INGEST_EXCLUDED_DIRS",
        );
        override_string(
            &mut self.ingest.bandwidth_dir_prefix,
            "EARNWATCH_INGEST_BANDWIDTH_DIR_PREFIX",
        );
        override_usize(
            &mut self.ingest.general_window,
            "EARNWATCH_INGEST_GENERAL_WINDOW",
        );
        override_usize(
            &mut self.ingest.bandwidth_window,
            "EARNWATCH_INGEST_BANDWIDTH_WINDOW",
        );
        override_usize(&mut self.ingest.error_window, "EARNWATCH_INGEST_ERROR_WINDOW");
        override_usize(
            &mut self.ingest.general_capacity,
            "EARNWATCH_INGEST_GENERAL_CAPACITY",
        );
        override_usize(
            &mut self.ingest.bandwidth_capacity,
            "EARNWATCH_INGEST_BANDWIDTH_CAPACITY",
        );
        override_f64(
            &mut self.ingest.bandwidth_divisor,
            "EARNWATCH_INGEST_BANDWIDTH_DIVISOR",
        );
        override_bool(&mut self.ingest.persist_state, "EARNWATCH_INGEST_PERSIST_STATE");
        override_bool(
            &mut self.ingest.reset_state_on_start,
            "EARNWATCH_INGEST_RESET_STATE_ON_START",
        );

        // Server
        override_string(&mut self.server.bind_addr, "EARNWATCH_SERVER_BIND_ADDR");
        override_opt_string(&mut self.server.static_dir, "EARNWATCH_SERVER_STATIC_DIR");
        override_bool(
            &mut self.server.cors_allow_any,
            "EARNWATCH_SERVER_CORS_ALLOW_ANY",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "EARNWATCH_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "EARNWATCH_METRICS_LISTEN_ADDR");
        override_u16(&mut self.metrics.port, "EARNWATCH_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), EarnwatchError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        self.ingest.validate()?;

        if self.server.bind_addr.is_empty() {
            return Err(invalid("server.bind_addr", "must not be empty"));
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(invalid(
                "metrics.port",
                "must be non-zero when metrics are enabled",
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> EarnwatchError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 상태 파일(커서 캐시, 해제 목록)을 저장할 디렉토리
    pub data_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
            data_dir: "./data".to_owned(),
        }
    }
}

/// 로그 수집 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// 로그 루트 디렉토리
    pub log_dir: String,
    /// 수집 대상 파일 확장자 (점 없이)
    pub extensions: Vec<String>,
    /// 탐색에서 제외할 하위 디렉토리 이름
    pub excluded_dirs: Vec<String>,
    /// 대역폭 로그 하위 트리 이름 접두어
    pub bandwidth_dir_prefix: String,
    /// 일반 로그 선택 윈도우 크기
    pub general_window: usize,
    /// 대역폭 로그 선택 윈도우 크기
    pub bandwidth_window: usize,
    /// 에러 피드 선택 윈도우 크기
    pub error_window: usize,
    /// 일반 로그 커서 저장소 용량
    pub general_capacity: usize,
    /// 대역폭 로그 커서 저장소 용량
    pub bandwidth_capacity: usize,
    /// 대역폭 원시값(샘플 구간당 비트 수)을 MB/s로 바꾸는 나눗수
    pub bandwidth_divisor: f64,
    /// 커서 캐시와 해제 목록을 파일로 유지할지 여부
    pub persist_state: bool,
    /// 시작 시 저장된 상태를 지우고 콜드 스타트할지 여부
    pub reset_state_on_start: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir().to_owned(),
            extensions: vec!["txt".to_owned(), "log".to_owned()],
            excluded_dirs: Vec::new(),
            bandwidth_dir_prefix: "Bandwidth-SGS-".to_owned(),
            general_window: 20,
            bandwidth_window: 5,
            error_window: 20,
            general_capacity: 20,
            bandwidth_capacity: 5,
            bandwidth_divisor: 250_000.0 * 30.0,
            persist_state: true,
            reset_state_on_start: false,
        }
    }
}

impl IngestConfig {
    /// 수집 엔진 섹션을 검증합니다.
    pub fn validate(&self) -> Result<(), EarnwatchError> {
        if self.log_dir.is_empty() {
            return Err(invalid("ingest.log_dir", "must not be empty"));
        }

        if self.extensions.is_empty() || self.extensions.iter().any(|e| e.is_empty()) {
            return Err(invalid(
                "ingest.extensions",
                "at least one non-empty extension is required",
            ));
        }

        if self.bandwidth_dir_prefix.is_empty() {
            return Err(invalid("ingest.bandwidth_dir_prefix", "must not be empty"));
        }

        for (field, value) in [
            ("ingest.general_window", self.general_window),
            ("ingest.bandwidth_window", self.bandwidth_window),
            ("ingest.error_window", self.error_window),
        ] {
            if value == 0 {
                return Err(invalid(field, "must be at least 1"));
            }
        }

        // 용량이 윈도우보다 작으면 한 사이클 안에서 방금 읽은 파일이 축출된다
        if self.general_capacity < self.general_window {
            return Err(invalid(
                "ingest.general_capacity",
                format!("must be >= general_window ({})", self.general_window),
            ));
        }
        if self.bandwidth_capacity < self.bandwidth_window {
            return Err(invalid(
                "ingest.bandwidth_capacity",
                format!("must be >= bandwidth_window ({})", self.bandwidth_window),
            ));
        }

        if !self.bandwidth_divisor.is_finite() || self.bandwidth_divisor <= 0.0 {
            return Err(invalid(
                "ingest.bandwidth_divisor",
                "must be a finite number greater than 0",
            ));
        }

        Ok(())
    }
}

#[cfg(windows)]
fn default_log_dir() -> &'static str {
    r"C:\ProgramData\Salad\logs"
}

#[cfg(not(windows))]
fn default_log_dir() -> &'static str {
    "/var/log/salad"
}

/// HTTP 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인드 주소
    pub bind_addr: String,
    /// `index.html`을 제공할 정적 파일 디렉토리
    pub static_dir: Option<String>,
    /// 모든 Origin에 CORS 허용
    pub cors_allow_any: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_owned(),
            static_dir: None,
            cors_allow_any: true,
        }
    }
}

/// Prometheus 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 리스너 주소
    pub listen_addr: String,
    /// 리스너 포트
    pub port: u16,
    /// 스크레이프 엔드포인트 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9100,
            endpoint: "/metrics".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_opt_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = if val.is_empty() { None } else { Some(val) };
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_f64(target: &mut f64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<f64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse f64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
