//! 이벤트 모델 -- 로그에서 추출한 텔레메트리 레코드
//!
//! [`Event`]는 닫힌 태그 유니온이며, 네 가지 레코드 형태
//! (수익, 지갑 잔액, 대역폭, 워크로드 실패 경고)만 존재합니다.
//! 모든 이벤트는 밀리초 정밀도와 고정 UTC 오프셋을 가진 [`Timestamp`]를 갖습니다.
//!
//! JSON 직렬화는 외부 소비자를 위한 투영입니다:
//! `kind` 태그와 camelCase 필드명을 사용합니다.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

/// 로그 타임스탬프 형식 (`YYYY-MM-DD HH:MM:SS.mmm ±HH:MM`)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f %:z";

/// 로그 레코드 타임스탬프
///
/// 정렬은 절대 시각 기준이며, 같은 시각이면 원문 텍스트로 구분합니다.
/// 텍스트 표현과 [`key`](Self::key)는 파싱한 원문 그대로입니다
/// (`-00:00`이 `+00:00`으로 바뀌지 않음).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Timestamp {
    instant: DateTime<FixedOffset>,
    raw: String,
}

impl Timestamp {
    /// 고정 형식 문자열을 파싱합니다.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        DateTime::parse_from_str(input, TIMESTAMP_FORMAT)
            .map(|instant| Self {
                instant,
                raw: input.to_owned(),
            })
            .map_err(|e| ParseError::Timestamp {
                input: input.to_owned(),
                reason: e.to_string(),
            })
    }

    /// 내부 `DateTime` 값을 반환합니다.
    pub fn as_datetime(&self) -> &DateTime<FixedOffset> {
        &self.instant
    }

    /// 파싱한 원문 텍스트
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// 중복 제거 및 해제(dismiss)에 쓰이는 텍스트 키 (원문과 정확히 일치)
    pub fn key(&self) -> String {
        self.raw.clone()
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant
            .cmp(&other.instant)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(instant: DateTime<FixedOffset>) -> Self {
        Self {
            raw: instant.format(TIMESTAMP_FORMAT).to_string(),
            instant,
        }
    }
}

impl FromStr for Timestamp {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// 예측 수익 보고 이벤트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsEvent {
    pub timestamp: Timestamp,
    pub earnings: f64,
    pub container_id: String,
}

/// 지갑 잔액 이벤트 (예측 잔액은 음수일 수 있음)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletEvent {
    pub timestamp: Timestamp,
    pub current_balance: f64,
    pub predicted_balance: f64,
}

/// 대역폭 측정 이벤트 (MB/s 단위로 변환된 값)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandwidthEvent {
    pub timestamp: Timestamp,
    #[serde(rename = "throughputMBps")]
    pub throughput_mbps: f64,
}

/// 노드 호환성 워크로드 실패 경고
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
    pub timestamp: Timestamp,
    pub machine_name: String,
    pub message: String,
}

/// 이벤트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Earnings,
    Wallet,
    Bandwidth,
    Error,
}

impl EventKind {
    /// 로깅과 메트릭 레이블에 쓰이는 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Earnings => "earnings",
            Self::Wallet => "wallet",
            Self::Bandwidth => "bandwidth",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 로그에서 추출한 텔레메트리 이벤트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Event {
    Earnings(EarningsEvent),
    Wallet(WalletEvent),
    Bandwidth(BandwidthEvent),
    Error(ErrorEvent),
}

impl Event {
    /// 이벤트 발생 시각
    pub fn timestamp(&self) -> &Timestamp {
        match self {
            Self::Earnings(e) => &e.timestamp,
            Self::Wallet(e) => &e.timestamp,
            Self::Bandwidth(e) => &e.timestamp,
            Self::Error(e) => &e.timestamp,
        }
    }

    /// 이벤트 종류
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Earnings(_) => EventKind::Earnings,
            Self::Wallet(_) => EventKind::Wallet,
            Self::Bandwidth(_) => EventKind::Bandwidth,
            Self::Error(_) => EventKind::Error,
        }
    }
}

impl From<EarningsEvent> for Event {
    fn from(e: EarningsEvent) -> Self {
        Self::Earnings(e)
    }
}

impl From<WalletEvent> for Event {
    fn from(e: WalletEvent) -> Self {
        Self::Wallet(e)
    }
}

impl From<BandwidthEvent> for Event {
    fn from(e: BandwidthEvent) -> Self {
        Self::Bandwidth(e)
    }
}

impl From<ErrorEvent> for Event {
    fn from(e: ErrorEvent) -> Self {
        Self::Error(e)
    }
}

/// 이벤트를 시각 오름차순으로 정렬합니다 (같은 시각이면 기존 순서 유지).
pub fn sort_by_time(events: &mut [Event]) {
    events.sort_by(|a, b| a.timestamp().cmp(b.timestamp()));
}
