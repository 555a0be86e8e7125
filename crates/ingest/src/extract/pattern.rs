//! 레코드 패턴 -- 네 가지 구조적 로그 레코드 정의
//!
//! 각 패턴은 [`RecordPattern`] trait을 구현하며, 정규식 캡처를
//! 타입이 있는 [`Event`]로 변환합니다.
//!
//! 모든 패턴은 고정 타임스탬프 접두어(`YYYY-MM-DD HH:MM:SS.mmm ±HH:MM`)로 시작합니다.

use earnwatch_core::event::{
    BandwidthEvent, EarningsEvent, ErrorEvent, Event, EventKind, Timestamp, WalletEvent,
};
use regex::{Captures, Regex};

use crate::error::IngestError;
use crate::selector::FileClass;

/// 타임스탬프 캡처 그룹 (음수/양수 오프셋 모두 허용)
const TIMESTAMP: &str = r"(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d{3} [+-]\d{2}:\d{2})";

/// 구조적 레코드 패턴
///
/// `Send + Sync` 바운드는 추출기를 여러 요청이 공유하기 위해 필요합니다.
pub trait RecordPattern: Send + Sync {
    /// 패턴 이름 (로깅, 에러 메시지용)
    fn name(&self) -> &'static str;

    /// 생성하는 이벤트 종류
    fn kind(&self) -> EventKind;

    /// 텍스트 전체에 적용할 정규식
    fn regex(&self) -> &Regex;

    /// 해당 파일 분류에 이 패턴을 적용할지 여부
    fn applies_to(&self, _class: FileClass) -> bool {
        true
    }

    /// 캡처를 이벤트로 변환합니다. 실패하면 해당 레코드만 버립니다.
    fn build(&self, caps: &Captures<'_>) -> Result<Event, IngestError>;
}

/// 캡처 그룹 `index`를 문자열로 가져옵니다.
fn group<'t>(
    pattern: &'static str,
    caps: &Captures<'t>,
    index: usize,
) -> Result<&'t str, IngestError> {
    caps.get(index)
        .map(|m| m.as_str())
        .ok_or_else(|| IngestError::Record {
            pattern,
            reason: format!("missing capture group {index}"),
        })
}

fn timestamp(pattern: &'static str, caps: &Captures<'_>) -> Result<Timestamp, IngestError> {
    Timestamp::parse(group(pattern, caps, 1)?).map_err(|e| IngestError::Record {
        pattern,
        reason: e.to_string(),
    })
}

fn number(
    pattern: &'static str,
    field: &str,
    caps: &Captures<'_>,
    index: usize,
) -> Result<f64, IngestError> {
    let raw = group(pattern, caps, index)?;
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| IngestError::Record {
            pattern,
            reason: format!("{field} is not a number: {raw:?}"),
        })
}

/// 예측 수익 보고 패턴
///
/// `<ts> [INF] Predicted Earnings Report: <float> from (<containerId>)`
pub struct EarningsPattern {
    regex: Regex,
}

impl EarningsPattern {
    /// 패턴을 컴파일합니다.
    pub fn new() -> Result<Self, IngestError> {
        let regex = Regex::new(&format!(
            r"{TIMESTAMP} \[INF\] Predicted Earnings Report: ([\d.]+) from \(([^)]+)\)"
        ))?;
        Ok(Self { regex })
    }
}

impl RecordPattern for EarningsPattern {
    fn name(&self) -> &'static str {
        "earnings"
    }

    fn kind(&self) -> EventKind {
        EventKind::Earnings
    }

    fn regex(&self) -> &Regex {
        &self.regex
    }

    fn build(&self, caps: &Captures<'_>) -> Result<Event, IngestError> {
        Ok(EarningsEvent {
            timestamp: timestamp(self.name(), caps)?,
            earnings: number(self.name(), "earnings", caps, 2)?,
            container_id: group(self.name(), caps, 3)?.to_owned(),
        }
        .into())
    }
}

/// 지갑 잔액 패턴
///
/// `<ts> [INF] Wallet: Current(<float>), Predicted(<float>)`
pub struct WalletPattern {
    regex: Regex,
}

impl WalletPattern {
    /// 패턴을 컴파일합니다. 두 값 모두 음수를 허용합니다.
    pub fn new() -> Result<Self, IngestError> {
        let regex = Regex::new(&format!(
            r"{TIMESTAMP} \[INF\] Wallet: Current\((-?[\d.]+)\), Predicted\((-?[\d.]+)\)"
        ))?;
        Ok(Self { regex })
    }
}

impl RecordPattern for WalletPattern {
    fn name(&self) -> &'static str {
        "wallet"
    }

    fn kind(&self) -> EventKind {
        EventKind::Wallet
    }

    fn regex(&self) -> &Regex {
        &self.regex
    }

    fn build(&self, caps: &Captures<'_>) -> Result<Event, IngestError> {
        Ok(WalletEvent {
            timestamp: timestamp(self.name(), caps)?,
            current_balance: number(self.name(), "current balance", caps, 2)?,
            predicted_balance: number(self.name(), "predicted balance", caps, 3)?,
        }
        .into())
    }
}

/// 대역폭 측정 패턴 (대역폭 파일에만 적용)
///
/// `<ts> [INF] {... "BidirThroughput":<float> ...}` 형식이며,
/// 원시값을 `divisor`로 나눠 MB/s로 변환합니다.
pub struct BandwidthPattern {
    regex: Regex,
    divisor: f64,
}

impl BandwidthPattern {
    /// 패턴을 컴파일합니다.
    pub fn new(divisor: f64) -> Result<Self, IngestError> {
        if !divisor.is_finite() || divisor <= 0.0 {
            return Err(IngestError::Config {
                field: "bandwidth_divisor".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }
        // `.`은 줄바꿈을 넘지 않으므로 레코드는 한 줄 안에서만 매칭된다
        let regex = Regex::new(&format!(
            r#"{TIMESTAMP} \[INF\] .*?"BidirThroughput":([\d.]+)"#
        ))?;
        Ok(Self { regex, divisor })
    }
}

impl RecordPattern for BandwidthPattern {
    fn name(&self) -> &'static str {
        "bandwidth"
    }

    fn kind(&self) -> EventKind {
        EventKind::Bandwidth
    }

    fn regex(&self) -> &Regex {
        &self.regex
    }

    fn applies_to(&self, class: FileClass) -> bool {
        class == FileClass::Bandwidth
    }

    fn build(&self, caps: &Captures<'_>) -> Result<Event, IngestError> {
        let raw = number(self.name(), "throughput", caps, 2)?;
        Ok(BandwidthEvent {
            timestamp: timestamp(self.name(), caps)?,
            throughput_mbps: raw / self.divisor,
        }
        .into())
    }
}

/// 워크로드 실패 경고 패턴
///
/// `<ts> [WRN] Node Compatibility Workload Failure <machine> NodeCompatibilityMessage {<message>}`
///
/// 메시지 본문은 여러 줄에 걸칠 수 있으며, 첫 번째 `}`에서 끝납니다.
pub struct WorkloadFailurePattern {
    regex: Regex,
}

impl WorkloadFailurePattern {
    /// 패턴을 컴파일합니다.
    pub fn new() -> Result<Self, IngestError> {
        let regex = Regex::new(&format!(
            r"{TIMESTAMP} \[WRN\] Node Compatibility Workload Failure (\S+) NodeCompatibilityMessage \{{(?s:(.*?))\}}"
        ))?;
        Ok(Self { regex })
    }
}

impl RecordPattern for WorkloadFailurePattern {
    fn name(&self) -> &'static str {
        "error"
    }

    fn kind(&self) -> EventKind {
        EventKind::Error
    }

    fn regex(&self) -> &Regex {
        &self.regex
    }

    fn build(&self, caps: &Captures<'_>) -> Result<Event, IngestError> {
        Ok(ErrorEvent {
            timestamp: timestamp(self.name(), caps)?,
            machine_name: group(self.name(), caps, 2)?.to_owned(),
            message: group(self.name(), caps, 3)?.trim().to_owned(),
        }
        .into())
    }
}
