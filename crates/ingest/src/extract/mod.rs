//! 패턴 추출 모듈 -- 로그 텍스트를 타입이 있는 이벤트로 변환
//!
//! [`Extractor`]는 등록된 [`RecordPattern`]을 텍스트 전체에 적용합니다.
//! 에러 패턴처럼 한 레코드가 여러 줄에 걸칠 수 있으므로 라인 단위가 아니라
//! 텍스트 단위로 매칭합니다.
//!
//! 커서 오프셋은 라인 수로 관리되므로, 추출기에 넘기는 텍스트는
//! [`unread_suffix`]로 라인 경계에 맞춰 잘라야 합니다.
//!
//! # 사용 예시
//! ```ignore
//! use earnwatch_ingest::extract::Extractor;
//! use earnwatch_ingest::selector::FileClass;
//!
//! let extractor = Extractor::with_defaults(250_000.0 * 30.0)?;
//! let extraction = extractor.extract(text, FileClass::General);
//! assert_eq!(extraction.lines_consumed, text.lines().count());
//! ```

pub mod pattern;

pub use pattern::{
    BandwidthPattern, EarningsPattern, RecordPattern, WalletPattern, WorkloadFailurePattern,
};

use earnwatch_core::event::Event;
use tracing::debug;

use crate::error::IngestError;
use crate::selector::FileClass;

/// 한 번의 추출 결과
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// 텍스트 내 위치 순서의 이벤트
    pub events: Vec<Event>,
    /// 입력 텍스트의 라인 수 (매칭 여부와 무관)
    pub lines_consumed: usize,
    /// 파싱 실패로 버린 레코드 수
    pub dropped: usize,
}

/// 레코드 추출기
///
/// 등록된 패턴을 모두 적용하고 결과를 텍스트 내 위치 순으로 합칩니다.
pub struct Extractor {
    patterns: Vec<Box<dyn RecordPattern>>,
}

impl Extractor {
    /// 패턴이 없는 추출기를 생성합니다.
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// 네 가지 기본 패턴으로 추출기를 생성합니다.
    pub fn with_defaults(bandwidth_divisor: f64) -> Result<Self, IngestError> {
        Ok(Self::new()
            .register(Box::new(EarningsPattern::new()?))
            .register(Box::new(WalletPattern::new()?))
            .register(Box::new(BandwidthPattern::new(bandwidth_divisor)?))
            .register(Box::new(WorkloadFailurePattern::new()?)))
    }

    /// 워크로드 실패 패턴만 가진 추출기를 생성합니다 (에러 피드용).
    pub fn workload_failures() -> Result<Self, IngestError> {
        Ok(Self::new().register(Box::new(WorkloadFailurePattern::new()?)))
    }

    /// 패턴을 등록합니다.
    pub fn register(mut self, pattern: Box<dyn RecordPattern>) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// 등록된 패턴 이름 목록을 반환합니다.
    pub fn registered_patterns(&self) -> Vec<&'static str> {
        self.patterns.iter().map(|p| p.name()).collect()
    }

    /// 텍스트에서 이벤트를 추출합니다.
    ///
    /// 타임스탬프나 숫자가 잘못된 레코드는 버리고 계속 진행합니다.
    pub fn extract(&self, text: &str, class: FileClass) -> Extraction {
        let mut located: Vec<(usize, Event)> = Vec::new();
        let mut dropped = 0;

        for pattern in self.patterns.iter().filter(|p| p.applies_to(class)) {
            for caps in pattern.regex().captures_iter(text) {
                let start = caps.get(0).map_or(0, |m| m.start());
                match pattern.build(&caps) {
                    Ok(event) => located.push((start, event)),
                    Err(e) => {
                        debug!(pattern = pattern.name(), error = %e, "dropping malformed record");
                        dropped += 1;
                    }
                }
            }
        }

        located.sort_by_key(|(start, _)| *start);

        Extraction {
            events: located.into_iter().map(|(_, event)| event).collect(),
            lines_consumed: count_lines(text),
            dropped,
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// 텍스트의 라인 수를 셉니다. 마지막 줄에 개행이 없어도 한 줄로 셉니다.
pub fn count_lines(text: &str) -> usize {
    let newlines = text.bytes().filter(|&b| b == b'\n').count();
    if text.is_empty() || text.ends_with('\n') {
        newlines
    } else {
        newlines + 1
    }
}

/// 여러 줄 워크로드 실패 레코드의 본문 시작 표식
const FAILURE_OPENER: &str = "NodeCompatibilityMessage {";

/// 닫히지 않은 레코드를 보류할 최대 줄 수. 넘으면 그대로 소비합니다.
pub const MAX_PENDING_RECORD_LINES: usize = 256;

/// 앞의 `offset`줄을 건너뛴 나머지 중 개행으로 끝난 완전한 줄만 반환합니다.
///
/// 반환값은 `(suffix, 완전한 줄 수)`입니다. 쓰는 중인 마지막 줄은 포함하지
/// 않으므로 다음 사이클에 다시 읽힙니다. 마지막 워크로드 실패 레코드의
/// 닫는 `}`가 아직 없으면 그 레코드가 시작된 줄부터 보류합니다
/// (보류 분량이 [`MAX_PENDING_RECORD_LINES`] 이하일 때). 파일이 `offset`줄보다
/// 짧으면 빈 suffix를 반환합니다.
pub fn unread_suffix(content: &str, offset: usize) -> (&str, usize) {
    let mut start = 0;
    for _ in 0..offset {
        match content[start..].find('\n') {
            Some(pos) => start += pos + 1,
            None => return ("", 0),
        }
    }

    let rest = &content[start..];
    match rest.rfind('\n') {
        Some(pos) => {
            let complete = hold_back_open_record(&rest[..=pos]);
            (complete, count_lines(complete))
        }
        None => ("", 0),
    }
}

/// 닫히지 않은 마지막 실패 레코드의 시작 줄 앞에서 텍스트를 자릅니다.
fn hold_back_open_record(complete: &str) -> &str {
    let Some(opener) = complete.rfind(FAILURE_OPENER) else {
        return complete;
    };
    if complete[opener..].contains('}') {
        return complete;
    }

    let line_start = complete[..opener].rfind('\n').map_or(0, |pos| pos + 1);
    if count_lines(&complete[line_start..]) > MAX_PENDING_RECORD_LINES {
        return complete;
    }
    &complete[..line_start]
}
