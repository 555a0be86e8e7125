//! earnwatch 로그 수집 엔진
//!
//! 외부 프로세스가 회전시키며 쓰는 텍스트 로그에서 수익, 지갑 잔액, 대역폭,
//! 워크로드 실패 이벤트를 점진적으로 추출합니다.
//!
//! # 모듈 구성
//!
//! - [`selector`]: 로그 디렉토리 탐색 및 최신 파일 윈도우 선택
//! - [`cursor`]: 파일별 읽기 위치와 누적 이벤트를 담는 용량 제한 저장소
//! - [`extract`]: 네 가지 레코드 패턴과 추출기
//! - [`coordinator`]: 스캔 사이클 구동, 병합, 정렬, 영속화
//! - [`feed`]: 워크로드 실패 경고 피드와 해제 목록
//! - [`state`]: JSON 상태 파일 (원자적 저장)
//! - [`config`]: 엔진 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! FileSelector -> CursorStore.needs_rescan -> unread_suffix -> Extractor -> CursorStore.update
//!      |                                                                       |
//!  general/bandwidth window                                  all_cached_events -> sort
//!
//! FileSelector -> Extractor(workload failures) -> dedup -> DismissalSet filter
//! ```

pub mod config;
pub mod coordinator;
pub mod cursor;
pub mod error;
pub mod extract;
pub mod feed;
pub mod selector;
pub mod state;

// --- 주요 타입 re-export ---

// 코디네이터
pub use coordinator::{IngestCoordinator, ScanReport};

// 설정
pub use config::{EngineConfig, EngineConfigBuilder};

// 에러
pub use error::IngestError;

// 추출기
pub use extract::{Extraction, Extractor, RecordPattern};

// 커서
pub use cursor::{CursorStore, FileCursor};

// 선택기
pub use selector::{FileClass, FileSelector, SelectedFile, Selection};

// 에러 피드
pub use feed::{DismissAck, DismissalSet, ErrorFeed};

// 상태 파일
pub use state::StateFile;
