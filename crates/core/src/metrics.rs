//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `earnwatch_`
//! - 구성 요소: `ingest_`, `error_feed_`, `http_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 커서 저장소 레이블 키 (general, bandwidth)
pub const LABEL_STORE: &str = "store";

/// 이벤트 종류 레이블 키 (earnings, wallet, bandwidth, error)
pub const LABEL_KIND: &str = "kind";

// ─── Ingest 메트릭 ─────────────────────────────────────────────────

/// Ingest: 다시 읽은 파일 수 (counter, label: store)
pub const INGEST_FILES_SCANNED_TOTAL: &str = "earnwatch_ingest_files_scanned_total";

/// Ingest: 변경이 없어 캐시를 재사용한 파일 수 (counter, label: store)
pub const INGEST_FILES_SKIPPED_TOTAL: &str = "earnwatch_ingest_files_skipped_total";

/// Ingest: 읽기 실패로 건너뛴 파일 수 (counter)
pub const INGEST_FILE_ERRORS_TOTAL: &str = "earnwatch_ingest_file_errors_total";

/// Ingest: 소비한 라인 수 (counter)
pub const INGEST_LINES_CONSUMED_TOTAL: &str = "earnwatch_ingest_lines_consumed_total";

/// Ingest: 새로 추출된 이벤트 수 (counter, label: kind)
pub const INGEST_EVENTS_EXTRACTED_TOTAL: &str = "earnwatch_ingest_events_extracted_total";

/// Ingest: 타임스탬프/숫자 파싱 실패로 버린 레코드 수 (counter)
pub const INGEST_RECORDS_DROPPED_TOTAL: &str = "earnwatch_ingest_records_dropped_total";

/// Ingest: 용량 초과로 축출된 커서 수 (counter, label: store)
pub const INGEST_CURSORS_EVICTED_TOTAL: &str = "earnwatch_ingest_cursors_evicted_total";

/// Ingest: 스캔 사이클 소요 시간 (histogram, 초)
pub const INGEST_SCAN_DURATION_SECONDS: &str = "earnwatch_ingest_scan_duration_seconds";

/// Ingest: 캐시에 보관 중인 이벤트 수 (gauge, label: store)
pub const INGEST_CACHED_EVENTS: &str = "earnwatch_ingest_cached_events";

// ─── Error Feed 메트릭 ──────────────────────────────────────────────

/// Error Feed: 해제(dismiss)된 키 수 (counter)
pub const ERROR_FEED_DISMISSED_TOTAL: &str = "earnwatch_error_feed_dismissed_total";

/// Error Feed: 해제 목록으로 숨겨진 에러 수 (counter)
pub const ERROR_FEED_SUPPRESSED_TOTAL: &str = "earnwatch_error_feed_suppressed_total";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 스캔 소요 시간 히스토그램 버킷 (초)
///
/// 1ms ~ 10s 범위 (콜드 스캔은 전체 파일을 읽음)
pub const SCAN_DURATION_BUCKETS: [f64; 9] = [0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 일반적으로 `earnwatch-daemon`의 시작 시점에서 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_counter!(
        INGEST_FILES_SCANNED_TOTAL,
        "Log files re-read because they were new or modified"
    );
    describe_counter!(
        INGEST_FILES_SKIPPED_TOTAL,
        "Log files served from cache because they were unchanged"
    );
    describe_counter!(
        INGEST_FILE_ERRORS_TOTAL,
        "Log files skipped for a cycle because they could not be read"
    );
    describe_counter!(
        INGEST_LINES_CONSUMED_TOTAL,
        "Total number of log lines consumed by the extractor"
    );
    describe_counter!(
        INGEST_EVENTS_EXTRACTED_TOTAL,
        "Total number of telemetry events extracted, by kind"
    );
    describe_counter!(
        INGEST_RECORDS_DROPPED_TOTAL,
        "Matched records dropped because a field failed to parse"
    );
    describe_counter!(
        INGEST_CURSORS_EVICTED_TOTAL,
        "File cursors evicted from a store that exceeded its capacity"
    );
    describe_histogram!(
        INGEST_SCAN_DURATION_SECONDS,
        "Time to complete one scan cycle in seconds"
    );
    describe_gauge!(
        INGEST_CACHED_EVENTS,
        "Events currently held in a cursor store"
    );
    describe_counter!(
        ERROR_FEED_DISMISSED_TOTAL,
        "Error keys newly added to the dismissal set"
    );
    describe_counter!(
        ERROR_FEED_SUPPRESSED_TOTAL,
        "Error events hidden from the feed because they were dismissed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        INGEST_FILES_SCANNED_TOTAL,
        INGEST_FILES_SKIPPED_TOTAL,
        INGEST_FILE_ERRORS_TOTAL,
        INGEST_LINES_CONSUMED_TOTAL,
        INGEST_EVENTS_EXTRACTED_TOTAL,
        INGEST_RECORDS_DROPPED_TOTAL,
        INGEST_CURSORS_EVICTED_TOTAL,
        INGEST_SCAN_DURATION_SECONDS,
        INGEST_CACHED_EVENTS,
        ERROR_FEED_DISMISSED_TOTAL,
        ERROR_FEED_SUPPRESSED_TOTAL,
    ];

    #[test]
    fn all_metrics_start_with_earnwatch_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("earnwatch_"),
                "Metric '{}' does not start with 'earnwatch_' prefix",
                name
            );
        }
    }

    #[test]
    fn describe_all_does_not_panic() {
        // 레코더가 없어도 패닉하지 않아야 함
        describe_all();
    }

    #[test]
    fn scan_duration_buckets_are_sorted() {
        let buckets = SCAN_DURATION_BUCKETS;
        for i in 1..buckets.len() {
            assert!(
                buckets[i] > buckets[i - 1],
                "Bucket values must be in ascending order"
            );
        }
    }
}
