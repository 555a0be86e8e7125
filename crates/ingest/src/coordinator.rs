//! 수집 코디네이터 -- 한 번의 스캔 사이클을 구동합니다.
//!
//! [`IngestCoordinator::scan`]은 다음 순서로 동작합니다:
//!
//! 1. 일반/대역폭 파일 윈도우 선택 ([`FileSelector`]), 선택된 파일이 들어갈
//!    자리를 미리 확보 ([`CursorStore::make_room`])
//! 2. 파일별로 재스캔 여부 결정 ([`CursorStore::needs_rescan`])
//! 3. 재스캔 대상은 커서 오프셋 이후의 완전한 줄만 추출 ([`Extractor`])
//! 4. 커서 갱신 (새 이벤트는 기존 캐시에 덧붙임)
//! 5. 모든 저장소의 캐시 이벤트를 합쳐 시각 순 정렬
//! 6. 변경이 있었으면 저장소를 상태 파일로 저장
//!
//! 두 저장소는 하나의 뮤텍스로 보호되며, 스캔 사이클 전체가 직렬화됩니다.
//! 동시에 두 스캔이 같은 suffix를 두 번 덧붙이는 일을 막기 위함입니다.

use std::path::Path;
use std::time::{Duration, Instant};

use earnwatch_core::event::{Event, sort_by_time};
use earnwatch_core::metrics as m;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::{BANDWIDTH_CACHE_FILE, EngineConfig, GENERAL_CACHE_FILE};
use crate::cursor::CursorStore;
use crate::error::IngestError;
use crate::extract::{Extractor, unread_suffix};
use crate::selector::{FileClass, FileSelector, SelectedFile};
use crate::state::StateFile;

/// 스캔 사이클 결과
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// 시각 오름차순으로 정렬된 전체 이벤트 (캐시 포함)
    pub events: Vec<Event>,
    /// 이번 사이클에 새로 추출된 이벤트 수
    pub new_events: usize,
    /// 다시 읽은 파일 수
    pub files_scanned: usize,
    /// 변경이 없어 캐시를 재사용한 파일 수
    pub files_skipped: usize,
    /// 읽기 실패로 건너뛴 파일 수
    pub files_failed: usize,
    /// 소비한 라인 수
    pub lines_consumed: usize,
    /// 파싱 실패로 버린 레코드 수
    pub records_dropped: usize,
    /// 축출된 커서 수
    pub cursors_evicted: usize,
    /// 소요 시간
    pub duration: Duration,
}

impl ScanReport {
    /// 새 데이터가 있었는지 여부
    pub fn has_new_data(&self) -> bool {
        self.new_events > 0
    }
}

/// 일반/대역폭 커서 저장소 묶음
struct Stores {
    general: CursorStore,
    bandwidth: CursorStore,
}

impl Stores {
    fn for_class(&mut self, class: FileClass) -> &mut CursorStore {
        match class {
            FileClass::General => &mut self.general,
            FileClass::Bandwidth => &mut self.bandwidth,
        }
    }
}

/// 수집 코디네이터
pub struct IngestCoordinator {
    config: EngineConfig,
    selector: FileSelector,
    extractor: Extractor,
    stores: Mutex<Stores>,
    general_state: Option<StateFile>,
    bandwidth_state: Option<StateFile>,
}

impl IngestCoordinator {
    /// 설정을 검증하고 코디네이터를 생성합니다.
    ///
    /// 상태 디렉토리가 설정되어 있으면 저장된 커서를 불러옵니다.
    /// 없거나 손상된 상태 파일은 빈 저장소로 대체합니다.
    pub fn new(config: EngineConfig) -> Result<Self, IngestError> {
        config.validate()?;

        let extractor = Extractor::with_defaults(config.bandwidth_divisor)?;
        let selector = FileSelector::from_config(&config);

        let general_state = config.state_path(GENERAL_CACHE_FILE).map(StateFile::new);
        let bandwidth_state = config.state_path(BANDWIDTH_CACHE_FILE).map(StateFile::new);

        if config.reset_state_on_start {
            for state in general_state.iter().chain(bandwidth_state.iter()) {
                state.remove()?;
                info!(path = %state.path().display(), "cleared cursor cache");
            }
        }

        let general = load_store(general_state.as_ref(), config.general_capacity);
        let bandwidth = load_store(bandwidth_state.as_ref(), config.bandwidth_capacity);

        info!(
            log_dir = %config.log_dir.display(),
            general_cursors = general.len(),
            bandwidth_cursors = bandwidth.len(),
            persist = general_state.is_some(),
            "ingest coordinator initialized"
        );

        Ok(Self {
            config,
            selector,
            extractor,
            stores: Mutex::new(Stores { general, bandwidth }),
            general_state,
            bandwidth_state,
        })
    }

    /// 엔진 설정
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 설정된 로그 디렉토리를 스캔합니다.
    pub fn scan(&self) -> ScanReport {
        self.scan_dir(&self.config.log_dir)
    }

    /// 지정한 루트 디렉토리를 스캔합니다.
    ///
    /// 읽을 수 없는 파일은 이번 사이클만 건너뛰며 전체 스캔을 중단하지 않습니다.
    pub fn scan_dir(&self, root: &Path) -> ScanReport {
        let started = Instant::now();
        let mut report = ScanReport::default();

        let mut stores = self.stores.lock();

        let selection = self.selector.select(
            root,
            self.config.general_window,
            self.config.bandwidth_window,
        );
        debug!(
            general = selection.general.len(),
            bandwidth = selection.bandwidth.len(),
            "selected log files"
        );

        // 선택된 파일이 사이클 도중 축출되지 않도록 자리를 먼저 만든다.
        // 축출된 파일의 캐시는 이번 응답까지는 포함한다.
        let mut carried = Vec::new();
        for (class, files) in [
            (FileClass::General, &selection.general),
            (FileClass::Bandwidth, &selection.bandwidth),
        ] {
            let keep: Vec<&Path> = files.iter().map(|f| f.path.as_path()).collect();
            for cursor in stores.for_class(class).make_room(&keep) {
                record_eviction(&cursor.path, class, &mut report);
                carried.extend(cursor.events);
            }
        }

        for file in selection.general.iter().chain(selection.bandwidth.iter()) {
            self.process_file(stores.for_class(file.class), file, &mut report);
        }

        report.events = carried;
        report.events.extend(
            stores
                .general
                .all_cached_events()
                .chain(stores.bandwidth.all_cached_events())
                .cloned(),
        );
        sort_by_time(&mut report.events);

        if report.files_scanned > 0 || report.cursors_evicted > 0 {
            self.persist(&stores);
        }

        metrics::gauge!(m::INGEST_CACHED_EVENTS, m::LABEL_STORE => FileClass::General.as_str())
            .set(stores.general.event_count() as f64);
        metrics::gauge!(m::INGEST_CACHED_EVENTS, m::LABEL_STORE => FileClass::Bandwidth.as_str())
            .set(stores.bandwidth.event_count() as f64);
        drop(stores);

        report.duration = started.elapsed();
        metrics::histogram!(m::INGEST_SCAN_DURATION_SECONDS).record(report.duration.as_secs_f64());

        if report.has_new_data() {
            info!(new_events = report.new_events, "new data found");
        } else {
            debug!("no new data found");
        }
        info!(
            duration_ms = report.duration.as_millis() as u64,
            events = report.events.len(),
            scanned = report.files_scanned,
            skipped = report.files_skipped,
            failed = report.files_failed,
            "scan complete"
        );

        report
    }

    /// 파일 하나를 처리합니다. 커서는 파일을 끝까지 처리한 뒤에만 갱신됩니다.
    fn process_file(&self, store: &mut CursorStore, file: &SelectedFile, report: &mut ScanReport) {
        let label = file.class.as_str();

        if !store.needs_rescan(&file.path, Some(file.modified)) {
            report.files_skipped += 1;
            metrics::counter!(m::INGEST_FILES_SKIPPED_TOTAL, m::LABEL_STORE => label).increment(1);
            return;
        }

        let content = match std::fs::read(&file.path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "failed to read log file, keeping cursor");
                report.files_failed += 1;
                metrics::counter!(m::INGEST_FILE_ERRORS_TOTAL).increment(1);
                return;
            }
        };

        let offset = store.get(&file.path).map_or(0, |c| c.last_line_offset);
        let (suffix, _) = unread_suffix(&content, offset);
        let extraction = self.extractor.extract(suffix, file.class);

        for event in &extraction.events {
            metrics::counter!(m::INGEST_EVENTS_EXTRACTED_TOTAL, m::LABEL_KIND => event.kind().as_str())
                .increment(1);
        }
        metrics::counter!(m::INGEST_FILES_SCANNED_TOTAL, m::LABEL_STORE => label).increment(1);
        metrics::counter!(m::INGEST_LINES_CONSUMED_TOTAL).increment(extraction.lines_consumed as u64);
        if extraction.dropped > 0 {
            metrics::counter!(m::INGEST_RECORDS_DROPPED_TOTAL).increment(extraction.dropped as u64);
        }

        debug!(
            path = %file.path.display(),
            offset,
            lines = extraction.lines_consumed,
            events = extraction.events.len(),
            "scanned log file"
        );

        report.files_scanned += 1;
        report.lines_consumed += extraction.lines_consumed;
        report.records_dropped += extraction.dropped;
        report.new_events += extraction.events.len();

        let evicted = store.update(
            &file.path,
            offset + extraction.lines_consumed,
            file.modified,
            extraction.events,
        );
        if let Some(evicted) = evicted {
            record_eviction(&evicted, file.class, report);
        }
    }

    fn persist(&self, stores: &Stores) {
        for (state, store) in [
            (self.general_state.as_ref(), &stores.general),
            (self.bandwidth_state.as_ref(), &stores.bandwidth),
        ] {
            let Some(state) = state else { continue };
            if let Err(e) = state.save(store) {
                warn!(path = %state.path().display(), error = %e, "failed to persist cursor cache");
            }
        }
    }

    /// 추적 중인 커서 수 `(general, bandwidth)`
    pub fn tracked_files(&self) -> (usize, usize) {
        let stores = self.stores.lock();
        (stores.general.len(), stores.bandwidth.len())
    }

    /// 특정 파일의 커서 오프셋을 반환합니다.
    pub fn cursor_offset(&self, path: &Path) -> Option<usize> {
        let stores = self.stores.lock();
        stores
            .general
            .get(path)
            .or_else(|| stores.bandwidth.get(path))
            .map(|c| c.last_line_offset)
    }
}

fn record_eviction(path: &Path, class: FileClass, report: &mut ScanReport) {
    info!(path = %path.display(), store = class.as_str(), "evicted file cursor");
    report.cursors_evicted += 1;
    metrics::counter!(m::INGEST_CURSORS_EVICTED_TOTAL, m::LABEL_STORE => class.as_str()).increment(1);
}

fn load_store(state: Option<&StateFile>, capacity: usize) -> CursorStore {
    match state {
        Some(state) => state.load_or_else(
            |store: CursorStore| store.restore(capacity),
            || CursorStore::new(capacity),
        ),
        None => CursorStore::new(capacity),
    }
}
