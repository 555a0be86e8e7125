//! 커서 저장소 -- 파일별 읽기 위치와 누적 이벤트 캐시
//!
//! [`CursorStore`]는 용량 K로 제한된 파일 커서 맵입니다.
//! 추적 순서(`order`)는 삽입 순서이며, 용량을 넘으면 가장 먼저 추적된
//! 파일이 축출됩니다 (접근 기준 LRU가 아님).
//!
//! # 불변식
//! - `order.len() == entries.len()`
//! - `order`의 모든 경로는 `entries`에 존재하며 중복이 없음
//! - `entries.len() <= capacity`

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use earnwatch_core::event::Event;
use serde::{Deserialize, Serialize};

/// 파일 하나의 읽기 상태
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCursor {
    /// 대상 파일 경로
    pub path: PathBuf,
    /// 이미 소비한 라인 수
    pub last_line_offset: usize,
    /// 마지막으로 관측한 수정 시각 (아직 읽지 않았으면 `None`)
    pub last_modified: Option<SystemTime>,
    /// 지금까지 추출한 이벤트 (파일 내 순서)
    pub events: Vec<Event>,
}

impl FileCursor {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            last_line_offset: 0,
            last_modified: None,
            events: Vec::new(),
        }
    }
}

/// 용량 제한이 있는 커서 저장소
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorStore {
    #[serde(skip)]
    capacity: usize,
    entries: HashMap<PathBuf, FileCursor>,
    order: VecDeque<PathBuf>,
}

impl CursorStore {
    /// 빈 저장소를 생성합니다. 용량은 최소 1입니다.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// 저장소 용량
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 추적 중인 파일 수
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// 추적 중인 파일이 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 커서를 조회합니다.
    pub fn get(&self, path: &Path) -> Option<&FileCursor> {
        self.entries.get(path)
    }

    /// 추적 순서대로 경로를 반환합니다 (가장 오래된 것부터).
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.order.iter().map(PathBuf::as_path)
    }

    /// 다시 읽어야 하는지 판단합니다.
    ///
    /// 커서가 없거나 아직 읽지 않았거나 수정 시각이 더 최신이면 `true`입니다.
    /// 수정 시각을 알 수 없으면 변경되지 않은 것으로 봅니다.
    pub fn needs_rescan(&self, path: &Path, modified: Option<SystemTime>) -> bool {
        let Some(modified) = modified else {
            return false;
        };
        match self.entries.get(path).and_then(|c| c.last_modified) {
            Some(last) => modified > last,
            None => true,
        }
    }

    /// 경로를 추적 목록에 넣습니다.
    ///
    /// 이미 추적 중이면 아무것도 하지 않습니다. 용량을 넘으면 가장 오래
    /// 추적된 경로를 축출하고 그 경로를 반환합니다.
    pub fn touch(&mut self, path: &Path) -> Option<PathBuf> {
        if self.entries.contains_key(path) {
            return None;
        }

        let evicted = if self.order.len() >= self.capacity {
            self.order.pop_front().inspect(|oldest| {
                self.entries.remove(oldest);
            })
        } else {
            None
        };

        self.order.push_back(path.to_path_buf());
        self.entries
            .insert(path.to_path_buf(), FileCursor::new(path.to_path_buf()));
        evicted
    }

    /// 이번 사이클에 다룰 경로들이 모두 들어갈 자리를 미리 만듭니다.
    ///
    /// `keep`에 없는 추적 경로를 오래된 것부터 축출하며, `keep`에 있는
    /// 경로는 축출하지 않습니다. 이후 `keep`의 경로를 [`touch`](Self::touch)해도
    /// 축출이 일어나지 않습니다 (`keep`이 용량 이하일 때). 축출된 커서를
    /// 추적 순서대로 반환합니다.
    pub fn make_room(&mut self, keep: &[&Path]) -> Vec<FileCursor> {
        let keep: HashSet<&Path> = keep.iter().copied().collect();
        let incoming = keep
            .iter()
            .filter(|path| !self.entries.contains_key(**path))
            .count();

        let mut evicted = Vec::new();
        let mut index = 0;
        while self.order.len() + incoming > self.capacity && index < self.order.len() {
            if keep.contains(self.order[index].as_path()) {
                index += 1;
                continue;
            }
            if let Some(path) = self.order.remove(index) {
                if let Some(cursor) = self.entries.remove(&path) {
                    evicted.push(cursor);
                }
            }
        }
        evicted
    }

    /// 새 이벤트를 덧붙이고 오프셋과 수정 시각을 갱신합니다.
    ///
    /// 추적 중이 아니면 먼저 [`touch`](Self::touch)하며, 축출된 경로를 반환합니다.
    pub fn update(
        &mut self,
        path: &Path,
        new_offset: usize,
        modified: SystemTime,
        new_events: Vec<Event>,
    ) -> Option<PathBuf> {
        let evicted = self.touch(path);
        if let Some(cursor) = self.entries.get_mut(path) {
            cursor.last_line_offset = new_offset;
            cursor.last_modified = Some(modified);
            cursor.events.extend(new_events);
        }
        evicted
    }

    /// 추적 순서대로 모든 캐시 이벤트를 이어 붙여 반환합니다.
    ///
    /// 시각 순 정렬은 호출자가 합니다.
    pub fn all_cached_events(&self) -> impl Iterator<Item = &Event> {
        self.order
            .iter()
            .filter_map(|path| self.entries.get(path))
            .flat_map(|cursor| cursor.events.iter())
    }

    /// 캐시에 보관 중인 이벤트 수
    pub fn event_count(&self) -> usize {
        self.entries.values().map(|c| c.events.len()).sum()
    }

    /// 역직렬화한 저장소의 일관성을 검증하고 용량을 적용합니다.
    ///
    /// 용량보다 많이 추적 중이면 오래된 것부터 축출합니다.
    pub fn restore(mut self, capacity: usize) -> Result<Self, String> {
        self.capacity = capacity.max(1);

        if self.order.len() != self.entries.len() {
            return Err(format!(
                "order has {} paths but entries has {}",
                self.order.len(),
                self.entries.len()
            ));
        }

        let mut seen = HashSet::with_capacity(self.order.len());
        for path in &self.order {
            if !seen.insert(path) {
                return Err(format!("duplicate path in order: {}", path.display()));
            }
            match self.entries.get(path) {
                Some(cursor) if cursor.path == *path => {}
                Some(_) => return Err(format!("cursor path mismatch for {}", path.display())),
                None => return Err(format!("missing entry for {}", path.display())),
            }
        }

        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use earnwatch_core::event::{EarningsEvent, Timestamp};
    use std::time::Duration;

    fn event(ts: &str) -> Event {
        EarningsEvent {
            timestamp: Timestamp::parse(ts).unwrap(),
            earnings: 1.0,
            container_id: "c".to_owned(),
        }
        .into()
    }

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn new_store_is_empty() {
        let store = CursorStore::new(3);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 3);
        assert_eq!(store.all_cached_events().count(), 0);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        assert_eq!(CursorStore::new(0).capacity(), 1);
    }

    #[test]
    fn untracked_file_needs_rescan() {
        let store = CursorStore::new(3);
        assert!(store.needs_rescan(Path::new("a.txt"), Some(at(10))));
    }

    #[test]
    fn unchanged_file_is_skipped() {
        let mut store = CursorStore::new(3);
        store.update(Path::new("a.txt"), 4, at(10), vec![]);
        assert!(!store.needs_rescan(Path::new("a.txt"), Some(at(10))));
        assert!(!store.needs_rescan(Path::new("a.txt"), Some(at(5))));
        assert!(store.needs_rescan(Path::new("a.txt"), Some(at(11))));
    }

    #[test]
    fn unknown_mtime_is_treated_as_unchanged() {
        let mut store = CursorStore::new(3);
        store.update(Path::new("a.txt"), 1, at(10), vec![]);
        assert!(!store.needs_rescan(Path::new("a.txt"), None));
        assert!(!store.needs_rescan(Path::new("b.txt"), None));
    }

    #[test]
    fn update_appends_events_and_advances_offset() {
        let mut store = CursorStore::new(3);
        let path = Path::new("a.txt");
        store.update(path, 2, at(10), vec![event("2024-01-01 00:00:00.000 +00:00")]);
        store.update(path, 5, at(20), vec![event("2024-01-01 00:00:01.000 +00:00")]);

        let cursor = store.get(path).unwrap();
        assert_eq!(cursor.last_line_offset, 5);
        assert_eq!(cursor.last_modified, Some(at(20)));
        assert_eq!(cursor.events.len(), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn touch_evicts_oldest_tracked_path() {
        let mut store = CursorStore::new(2);
        assert_eq!(store.touch(Path::new("a")), None);
        assert_eq!(store.touch(Path::new("b")), None);
        // 재접근은 순서를 바꾸지 않는다
        assert_eq!(store.touch(Path::new("a")), None);
        assert_eq!(store.touch(Path::new("c")), Some(PathBuf::from("a")));

        assert_eq!(store.len(), 2);
        assert!(store.get(Path::new("a")).is_none());
        let paths: Vec<_> = store.paths().collect();
        assert_eq!(paths, vec![Path::new("b"), Path::new("c")]);
    }

    #[test]
    fn make_room_never_evicts_kept_paths() {
        let mut store = CursorStore::new(2);
        store.update(Path::new("b"), 1, at(1), vec![event("2024-01-01 00:00:00.000 +00:00")]);
        store.update(Path::new("c"), 1, at(2), vec![]);

        // b는 가장 오래 추적됐지만 이번 사이클 대상이므로 c가 대신 나간다
        let evicted = store.make_room(&[Path::new("b"), Path::new("a")]);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].path, PathBuf::from("c"));

        assert_eq!(store.touch(Path::new("a")), None);
        assert_eq!(store.get(Path::new("b")).map(|c| c.events.len()), Some(1));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn make_room_is_noop_when_everything_fits() {
        let mut store = CursorStore::new(3);
        store.update(Path::new("a"), 1, at(1), vec![]);
        assert!(store.make_room(&[Path::new("a"), Path::new("b")]).is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn all_cached_events_follow_tracking_order() {
        let mut store = CursorStore::new(3);
        store.update(Path::new("b"), 1, at(1), vec![event("2024-01-01 00:00:05.000 +00:00")]);
        store.update(Path::new("a"), 1, at(1), vec![event("2024-01-01 00:00:01.000 +00:00")]);

        let stamps: Vec<String> = store
            .all_cached_events()
            .map(|e| e.timestamp().to_string())
            .collect();
        assert_eq!(
            stamps,
            vec![
                "2024-01-01 00:00:05.000 +00:00",
                "2024-01-01 00:00:01.000 +00:00"
            ]
        );
        assert_eq!(store.event_count(), 2);
    }

    #[test]
    fn restore_rejects_inconsistent_order() {
        let mut store = CursorStore::new(3);
        store.update(Path::new("a"), 1, at(1), vec![]);
        store.order.push_back(PathBuf::from("ghost"));
        assert!(store.restore(3).is_err());
    }

    #[test]
    fn restore_clamps_to_capacity() {
        let mut store = CursorStore::new(5);
        for name in ["a", "b", "c", "d"] {
            store.update(Path::new(name), 1, at(1), vec![]);
        }
        let restored = store.restore(2).unwrap();
        assert_eq!(restored.len(), 2);
        let paths: Vec<_> = restored.paths().collect();
        assert_eq!(paths, vec![Path::new("c"), Path::new("d")]);
    }

    #[test]
    fn json_roundtrip_preserves_cursors() {
        let mut store = CursorStore::new(3);
        store.update(
            Path::new("/logs/a.txt"),
            3,
            at(42),
            vec![event("2024-01-01 00:00:00.000 -05:00")],
        );
        let json = serde_json::to_string(&store).unwrap();
        let loaded: CursorStore = serde_json::from_str(&json).unwrap();
        let loaded = loaded.restore(3).unwrap();
        assert_eq!(loaded, store);
    }
}
