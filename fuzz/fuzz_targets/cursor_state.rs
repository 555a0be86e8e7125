#![no_main]

use earnwatch_ingest::CursorStore;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // 손상된 상태 파일은 에러로 거부되어야 하며 패닉하면 안 됨
    let Ok(store) = serde_json::from_slice::<CursorStore>(data) else {
        return;
    };
    if let Ok(store) = store.restore(4) {
        assert!(store.len() <= store.capacity());
        assert_eq!(store.all_cached_events().count(), store.event_count());
    }
});
