#![no_main]

use earnwatch_ingest::{Extractor, FileClass};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(extractor) = Extractor::with_defaults(250_000.0 * 30.0) else {
        return;
    };
    let text = String::from_utf8_lossy(data);

    for class in [FileClass::General, FileClass::Bandwidth] {
        let extraction = extractor.extract(&text, class);
        // 모든 이벤트는 입력의 서로 다른 구간에서 나옴
        assert!(extraction.events.len() <= text.len());
    }
});
