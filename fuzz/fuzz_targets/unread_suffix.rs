#![no_main]

use arbitrary::Arbitrary;
use earnwatch_ingest::extract::{count_lines, unread_suffix};
use libfuzzer_sys::fuzz_target;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    content: String,
    /// 커서 오프셋 (줄 단위)
    offset: u16,
}

fuzz_target!(|input: FuzzInput| {
    let (suffix, lines) = unread_suffix(&input.content, input.offset as usize);

    // 완전한 줄만 소비
    assert!(suffix.is_empty() || suffix.ends_with('\n'));
    assert_eq!(lines, count_lines(suffix));
    assert!(input.content.contains(suffix));
    if lines > 0 {
        assert!(input.offset as usize + lines <= count_lines(&input.content));
    }
});
