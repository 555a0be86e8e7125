//! 추출기 벤치마크
//!
//! 네 가지 레코드 패턴이 섞인 로그 텍스트의 추출 처리량과
//! 커서 오프셋 기준 suffix 계산 비용을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use earnwatch_ingest::extract::{Extractor, unread_suffix};
use earnwatch_ingest::selector::FileClass;

const EARNINGS: &str =
    "2024-01-15 12:00:00.123 -05:00 [INF] Predicted Earnings Report: 0.0125 from (container-7f3a)\n";
const WALLET: &str =
    "2024-01-15 12:00:01.456 -05:00 [INF] Wallet: Current(12.3456), Predicted(-0.0021)\n";
const BANDWIDTH: &str = "2024-01-15 12:00:02.789 -05:00 [INF] {\"Interface\":\"eth0\",\"BidirThroughput\":7000000,\"Tx\":3500000,\"Rx\":3500000}\n";
const FAILURE: &str = "2024-01-15 12:00:03.000 -05:00 [WRN] Node Compatibility Workload Failure rig-01 NodeCompatibilityMessage {\n  GPU driver version is below the required minimum\n}\n";
const NOISE: &str = "2024-01-15 12:00:04.000 -05:00 [DBG] Heartbeat acknowledged by upstream service\n";

fn mixed_log(records: usize) -> String {
    let lines = [EARNINGS, WALLET, BANDWIDTH, FAILURE, NOISE];
    (0..records).map(|i| lines[i % lines.len()]).collect()
}

fn bench_extract(c: &mut Criterion) {
    let extractor = Extractor::with_defaults(250_000.0 * 30.0).unwrap();

    let mut group = c.benchmark_group("extract");

    for records in [100usize, 1_000, 10_000] {
        let text = mixed_log(records);
        group.throughput(Throughput::Bytes(text.len() as u64));

        group.bench_with_input(BenchmarkId::new("general", records), &text, |b, text| {
            b.iter(|| extractor.extract(black_box(text), FileClass::General))
        });

        group.bench_with_input(BenchmarkId::new("bandwidth", records), &text, |b, text| {
            b.iter(|| extractor.extract(black_box(text), FileClass::Bandwidth))
        });
    }

    group.finish();
}

fn bench_unread_suffix(c: &mut Criterion) {
    let text = mixed_log(10_000);

    let mut group = c.benchmark_group("unread_suffix");
    for offset in [0usize, 5_000, 11_000] {
        group.bench_with_input(BenchmarkId::from_parameter(offset), &offset, |b, &offset| {
            b.iter(|| unread_suffix(black_box(&text), offset))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_extract, bench_unread_suffix);
criterion_main!(benches);
