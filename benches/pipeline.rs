// benches/pipeline.rs
use criterion::{criterion_group, criterion_main, Criterion, black_box};

use g2b_collect::{
    collect::{dedup, drop_private_negotiated},
    file::render_csv,
    model::{Category, SourceKind},
    normalize::{normalize_all, RawRecord},
};

const METHODS: [&str; 4] = ["일반경쟁입찰", "제한경쟁입찰", "수의계약", "지명경쟁입찰"];

/// API-shaped rows; every fourth id repeats an earlier one.
fn synthetic(n: usize) -> Vec<RawRecord> {
    (0..n)
        .map(|i| {
            let id = if i % 4 == 3 { i - 3 } else { i };
            RawRecord::with_fields(
                SourceKind::PublicApi,
                Category::ALL[i % Category::ALL.len()],
                g2b_collect::fields! {
                    "bidNtceNo" => format!("R25BK{id:06}"),
                    "bidNtceOrd" => "000",
                    "bidNtceNm" => format!("[{i}] 정보시스템 유지관리 용역"),
                    "ntceInsttNm" => format!("기관 {}", i % 37),
                    "cntrctCnclsMthdNm" => METHODS[i % METHODS.len()],
                    "bidNtceDt" => format!("2025-07-{:02} 09:00:00", 1 + i % 7),
                    "bidClseDt" => "2025/07/15 18:00 (2025/07/16 10:00)",
                    "presmptPrc" => "150000000",
                },
            )
        })
        .collect()
}

fn bench_pipeline(c: &mut Criterion) {
    let raws = synthetic(5_000);

    c.bench_function("normalize_5k", |b| {
        b.iter(|| {
            let mut rejected = 0;
            let recs = normalize_all(black_box(&raws), &mut rejected);
            black_box(recs.len())
        })
    });

    let mut rejected = 0;
    let records = normalize_all(&raws, &mut rejected);

    c.bench_function("dedup_filter_5k", |b| {
        b.iter(|| {
            let (unique, _) = dedup(black_box(records.clone()));
            let (kept, _) = drop_private_negotiated(unique);
            black_box(kept.len())
        })
    });

    c.bench_function("render_csv_5k", |b| {
        b.iter(|| black_box(render_csv(black_box(&records)).len()))
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
