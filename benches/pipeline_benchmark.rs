use chrono::{Duration, NaiveDate, NaiveDateTime};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use prc_op::aggregate::{aggregate, sort_by_account};
use prc_op::filter::drop_duplicates;
use prc_op::prelude::*;
use std::hint::black_box;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 20)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

// Roughly three service lines per account, spread over a month so the
// window filter has work to do
fn synthetic_export(rows: usize) -> Vec<ClaimRecord> {
    let first_day = NaiveDate::from_ymd_opt(2024, 5, 25).unwrap();
    (0..rows)
        .map(|i| {
            let date = first_day + Duration::days((i % 30) as i64);
            let mut record = ClaimRecord::from_pairs([
                (Column::FileId, "F1"),
                (Column::FirstName, "PAT"),
                (Column::LastName, "DOE"),
                (Column::PhysicianName, "DR SMITH"),
                (Column::PhysicianNpi, "1234567890.0"),
                (Column::AdmitSource, "7.0"),
            ]);
            record.set(Column::AccountCode, Some((i / 3).to_string()));
            record.set(Column::CptCodes, Some(format!("{}", 99200 + i % 20)));
            record.set(
                Column::DischargeServiceDate,
                Some(date.format("%m/%d/%Y").to_string()),
            );
            record.set(Column::Mrn, Some(format!("{}.0", 100_000 + i / 3)));
            record
        })
        .collect()
}

fn benchmark_transform(c: &mut Criterion) {
    let pipeline = Pipeline::new(PipelineConfig::default());
    let mut group = c.benchmark_group("transform");
    group.sample_size(20);

    for size in [1_000usize, 10_000, 50_000] {
        let records = synthetic_export(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| {
                let (claims, _) = pipeline.transform(black_box(records.clone()), now());
                black_box(claims)
            })
        });
    }
    group.finish();
}

fn benchmark_stages(c: &mut Criterion) {
    let records = synthetic_export(10_000);

    c.bench_function("drop_duplicates_10k", |b| {
        b.iter(|| drop_duplicates(black_box(records.clone())))
    });

    c.bench_function("sort_and_aggregate_10k", |b| {
        b.iter(|| {
            let (sorted, _) = sort_by_account(black_box(records.clone()));
            aggregate(sorted)
        })
    });
}

criterion_group!(benches, benchmark_transform, benchmark_stages);
criterion_main!(benches);
