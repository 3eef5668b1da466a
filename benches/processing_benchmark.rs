use chrono::NaiveDate;
use comfy_days::config::ComfortThresholds;
use comfy_days::models::{DayRecord, StationMeta, MONTHS};
use comfy_days::processors::{shard_of, ComfortClassifier, CompletenessChecker};
use comfy_days::spool::{compact_json, JsonLayout};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// Daily records for a station observed over `years` years
fn create_station_days(years: i32) -> Vec<DayRecord> {
    let mut records = Vec::with_capacity(years as usize * 365);
    for year in 1950..1950 + years {
        for info in MONTHS.iter() {
            for day in 1..=info.num_days {
                let seasonal = ((info.number as i32 - 7).abs()) * 25;
                let tmax = 320 - seasonal + (year % 7) * 5;
                records.push(DayRecord::new(year, info.number, day, Some(tmax), Some(tmax - 120)));
            }
        }
    }
    records
}

fn meta() -> StationMeta {
    StationMeta {
        id: "USC00449215".to_string(),
        name: "WISE 1 SE, VA US".to_string(),
        latitude: Some(36.9725),
        longitude: Some(-82.5579),
        elevation_m: Some(781.5),
        state_code: "VA".to_string(),
        start_date: NaiveDate::from_ymd_opt(1950, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2019, 12, 31).unwrap(),
        has_temperature_data: true,
        has_complete_temperature_year: true,
    }
}

fn benchmark_classification(c: &mut Criterion) {
    let classifier = ComfortClassifier::new(ComfortThresholds::default());
    let mut group = c.benchmark_group("classify_days");

    for years in [1, 10, 70] {
        let records = create_station_days(years);
        group.bench_with_input(BenchmarkId::from_parameter(years), &records, |b, records| {
            b.iter(|| classifier.classify_days(black_box(records)))
        });
    }
    group.finish();
}

fn benchmark_summarize(c: &mut Criterion) {
    let classifier = ComfortClassifier::new(ComfortThresholds::default());
    let days = classifier.classify_days(&create_station_days(70));

    c.bench_function("summarize_70_years", |b| {
        b.iter(|| classifier.summarize(meta(), black_box(&days)))
    });
}

fn benchmark_completeness(c: &mut Criterion) {
    let checker = CompletenessChecker::new();
    let records = create_station_days(70);

    c.bench_function("completeness_check", |b| {
        b.iter(|| checker.check(black_box(&records)))
    });
}

fn benchmark_spool_encoding(c: &mut Criterion) {
    let classifier = ComfortClassifier::new(ComfortThresholds::default());
    let year = classifier.summarize(meta(), &classifier.classify_days(&create_station_days(70)));

    c.bench_function("compact_json_year", |b| {
        b.iter(|| compact_json(black_box(&year), JsonLayout::default()))
    });
}

fn benchmark_sharding(c: &mut Criterion) {
    let filenames: Vec<String> = (0..1000).map(|n| format!("USC{:08}.csv", n)).collect();

    c.bench_function("shard_of_1000", |b| {
        b.iter(|| {
            for filename in &filenames {
                black_box(shard_of(filename));
            }
        })
    });
}

criterion_group!(
    benches,
    benchmark_classification,
    benchmark_summarize,
    benchmark_completeness,
    benchmark_spool_encoding,
    benchmark_sharding
);
criterion_main!(benches);
