//! Performance benchmarks for the publication engine.
//!
//! This suite measures:
//! - Composing the sickness rates breakdowns over a month of records
//! - A full publication run across every family
//! - A family build through the HTTP API
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use absence_rates::api::{AppState, PublicationRequest, create_router};
use absence_rates::calculation::compose;
use absence_rates::config::ConfigLoader;
use absence_rates::families::sickness_rates::breakdowns_plan;
use absence_rates::models::{AbsenceRecord, OrgReference};
use absence_rates::pipeline::{InMemorySource, run_publication};

use axum::{body::Body, http::Request};
use tower::ServiceExt;

const REGIONS: [(&str, &str); 4] = [
    ("Y56", "London"),
    ("Y58", "South West"),
    ("Y60", "Midlands"),
    ("Y63", "North East and Yorkshire"),
];

const STAFF: [(&str, &str, &str); 4] = [
    ("Professionally qualified clinical staff", "HCHS Doctors", "010"),
    ("Nurses & health visitors", "Nurses & health visitors", "N0A"),
    ("Support to clinical staff", "Support to doctors, nurses & midwives", "H1A"),
    ("Unknown", "Unknown", "ZZZ"),
];

const REASONS: [&str; 3] = [
    "S10 Anxiety/stress/depression/other psychiatric illnesses",
    "S11 Back Problems",
    "S25 Gastrointestinal problems",
];

/// Creates `count` records spread over regions, organisations, staff groups
/// and reasons.
fn create_records(count: usize) -> Vec<AbsenceRecord> {
    (0..count)
        .map(|i| {
            let (region_code, region_name) = REGIONS[i % REGIONS.len()];
            let (main, minor, occupation) = STAFF[i % STAFF.len()];
            let medical = minor == "HCHS Doctors";
            let org = i % 40;
            AbsenceRecord {
                fte_days_lost: Some(Decimal::new((i % 97) as i64, 1)),
                fte_days_available: Some(Decimal::new(200 + (i % 300) as i64, 0)),
                region_code: Some(region_code.to_string()),
                region_name: Some(region_name.to_string()),
                org_code: Some(format!("R{:02}", org)),
                org_name: Some(format!("R{:02} Trust", org)),
                cluster_group: Some(if org % 2 == 0 { "Acute" } else { "Mental Health" }.to_string()),
                main_staff_group: Some(main.to_string()),
                minor_staff_group: Some(minor.to_string()),
                grade: medical.then(|| if i % 3 == 0 { "Consultant" } else { "Specialty Doctor" }.to_string()),
                breed: Some(if medical { "Med" } else { "Non-Med" }.to_string()),
                occupation_code: Some(occupation.to_string()),
                attendance_reason: Some(REASONS[i % REASONS.len()].to_string()),
                related_reason: (i % 11 == 0).then(|| "Coronavirus (COVID-19)".to_string()),
                period: Some("2024-03-31".to_string()),
            }
        })
        .collect()
}

fn create_references() -> Vec<OrgReference> {
    (0..40)
        .map(|org| OrgReference {
            org_code: format!("R{:02}", org),
            org_name: format!("R{:02} NHS Trust", org),
            region_code: Some(REGIONS[org % REGIONS.len()].0.to_string()),
            region_name: Some(REGIONS[org % REGIONS.len()].1.to_string()),
            cluster_group: Some("Acute".to_string()),
            benchmark_group: Some("Acute - Medium".to_string()),
        })
        .collect()
}

/// Benchmark: sickness rates breakdowns at increasing record counts.
fn bench_compose_breakdowns(c: &mut Criterion) {
    let plan = breakdowns_plan();
    let mut group = c.benchmark_group("compose_breakdowns");

    for record_count in [1_000, 10_000, 100_000].iter() {
        let records = create_records(*record_count);

        group.throughput(Throughput::Elements(*record_count as u64));
        group.bench_with_input(
            BenchmarkId::new("records", record_count),
            &records,
            |b, records| b.iter(|| black_box(compose(&plan, records).unwrap())),
        );
    }

    group.finish();
}

/// Benchmark: every family over one shared record set.
fn bench_full_run(c: &mut Criterion) {
    let loader = ConfigLoader::load("./config").expect("Failed to load config");
    let source = InMemorySource::new(create_records(10_000), create_references());

    c.bench_function("full_run_10000_records", |b| {
        b.iter(|| black_box(run_publication(loader.config(), &source).unwrap()))
    });
}

/// Benchmark: one family build through the router.
fn bench_api_family(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let config = ConfigLoader::load("./config").expect("Failed to load config");
    let router = create_router(AppState::new(config));

    let request = PublicationRequest {
        records: create_records(1_000),
        latest_orgs: create_references(),
        publication_date: None,
    };
    let body = serde_json::to_string(&request).unwrap();

    c.bench_function("api_benchmarking_1000_records", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/publications/benchmarking")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(
    benches,
    bench_compose_breakdowns,
    bench_full_run,
    bench_api_family,
);
criterion_main!(benches);
