//! Benchmarks for decoding raw wire messages.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use txn_inspector::builder::{CapturedExchange, CapturedRequest, CapturedResponse};
use txn_inspector::decoder::{decode_message, hex_dump};
use txn_inspector::store::process_transaction;
use txn_inspector::FormatOptions;

/// Generate `len` bytes cycling through every byte value.
fn generate_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 256) as u8).collect()
}

/// Benchmark hex dumps of varying sizes.
fn bench_hex_dump_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("hex_dump_scaling");
    for size_kb in [1, 16, 256, 1024].iter() {
        let bytes = generate_bytes(size_kb * 1024);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}kb", size_kb)),
            size_kb,
            |b, _| b.iter(|| hex_dump(black_box(&bytes))),
        );
    }
    group.finish();
}

/// Benchmark decoding a binary response message.
fn bench_decode_message(c: &mut Criterion) {
    let response = CapturedResponse::new(200, "OK")
        .header("Content-Type", "application/octet-stream")
        .body(generate_bytes(64 * 1024))
        .to_message();

    c.bench_function("decode_message_64kb_binary", |b| {
        b.iter(|| {
            let mut message = response.clone();
            decode_message(black_box(&mut message))
        })
    });
}

/// Benchmark processing a whole transaction.
fn bench_process_transaction(c: &mut Criterion) {
    let body: String = (0..2000)
        .map(|i| format!(r#"{{"id":{},"ok":true}}"#, i))
        .collect::<Vec<_>>()
        .join(",");
    let record = CapturedExchange::new(
        CapturedRequest::new("GET", "/items?limit=2000").header("Accept", "application/json"),
        CapturedResponse::new(200, "OK")
            .header("Content-Type", "application/json")
            .body(format!("[{}]", body)),
    )
    .to_record_with_id("bench");
    let options = FormatOptions::default();

    c.bench_function("process_transaction_json", |b| {
        b.iter(|| process_transaction(black_box(&record), &options))
    });
}

criterion_group!(
    benches,
    bench_hex_dump_scaling,
    bench_decode_message,
    bench_process_transaction
);
criterion_main!(benches);
