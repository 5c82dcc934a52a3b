//! Stream decoding benchmark: framing and accumulation throughput.
//!
//! Target: decoding must stay far below one presentation frame per chunk.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use grommel::stream::decode_reader;
use grommel::{DeltaDecoder, DeltaQueue, LineFramer};
use std::io::Cursor;

/// A realistic streamed body of `records` one-word fragments.
fn ndjson_body(records: usize) -> Vec<u8> {
    let mut body = String::new();
    for i in 0..records {
        body.push_str(&format!(
            "{{\"model\":\"llama3:8b\",\"created_at\":\"2024-05-01T12:00:00Z\",\"response\":\"word{} \",\"done\":false}}\n",
            i % 97
        ));
    }
    body.push_str("{\"model\":\"llama3:8b\",\"response\":\"\",\"done\":true}\n");
    body.into_bytes()
}

fn framer_chunk_sizes(c: &mut Criterion) {
    let body = ndjson_body(500);
    let mut group = c.benchmark_group("framer_push");
    group.throughput(Throughput::Bytes(body.len() as u64));

    for chunk in [7usize, 64, 2048] {
        group.bench_with_input(BenchmarkId::from_parameter(chunk), &chunk, |b, &chunk| {
            b.iter(|| {
                let mut framer = LineFramer::new();
                let mut lines = 0;
                for piece in body.chunks(chunk) {
                    lines += framer.push(black_box(piece)).len();
                }
                lines
            });
        });
    }

    group.finish();
}

fn decoder_feed(c: &mut Criterion) {
    let body = ndjson_body(500);
    let text = String::from_utf8_lossy(&body).into_owned();
    let lines: Vec<&str> = text.lines().collect();

    c.bench_function("decoder_feed_500_records", |b| {
        b.iter(|| {
            let mut decoder = DeltaDecoder::new();
            let mut calls = 0usize;
            let mut on_delta = |_: &str| calls += 1;
            for line in &lines {
                if !decoder.feed_line(black_box(line), &mut on_delta) {
                    break;
                }
            }
            calls
        });
    });
}

fn decode_into_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_reader_to_queue");

    for records in [50usize, 500, 5000] {
        let body = ndjson_body(records);
        group.throughput(Throughput::Elements(records as u64));
        group.bench_with_input(BenchmarkId::from_parameter(records), &body, |b, body| {
            let queue = DeltaQueue::new();
            let producer = queue.producer();
            b.iter(|| {
                let mut on_delta = |snapshot: &str| {
                    producer.push(snapshot);
                };
                let (text, _) = decode_reader(Cursor::new(body.as_slice()), &mut on_delta);
                black_box(queue.drain_latest());
                text.len()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, framer_chunk_sizes, decoder_feed, decode_into_queue);
criterion_main!(benches);
