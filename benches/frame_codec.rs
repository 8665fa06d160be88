//! Frame codec benchmark suite.
//!
//! Benchmarks frame encoding/decoding and request round trips over an
//! in-memory stream at different payload sizes.
//!
//! Run with: cargo bench --bench frame_codec
//! Results saved to: target/criterion/

use std::hint::black_box;

use cast_control::transport::{decode_frame, encode_frame};
use cast_control::{Connection, ConnectionOptions, Envelope, FrameCodec, namespace};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::{Value, json};
use tokio::runtime::Runtime;

// ============================================================================
// Benchmark Parameters
// ============================================================================

const PAYLOAD_SIZES: &[usize] = &[64, 1024, 16 * 1024];

fn envelope() -> Envelope {
    Envelope::new("sender-0", "receiver-0", namespace::RECEIVER)
}

fn payload(size: usize) -> Vec<u8> {
    format!(r#"{{"type":"GET_STATUS","pad":"{}"}}"#, "x".repeat(size)).into_bytes()
}

// ============================================================================
// Benchmark: Encode / Decode
// ============================================================================

fn bench_encode_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    let env = envelope();

    for &size in PAYLOAD_SIZES {
        let body = payload(size);
        let frame = encode_frame(&env, &body).expect("encode");
        group.throughput(Throughput::Bytes(frame.len() as u64));

        group.bench_with_input(BenchmarkId::new("encode", size), &body, |b, body| {
            b.iter(|| encode_frame(black_box(&env), black_box(body)).expect("encode"));
        });

        group.bench_with_input(BenchmarkId::new("decode", size), &frame, |b, frame| {
            b.iter(|| decode_frame(black_box(frame)).expect("decode"));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Request Round Trip
// ============================================================================

/// Spawns an echo receiver on the far side of an in-memory stream.
fn echo_connection() -> Connection {
    let (local, remote) = tokio::io::duplex(256 * 1024);
    let codec = FrameCodec::new(remote, 1024 * 1024);

    tokio::spawn(async move {
        while let Ok((env, payload)) = codec.receive().await {
            let request: Value = serde_json::from_slice(&payload).expect("json");
            let reply = json!({ "requestId": request["requestId"], "status": {} });
            let bytes = serde_json::to_vec(&reply).expect("serialize");
            if codec.send(&env.reply(), &bytes).await.is_err() {
                break;
            }
        }
    });

    Connection::new(local, ConnectionOptions::default()).expect("connection")
}

fn bench_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let connection = rt.block_on(async { echo_connection() });
    let env = envelope();

    let mut group = c.benchmark_group("request");
    group.bench_function("round_trip", |b| {
        b.to_async(&rt).iter(|| async {
            let pending = connection
                .request(&env, &json!({ "type": "GET_STATUS" }))
                .await
                .expect("request");
            black_box(pending.wait().await.expect("reply"))
        });
    });
    group.finish();
}

criterion_group!(benches, bench_encode_decode, bench_round_trip);
criterion_main!(benches);
