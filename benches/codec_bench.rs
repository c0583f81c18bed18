//! Performance benchmarks for the reader-service codec.
//!
//! Run with:
//! ```sh
//! cargo bench --bench codec_bench
//! ```

use bytes::BytesMut;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tokio_util::codec::{Decoder, Encoder};
use uuid::Uuid;

use gymgate_core::{MemberId, TemplateData, TenantId};
use gymgate_protocol::{Command, Event, ReaderCodec, ServiceCodec};

fn ping_command() -> Command {
    Command::Ping
}

/// A verify command with a realistically sized template payload.
fn verify_command() -> Command {
    Command::VerifyFingerprint {
        tenant_id: TenantId::new("gym-001").unwrap(),
        template: TemplateData::new(&"QUFB".repeat(128)).unwrap(),
        request_id: Uuid::new_v4(),
    }
}

fn verified_event() -> Event {
    Event::FingerprintVerified {
        member_id: MemberId::new("M-1042").unwrap(),
        member_name: Some("Ada Lovelace".to_string()),
        confidence: 0.92,
        request_id: Some(Uuid::new_v4()),
    }
}

/// Pre-encode one event frame using the service side of the codec.
fn encoded_event_frame() -> bytes::Bytes {
    let mut codec = ServiceCodec::new();
    let mut buffer = BytesMut::new();
    codec.encode(verified_event(), &mut buffer).unwrap();
    buffer.freeze()
}

fn bench_encode_commands(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_command");
    group.throughput(Throughput::Elements(1));

    for (name, cmd) in [("ping", ping_command()), ("verify", verify_command())] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut codec = ReaderCodec::new();
                let mut buffer = BytesMut::new();
                codec.encode(black_box(cmd.clone()), &mut buffer).unwrap();
                black_box(buffer);
            });
        });
    }

    group.finish();
}

fn bench_decode_event(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_event");
    group.throughput(Throughput::Elements(1));

    let frame = encoded_event_frame();

    group.bench_function("fingerprint_verified", |b| {
        b.iter(|| {
            let mut codec = ReaderCodec::new();
            let mut buffer = BytesMut::from(&frame[..]);
            let result = codec.decode(&mut buffer).unwrap();
            black_box(result);
        });
    });

    group.finish();
}

fn bench_decode_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_batch");

    for batch_size in [10, 100, 1000] {
        group.throughput(Throughput::Elements(batch_size as u64));

        let mut encoder = ServiceCodec::new();
        let mut encoded = BytesMut::new();
        for _ in 0..batch_size {
            encoder.encode(verified_event(), &mut encoded).unwrap();
        }
        let encoded = encoded.freeze();

        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            &batch_size,
            |b, _| {
                b.iter(|| {
                    let mut codec = ReaderCodec::new();
                    let mut buffer = BytesMut::from(&encoded[..]);
                    let mut count = 0;

                    while let Ok(Some(_)) = codec.decode(&mut buffer) {
                        count += 1;
                    }

                    black_box(count);
                });
            },
        );
    }

    group.finish();
}

/// Frames arriving in small chunks, as over a real TCP stream.
fn bench_decode_partial_streaming(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_partial_streaming");
    group.throughput(Throughput::Elements(1));

    let frame = encoded_event_frame();

    for chunk_size in [8, 16, 32] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("chunk_{chunk_size}_bytes")),
            &chunk_size,
            |b, &size| {
                b.iter(|| {
                    let mut codec = ReaderCodec::new();
                    let mut buffer = BytesMut::new();
                    let mut result = None;

                    for chunk in frame.chunks(size) {
                        buffer.extend_from_slice(chunk);
                        if let Ok(Some(event)) = codec.decode(&mut buffer) {
                            result = Some(event);
                            break;
                        }
                    }

                    black_box(result);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_encode_commands,
    bench_decode_event,
    bench_decode_batch,
    bench_decode_partial_streaming,
);

criterion_main!(benches);
