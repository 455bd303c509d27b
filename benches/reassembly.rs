//! Benchmarks for frame reassembly
//!
//! Measures per-frame cost of feeding packets through the reassembler:
//! - VGA depth frames (614 KB, 16-bit swap on completion)
//! - 1080p color frames at full packet size
//! - Reset cost after a full-size frame (dirty-prefix clearing)
//!
//! Platform: Cross-platform (synthetic datagrams, CI-safe)

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use depthlink::protocol::{METADATA_LEN, PACKET_PAYLOAD_CAPACITY, PacketHeader};
use depthlink::test_utils::{packetize, test_pattern};
use depthlink::{FrameReassembler, StreamKind};
use std::hint::black_box;

fn parsed(frame_len: usize) -> Vec<(PacketHeader, Vec<u8>)> {
    packetize(&test_pattern(frame_len), PACKET_PAYLOAD_CAPACITY, 1)
        .into_iter()
        .map(|datagram| (PacketHeader::parse(&datagram).expect("valid header"), datagram))
        .collect()
}

fn bench_full_frame(c: &mut Criterion) {
    let cases = [
        ("depth_640x480", StreamKind::Depth, 640 * 480 * 2),
        ("color_1920x1080", StreamKind::Color, 1920 * 1080 * 2),
    ];

    let mut group = c.benchmark_group("reassemble_frame");
    for (name, kind, payload_len) in cases {
        let packets = parsed(METADATA_LEN + payload_len);
        let mut reassembler = FrameReassembler::new();

        group.throughput(Throughput::Bytes(payload_len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &packets, |b, packets| {
            b.iter(|| {
                for (header, datagram) in packets {
                    reassembler.process(header, black_box(datagram), kind);
                }
                let size = reassembler.frame_data_size();
                reassembler.reset();
                black_box(size)
            })
        });
    }
    group.finish();
}

fn bench_header_parse(c: &mut Criterion) {
    let datagram = packetize(&test_pattern(PACKET_PAYLOAD_CAPACITY), PACKET_PAYLOAD_CAPACITY, 7)
        .remove(0);

    c.bench_function("header_parse", |b| {
        b.iter(|| black_box(PacketHeader::parse(black_box(&datagram))))
    });
}

criterion_group!(benches, bench_full_frame, bench_header_parse);
criterion_main!(benches);
