use rand::Rng;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use gt3x::activity::{decode_packed, decode_plain, Sample};
use gt3x::Parser;

const RATE: usize = 100;

fn random_payload(len: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen()).collect()
}

// `seconds` of 100Hz plain activity records starting at the epoch.
fn random_log(seconds: u32) -> Vec<u8> {
    let mut dat = vec![0x1E, 0x15, 0, 0, 0, 0, 8, 0, 1, 0, 12, 0, 0, 0, 0, 0, 0];
    for sec in 0..seconds {
        let payload = random_payload(RATE * 6);
        dat.extend_from_slice(&[0x1E, 0x1A]);
        dat.extend_from_slice(&sec.to_le_bytes());
        dat.extend_from_slice(&u16::try_from(payload.len()).unwrap().to_le_bytes());
        dat.extend_from_slice(&payload);
        dat.push(0);
    }
    dat
}

fn bench_decode_packed(c: &mut Criterion) {
    let payload = random_payload(RATE * 9 / 2);

    let mut group = c.benchmark_group("activity");
    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("packed", |b| {
        b.iter(|| {
            let _: Vec<Sample> = decode_packed(&payload, RATE).collect();
        });
    });
    let payload = random_payload(RATE * 6);
    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("plain", |b| {
        b.iter(|| {
            let _: Vec<Sample> = decode_plain(&payload, RATE).collect();
        });
    });
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let dat = random_log(3600);
    let parser = Parser::builder()
        .max_samples(3600 * RATE)
        .scale_factor(256.0)
        .sample_rate(RATE as u32)
        .build();

    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(dat.len() as u64));
    group.sample_size(10);
    group.bench_function("hour", |b| {
        b.iter(|| {
            let activity = parser.parse_reader(&dat[..]).unwrap();
            assert_eq!(activity.len(), 3600 * RATE);
        });
    });
    group.finish();
}

criterion_group!(benches, bench_decode_packed, bench_parse);
criterion_main!(benches);
