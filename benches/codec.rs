use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use sbdmsg::{FieldSelection, SettingsRecord, decode_mt, encode_mo};

fn tracking_record() -> SettingsRecord {
    let mut r = SettingsRecord::default();
    r.battv = 412;
    r.lat = 515_074_000;
    r.lon = -1_278_000;
    r.alt = 42_000;
    r.sats = 11;
    r
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let record = tracking_record();

    // Default tracking selection (DATETIME, LAT, LON, ALT)
    let default_selection = record.mo_fields;
    let default_len = encode_mo(&record, default_selection).unwrap().len();
    group.throughput(Throughput::Bytes(default_len as u64));
    group.bench_function("encode_default", |b| {
        b.iter(|| {
            black_box(encode_mo(&record, default_selection).unwrap());
        });
    });

    // Every selectable field
    let full_selection = FieldSelection::from_words([u32::MAX, u32::MAX, u32::MAX]);
    let full_len = encode_mo(&record, full_selection).unwrap().len();
    group.throughput(Throughput::Bytes(full_len as u64));
    group.bench_function("encode_full", |b| {
        b.iter(|| {
            black_box(encode_mo(&record, full_selection).unwrap());
        });
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let record = tracking_record();

    let default_frame = encode_mo(&record, record.mo_fields).unwrap();
    group.throughput(Throughput::Bytes(default_frame.len() as u64));
    group.bench_function("decode_default", |b| {
        b.iter(|| {
            let mut target = SettingsRecord::default();
            black_box(decode_mt(&default_frame, &mut target).unwrap());
        });
    });

    let full_frame = encode_mo(
        &record,
        FieldSelection::from_words([u32::MAX, u32::MAX, u32::MAX]),
    )
    .unwrap();
    group.throughput(Throughput::Bytes(full_frame.len() as u64));
    group.bench_function("decode_full", |b| {
        b.iter(|| {
            let mut target = SettingsRecord::default();
            black_box(decode_mt(&full_frame, &mut target).unwrap());
        });
    });

    group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let record = tracking_record();
    let selection = record.mo_fields;

    group.bench_function("roundtrip_default", |b| {
        b.iter(|| {
            let frame = encode_mo(&record, selection).unwrap();
            let mut target = SettingsRecord::default();
            decode_mt(&frame, &mut target).unwrap();
            black_box(target);
        });
    });

    group.finish();
}

fn bench_settings_image(c: &mut Criterion) {
    let mut group = c.benchmark_group("settings_image");
    let record = tracking_record();
    let image = record.to_byte_image();
    group.throughput(Throughput::Bytes(image.len() as u64));

    group.bench_function("to_image", |b| {
        b.iter(|| {
            black_box(record.to_byte_image());
        });
    });

    group.bench_function("from_image", |b| {
        b.iter(|| {
            black_box(SettingsRecord::from_byte_image(&image).unwrap());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_roundtrip,
    bench_settings_image
);
criterion_main!(benches);
