use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rflink_rs::radio::codec::{self, PropertyGroup};

fn benchmark_set_property(c: &mut Criterion) {
    let values = [
        0xCC, 0xA1, 0x30, 0xA0, 0x21, 0xD1, 0xB9, 0xC9, 0xEA, 0x05, 0x12, 0x11,
    ];

    c.bench_function("set_property", |b| {
        b.iter(|| {
            let command = codec::set_property(
                black_box(PropertyGroup::ModemChflt),
                black_box(0x00),
                black_box(&values),
            );
            black_box(command)
        })
    });
}

fn benchmark_start_tx(c: &mut Criterion) {
    c.bench_function("start_tx", |b| {
        b.iter(|| black_box(codec::start_tx(black_box(0), black_box(0x30), black_box(0), 0, 0)))
    });
}

criterion_group!(benches, benchmark_set_property, benchmark_start_tx);
criterion_main!(benches);
