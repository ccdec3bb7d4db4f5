use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use std::net::Ipv4Addr;
use tinyhttp::{AddressAllowlist, AddressMaskEntry};

fn allowlist_of(size: u32) -> AddressAllowlist {
    let entries = (0..size)
        .map(|i| {
            AddressMaskEntry::new(
                Ipv4Addr::from(0x0A00_0000 | (i << 8)),
                Ipv4Addr::new(255, 255, 255, 0),
            )
        })
        .collect();
    AddressAllowlist::new(entries)
}

fn is_allowed_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_allowed");

    for size in [1u32, 16, 256, 4096] {
        let list = allowlist_of(size);
        // 最坏情况：没有任何记录匹配
        let candidate = Ipv4Addr::new(192, 168, 1, 1);
        group.bench_with_input(BenchmarkId::new("miss", size), &list, |b, list| {
            b.iter(|| list.is_allowed(black_box(candidate)));
        });
        let last = Ipv4Addr::from(0x0A00_0001 | ((size - 1) << 8));
        group.bench_with_input(BenchmarkId::new("last_entry", size), &list, |b, list| {
            b.iter(|| list.is_allowed(black_box(last)));
        });
    }

    group.finish();
}

fn parse_benchmark(c: &mut Criterion) {
    let text: String = (0..1024u32)
        .map(|i| format!("10.{}.{}.0 255.255.255.0\n", i / 256, i % 256))
        .collect();

    c.bench_function("allowlist_from_lines_1024", |b| {
        b.iter(|| AddressAllowlist::from_lines(black_box(&text)));
    });
}

criterion_group!(benches, is_allowed_benchmark, parse_benchmark);
criterion_main!(benches);
