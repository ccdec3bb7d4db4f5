use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tinyhttp::request::{classify, parse_request_line};

fn simple_request_parse_benchmark(c: &mut Criterion) {
    let request = b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n";

    c.bench_function("simple_request_parse", |b| {
        b.iter(|| parse_request_line(black_box(request), 0));
    });
}

fn browser_request_parse_benchmark(c: &mut Criterion) {
    let request = b"GET /index.htm HTTP/1.1\r\n\
                    Host: localhost\r\n\
                    User-Agent: Mozilla/5.0 (Windows NT 10.0; Win64; x64)\r\n\
                    Accept: text/html,application/xhtml+xml\r\n\
                    Accept-Language: en-US,en;q=0.9\r\n\
                    Accept-Encoding: gzip, deflate, br\r\n\
                    Connection: keep-alive\r\n\
                    \r\n";

    c.bench_function("browser_request_parse", |b| {
        b.iter(|| parse_request_line(black_box(request), 0));
    });
}

fn classify_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    for path in ["/", "/execute/date", "/server_stop.htm", "/page.htm"] {
        group.bench_with_input(BenchmarkId::from_parameter(path), path, |b, path| {
            b.iter(|| classify(black_box(path)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    simple_request_parse_benchmark,
    browser_request_parse_benchmark,
    classify_benchmark
);
criterion_main!(benches);
