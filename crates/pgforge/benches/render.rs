use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pgforge::expr::{and, col, eq, val};
use pgforge::{Dialect, Select};

/// Build a SELECT with `n` fields and `n` AND-ed conditions:
/// SELECT "t"."col0", ... FROM "t" "t" WHERE "t"."col0" = ? AND ...
fn build_select(n: usize) -> Select {
    Select::new()
        .from("t", "t")
        .unwrap()
        .fields((0..n).map(|i| (format!("col{i}"), col(format!("t.col{i}")))))
        .unwrap()
        .filter(and(
            (0..n)
                .map(|i| eq(col(format!("t.col{i}")), val(i as i64)))
                .collect(),
        ))
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/select");
    let dialect = Dialect::default();

    for n in [1, 5, 10, 50, 100] {
        let query = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &query, |b, query| {
            b.iter(|| black_box(query.render(&dialect)));
        });
    }

    group.finish();
}

fn bench_build_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/build_and_render");
    let dialect = Dialect::default();

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let query = build_select(n);
                black_box(query.render(&dialect));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render, bench_build_and_render);
criterion_main!(benches);
