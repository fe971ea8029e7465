//! Criterion benchmarks for blueprint and query compilation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use table_migrations::prelude::*;

// ============================================================================
// Blueprint Benchmarks
// ============================================================================

fn wide_table(columns: usize) -> Blueprint {
    let mut table = Blueprint::new("wide");
    table.create();
    table.increments("id");
    for i in 0..columns {
        match i % 4 {
            0 => table.string(format!("name_{}", i), 120).nullable(),
            1 => table.big_integer(format!("count_{}", i), false, true).default(0),
            2 => table.decimal(format!("amount_{}", i), 8, 2),
            _ => table.timestamp(format!("at_{}", i)).use_current(),
        };
    }
    table
}

fn bench_create_table(c: &mut Criterion) {
    let grammar = MySqlGrammar::new("wp_");
    let mut group = c.benchmark_group("create_table");

    for columns in [4usize, 32, 128] {
        group.throughput(Throughput::Elements(columns as u64));
        group.bench_with_input(BenchmarkId::from_parameter(columns), &columns, |b, &columns| {
            b.iter(|| {
                let mut table = wide_table(columns);
                black_box(table.to_sql(&grammar).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_alter_table(c: &mut Criterion) {
    let grammar = MySqlGrammar::new("wp_");

    c.bench_function("alter_table_mixed", |b| {
        b.iter(|| {
            let mut table = Blueprint::new("posts");
            table.string("slug", 120).unique();
            table.text("body").nullable().change();
            table.drop_column(&["legacy"]);
            table
                .foreign(&["author_id"], None)
                .references(&["id"])
                .on("users")
                .on_delete("cascade");
            black_box(table.to_sql(&grammar).unwrap())
        });
    });
}

// ============================================================================
// Query Benchmarks
// ============================================================================

fn bench_find_query(c: &mut Criterion) {
    let grammar = MySqlGrammar::new("wp_");
    let mut group = c.benchmark_group("find_query");

    for clauses in [1usize, 8, 32] {
        group.bench_with_input(BenchmarkId::from_parameter(clauses), &clauses, |b, &clauses| {
            b.iter(|| {
                let mut query = Query::new("posts").find();
                for i in 0..clauses {
                    query = query.where_eq(format!("field_{}", i), black_box("value"));
                }
                black_box(query.limit(5).to_sql(&grammar).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_insert_query(c: &mut Criterion) {
    let grammar = MySqlGrammar::new("wp_");
    let data: Attributes = (0..16)
        .map(|i| (format!("column_{}", i), format!("it's {}", i)))
        .collect();

    c.bench_function("insert_16_columns", |b| {
        b.iter(|| {
            let query = Query::new("posts").insert(black_box(data.clone()));
            black_box(query.to_sql(&grammar).unwrap())
        });
    });
}

criterion_group!(
    benches,
    bench_create_table,
    bench_alter_table,
    bench_find_query,
    bench_insert_query
);
criterion_main!(benches);
