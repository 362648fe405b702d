use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use data_types::{ElementType, Value};
use query::{Operator, ScanType, TableScan, TableWrapper};
use storage::Table;

fn build_table(rows: i32, compress: bool) -> Arc<Table> {
    let table = Arc::new(Table::new(1024));
    table.add_column("n", ElementType::Int).unwrap();
    for i in 0..rows {
        table.append(vec![Value::Int(i % 97)]).unwrap();
    }
    if compress {
        for chunk_id in 0..table.chunk_count() {
            table.compress_chunk(chunk_id).unwrap();
        }
    }
    table
}

#[inline]
fn run_scan(table: &Arc<Table>) -> u64 {
    let input: Arc<dyn Operator> = Arc::new(TableWrapper::new(Arc::clone(table)));
    input.execute().unwrap();
    let scan = TableScan::new(input, 0, ScanType::GreaterThan, Value::Int(48));
    scan.execute().unwrap();
    scan.get_output().row_count()
}

pub fn scan_encodings(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_scan");
    for &rows in &[1_024i32, 16_384, 131_072] {
        let plain = build_table(rows, false);
        let compressed = build_table(rows, true);
        group.bench_function(BenchmarkId::new("value", rows), |b| {
            b.iter(|| run_scan(&plain))
        });
        group.bench_function(BenchmarkId::new("dictionary", rows), |b| {
            b.iter(|| run_scan(&compressed))
        });
    }
    group.finish();
}

criterion_group!(benches, scan_encodings);
criterion_main!(benches);
