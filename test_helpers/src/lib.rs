//! Helpers shared by tests across the chunkdb crates: result-table
//! materialisation, row-equivalence assertions and logging setup.
//!
//! Row equivalence compares `{int, long}` and `{float, double}` as
//! equivalence classes, so a result table survives re-encoding of its input
//! without the assertions caring about the physical widths.

#![deny(rustdoc::broken_intra_doc_links, rust_2018_idioms)]
#![warn(missing_debug_implementations, clippy::explicit_iter_loop)]

use data_types::{ColumnId, Value};
use storage::Table;

/// Starts a terminal logger for tests when `RUST_LOG` is set. Safe to call
/// from every test; only the first call installs the subscriber.
pub fn maybe_start_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = observability_deps::tracing_subscriber::fmt()
            .with_env_filter(
                observability_deps::tracing_subscriber::EnvFilter::from_default_env(),
            )
            .try_init();
    }
}

/// Materialises one column of a table, across all chunks, in row order.
pub fn column_values(table: &Table, column_id: ColumnId) -> Vec<Value> {
    let mut values = Vec::with_capacity(table.row_count() as usize);
    for chunk_id in 0..table.chunk_count() {
        let chunk = table.chunk(chunk_id);
        let segment = chunk.segment(usize::from(column_id));
        for offset in 0..segment.len() {
            values.push(segment.value_at(offset));
        }
    }
    values
}

/// Materialises every row of a table, across all chunks, in row order.
pub fn table_rows(table: &Table) -> Vec<Vec<Value>> {
    let column_count = table.column_count();
    let mut rows = Vec::with_capacity(table.row_count() as usize);
    for chunk_id in 0..table.chunk_count() {
        let chunk = table.chunk(chunk_id);
        for offset in 0..chunk.len() {
            let row = (0..column_count)
                .map(|column| chunk.segment(usize::from(column)).value_at(offset))
                .collect();
            rows.push(row);
        }
    }
    rows
}

/// Widens a value to the canonical member of its comparison class.
pub fn normalized(value: Value) -> Value {
    match value {
        Value::Int(v) => Value::Long(i64::from(v)),
        Value::Float(v) => Value::Double(f64::from(v)),
        other => other,
    }
}

fn row_key(row: &[Value]) -> String {
    let parts: Vec<String> = row
        .iter()
        .map(|value| format!("{:?}", normalized(value.clone())))
        .collect();
    parts.join("|")
}

fn assert_schemas_equivalent(left: &Table, right: &Table) {
    assert_eq!(left.column_names(), right.column_names(), "column names");
    let left_types = left.column_types();
    let right_types = right.column_types();
    assert_eq!(left_types.len(), right_types.len(), "column counts");
    for (l, r) in left_types.iter().zip(&right_types) {
        assert!(
            l.is_equivalent_to(*r),
            "column types {} and {} are not equivalent",
            l,
            r
        );
    }
}

/// Asserts that two tables have equivalent schemas and the same rows in the
/// same order.
pub fn assert_tables_value_equal(left: &Table, right: &Table) {
    assert_schemas_equivalent(left, right);
    let left_rows: Vec<String> = table_rows(left).iter().map(|r| row_key(r)).collect();
    let right_rows: Vec<String> = table_rows(right).iter().map(|r| row_key(r)).collect();
    assert_eq!(left_rows, right_rows, "row values");
}

/// Asserts that two tables have equivalent schemas and the same multiset of
/// rows, ignoring order.
pub fn assert_tables_row_equivalent(left: &Table, right: &Table) {
    assert_schemas_equivalent(left, right);
    let mut left_rows: Vec<String> = table_rows(left).iter().map(|r| row_key(r)).collect();
    let mut right_rows: Vec<String> = table_rows(right).iter().map(|r| row_key(r)).collect();
    left_rows.sort();
    right_rows.sort();
    assert_eq!(left_rows, right_rows, "row multisets");
}
