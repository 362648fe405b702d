//! End-to-end lifecycle tests: catalog registration, appends across chunk
//! boundaries, dictionary compression and chained scans.

use std::sync::Arc;

use data_types::{ElementType, Value};
use query::{Operator, ScanType, TableScan, TableWrapper};
use storage::{Catalog, Segment, Table};
use test_helpers::{
    assert_tables_row_equivalent, column_values, maybe_start_logging, table_rows,
};

fn orders_table(target_chunk_size: u32) -> Arc<Table> {
    let table = Arc::new(Table::new(target_chunk_size));
    table.add_column("quantity", ElementType::Int).unwrap();
    table.add_column("price", ElementType::Double).unwrap();
    table.add_column("item", ElementType::String).unwrap();

    let rows = &[
        (3, 1.5, "bolt"),
        (1, 12.0, "gear"),
        (7, 1.5, "bolt"),
        (2, 80.25, "motor"),
        (7, 12.0, "gear"),
        (4, 1.5, "bolt"),
        (9, 80.25, "motor"),
    ];
    for &(quantity, price, item) in rows {
        table
            .append(vec![
                Value::Int(quantity),
                Value::Double(price),
                Value::from(item),
            ])
            .unwrap();
    }
    table
}

fn scan(input: Arc<dyn Operator>, column_id: u16, scan_type: ScanType, value: Value) -> Arc<TableScan> {
    let scan = Arc::new(TableScan::new(input, column_id, scan_type, value));
    scan.execute().unwrap();
    scan
}

#[test]
fn lifecycle_from_catalog_to_chained_scan() {
    maybe_start_logging();

    let catalog = Catalog::new();
    let table = orders_table(3);
    catalog.add_table("orders", Arc::clone(&table)).unwrap();

    // Seal and compress everything but the tail.
    for chunk_id in 0..table.chunk_count() - 1 {
        table.compress_chunk(chunk_id).unwrap();
    }

    let input = catalog.table("orders").unwrap();
    assert_eq!(input.row_count(), 7);

    let wrapper: Arc<dyn Operator> = Arc::new(TableWrapper::new(input));
    wrapper.execute().unwrap();

    let item_column = table.column_id_by_name("item").unwrap();
    let by_item = scan(wrapper, item_column, ScanType::Equals, Value::from("bolt"));
    assert_eq!(
        column_values(&by_item.get_output(), 0),
        vec![Value::Int(3), Value::Int(7), Value::Int(4)]
    );

    let quantity_column = table.column_id_by_name("quantity").unwrap();
    let by_quantity = scan(
        by_item as Arc<dyn Operator>,
        quantity_column,
        ScanType::GreaterThan,
        Value::Int(3),
    );

    let result = by_quantity.get_output();
    assert_eq!(
        table_rows(&result),
        vec![
            vec![Value::Int(7), Value::Double(1.5), Value::from("bolt")],
            vec![Value::Int(4), Value::Double(1.5), Value::from("bolt")],
        ]
    );

    // The chained result still references the registered base table.
    match result.chunk(0).segment(0) {
        Segment::Reference(segment) => {
            assert!(Arc::ptr_eq(segment.referenced_table(), &table));
        }
        other => panic!("expected a reference segment, got {:?}", other),
    };
}

#[test]
fn compression_does_not_change_scan_results() {
    maybe_start_logging();

    let plain = orders_table(2);
    let compressed = orders_table(2);
    for chunk_id in 0..compressed.chunk_count() {
        compressed.compress_chunk(chunk_id).unwrap();
    }

    let price_column = plain.column_id_by_name("price").unwrap();
    for &(scan_type, price) in &[
        (ScanType::Equals, 12.0),
        (ScanType::NotEquals, 12.0),
        (ScanType::LessThanEquals, 12.0),
        (ScanType::GreaterThan, 1.5),
    ] {
        let left: Arc<dyn Operator> = Arc::new(TableWrapper::new(Arc::clone(&plain)));
        left.execute().unwrap();
        let right: Arc<dyn Operator> = Arc::new(TableWrapper::new(Arc::clone(&compressed)));
        right.execute().unwrap();

        let left_scan = scan(left, price_column, scan_type, Value::Double(price));
        let right_scan = scan(right, price_column, scan_type, Value::Double(price));
        assert_tables_row_equivalent(&left_scan.get_output(), &right_scan.get_output());
    }
}

#[test]
fn dropping_the_catalog_entry_keeps_scan_results_alive() {
    let catalog = Catalog::new();
    let table = orders_table(0);
    catalog.add_table("orders", Arc::clone(&table)).unwrap();

    let wrapper: Arc<dyn Operator> = Arc::new(TableWrapper::new(Arc::clone(&table)));
    wrapper.execute().unwrap();
    let result = scan(
        wrapper,
        0,
        ScanType::GreaterThanEquals,
        Value::Int(7),
    )
    .get_output();

    catalog.drop_table("orders").unwrap();
    drop(table);

    // The reference segments keep the base table alive.
    assert_eq!(
        column_values(&result, 2),
        vec![Value::from("bolt"), Value::from("gear"), Value::from("motor")]
    );
}
