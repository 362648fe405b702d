//! This module implements the `demo` CLI command: it builds a table through
//! the catalog, compresses the sealed chunks, runs a chained pair of scans
//! and prints table summaries.

use std::sync::Arc;

use structopt::StructOpt;
use thiserror::Error;

use data_types::{ElementType, Value};
use query::{Operator, ScanType, TableScan, TableWrapper};
use storage::{catalog, Table};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Error building demo table: {0}")]
    Storage(#[from] storage::table::Error),

    #[error("Error registering demo table: {0}")]
    Catalog(#[from] storage::catalog::Error),

    #[error("Error running scan: {0}")]
    Query(#[from] query::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Run the built-in demo workload
#[derive(Debug, StructOpt)]
pub struct Config {
    /// Number of rows to append to the demo table
    #[structopt(long, default_value = "1000")]
    rows: u32,

    /// Target chunk capacity; 0 keeps everything in one unbounded chunk
    #[structopt(long, default_value = "100")]
    chunk_size: u32,
}

const BUCKETS: &[&str] = &["red", "green", "blue"];

pub fn command(config: Config) -> Result<()> {
    let table = Arc::new(Table::new(config.chunk_size));
    table.add_column("id", ElementType::Int)?;
    table.add_column("bucket", ElementType::String)?;

    for i in 0..config.rows as i32 {
        let bucket = BUCKETS[(i as usize) % BUCKETS.len()];
        table.append(vec![Value::Int(i), Value::from(bucket)])?;
    }

    // Every chunk but the tail is sealed and can be dictionary-compressed.
    for chunk_id in 0..table.chunk_count().saturating_sub(1) {
        table.compress_chunk(chunk_id)?;
    }

    catalog().add_table("demo", Arc::clone(&table))?;
    println!("{}", table.summary("demo"));

    let input: Arc<dyn Operator> = Arc::new(TableWrapper::new(Arc::clone(&table)));
    input.execute()?;

    let bucket_scan = Arc::new(TableScan::new(
        input,
        table.column_id_by_name("bucket")?,
        ScanType::Equals,
        Value::from("red"),
    ));
    bucket_scan.execute()?;
    println!(
        "{}",
        bucket_scan.get_output().summary("demo where bucket = red")
    );

    let threshold = (config.rows / 2) as i32;
    let id_scan = TableScan::new(
        bucket_scan as Arc<dyn Operator>,
        table.column_id_by_name("id")?,
        ScanType::GreaterThanEquals,
        Value::Int(threshold),
    );
    id_scan.execute()?;
    println!(
        "{}",
        id_scan.get_output().summary(format!(
            "demo where bucket = red and id >= {}",
            threshold
        ))
    );

    Ok(())
}
