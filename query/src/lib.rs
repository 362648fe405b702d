//! The operator layer of chunkdb: lazy computation nodes over tables and the
//! predicate-driven table scan.

#![deny(rustdoc::broken_intra_doc_links, rust_2018_idioms)]
#![warn(
    missing_debug_implementations,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr
)]

use snafu::Snafu;

pub mod operator;
pub mod table_scan;

pub use operator::{Operator, TableWrapper};
pub use table_scan::{ScanType, TableScan};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("table scan failed: {}", source))]
    TableScanFailed { source: table_scan::Error },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
