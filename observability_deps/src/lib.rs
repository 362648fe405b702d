//! Re-exports of the observability ecosystem used across chunkdb crates, so
//! that all crates share one pinned version of each.

#![deny(rustdoc::broken_intra_doc_links, rust_2018_idioms)]

pub use tracing;
pub use tracing_subscriber;
