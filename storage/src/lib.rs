//! In-memory, chunk-oriented columnar storage.
//!
//! A [`table::Table`] is horizontally partitioned into fixed-capacity
//! [`chunk::Chunk`]s, each carrying one [`segment::Segment`] per column. A
//! segment is one of three physical encodings: an append-only value segment,
//! an immutable dictionary-encoded segment with a bit-width-fitted attribute
//! vector, or a reference segment projecting a position list over another
//! table.

#![deny(rustdoc::broken_intra_doc_links, rust_2018_idioms)]
#![warn(
    missing_debug_implementations,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr
)]

pub mod attribute_vector;
pub mod catalog;
pub mod chunk;
pub mod dictionary;
pub mod reference;
pub mod segment;
pub mod table;

pub use attribute_vector::{AttributeVector, INVALID_ID};
pub use catalog::{catalog, Catalog};
pub use chunk::Chunk;
pub use dictionary::DictionarySegment;
pub use reference::ReferenceSegment;
pub use segment::{Segment, SegmentType, ValueSegment};
pub use table::{Table, TableSummary};
