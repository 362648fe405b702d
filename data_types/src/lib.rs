//! This crate contains the data types that are shared between the chunkdb
//! storage layer and its operators: the element-type tags, the typed value
//! union used at API boundaries, and the row identifier types.

#![deny(rustdoc::broken_intra_doc_links, rust_2018_idioms)]
#![warn(
    missing_debug_implementations,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr
)]

pub mod element_type;
pub mod row_id;
pub mod value;

pub use element_type::ElementType;
pub use row_id::{ChunkId, ChunkOffset, ColumnId, PositionList, RowId};
pub use value::{type_cast, NativeType, Value};
