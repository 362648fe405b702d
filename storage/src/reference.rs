//! Reference segments: column segments that project a shared position list
//! over a base table instead of owning values.

use std::mem;
use std::sync::Arc;

use data_types::{ColumnId, ElementType, PositionList, RowId, Value};

use crate::table::Table;

/// A column segment that resolves indexed reads through a position list into
/// another table's column.
///
/// The referenced table is always a base table, never itself a table of
/// reference segments; the scan enforces this by unwrapping one level of
/// indirection when its input is a reference-segment table.
#[derive(Debug, Clone)]
pub struct ReferenceSegment {
    table: Arc<Table>,
    column_id: ColumnId,
    positions: Arc<PositionList>,
}

impl ReferenceSegment {
    pub fn new(table: Arc<Table>, column_id: ColumnId, positions: Arc<PositionList>) -> Self {
        Self {
            table,
            column_id,
            positions,
        }
    }

    pub fn referenced_table(&self) -> &Arc<Table> {
        &self.table
    }

    pub fn referenced_column(&self) -> ColumnId {
        self.column_id
    }

    /// The shared position list. Published read-only; never mutated.
    pub fn pos_list(&self) -> &Arc<PositionList> {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn element_type(&self) -> ElementType {
        self.table.column_type(self.column_id)
    }

    /// Resolves the element at `offset` through the position list.
    ///
    /// # Panics
    ///
    /// If `offset >= len()`.
    pub fn value_at(&self, offset: usize) -> Value {
        let row = self.positions[offset];
        let chunk = self.table.chunk(row.chunk_id);
        chunk
            .segment(usize::from(self.column_id))
            .value_at(row.chunk_offset as usize)
    }

    /// Approximate memory size of the segment's own payload; the referenced
    /// table and the position list are shared, so only the handle overhead
    /// counts here.
    pub fn size_bytes(&self) -> usize {
        mem::size_of::<Self>() + mem::size_of::<RowId>()
    }
}
