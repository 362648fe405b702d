use std::fmt;

/// Index of a chunk within a table.
pub type ChunkId = u32;

/// Offset of a row within a chunk.
pub type ChunkOffset = u32;

/// Index of a column within a table schema.
pub type ColumnId = u16;

/// The canonical reference to a logical row within a table.
///
/// The derived ordering is lexicographic over `(chunk_id, chunk_offset)`,
/// which is the order scans emit positions in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId {
    pub chunk_id: ChunkId,
    pub chunk_offset: ChunkOffset,
}

impl RowId {
    pub fn new(chunk_id: ChunkId, chunk_offset: ChunkOffset) -> Self {
        Self {
            chunk_id,
            chunk_offset,
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.chunk_id, self.chunk_offset)
    }
}

/// An ordered sequence of row identifiers.
///
/// A scan produces one of these, then publishes it read-only behind an `Arc`
/// to every reference segment of its result table. Once published it is never
/// mutated.
pub type PositionList = Vec<RowId>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_chunk_major() {
        let mut rows = vec![
            RowId::new(1, 0),
            RowId::new(0, 7),
            RowId::new(0, 2),
            RowId::new(1, 3),
        ];
        rows.sort();
        assert_eq!(
            rows,
            vec![
                RowId::new(0, 2),
                RowId::new(0, 7),
                RowId::new(1, 0),
                RowId::new(1, 3),
            ]
        );
    }
}
