//! Tables: a column schema over an ordered sequence of chunks.

use std::fmt;
use std::mem;

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use snafu::{ensure, OptionExt, ResultExt, Snafu};

use data_types::{ChunkId, ColumnId, ElementType, Value};
use observability_deps::tracing::{debug, info};

use crate::chunk::{self, Chunk};
use crate::segment::{Segment, ValueSegment};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display(
        "cannot add column '{}' to a table that already has {} rows",
        name,
        row_count
    ))]
    NonEmptyAddColumn { name: String, row_count: u64 },

    #[snafu(display("no column named '{}'", name))]
    UnknownColumn { name: String },

    #[snafu(display("a column named '{}' already exists", name))]
    DuplicateColumn { name: String },

    #[snafu(display("error appending row to chunk {}: {}", chunk_id, source))]
    ChunkAppend {
        chunk_id: ChunkId,
        source: chunk::Error,
    },

    #[snafu(display("error compressing chunk {}: {}", chunk_id, source))]
    ChunkCompression {
        chunk_id: ChunkId,
        source: chunk::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Default)]
struct TableInner {
    column_names: Vec<String>,
    column_types: Vec<ElementType>,
    chunks: Vec<Chunk>,
}

impl TableInner {
    fn row_count(&self) -> u64 {
        self.chunks.iter().map(|chunk| chunk.len() as u64).sum()
    }

    fn tail(&self) -> &Chunk {
        self.chunks.last().expect("tables always have a tail chunk")
    }

    fn chunk_from_schema(&self) -> Chunk {
        let mut chunk = Chunk::new();
        for element_type in &self.column_types {
            chunk.add_segment(Segment::Value(ValueSegment::new(*element_type)));
        }
        chunk
    }

    fn define_column(&mut self, name: String, element_type: ElementType) -> Result<()> {
        ensure!(
            !self.column_names.contains(&name),
            DuplicateColumn { name }
        );
        self.column_names.push(name);
        self.column_types.push(element_type);
        Ok(())
    }
}

/// A horizontally chunked columnar table.
///
/// The mutable state sits behind a lock so tables can be shared as
/// `Arc<Table>` (the catalog, reference segments and operators all hold
/// shared handles). The engine itself is single-threaded: mutation never
/// overlaps an in-flight read per the published-table contract, so readers
/// acquire the lock uncontended.
#[derive(Debug)]
pub struct Table {
    target_chunk_size: u32,
    inner: RwLock<TableInner>,
}

impl Table {
    /// Creates an empty table with one initial chunk and the given target
    /// chunk capacity. A capacity of 0 means unbounded (a single chunk).
    pub fn new(target_chunk_size: u32) -> Self {
        let inner = TableInner {
            chunks: vec![Chunk::new()],
            ..Default::default()
        };
        Self {
            target_chunk_size,
            inner: RwLock::new(inner),
        }
    }

    /// Appends a column to the schema only, leaving existing chunks without
    /// the matching segment.
    ///
    /// The table is not valid for row appends until the chunks are brought
    /// back in line (the arity check at the chunk boundary catches attempts).
    /// This staged-construction path is how operators assemble result tables.
    pub fn add_column_definition(
        &self,
        name: impl Into<String>,
        element_type: ElementType,
    ) -> Result<()> {
        self.inner.write().define_column(name.into(), element_type)
    }

    /// Appends a column to the schema and a fresh value segment to every
    /// existing chunk. Only valid while the table has no rows.
    pub fn add_column(&self, name: impl Into<String>, element_type: ElementType) -> Result<()> {
        let name = name.into();
        let mut inner = self.inner.write();

        let row_count = inner.row_count();
        ensure!(row_count == 0, NonEmptyAddColumn { name, row_count });

        inner.define_column(name, element_type)?;
        for chunk in &mut inner.chunks {
            chunk.add_segment(Segment::Value(ValueSegment::new(element_type)));
        }
        Ok(())
    }

    /// Appends a row, cutting a new tail chunk first when the current tail
    /// has reached the target capacity.
    pub fn append(&self, row: Vec<Value>) -> Result<()> {
        let mut inner = self.inner.write();

        if self.target_chunk_size > 0 && inner.tail().len() >= self.target_chunk_size as usize {
            let chunk = inner.chunk_from_schema();
            inner.chunks.push(chunk);
            debug!(chunk_id = inner.chunks.len() - 1, "cut new tail chunk");
        }

        let chunk_id = (inner.chunks.len() - 1) as ChunkId;
        inner
            .chunks
            .last_mut()
            .expect("tables always have a tail chunk")
            .append(row)
            .context(ChunkAppend { chunk_id })
    }

    /// Converts every segment of the chunk to dictionary encoding, in place.
    ///
    /// The chunk accepts no further appends afterwards; the tail chunk
    /// should not be compressed while appends are still expected.
    ///
    /// # Panics
    ///
    /// If `chunk_id` is out of range.
    pub fn compress_chunk(&self, chunk_id: ChunkId) -> Result<()> {
        let mut inner = self.inner.write();
        let chunk = &mut inner.chunks[chunk_id as usize];
        chunk
            .compress()
            .context(ChunkCompression { chunk_id })?;
        info!(chunk_id, rows = chunk.len(), "compressed chunk");
        Ok(())
    }

    /// Installs a fully built chunk: replaces the initial empty chunk if the
    /// table has no rows yet, otherwise appends.
    pub fn emplace_chunk(&self, chunk: Chunk) {
        let mut inner = self.inner.write();
        debug_assert_eq!(chunk.segment_count(), inner.column_names.len());
        if inner.chunks.len() == 1 && inner.chunks[0].len() == 0 {
            inner.chunks[0] = chunk;
        } else {
            inner.chunks.push(chunk);
        }
    }

    pub fn column_id_by_name(&self, name: &str) -> Result<ColumnId> {
        let inner = self.inner.read();
        inner
            .column_names
            .iter()
            .position(|n| n == name)
            .map(|position| position as ColumnId)
            .context(UnknownColumn { name })
    }

    /// # Panics
    ///
    /// If `column_id` is out of range.
    pub fn column_name(&self, column_id: ColumnId) -> String {
        self.inner.read().column_names[usize::from(column_id)].clone()
    }

    /// # Panics
    ///
    /// If `column_id` is out of range.
    pub fn column_type(&self, column_id: ColumnId) -> ElementType {
        self.inner.read().column_types[usize::from(column_id)]
    }

    pub fn column_names(&self) -> Vec<String> {
        self.inner.read().column_names.clone()
    }

    pub fn column_types(&self) -> Vec<ElementType> {
        self.inner.read().column_types.clone()
    }

    pub fn column_count(&self) -> ColumnId {
        self.inner.read().column_names.len() as ColumnId
    }

    pub fn chunk_count(&self) -> ChunkId {
        self.inner.read().chunks.len() as ChunkId
    }

    /// Read access to a chunk.
    ///
    /// # Panics
    ///
    /// If `chunk_id` is out of range.
    pub fn chunk(&self, chunk_id: ChunkId) -> MappedRwLockReadGuard<'_, Chunk> {
        RwLockReadGuard::map(self.inner.read(), |inner| {
            &inner.chunks[chunk_id as usize]
        })
    }

    /// Total row count, summed over the actual chunk sizes.
    pub fn row_count(&self) -> u64 {
        self.inner.read().row_count()
    }

    pub fn target_chunk_size(&self) -> u32 {
        self.target_chunk_size
    }

    /// Approximate memory size of all chunks.
    pub fn size_bytes(&self) -> usize {
        let inner = self.inner.read();
        mem::size_of::<Self>()
            + inner.chunks.iter().map(Chunk::size_bytes).sum::<usize>()
    }

    pub fn summary(&self, name: impl Into<String>) -> TableSummary {
        let inner = self.inner.read();
        TableSummary {
            name: name.into(),
            column_count: inner.column_names.len() as ColumnId,
            row_count: inner.row_count(),
            chunk_count: inner.chunks.len() as ChunkId,
            size_bytes: mem::size_of::<Self>()
                + inner.chunks.iter().map(Chunk::size_bytes).sum::<usize>(),
        }
    }
}

/// Printable per-table summary, the driver's reporting surface.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub name: String,
    pub column_count: ColumnId,
    pub row_count: u64,
    pub chunk_count: ChunkId,
    pub size_bytes: usize,
}

impl fmt::Display for TableSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} columns, {} rows, {} chunks, ~{} bytes",
            self.name, self.column_count, self.row_count, self.chunk_count, self.size_bytes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_table(target_chunk_size: u32) -> Table {
        let table = Table::new(target_chunk_size);
        table.add_column("a", ElementType::Int).unwrap();
        table
    }

    #[test]
    fn append_grows_the_tail_and_cuts_chunks_at_capacity() {
        let table = int_table(2);
        for v in 0..5 {
            table.append(vec![Value::Int(v)]).unwrap();
        }

        assert_eq!(table.chunk_count(), 3);
        assert_eq!(table.row_count(), 5);
        assert_eq!(table.chunk(0).len(), 2);
        assert_eq!(table.chunk(1).len(), 2);
        assert_eq!(table.chunk(2).len(), 1);
    }

    #[test]
    fn unbounded_capacity_keeps_a_single_chunk() {
        let table = int_table(0);
        for v in 0..100 {
            table.append(vec![Value::Int(v)]).unwrap();
        }
        assert_eq!(table.chunk_count(), 1);
        assert_eq!(table.row_count(), 100);
    }

    #[test]
    fn row_count_increases_by_one_per_append() {
        let table = int_table(3);
        for v in 0..7 {
            assert_eq!(table.row_count(), v as u64);
            table.append(vec![Value::Int(v)]).unwrap();
        }
        assert_eq!(table.row_count(), 7);
    }

    #[test]
    fn add_column_rejects_non_empty_tables() {
        let table = int_table(2);
        table.append(vec![Value::Int(1)]).unwrap();

        let err = table.add_column("b", ElementType::String).unwrap_err();
        assert!(matches!(err, Error::NonEmptyAddColumn { .. }));
    }

    #[test]
    fn add_column_extends_every_chunk_while_empty() {
        let table = int_table(2);
        table.add_column("b", ElementType::Double).unwrap();
        table
            .append(vec![Value::Int(1), Value::Double(0.5)])
            .unwrap();

        assert_eq!(table.column_count(), 2);
        assert_eq!(table.chunk(0).segment_count(), 2);
    }

    #[test]
    fn duplicate_column_names_are_rejected() {
        let table = int_table(2);
        let err = table.add_column("a", ElementType::Int).unwrap_err();
        assert!(matches!(err, Error::DuplicateColumn { .. }));
    }

    #[test]
    fn column_lookup_by_name() {
        let table = int_table(2);
        table.add_column("b", ElementType::String).unwrap();

        assert_eq!(table.column_id_by_name("a").unwrap(), 0);
        assert_eq!(table.column_id_by_name("b").unwrap(), 1);
        assert_eq!(table.column_type(1), ElementType::String);
        assert_eq!(table.column_name(0), "a");

        let err = table.column_id_by_name("missing").unwrap_err();
        assert!(matches!(err, Error::UnknownColumn { .. }));
    }

    #[test]
    fn column_definition_without_segments_blocks_appends() {
        let table = int_table(2);
        table.append(vec![Value::Int(1)]).unwrap();
        table
            .add_column_definition("b", ElementType::Int)
            .unwrap();

        // The tail chunk still has one segment; the arity check at the chunk
        // boundary rejects the two-value row.
        let err = table
            .append(vec![Value::Int(2), Value::Int(3)])
            .unwrap_err();
        assert!(matches!(err, Error::ChunkAppend { .. }));
    }

    #[test]
    fn compress_chunk_converts_and_seals() {
        let table = int_table(3);
        for v in &[5, 5, 2, 2, 7] {
            table.append(vec![Value::Int(*v)]).unwrap();
        }

        table.compress_chunk(0).unwrap();
        assert!(matches!(table.chunk(0).segment(0), &Segment::Dictionary(_)));
        // Reads are unchanged.
        assert_eq!(table.chunk(0).segment(0).value_at(1), Value::Int(5));
        assert_eq!(table.row_count(), 5);

        // The tail chunk is untouched and still appendable.
        table.append(vec![Value::Int(9)]).unwrap();
        assert_eq!(table.row_count(), 6);
    }

    #[test]
    fn summary_reports_shape() {
        let table = int_table(2);
        for v in 0..3 {
            table.append(vec![Value::Int(v)]).unwrap();
        }

        let summary = table.summary("demo");
        assert_eq!(summary.name, "demo");
        assert_eq!(summary.column_count, 1);
        assert_eq!(summary.row_count, 3);
        assert_eq!(summary.chunk_count, 2);
    }
}
