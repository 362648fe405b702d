//! Chunks: the horizontal partitions of a table, one segment per column.

use std::mem;

use snafu::{ensure, ResultExt, Snafu};

use data_types::Value;

use crate::dictionary::{self, DictionarySegment};
use crate::segment::{self, Segment};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display(
        "row has {} values but the chunk has {} segments",
        row_width,
        segment_count
    ))]
    ArityMismatch {
        row_width: usize,
        segment_count: usize,
    },

    #[snafu(display("error appending to segment {}: {}", column, source))]
    SegmentAppend {
        column: usize,
        source: segment::Error,
    },

    #[snafu(display("error building dictionary for segment {}: {}", column, source))]
    DictionaryBuild {
        column: usize,
        source: dictionary::Error,
    },

    #[snafu(display("segment {} is a reference segment and cannot be compressed", column))]
    CompressReference { column: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An ordered sequence of segments forming one horizontal partition of a
/// table.
///
/// Invariant: either the chunk has no segments, or all segments have equal
/// length (the chunk's row count).
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    segments: Vec<Segment>,
}

impl Chunk {
    pub fn new() -> Self {
        Default::default()
    }

    /// Appends a segment. All columns must be added before rows are appended.
    pub fn add_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Appends a row element-wise, one value per segment.
    ///
    /// The whole row is validated first so a failed append leaves the chunk
    /// unchanged and the equal-length invariant intact.
    pub fn append(&mut self, row: Vec<Value>) -> Result<()> {
        ensure!(
            row.len() == self.segments.len(),
            ArityMismatch {
                row_width: row.len(),
                segment_count: self.segments.len(),
            }
        );

        for (column, (segment, value)) in self.segments.iter().zip(row.iter()).enumerate() {
            segment
                .validate_append(value)
                .context(SegmentAppend { column })?;
        }
        for (column, (segment, value)) in self.segments.iter_mut().zip(row).enumerate() {
            segment.append(value).context(SegmentAppend { column })?;
        }
        Ok(())
    }

    /// # Panics
    ///
    /// If `index >= segment_count()`.
    pub fn segment(&self, index: usize) -> &Segment {
        &self.segments[index]
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// The chunk's row count: 0 without segments, otherwise the length of
    /// segment 0.
    pub fn len(&self) -> usize {
        self.segments.first().map(Segment::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces every value segment with a dictionary segment built from it.
    ///
    /// Already-compressed segments are left untouched; reference segments
    /// cannot be compressed.
    pub fn compress(&mut self) -> Result<()> {
        for (column, slot) in self.segments.iter_mut().enumerate() {
            match slot {
                Segment::Value(values) => {
                    let dictionary = DictionarySegment::from_value_segment(values)
                        .context(DictionaryBuild { column })?;
                    *slot = Segment::Dictionary(dictionary);
                }
                Segment::Dictionary(_) => {}
                Segment::Reference(_) => return CompressReference { column }.fail(),
            }
        }
        Ok(())
    }

    /// Approximate memory size of all segments.
    pub fn size_bytes(&self) -> usize {
        mem::size_of::<Self>()
            + self
                .segments
                .iter()
                .map(Segment::size_bytes)
                .sum::<usize>()
    }
}
