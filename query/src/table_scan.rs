//! The predicate-driven table scan.
//!
//! The scan dispatches once on the target column's element type, then per
//! chunk on the concrete segment encoding. Value segments are scanned with a
//! linear typed loop; dictionary segments reduce the predicate to a single
//! attribute-vector code comparison and run a width-monomorphic loop;
//! reference segments pass matching positions through verbatim against the
//! underlying base table. The result is a table of reference segments over
//! one shared position list.

use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use parking_lot::RwLock;
use snafu::{ensure, ResultExt, Snafu};

use data_types::{
    type_cast, ChunkId, ChunkOffset, ColumnId, ElementType, PositionList, RowId, Value,
};
use observability_deps::tracing::debug;
use storage::attribute_vector::{AttributeVector, INVALID_ID};
use storage::dictionary::{lower_bound_in, DictionarySegment};
use storage::reference::ReferenceSegment;
use storage::segment::{Segment, SegmentType, ValueSegment};
use storage::{Chunk, Table};

use crate::operator::Operator;
use crate::TableScanFailed;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display(
        "search value of type {} does not match column '{}' of type {}",
        search_type,
        column_name,
        column_type
    ))]
    TypeMismatch {
        search_type: ElementType,
        column_name: String,
        column_type: ElementType,
    },

    #[snafu(display("scan input mixes reference segments over different base tables"))]
    HeterogeneousReferenceInput,

    #[snafu(display("cannot cast the search value: {}", source))]
    SearchValueCast { source: data_types::value::Error },

    #[snafu(display("error building the result table: {}", source))]
    ResultTable { source: storage::table::Error },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The comparison a scan applies between column values and its search value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanType {
    Equals,
    NotEquals,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
}

impl ScanType {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::LessThan => "<",
            Self::LessThanEquals => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEquals => ">=",
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Scans one column of the input table against a typed search value and
/// materialises a result table of reference segments into the scanned base
/// table.
#[derive(Debug)]
pub struct TableScan {
    input: Arc<dyn Operator>,
    column_id: ColumnId,
    scan_type: ScanType,
    search_value: Value,
    output: RwLock<Option<Arc<Table>>>,
}

impl TableScan {
    pub fn new(
        input: Arc<dyn Operator>,
        column_id: ColumnId,
        scan_type: ScanType,
        search_value: Value,
    ) -> Self {
        Self {
            input,
            column_id,
            scan_type,
            search_value,
            output: RwLock::new(None),
        }
    }
}

impl Operator for TableScan {
    fn execute(&self) -> crate::Result<()> {
        if self.output.read().is_some() {
            return Ok(());
        }

        let input = self.input.get_output();
        let output = scan_table(&input, self.column_id, self.scan_type, &self.search_value)
            .context(TableScanFailed)?;
        *self.output.write() = Some(output);
        Ok(())
    }

    fn get_output(&self) -> Arc<Table> {
        self.output
            .read()
            .as_ref()
            .map(Arc::clone)
            .expect("execute() must run before get_output()")
    }
}

fn scan_table(
    input: &Arc<Table>,
    column_id: ColumnId,
    scan_type: ScanType,
    search_value: &Value,
) -> Result<Arc<Table>> {
    let column_type = input.column_type(column_id);
    let search_type = search_value.element_type();
    ensure!(
        search_type == column_type,
        TypeMismatch {
            search_type,
            column_name: input.column_name(column_id),
            column_type,
        }
    );

    let (positions, base_table) = match column_type {
        ElementType::Int => scan_column::<i32>(input, column_id, scan_type, search_value)?,
        ElementType::Long => scan_column::<i64>(input, column_id, scan_type, search_value)?,
        ElementType::Float => scan_column::<f32>(input, column_id, scan_type, search_value)?,
        ElementType::Double => scan_column::<f64>(input, column_id, scan_type, search_value)?,
        ElementType::String => scan_column::<String>(input, column_id, scan_type, search_value)?,
    };

    // A scan over a reference-segment table unwraps one level: the result
    // references the ultimate base table, never the intermediate one.
    let base_table = base_table.unwrap_or_else(|| Arc::clone(input));
    let positions = Arc::new(positions);

    debug!(
        column = %input.column_name(column_id),
        scan_type = %scan_type,
        rows_in = input.row_count(),
        rows_out = positions.len() as u64,
        "table scan complete"
    );

    let result = Table::new(0);
    let mut chunk = Chunk::new();
    for column in 0..input.column_count() {
        result
            .add_column_definition(input.column_name(column), input.column_type(column))
            .context(ResultTable)?;
        chunk.add_segment(Segment::Reference(ReferenceSegment::new(
            Arc::clone(&base_table),
            column,
            Arc::clone(&positions),
        )));
    }
    result.emplace_chunk(chunk);
    Ok(Arc::new(result))
}

fn scan_column<T: SegmentType>(
    input: &Arc<Table>,
    column_id: ColumnId,
    scan_type: ScanType,
    search_value: &Value,
) -> Result<(PositionList, Option<Arc<Table>>)> {
    let search: T = type_cast(search_value).context(SearchValueCast)?;
    let mut positions = PositionList::new();
    let mut base_table = None;

    for chunk_id in 0..input.chunk_count() {
        let chunk = input.chunk(chunk_id);
        match chunk.segment(usize::from(column_id)) {
            Segment::Value(segment) => {
                scan_value_segment(segment, chunk_id, scan_type, &search, &mut positions)
            }
            Segment::Dictionary(segment) => {
                scan_dictionary_segment(segment, chunk_id, scan_type, &search, &mut positions)
            }
            Segment::Reference(segment) => scan_reference_segment(
                segment,
                scan_type,
                &search,
                &mut base_table,
                &mut positions,
            )?,
        }
    }

    Ok((positions, base_table))
}

fn matches_value<T: PartialOrd>(scan_type: ScanType, value: &T, search: &T) -> bool {
    match scan_type {
        ScanType::Equals => value == search,
        ScanType::NotEquals => value != search,
        ScanType::LessThan => value < search,
        ScanType::LessThanEquals => value <= search,
        ScanType::GreaterThan => value > search,
        ScanType::GreaterThanEquals => value >= search,
    }
}

fn scan_value_segment<T: SegmentType>(
    segment: &ValueSegment,
    chunk_id: ChunkId,
    scan_type: ScanType,
    search: &T,
    positions: &mut PositionList,
) {
    let values = T::slice(segment).expect("segment type matches the dispatched column type");
    for (offset, value) in values.iter().enumerate() {
        if matches_value(scan_type, value, search) {
            positions.push(RowId::new(chunk_id, offset as ChunkOffset));
        }
    }
}

/// The scan predicate rewritten into attribute-vector code space.
///
/// `vid` is the dictionary index of the first entry `>= search`
/// ([`INVALID_ID`] when the search value is greater than every entry, which
/// unsigned comparison against the sentinel handles without a special case).
/// `contains` records whether the entry at `vid` equals the search value.
#[derive(Debug, Clone, Copy)]
enum CodePredicate {
    MatchNone,
    MatchAll,
    Eq(u32),
    Ne(u32),
    Lt(u32),
    Le(u32),
    Gt(u32),
    Ge(u32),
}

impl CodePredicate {
    fn new(scan_type: ScanType, vid: u32, contains: bool) -> Self {
        match scan_type {
            ScanType::Equals => {
                if contains {
                    Self::Eq(vid)
                } else {
                    Self::MatchNone
                }
            }
            ScanType::NotEquals => {
                if contains {
                    Self::Ne(vid)
                } else {
                    Self::MatchAll
                }
            }
            ScanType::LessThan => Self::Lt(vid),
            ScanType::LessThanEquals => {
                // Without an exact hit, vid already points at the first
                // greater entry, so "<= search" is "< vid".
                if contains {
                    Self::Le(vid)
                } else {
                    Self::Lt(vid)
                }
            }
            ScanType::GreaterThan => {
                // Without an exact hit, every entry from vid on is greater.
                if contains {
                    Self::Gt(vid)
                } else {
                    Self::Ge(vid)
                }
            }
            ScanType::GreaterThanEquals => Self::Ge(vid),
        }
    }

    #[inline]
    fn matches(self, code: u32) -> bool {
        match self {
            Self::MatchNone => false,
            Self::MatchAll => true,
            Self::Eq(vid) => code == vid,
            Self::Ne(vid) => code != vid,
            Self::Lt(vid) => code < vid,
            Self::Le(vid) => code <= vid,
            Self::Gt(vid) => code > vid,
            Self::Ge(vid) => code >= vid,
        }
    }
}

fn scan_dictionary_segment<T: SegmentType>(
    segment: &DictionarySegment,
    chunk_id: ChunkId,
    scan_type: ScanType,
    search: &T,
    positions: &mut PositionList,
) {
    let dictionary = segment
        .typed_dictionary::<T>()
        .expect("segment type matches the dispatched column type");
    let vid = lower_bound_in(dictionary, search);
    let contains = vid != INVALID_ID && dictionary[vid as usize] == *search;
    let predicate = CodePredicate::new(scan_type, vid, contains);

    // One dispatch per chunk selects the monomorphic loop for the
    // attribute vector's width.
    match segment.attribute_vector().as_ref() {
        AttributeVector::U8(codes) => scan_codes(codes, chunk_id, predicate, positions),
        AttributeVector::U16(codes) => scan_codes(codes, chunk_id, predicate, positions),
        AttributeVector::U32(codes) => scan_codes(codes, chunk_id, predicate, positions),
    }
}

fn scan_codes<C: Copy + Into<u32>>(
    codes: &[C],
    chunk_id: ChunkId,
    predicate: CodePredicate,
    positions: &mut PositionList,
) {
    match predicate {
        CodePredicate::MatchNone => {}
        CodePredicate::MatchAll => {
            for offset in 0..codes.len() {
                positions.push(RowId::new(chunk_id, offset as ChunkOffset));
            }
        }
        predicate => {
            for (offset, code) in codes.iter().enumerate() {
                if predicate.matches((*code).into()) {
                    positions.push(RowId::new(chunk_id, offset as ChunkOffset));
                }
            }
        }
    }
}

fn scan_reference_segment<T: SegmentType>(
    segment: &ReferenceSegment,
    scan_type: ScanType,
    search: &T,
    base_table: &mut Option<Arc<Table>>,
    positions: &mut PositionList,
) -> Result<()> {
    let referenced = segment.referenced_table();
    match base_table {
        Some(base) => ensure!(Arc::ptr_eq(base, referenced), HeterogeneousReferenceInput),
        None => *base_table = Some(Arc::clone(referenced)),
    }

    let column = usize::from(segment.referenced_column());

    // Walk the position list grouped by source chunk so each underlying
    // segment is fetched once per run of positions.
    for (chunk_id, rows) in &segment.pos_list().iter().group_by(|row| row.chunk_id) {
        let chunk = referenced.chunk(chunk_id);
        match chunk.segment(column) {
            Segment::Value(values) => {
                let values =
                    T::slice(values).expect("segment type matches the dispatched column type");
                for row in rows {
                    if matches_value(scan_type, &values[row.chunk_offset as usize], search) {
                        positions.push(*row);
                    }
                }
            }
            Segment::Dictionary(dictionary) => {
                let entries = dictionary
                    .typed_dictionary::<T>()
                    .expect("segment type matches the dispatched column type");
                let codes = dictionary.attribute_vector();
                for row in rows {
                    let value = &entries[codes.get(row.chunk_offset as usize) as usize];
                    if matches_value(scan_type, value, search) {
                        positions.push(*row);
                    }
                }
            }
            Segment::Reference(_) => {
                unreachable!("reference segments always point at a base table")
            }
        }
    }

    Ok(())
}
