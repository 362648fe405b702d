//! Dictionary-encoded column segments.
//!
//! A dictionary segment pairs a sorted, duplicate-free sequence of distinct
//! values with an attribute vector mapping each original row offset to its
//! dictionary index. The attribute-vector width is fitted to the dictionary
//! size so readers can run monomorphic loops per width. Both parts are
//! immutable and shared read-only after construction.

use std::sync::Arc;

use snafu::{ensure, ResultExt, Snafu};

use data_types::{type_cast, ElementType, NativeType, Value};
use observability_deps::tracing::debug;

use crate::attribute_vector::{AttributeVector, INVALID_ID};
use crate::segment::{SegmentType, ValueSegment};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display(
        "{} distinct values exceed the widest supported attribute vector",
        unique_values
    ))]
    DictionaryOverflow { unique_values: usize },

    #[snafu(display("invalid search value: {}", source))]
    SearchValueCast { source: data_types::value::Error },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The sorted distinct values of a dictionary segment, shared read-only.
#[derive(Debug, Clone)]
pub enum DictionaryValues {
    Int(Arc<Vec<i32>>),
    Long(Arc<Vec<i64>>),
    Float(Arc<Vec<f32>>),
    Double(Arc<Vec<f64>>),
    String(Arc<Vec<String>>),
}

macro_rules! with_dictionary_values {
    ($dictionary:expr, |$values:ident| $body:expr) => {
        match $dictionary {
            DictionaryValues::Int($values) => $body,
            DictionaryValues::Long($values) => $body,
            DictionaryValues::Float($values) => $body,
            DictionaryValues::Double($values) => $body,
            DictionaryValues::String($values) => $body,
        }
    };
}

/// Immutable dictionary-encoded column segment.
#[derive(Debug, Clone)]
pub struct DictionarySegment {
    dictionary: DictionaryValues,
    attribute_vector: Arc<AttributeVector>,
}

impl DictionarySegment {
    /// Builds a dictionary segment from an existing value segment.
    ///
    /// The values are copied, sorted and deduplicated; the attribute vector
    /// is allocated at the narrowest width that still leaves the
    /// all-ones sentinel unused, then every original value is binary-searched
    /// into it.
    pub fn from_value_segment(segment: &ValueSegment) -> Result<Self> {
        match segment {
            ValueSegment::Int(values) => Self::build(values),
            ValueSegment::Long(values) => Self::build(values),
            ValueSegment::Float(values) => Self::build(values),
            ValueSegment::Double(values) => Self::build(values),
            ValueSegment::String(values) => Self::build(values),
        }
    }

    fn build<T: SegmentType>(values: &[T]) -> Result<Self> {
        let mut dictionary: Vec<T> = values.to_vec();
        dictionary.sort_by(T::total_order);
        dictionary.dedup();

        let unique_values = dictionary.len();
        ensure!(
            unique_values < u32::MAX as usize,
            DictionaryOverflow { unique_values }
        );
        // Strict bounds keep the per-width INVALID_ID sentinel unused.
        let width = if unique_values < u8::MAX as usize {
            1
        } else if unique_values < u16::MAX as usize {
            2
        } else {
            4
        };

        let mut attribute_vector = AttributeVector::new(width, values.len());
        for (row, value) in values.iter().enumerate() {
            let id = dictionary.partition_point(|entry| entry < value);
            debug_assert!(id < unique_values && dictionary[id] == *value);
            attribute_vector.set(row, id as u32);
        }

        debug!(
            rows = values.len(),
            unique_values, width, "built dictionary segment"
        );

        Ok(Self {
            dictionary: T::wrap_dictionary(Arc::new(dictionary)),
            attribute_vector: Arc::new(attribute_vector),
        })
    }

    pub fn element_type(&self) -> ElementType {
        match &self.dictionary {
            DictionaryValues::Int(_) => ElementType::Int,
            DictionaryValues::Long(_) => ElementType::Long,
            DictionaryValues::Float(_) => ElementType::Float,
            DictionaryValues::Double(_) => ElementType::Double,
            DictionaryValues::String(_) => ElementType::String,
        }
    }

    /// Number of rows the segment encodes.
    pub fn len(&self) -> usize {
        self.attribute_vector.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attribute_vector.is_empty()
    }

    /// Number of distinct values in the dictionary.
    pub fn unique_values_count(&self) -> usize {
        with_dictionary_values!(&self.dictionary, |values| values.len())
    }

    /// The sorted distinct values, as a shared handle.
    pub fn dictionary(&self) -> &DictionaryValues {
        &self.dictionary
    }

    /// The typed sorted dictionary, if `T` matches the element type.
    pub fn typed_dictionary<T: SegmentType>(&self) -> Option<&Arc<Vec<T>>> {
        T::dictionary(&self.dictionary)
    }

    /// The attribute vector, as a shared handle.
    pub fn attribute_vector(&self) -> &Arc<AttributeVector> {
        &self.attribute_vector
    }

    /// The dictionary entry behind `id`.
    ///
    /// # Panics
    ///
    /// If `id` is not a valid dictionary index.
    pub fn value_by_id(&self, id: u32) -> Value {
        with_dictionary_values!(&self.dictionary, |values| values[id as usize]
            .clone()
            .into_value())
    }

    /// Decodes the element at `offset`.
    ///
    /// # Panics
    ///
    /// If `offset >= len()`.
    pub fn value_at(&self, offset: usize) -> Value {
        self.value_by_id(self.attribute_vector.get(offset))
    }

    /// Index of the first dictionary entry `>= value`, or [`INVALID_ID`] if
    /// the value is greater than every entry.
    ///
    /// The search value is cast once, then binary-searched once.
    pub fn lower_bound(&self, value: &Value) -> Result<u32> {
        with_dictionary_values!(&self.dictionary, |values| Ok(lower_bound_in(
            values.as_slice(),
            &type_cast(value).context(SearchValueCast)?
        )))
    }

    /// Index of the first dictionary entry `> value`, or [`INVALID_ID`] if
    /// no entry is greater.
    pub fn upper_bound(&self, value: &Value) -> Result<u32> {
        with_dictionary_values!(&self.dictionary, |values| Ok(upper_bound_in(
            values.as_slice(),
            &type_cast(value).context(SearchValueCast)?
        )))
    }

    /// Approximate memory size of dictionary plus attribute vector.
    pub fn size_bytes(&self) -> usize {
        let dictionary_bytes = match &self.dictionary {
            DictionaryValues::Int(values) => values.len() * std::mem::size_of::<i32>(),
            DictionaryValues::Long(values) => values.len() * std::mem::size_of::<i64>(),
            DictionaryValues::Float(values) => values.len() * std::mem::size_of::<f32>(),
            DictionaryValues::Double(values) => values.len() * std::mem::size_of::<f64>(),
            DictionaryValues::String(values) => {
                values.len() * std::mem::size_of::<String>()
                    + values.iter().map(|s| s.capacity()).sum::<usize>()
            }
        };
        dictionary_bytes + self.attribute_vector.size_bytes()
    }
}

/// Least index in the sorted slice with an entry `>= value`, or
/// [`INVALID_ID`] if there is none.
pub fn lower_bound_in<T: PartialOrd>(values: &[T], value: &T) -> u32 {
    let index = values.partition_point(|entry| entry < value);
    if index == values.len() {
        INVALID_ID
    } else {
        index as u32
    }
}

/// Least index in the sorted slice with an entry `> value`, or
/// [`INVALID_ID`] if there is none.
pub fn upper_bound_in<T: PartialOrd>(values: &[T], value: &T) -> u32 {
    let index = values.partition_point(|entry| entry <= value);
    if index == values.len() {
        INVALID_ID
    } else {
        index as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_segment(values: &[i32]) -> ValueSegment {
        ValueSegment::Int(values.to_vec())
    }

    #[test]
    fn construction_sorts_and_deduplicates() {
        let segment = int_segment(&[5, 5, 2, 2, 7]);
        let dictionary = DictionarySegment::from_value_segment(&segment).unwrap();

        assert_eq!(dictionary.unique_values_count(), 3);
        assert_eq!(
            dictionary.typed_dictionary::<i32>().unwrap().as_slice(),
            &[2, 5, 7]
        );
        assert_eq!(dictionary.attribute_vector().width(), 1);

        let codes: Vec<u32> = (0..5).map(|i| dictionary.attribute_vector().get(i)).collect();
        assert_eq!(codes, vec![1, 1, 0, 0, 2]);
    }

    #[test]
    fn round_trip_read_back() {
        let segment = int_segment(&[9, 3, 3, 1, 9, 4]);
        let dictionary = DictionarySegment::from_value_segment(&segment).unwrap();

        assert_eq!(dictionary.len(), 6);
        for offset in 0..6 {
            assert_eq!(dictionary.value_at(offset), segment.value_at(offset));
        }
    }

    #[test]
    fn width_fits_the_unique_value_count() {
        let narrow: Vec<i32> = (0..200).collect();
        let dictionary =
            DictionarySegment::from_value_segment(&int_segment(&narrow)).unwrap();
        assert_eq!(dictionary.attribute_vector().width(), 1);

        let wide: Vec<i32> = (0..300).collect();
        let dictionary = DictionarySegment::from_value_segment(&int_segment(&wide)).unwrap();
        assert_eq!(dictionary.attribute_vector().width(), 2);
    }

    #[test]
    fn width_boundary_preserves_the_sentinel() {
        // 254 distinct values fit width 1; 255 would collide with the
        // sentinel and must widen to 2 bytes.
        let at_limit: Vec<i32> = (0..254).collect();
        let dictionary =
            DictionarySegment::from_value_segment(&int_segment(&at_limit)).unwrap();
        assert_eq!(dictionary.attribute_vector().width(), 1);

        let over_limit: Vec<i32> = (0..255).collect();
        let dictionary =
            DictionarySegment::from_value_segment(&int_segment(&over_limit)).unwrap();
        assert_eq!(dictionary.attribute_vector().width(), 2);
    }

    #[test]
    fn bounds_on_hits_and_misses() {
        let segment = int_segment(&[5, 5, 2, 2, 7]);
        let dictionary = DictionarySegment::from_value_segment(&segment).unwrap();

        assert_eq!(dictionary.lower_bound(&Value::Int(2)).unwrap(), 0);
        assert_eq!(dictionary.upper_bound(&Value::Int(2)).unwrap(), 1);
        assert_eq!(dictionary.lower_bound(&Value::Int(3)).unwrap(), 1);
        assert_eq!(dictionary.upper_bound(&Value::Int(3)).unwrap(), 1);
        assert_eq!(dictionary.lower_bound(&Value::Int(7)).unwrap(), 2);
        assert_eq!(dictionary.upper_bound(&Value::Int(7)).unwrap(), INVALID_ID);
        assert_eq!(dictionary.lower_bound(&Value::Int(8)).unwrap(), INVALID_ID);
    }

    #[test]
    fn string_dictionary_orders_lexicographically() {
        let segment = ValueSegment::String(vec![
            "pear".to_string(),
            "apple".to_string(),
            "pear".to_string(),
            "fig".to_string(),
        ]);
        let dictionary = DictionarySegment::from_value_segment(&segment).unwrap();

        assert_eq!(
            dictionary.typed_dictionary::<String>().unwrap().as_slice(),
            &["apple".to_string(), "fig".to_string(), "pear".to_string()]
        );
        assert_eq!(dictionary.value_at(0), Value::from("pear"));
        assert_eq!(dictionary.value_at(1), Value::from("apple"));
    }

    #[test]
    fn float_dictionary_is_strictly_increasing() {
        let segment = ValueSegment::Double(vec![2.5, -1.0, 2.5, 0.0, -1.0]);
        let dictionary = DictionarySegment::from_value_segment(&segment).unwrap();

        let values = dictionary.typed_dictionary::<f64>().unwrap();
        assert_eq!(values.as_slice(), &[-1.0, 0.0, 2.5]);
        for pair in values.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn empty_segment_compresses_to_empty_dictionary() {
        let dictionary = DictionarySegment::from_value_segment(&int_segment(&[])).unwrap();
        assert_eq!(dictionary.len(), 0);
        assert_eq!(dictionary.unique_values_count(), 0);
        assert_eq!(
            dictionary.lower_bound(&Value::Int(1)).unwrap(),
            INVALID_ID
        );
    }
}
