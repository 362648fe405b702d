//! The polymorphic column-segment capability and its append-only value
//! encoding.

use std::mem;
use std::sync::Arc;

use snafu::Snafu;

use data_types::{ElementType, NativeType, Value};

use crate::dictionary::{DictionarySegment, DictionaryValues};
use crate::reference::ReferenceSegment;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("cannot append a {} value to a {} segment", inserted, existing))]
    TypeMismatch {
        existing: ElementType,
        inserted: ElementType,
    },

    #[snafu(display("cannot append to an immutable {} segment", encoding))]
    ImmutableSegment { encoding: &'static str },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A column's values within a single chunk, under one of three physical
/// encodings.
///
/// All encodings share the uniform surface `value_at`/`len`/`append`; the
/// scan additionally matches on the concrete encoding to select its code
/// path.
#[derive(Debug, Clone)]
pub enum Segment {
    Value(ValueSegment),
    Dictionary(DictionarySegment),
    Reference(ReferenceSegment),
}

impl Segment {
    /// Materialises the element at `offset` as a typed value.
    ///
    /// # Panics
    ///
    /// If `offset >= len()`.
    pub fn value_at(&self, offset: usize) -> Value {
        match self {
            Self::Value(segment) => segment.value_at(offset),
            Self::Dictionary(segment) => segment.value_at(offset),
            Self::Reference(segment) => segment.value_at(offset),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Value(segment) => segment.len(),
            Self::Dictionary(segment) => segment.len(),
            Self::Reference(segment) => segment.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Value(segment) => segment.element_type(),
            Self::Dictionary(segment) => segment.element_type(),
            Self::Reference(segment) => segment.element_type(),
        }
    }

    /// Appends a typed value. Only value segments are mutable; dictionary and
    /// reference segments reject the append.
    pub fn append(&mut self, value: Value) -> Result<()> {
        match self {
            Self::Value(segment) => segment.append(value),
            Self::Dictionary(_) => ImmutableSegment {
                encoding: "dictionary",
            }
            .fail(),
            Self::Reference(_) => ImmutableSegment {
                encoding: "reference",
            }
            .fail(),
        }
    }

    /// Checks that `append` would succeed without mutating anything.
    pub fn validate_append(&self, value: &Value) -> Result<()> {
        match self {
            Self::Value(segment) => {
                let existing = segment.element_type();
                let inserted = value.element_type();
                if existing == inserted {
                    Ok(())
                } else {
                    TypeMismatch { existing, inserted }.fail()
                }
            }
            Self::Dictionary(_) => ImmutableSegment {
                encoding: "dictionary",
            }
            .fail(),
            Self::Reference(_) => ImmutableSegment {
                encoding: "reference",
            }
            .fail(),
        }
    }

    /// Approximate memory size of the segment payload.
    pub fn size_bytes(&self) -> usize {
        match self {
            Self::Value(segment) => segment.size_bytes(),
            Self::Dictionary(segment) => segment.size_bytes(),
            Self::Reference(segment) => segment.size_bytes(),
        }
    }
}

/// Append-only uncompressed column segment, one typed growable vector per
/// element type.
#[derive(Debug, Clone)]
pub enum ValueSegment {
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    String(Vec<String>),
}

impl ValueSegment {
    pub fn new(element_type: ElementType) -> Self {
        match element_type {
            ElementType::Int => Self::Int(Vec::new()),
            ElementType::Long => Self::Long(Vec::new()),
            ElementType::Float => Self::Float(Vec::new()),
            ElementType::Double => Self::Double(Vec::new()),
            ElementType::String => Self::String(Vec::new()),
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Int(_) => ElementType::Int,
            Self::Long(_) => ElementType::Long,
            Self::Float(_) => ElementType::Float,
            Self::Double(_) => ElementType::Double,
            Self::String(_) => ElementType::String,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Int(values) => values.len(),
            Self::Long(values) => values.len(),
            Self::Float(values) => values.len(),
            Self::Double(values) => values.len(),
            Self::String(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// # Panics
    ///
    /// If `offset >= len()`.
    pub fn value_at(&self, offset: usize) -> Value {
        match self {
            Self::Int(values) => Value::Int(values[offset]),
            Self::Long(values) => Value::Long(values[offset]),
            Self::Float(values) => Value::Float(values[offset]),
            Self::Double(values) => Value::Double(values[offset]),
            Self::String(values) => Value::String(values[offset].clone()),
        }
    }

    pub fn append(&mut self, value: Value) -> Result<()> {
        match (self, value) {
            (Self::Int(values), Value::Int(v)) => values.push(v),
            (Self::Long(values), Value::Long(v)) => values.push(v),
            (Self::Float(values), Value::Float(v)) => values.push(v),
            (Self::Double(values), Value::Double(v)) => values.push(v),
            (Self::String(values), Value::String(v)) => values.push(v),
            (segment, value) => {
                return TypeMismatch {
                    existing: segment.element_type(),
                    inserted: value.element_type(),
                }
                .fail()
            }
        }
        Ok(())
    }

    pub fn size_bytes(&self) -> usize {
        match self {
            Self::Int(values) => values.len() * mem::size_of::<i32>(),
            Self::Long(values) => values.len() * mem::size_of::<i64>(),
            Self::Float(values) => values.len() * mem::size_of::<f32>(),
            Self::Double(values) => values.len() * mem::size_of::<f64>(),
            Self::String(values) => {
                values.len() * mem::size_of::<String>()
                    + values.iter().map(|s| s.capacity()).sum::<usize>()
            }
        }
    }
}

/// Typed access into the storage variants, one implementation per element
/// type.
///
/// This is what lets the scan dispatch once on the element-type tag and then
/// run a monomorphic body over native slices.
pub trait SegmentType: NativeType {
    /// The typed slice behind a value segment, if the types line up.
    fn slice(segment: &ValueSegment) -> Option<&[Self]>;

    /// The typed sorted dictionary behind a dictionary segment's values, if
    /// the types line up.
    fn dictionary(values: &DictionaryValues) -> Option<&Arc<Vec<Self>>>;

    /// Wraps a sorted distinct sequence into the dictionary-values variant.
    fn wrap_dictionary(values: Arc<Vec<Self>>) -> DictionaryValues;
}

macro_rules! impl_segment_type {
    ($t:ty, $variant:ident) => {
        impl SegmentType for $t {
            fn slice(segment: &ValueSegment) -> Option<&[Self]> {
                match segment {
                    ValueSegment::$variant(values) => Some(values),
                    _ => None,
                }
            }

            fn dictionary(values: &DictionaryValues) -> Option<&Arc<Vec<Self>>> {
                match values {
                    DictionaryValues::$variant(values) => Some(values),
                    _ => None,
                }
            }

            fn wrap_dictionary(values: Arc<Vec<Self>>) -> DictionaryValues {
                DictionaryValues::$variant(values)
            }
        }
    };
}

impl_segment_type!(i32, Int);
impl_segment_type!(i64, Long);
impl_segment_type!(f32, Float);
impl_segment_type!(f64, Double);
impl_segment_type!(String, String);
