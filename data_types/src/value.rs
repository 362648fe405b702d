//! The typed value union used at API boundaries (row append, scan search
//! values, scalar probe results) and the checked casts between element types.

use std::cmp::Ordering;
use std::fmt;

use snafu::{OptionExt, Snafu};

use crate::element_type::ElementType;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display(
        "cannot represent {} value '{}' as {}",
        source_type,
        value,
        target_type
    ))]
    Unrepresentable {
        source_type: ElementType,
        value: String,
        target_type: ElementType,
    },

    #[snafu(display("expected a {} value, got a {} value", expected, actual))]
    TypeMismatch {
        expected: ElementType,
        actual: ElementType,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A tagged union over the supported element types.
///
/// Values only appear at the boundary; segments store their elements in
/// native form and materialise a `Value` on indexed reads.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl Value {
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Int(_) => ElementType::Int,
            Self::Long(_) => ElementType::Long,
            Self::Float(_) => ElementType::Float,
            Self::Double(_) => ElementType::Double,
            Self::String(_) => ElementType::String,
        }
    }

    /// Cast to the given element type, keeping the value faithful.
    ///
    /// Numeric to numeric uses standard checked conversion, numeric and
    /// string convert through the canonical decimal textual form.
    pub fn cast_to(&self, target: ElementType) -> Result<Self> {
        match target {
            ElementType::Int => type_cast::<i32>(self).map(Value::Int),
            ElementType::Long => type_cast::<i64>(self).map(Value::Long),
            ElementType::Float => type_cast::<f32>(self).map(Value::Float),
            ElementType::Double => type_cast::<f64>(self).map(Value::Double),
            ElementType::String => type_cast::<String>(self).map(Value::String),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Long(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::String(v) => f.write_str(v),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// Bridge between the runtime `ElementType` tag and the concrete native type.
///
/// One implementation exists per element type; operators dispatch on the tag
/// once and then run monomorphic bodies bound by this trait.
pub trait NativeType:
    Clone + fmt::Debug + fmt::Display + PartialEq + PartialOrd + Send + Sync + 'static
{
    const ELEMENT_TYPE: ElementType;

    /// Extracts the native value; the tag must match exactly.
    fn try_from_value(value: &Value) -> Result<Self>;

    /// Wraps the native value back into the union.
    fn into_value(self) -> Value;

    /// Total ordering for dictionary construction. Coincides with `PartialOrd`
    /// everywhere except the float types, which fall back to `total_cmp`.
    fn total_order(a: &Self, b: &Self) -> Ordering;

    /// Converting cast from any value tag.
    fn cast_from(value: &Value) -> Result<Self>;
}

/// Produce a value of concrete type `T` from any typed value, converting
/// between element types where the conversion is faithful.
pub fn type_cast<T: NativeType>(value: &Value) -> Result<T> {
    T::cast_from(value)
}

fn numeric_cast<S, T>(v: S, original: &Value) -> Result<T>
where
    S: num_traits::NumCast + Copy,
    T: NativeType + num_traits::NumCast,
{
    num_traits::cast(v).context(Unrepresentable {
        source_type: original.element_type(),
        value: original.to_string(),
        target_type: T::ELEMENT_TYPE,
    })
}

macro_rules! numeric_native_type {
    ($t:ty, $variant:ident, $element_type:ident, $cmp:expr) => {
        impl NativeType for $t {
            const ELEMENT_TYPE: ElementType = ElementType::$element_type;

            fn try_from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(*v),
                    other => TypeMismatch {
                        expected: Self::ELEMENT_TYPE,
                        actual: other.element_type(),
                    }
                    .fail(),
                }
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn total_order(a: &Self, b: &Self) -> Ordering {
                $cmp(a, b)
            }

            fn cast_from(value: &Value) -> Result<Self> {
                match value {
                    Value::Int(v) => numeric_cast(*v, value),
                    Value::Long(v) => numeric_cast(*v, value),
                    Value::Float(v) => numeric_cast(*v, value),
                    Value::Double(v) => numeric_cast(*v, value),
                    Value::String(s) => s.parse::<Self>().ok().context(Unrepresentable {
                        source_type: ElementType::String,
                        value: s.clone(),
                        target_type: Self::ELEMENT_TYPE,
                    }),
                }
            }
        }
    };
}

numeric_native_type!(i32, Int, Int, |a: &i32, b: &i32| a.cmp(b));
numeric_native_type!(i64, Long, Long, |a: &i64, b: &i64| a.cmp(b));
numeric_native_type!(f32, Float, Float, |a: &f32, b: &f32| a.total_cmp(b));
numeric_native_type!(f64, Double, Double, |a: &f64, b: &f64| a.total_cmp(b));

impl NativeType for String {
    const ELEMENT_TYPE: ElementType = ElementType::String;

    fn try_from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => TypeMismatch {
                expected: Self::ELEMENT_TYPE,
                actual: other.element_type(),
            }
            .fail(),
        }
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn total_order(a: &Self, b: &Self) -> Ordering {
        a.cmp(b)
    }

    fn cast_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Ok(other.to_string()),
        }
    }
}
