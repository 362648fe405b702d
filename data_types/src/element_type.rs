use std::fmt;
use std::str::FromStr;

use snafu::Snafu;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display(
        "unknown element type '{}', expected one of int, long, float, double, string",
        name
    ))]
    UnknownElementType { name: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The closed set of scalar element types a column may be declared with.
///
/// The tag drives all typed dispatch at operator boundaries; the surface
/// strings (`"int"`, `"long"`, ...) are the only names exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Signed 32-bit integer.
    Int,
    /// Signed 64-bit integer.
    Long,
    /// 32-bit IEEE 754 float.
    Float,
    /// 64-bit IEEE 754 float.
    Double,
    /// UTF-8 string.
    String,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
        }
    }

    /// Whether `self` and `other` belong to the same comparison class.
    ///
    /// `{int, long}` and `{float, double}` compare as equivalent when result
    /// tables are checked for row equivalence.
    pub fn is_equivalent_to(&self, other: Self) -> bool {
        match (self, other) {
            (Self::Int, Self::Long) | (Self::Long, Self::Int) => true,
            (Self::Float, Self::Double) | (Self::Double, Self::Float) => true,
            (a, b) => *a == b,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "int" => Ok(Self::Int),
            "long" => Ok(Self::Long),
            "float" => Ok(Self::Float),
            "double" => Ok(Self::Double),
            "string" => Ok(Self::String),
            other => UnknownElementType { name: other }.fail(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_surface_strings() {
        for name in &["int", "long", "float", "double", "string"] {
            let parsed: ElementType = name.parse().unwrap();
            assert_eq!(parsed.as_str(), *name);
        }
    }

    #[test]
    fn parse_rejects_unknown_names() {
        let err = "varchar".parse::<ElementType>().unwrap_err();
        assert!(err.to_string().contains("varchar"));
    }

    #[test]
    fn equivalence_classes() {
        assert!(ElementType::Int.is_equivalent_to(ElementType::Long));
        assert!(ElementType::Double.is_equivalent_to(ElementType::Float));
        assert!(ElementType::String.is_equivalent_to(ElementType::String));
        assert!(!ElementType::Int.is_equivalent_to(ElementType::Float));
        assert!(!ElementType::String.is_equivalent_to(ElementType::Int));
    }
}
