use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Represents a parameter for a SQL query
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum SqlParam {
    /// Represents a BLOB value
    Blob(Bytes),

    /// Represents an INTEGER value
    Integer(i64),

    /// Represents a NULL value
    Null,

    /// Represents a REAL value
    Real(f64),

    /// Represents a TEXT value
    Text(String),
}

impl SqlParam {
    /// Numeric view of the value. INTEGER and REAL both widen to `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Real(r) => Some(*r),
            _ => None,
        }
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for SqlParam {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl<T: Into<Self>> From<Option<T>> for SqlParam {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_view() {
        assert_eq!(SqlParam::Integer(500).as_f64(), Some(500.0));
        assert_eq!(SqlParam::Real(99.5).as_f64(), Some(99.5));
        assert_eq!(SqlParam::Null.as_f64(), None);
        assert_eq!(SqlParam::Text("500".to_string()).as_f64(), None);
    }

    #[test]
    fn test_option_maps_to_null() {
        assert_eq!(SqlParam::from(None::<i64>), SqlParam::Null);
        assert_eq!(SqlParam::from(Some(7_i64)), SqlParam::Integer(7));
    }
}
