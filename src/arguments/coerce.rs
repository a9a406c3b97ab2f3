use thiserror::Error;

/// A raw token could not be converted into the field's type.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("expected {expected}")]
pub struct CoerceError {
    pub expected: &'static str,
}

/// Conversion from a raw command token into a field value.
pub trait FromArgument: Sized {
    const EXPECTED: &'static str;

    fn from_argument(raw: &str) -> Option<Self>;
}

impl FromArgument for String {
    const EXPECTED: &'static str = "a string";

    fn from_argument(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl FromArgument for i64 {
    const EXPECTED: &'static str = "an integer";

    fn from_argument(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl FromArgument for usize {
    const EXPECTED: &'static str = "a non-negative integer";

    fn from_argument(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl FromArgument for f64 {
    const EXPECTED: &'static str = "a number";

    fn from_argument(raw: &str) -> Option<Self> {
        raw.parse::<f64>().ok().filter(|value| !value.is_nan())
    }
}

pub fn coerce<V: FromArgument>(raw: &str) -> Result<V, CoerceError> {
    V::from_argument(raw).ok_or(CoerceError {
        expected: V::EXPECTED,
    })
}
