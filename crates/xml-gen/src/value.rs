use std::borrow::Cow;

use chrono::NaiveDateTime;

/// Scalar payload accepted by [`crate::XmlGenerator::write`].
///
/// One variant per rendering rule, resolved at the call site through the
/// `From` conversions below instead of runtime type inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// Renders as the literal text `null`.
    Null,
    /// Passes through unchanged.
    Text(Cow<'a, str>),
    /// Rendered with the generator's configured date format.
    DateTime(NaiveDateTime),
    /// Rendered with exactly two decimal digits.
    Float(f64),
    /// Default textual representation of any other scalar.
    Other(String),
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(value: &'a str) -> Self {
        Value::Text(Cow::Borrowed(value))
    }
}

impl From<String> for Value<'_> {
    fn from(value: String) -> Self {
        Value::Text(Cow::Owned(value))
    }
}

impl From<NaiveDateTime> for Value<'_> {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<f64> for Value<'_> {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value<'_> {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

macro_rules! value_from_display {
    ($($kind:ty),+ $(,)?) => {
        $(
            impl From<$kind> for Value<'_> {
                fn from(value: $kind) -> Self {
                    Value::Other(value.to_string())
                }
            }
        )+
    };
}

value_from_display!(bool, char, i8, i16, i32, i64, u8, u16, u32, u64);

impl<'a, T> From<Option<T>> for Value<'a>
where
    T: Into<Value<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
