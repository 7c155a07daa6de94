//! Parameter values bound to benchmarks.

use crate::error::ParamError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// One positional argument.
///
/// Values are kept untyped until invocation, when [`FromParam`] converts them
/// to the argument types of the target function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Str(Cow<'static, str>),
    /// A sequence, bound to `Vec<T>` or `&[T]` arguments.
    List(Cow<'static, [ParamValue]>),
}

impl ParamValue {
    /// Short name of the value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Int(_) => "int",
            ParamValue::UInt(_) => "uint",
            ParamValue::Float(_) => "float",
            ParamValue::Bool(_) => "bool",
            ParamValue::Str(_) => "str",
            ParamValue::List(_) => "list",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::UInt(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v:?}"),
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Str(v) => write!(f, "{v:?}"),
            ParamValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {$(
        impl From<$t> for ParamValue {
            fn from(v: $t) -> Self {
                ParamValue::Int(v as i64)
            }
        }
    )*};
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {$(
        impl From<$t> for ParamValue {
            fn from(v: $t) -> Self {
                match i64::try_from(v) {
                    Ok(i) => ParamValue::Int(i),
                    Err(_) => ParamValue::UInt(v as u64),
                }
            }
        }
    )*};
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Float(v as f64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&'static str> for ParamValue {
    fn from(v: &'static str) -> Self {
        ParamValue::Str(Cow::Borrowed(v))
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(Cow::Owned(v))
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(items: Vec<T>) -> Self {
        ParamValue::List(items.into_iter().map(Into::into).collect())
    }
}

/// Conversion from a bound [`ParamValue`] into a typed argument.
pub trait FromParam: Sized {
    /// Name reported in [`ParamError::TypeMismatch`].
    const EXPECTED: &'static str;

    fn from_param(value: &ParamValue) -> Result<Self, ParamError>;
}

fn mismatch<T: FromParam>(value: &ParamValue) -> ParamError {
    ParamError::TypeMismatch {
        expected: T::EXPECTED,
        found: value.kind(),
    }
}

macro_rules! impl_from_param_int {
    ($($t:ty),*) => {$(
        impl FromParam for $t {
            const EXPECTED: &'static str = stringify!($t);

            fn from_param(value: &ParamValue) -> Result<Self, ParamError> {
                let converted = match value {
                    ParamValue::Int(v) => <$t>::try_from(*v).ok(),
                    ParamValue::UInt(v) => <$t>::try_from(*v).ok(),
                    _ => return Err(mismatch::<Self>(value)),
                };
                converted.ok_or_else(|| ParamError::OutOfRange {
                    value: value.to_string(),
                    target: Self::EXPECTED,
                })
            }
        }
    )*};
}

impl_from_param_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromParam for f64 {
    const EXPECTED: &'static str = "f64";

    fn from_param(value: &ParamValue) -> Result<Self, ParamError> {
        match value {
            ParamValue::Float(v) => Ok(*v),
            ParamValue::Int(v) => Ok(*v as f64),
            ParamValue::UInt(v) => Ok(*v as f64),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromParam for f32 {
    const EXPECTED: &'static str = "f32";

    fn from_param(value: &ParamValue) -> Result<Self, ParamError> {
        f64::from_param(value)
            .map(|v| v as f32)
            .map_err(|_| mismatch::<Self>(value))
    }
}

impl FromParam for bool {
    const EXPECTED: &'static str = "bool";

    fn from_param(value: &ParamValue) -> Result<Self, ParamError> {
        match value {
            ParamValue::Bool(v) => Ok(*v),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromParam for String {
    const EXPECTED: &'static str = "String";

    fn from_param(value: &ParamValue) -> Result<Self, ParamError> {
        match value {
            ParamValue::Str(v) => Ok(v.to_string()),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl<T: FromParam> FromParam for Vec<T> {
    const EXPECTED: &'static str = "list";

    fn from_param(value: &ParamValue) -> Result<Self, ParamError> {
        match value {
            ParamValue::List(items) => items.iter().map(T::from_param).collect(),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromParam for ParamValue {
    const EXPECTED: &'static str = "any";

    fn from_param(value: &ParamValue) -> Result<Self, ParamError> {
        Ok(value.clone())
    }
}

/// The ordered argument tuple bound to one benchmark.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Vec<ParamValue>);

impl Params {
    /// An empty tuple ("invoke with no arguments").
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ParamValue> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParamValue> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ParamValue] {
        &self.0
    }
}

impl From<Vec<ParamValue>> for Params {
    fn from(values: Vec<ParamValue>) -> Self {
        Self(values)
    }
}

impl From<&[ParamValue]> for Params {
    fn from(values: &[ParamValue]) -> Self {
        Self(values.to_vec())
    }
}

impl FromIterator<ParamValue> for Params {
    fn from_iter<I: IntoIterator<Item = ParamValue>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a ParamValue;
    type IntoIter = std::slice::Iter<'a, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

/// Build a [`Params`] tuple from heterogeneous values.
///
/// ```rust
/// use cntryl_bench_registry::{params, ParamValue};
///
/// let p = params![1, 2.5, "label"];
/// assert_eq!(p.get(2), Some(&ParamValue::from("label")));
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::empty()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Params::from(::std::vec![$($crate::ParamValue::from($value)),+])
    };
}
