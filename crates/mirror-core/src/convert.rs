//! Conversion traits between Rust types and [`Value`].
//!
//! - [`FromValue`]: extract a Rust value from an argument
//! - [`IntoValue`]: turn a Rust return value into a [`Value`]
//!
//! Every implementing type also reports a diagnostic [`FromValue::TYPE_NAME`],
//! used to build method signature fingerprints.
//!
//! ```
//! use mirror_core::{FromValue, IntoValue, Value};
//!
//! let v = 42i32.into_value();
//! let back = i32::from_value(&v).unwrap();
//! assert_eq!(back, 42);
//! assert!(u8::from_value(&Value::from(-1)).is_err());
//! ```

use std::any::Any;
use std::sync::Arc;

use crate::error::ConversionError;
use crate::value::{Array, SharedArray, SharedDict, Value};

/// Extract a Rust value from a [`Value`].
pub trait FromValue: Sized {
    /// Diagnostic name of the target type.
    const TYPE_NAME: &'static str;

    /// Convert the given value.
    ///
    /// Returns a `ConversionError` if the value holds an incompatible variant.
    fn from_value(value: &Value) -> Result<Self, ConversionError>;
}

/// Convert a Rust value into a [`Value`].
pub trait IntoValue {
    /// Diagnostic name of the source type.
    const TYPE_NAME: &'static str;

    /// True for `()`, the only return type a void method may have.
    const IS_VOID: bool = false;

    fn into_value(self) -> Value;
}

fn mismatch(expected: &'static str, value: &Value) -> ConversionError {
    ConversionError::TypeMismatch {
        expected,
        actual: value.type_name(),
    }
}

// ============================================================================
// Integer implementations
// ============================================================================

macro_rules! impl_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn from_value(value: &Value) -> Result<Self, ConversionError> {
                    match value {
                        Value::Int(v) => <$ty>::try_from(*v).map_err(|_| {
                            ConversionError::IntegerOverflow {
                                value: *v,
                                target_type: stringify!($ty),
                            }
                        }),
                        _ => Err(mismatch("int", value)),
                    }
                }
            }

            impl IntoValue for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn into_value(self) -> Value {
                    Value::Int(self as i64)
                }
            }
        )*
    };
}

impl_int!(i8, i16, i32, i64, u8, u16, u32);

// ============================================================================
// Float implementations
// ============================================================================

impl FromValue for f64 {
    const TYPE_NAME: &'static str = "f64";

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Double(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            _ => Err(mismatch("double", value)),
        }
    }
}

impl IntoValue for f64 {
    const TYPE_NAME: &'static str = "f64";

    fn into_value(self) -> Value {
        Value::Double(self)
    }
}

impl FromValue for f32 {
    const TYPE_NAME: &'static str = "f32";

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl IntoValue for f32 {
    const TYPE_NAME: &'static str = "f32";

    fn into_value(self) -> Value {
        Value::Double(self as f64)
    }
}

// ============================================================================
// Bool, string and unit
// ============================================================================

impl FromValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        value.as_bool().ok_or_else(|| mismatch("bool", value))
    }
}

impl IntoValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FromValue for String {
    const TYPE_NAME: &'static str = "String";

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| mismatch("string", value))
    }
}

impl IntoValue for String {
    const TYPE_NAME: &'static str = "String";

    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl IntoValue for &'static str {
    const TYPE_NAME: &'static str = "&str";

    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl FromValue for () {
    const TYPE_NAME: &'static str = "()";

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(()),
            _ => Err(mismatch("null", value)),
        }
    }
}

impl IntoValue for () {
    const TYPE_NAME: &'static str = "()";
    const IS_VOID: bool = true;

    fn into_value(self) -> Value {
        Value::Null
    }
}

// ============================================================================
// Values, containers and objects
// ============================================================================

impl FromValue for Value {
    const TYPE_NAME: &'static str = "Value";

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

impl IntoValue for Value {
    const TYPE_NAME: &'static str = "Value";

    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for SharedArray {
    const TYPE_NAME: &'static str = "SharedArray";

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Array(a) => Ok(a.clone()),
            _ => Err(mismatch("array", value)),
        }
    }
}

impl FromValue for SharedDict {
    const TYPE_NAME: &'static str = "SharedDict";

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Dict(d) => Ok(d.clone()),
            _ => Err(mismatch("dict", value)),
        }
    }
}

impl IntoValue for Array {
    const TYPE_NAME: &'static str = "Array";

    fn into_value(self) -> Value {
        Value::from(self)
    }
}

/// Objects cross the boundary as shared pointers with an exact type match.
impl<T: Any + Send + Sync> FromValue for Arc<T> {
    const TYPE_NAME: &'static str = "Arc<object>";

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Err(ConversionError::NullPointer {
                target_type: std::any::type_name::<T>(),
            }),
            _ => value.as_ptr::<T>().ok_or_else(|| ConversionError::TypeMismatch {
                expected: std::any::type_name::<T>(),
                actual: value.type_name(),
            }),
        }
    }
}

impl<T: Any + Send + Sync> IntoValue for Arc<T> {
    const TYPE_NAME: &'static str = "Arc<object>";

    fn into_value(self) -> Value {
        Value::ptr(self)
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;

    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;

    #[test]
    fn from_value_i8() {
        assert_eq!(i8::from_value(&Value::Int(-128)).unwrap(), -128);
        assert!(i8::from_value(&Value::Int(128)).is_err());
        assert!(i8::from_value(&Value::Bool(true)).is_err());
    }

    #[test]
    fn from_value_unsigned_rejects_negative() {
        assert_eq!(u32::from_value(&Value::Int(7)).unwrap(), 7);
        let expected = ConversionError::IntegerOverflow {
            value: -1,
            target_type: "u8",
        };
        assert_eq!(u8::from_value(&Value::Int(-1)), Err(expected));
    }

    #[test]
    fn from_value_f64_accepts_int() {
        assert_eq!(f64::from_value(&Value::Double(1.5)).unwrap(), 1.5);
        assert_eq!(f64::from_value(&Value::Int(2)).unwrap(), 2.0);
        assert!(f64::from_value(&Value::from("x")).is_err());
        assert_eq!(f32::from_value(&Value::Double(0.5)).unwrap(), 0.5f32);
    }

    #[test]
    fn from_value_string_and_bool() {
        assert_eq!(String::from_value(&Value::from("hi")).unwrap(), "hi");
        assert!(bool::from_value(&Value::Bool(false)).is_ok());
        let expected = ConversionError::TypeMismatch {
            expected: "bool",
            actual: "int",
        };
        assert_eq!(bool::from_value(&Value::Int(1)), Err(expected));
    }

    #[test]
    fn unit_is_void() {
        assert!(<() as IntoValue>::IS_VOID);
        assert!(!<i32 as IntoValue>::IS_VOID);
        assert!(().into_value().is_null());
        assert!(<()>::from_value(&Value::Null).is_ok());
    }

    #[test]
    fn arc_round_trip() {
        let a = Arc::new(A);
        let v = Arc::clone(&a).into_value();
        let back = Arc::<A>::from_value(&v).unwrap();
        assert!(Arc::ptr_eq(&a, &back));
    }

    #[test]
    fn arc_from_null_and_wrong_type() {
        assert!(matches!(
            Arc::<A>::from_value(&Value::Null),
            Err(ConversionError::NullPointer { .. })
        ));
        assert!(matches!(
            Arc::<A>::from_value(&Value::Int(1)),
            Err(ConversionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn containers() {
        let v = Value::array();
        let a = SharedArray::from_value(&v).unwrap();
        a.push(1);
        assert_eq!(v.as_array().len(), 1);
        assert!(SharedDict::from_value(&v).is_err());
        assert!(vec![Value::from(1)].into_value().is_array());
    }

    #[test]
    fn option_into_value() {
        assert!(None::<i32>.into_value().is_null());
        assert_eq!(Some(3i32).into_value().as_int(), Some(3));
    }
}
