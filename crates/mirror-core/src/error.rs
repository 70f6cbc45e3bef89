//! Error types for the reflection layer.
//!
//! ## Error Hierarchy
//!
//! ```text
//! InvokeError        - dynamic method invocation failures
//! ├── ConversionError  - Value <-> Rust conversion failures (via #[from])
//! PropertyError      - dynamic property access failures
//! └── ConversionError
//! ```
//!
//! Contract violations (empty names, duplicate registrations) are not
//! represented here: they panic at the call site. Lookups that miss return
//! `None`.

use thiserror::Error;

// ============================================================================
// Conversion Errors
// ============================================================================

/// Errors raised when converting between [`Value`](crate::Value) and Rust types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// The value holds a different variant than the one requested.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: &'static str,
        /// The actual variant or type.
        actual: &'static str,
    },

    /// An integer does not fit in the target type.
    #[error("integer overflow: {value} doesn't fit in {target_type}")]
    IntegerOverflow {
        /// The value that overflowed.
        value: i64,
        /// The target type.
        target_type: &'static str,
    },

    /// A null value was passed where an object was required.
    #[error("null value cannot be converted to {target_type}")]
    NullPointer {
        /// The type that was expected.
        target_type: &'static str,
    },
}

// ============================================================================
// Invocation Errors
// ============================================================================

/// Errors raised by dynamic method invocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvokeError {
    /// No method with this name exists on the class.
    #[error("no method '{method}' on class '{class}'")]
    NoSuchMethod {
        /// The class that was searched.
        class: String,
        /// The requested method name.
        method: String,
    },

    /// The receiver's type was never registered.
    #[error("unknown receiver type '{type_name}'")]
    UnknownClass {
        /// Diagnostic name of the receiver's type.
        type_name: String,
    },

    /// The method exists but cannot be called through the dynamic boundary.
    #[error("invoking '{method}' is not implemented for signature '{signature}'")]
    NotImplemented {
        /// The method name.
        method: String,
        /// Diagnostic form of the signature.
        signature: &'static str,
    },

    /// The argument list has the wrong length.
    #[error("'{method}' expects {expected} argument(s), got {got}")]
    ArityMismatch {
        /// The method name.
        method: String,
        /// Declared arity.
        expected: usize,
        /// Number of arguments supplied.
        got: usize,
    },

    /// The receiver does not wrap an object of the method's class.
    #[error("invalid receiver: expected {expected}, got {actual}")]
    InvalidReceiver {
        /// The expected receiver type.
        expected: &'static str,
        /// The actual receiver type.
        actual: &'static str,
    },

    /// An argument could not be converted.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Failure reported by a user-supplied invoker.
    #[error("{message}")]
    Failed {
        /// The error message.
        message: String,
    },
}

impl InvokeError {
    /// Create a generic failure for use inside custom invokers.
    pub fn failed(message: impl Into<String>) -> Self {
        InvokeError::Failed {
            message: message.into(),
        }
    }
}

// ============================================================================
// Property Errors
// ============================================================================

/// Errors raised by dynamic property access.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    /// No property with this name exists on the class or its bases.
    #[error("no property '{property}' on class '{class}'")]
    NoSuchProperty {
        /// The class that was searched.
        class: String,
        /// The requested property name.
        property: String,
    },

    /// Attempted to write a read-only property.
    #[error("property '{property}' is read-only")]
    ReadOnly {
        /// The property name.
        property: String,
    },

    /// The property was registered as metadata only.
    #[error("property '{property}' has no accessor")]
    NoAccessor {
        /// The property name.
        property: String,
    },

    /// The receiver does not wrap an object of the property's class.
    #[error("invalid receiver: expected {expected}, got {actual}")]
    InvalidReceiver {
        /// The expected receiver type.
        expected: &'static str,
        /// The actual receiver type.
        actual: &'static str,
    },

    /// The assigned value could not be converted.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}
