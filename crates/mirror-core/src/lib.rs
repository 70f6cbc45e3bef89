//! Core types for the mirror reflection layer.
//!
//! This crate holds the pieces every other part of the layer depends on:
//!
//! - [`TypeIdentity`]: exact-match runtime type token
//! - [`TypeHash`]: deterministic signature fingerprint
//! - [`Value`]: type-erased, shared value container
//! - [`FromValue`] / [`IntoValue`]: conversions across the dynamic boundary
//! - [`Context`]: per-call invocation state
//! - error types for conversion, invocation and property access

pub mod context;
pub mod convert;
pub mod error;
pub mod type_hash;
pub mod type_identity;
pub mod value;

pub use context::{Context, ContextScope};
pub use convert::{FromValue, IntoValue};
pub use error::{ConversionError, InvokeError, PropertyError};
pub use type_hash::TypeHash;
pub use type_identity::TypeIdentity;
pub use value::{Array, Dict, Opaque, SharedArray, SharedDict, Value};
