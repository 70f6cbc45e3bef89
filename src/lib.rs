//! Runtime reflection for Rust types.
//!
//! `mirror` lets an application describe its types at runtime: register a
//! class's properties and methods under string names, link classes into
//! single-inheritance chains, and invoke methods dynamically through the
//! type-erased [`Value`] container.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI64, Ordering};
//! use mirror::{make_class, ClassRegistry, Context, InvokeError, PropertyDescriptor, Value};
//!
//! #[derive(Default)]
//! struct Counter {
//!     hits: AtomicI64,
//! }
//!
//! let mut class = make_class::<Counter>("Counter", None);
//! class
//!     .add_property(
//!         "hits",
//!         PropertyDescriptor::mutable(
//!             |c: &Counter| c.hits.load(Ordering::SeqCst),
//!             |c: &Counter, v: i64| c.hits.store(v, Ordering::SeqCst),
//!         ),
//!     )
//!     .add_method("bump", |c: &Counter| {
//!         c.hits.fetch_add(1, Ordering::SeqCst);
//!     });
//!
//! let mut registry = ClassRegistry::new();
//! let class = registry.add_class(class);
//!
//! let counter = Value::ptr(Arc::new(Counter::default()));
//! let mut ctx = Context::new();
//! registry.invoke(&mut ctx, &counter, "bump", &[]).unwrap();
//! assert_eq!(class.get_property(&counter, "hits").unwrap().as_int(), Some(1));
//!
//! let missing = registry.invoke(&mut ctx, &counter, "reset", &[]);
//! assert!(matches!(missing, Err(InvokeError::NoSuchMethod { .. })));
//! ```
//!
//! # Dispatch
//!
//! Methods registered from typed closures are only callable end to end when
//! they take no arguments and return `()`; other signatures are recorded
//! (arity, signature identity, fingerprint) but fail with
//! [`InvokeError::NotImplemented`] when invoked. Enable the `full-dispatch`
//! feature to decode arguments and results through [`FromValue`] and
//! [`IntoValue`]. Methods built from an explicit [`Invoker`] always run.
//!
//! Invocation by name reaches the first method registered under that name.
//! There is no overload resolution.
//!
//! # Features
//!
//! - `full-dispatch`: argument marshalling for typed methods
//! - `profiling`: instrument lookups and invocations with `profiling`

use std::any::Any;
use std::sync::Arc;

pub use mirror_core::{
    Array, Context, ContextScope, ConversionError, Dict, FromValue, IntoValue, InvokeError,
    Opaque, PropertyError, SharedArray, SharedDict, TypeHash, TypeIdentity, Value,
};
pub use mirror_registry::{
    ClassInfo, ClassRegistry, IntoMethod, Invocable, Invoker, MethodInfo, NameTypeInfo,
    PropertyDescriptor, PropertyInfo, global,
};

/// Create a fresh class descriptor for host type `T`.
///
/// # Panics
///
/// Panics if `name` is empty.
pub fn make_class<T: Any>(name: impl Into<String>, base: Option<Arc<ClassInfo>>) -> ClassInfo {
    let class = ClassInfo::new::<T>(name, base);
    tracing::trace!(class = class.name(), type_name = class.type_identity().name(), "made class");
    class
}

/// Common imports.
pub mod prelude {
    pub use crate::make_class;
    pub use mirror_core::{
        Context, FromValue, IntoValue, InvokeError, PropertyError, TypeIdentity, Value,
    };
    pub use mirror_registry::{
        ClassInfo, ClassRegistry, MethodInfo, PropertyDescriptor, PropertyInfo,
    };
}
