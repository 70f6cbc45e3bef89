//! Class metadata graph and class registry.
//!
//! - [`NameTypeInfo`]: the `{name, type}` pair shared by every entity
//! - [`PropertyInfo`] / [`PropertyDescriptor`]: data members and accessors
//! - [`MethodInfo`] / [`Invoker`] / [`IntoMethod`]: callables and their thunks
//! - [`ClassInfo`]: one class's properties, methods and base link
//! - [`ClassRegistry`]: lookup by name or by exact type identity
//! - [`global`]: one-time process-wide registry

pub mod class;
pub mod global;
pub mod method;
pub mod name_type;
pub mod property;
pub mod registry;

pub use class::ClassInfo;
pub use method::{IntoMethod, Invocable, Invoker, MethodInfo};
pub use name_type::NameTypeInfo;
pub use property::{PropertyDescriptor, PropertyInfo};
pub use registry::ClassRegistry;
