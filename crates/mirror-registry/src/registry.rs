//! ClassRegistry - catalog of reflected classes.
//!
//! This module provides [`ClassRegistry`], which owns every registered
//! [`ClassInfo`] and resolves them by name or by exact type identity.
//!
//! # Storage Model
//!
//! - Classes are stored as `Arc<ClassInfo>` in a vector sorted by name, so
//!   name lookup is a binary search and iteration is in name order.
//! - Type lookup scans the vector and compares each class's own identity.
//!   Base classes are never consulted.
//! - Registered classes are immutable. They can be handed out as bases of
//!   classes registered later.
//!
//! # Thread Safety
//!
//! Registration takes `&mut self`; lookups and invocation take `&self`. A
//! registry populated during a single-threaded setup phase can then be shared
//! across threads for lookups. [`crate::global`] wraps this pattern in a
//! one-time initialisation.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mirror_core::{Context, Value};
//! use mirror_registry::{ClassInfo, ClassRegistry};
//!
//! struct Greeter;
//!
//! let mut class = ClassInfo::new::<Greeter>("Greeter", None);
//! class.add_method("greet", |_: &Greeter| {});
//!
//! let mut registry = ClassRegistry::new();
//! registry.add_class(class);
//!
//! let mut ctx = Context::new();
//! let object = Value::ptr(Arc::new(Greeter));
//! assert!(registry.invoke(&mut ctx, &object, "greet", &[]).is_ok());
//! assert!(registry.find_by_name("Greeter").is_some());
//! ```

use std::any::Any;
use std::sync::Arc;

use mirror_core::{Context, InvokeError, TypeIdentity, Value};

use crate::class::ClassInfo;

/// Catalog of reflected classes, unique by name and by type identity.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    /// Sorted by name.
    classes: Vec<Arc<ClassInfo>>,
}

impl ClassRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class and return the shared handle to it.
    ///
    /// # Panics
    ///
    /// Panics if a class with the same name or the same type identity is
    /// already registered.
    pub fn add_class(&mut self, class: ClassInfo) -> Arc<ClassInfo> {
        self.add_shared(Arc::new(class))
    }

    /// Register an already shared class.
    ///
    /// # Panics
    ///
    /// Same conditions as [`ClassRegistry::add_class`].
    pub fn add_shared(&mut self, class: Arc<ClassInfo>) -> Arc<ClassInfo> {
        let index = match self.position(class.name()) {
            Ok(_) => panic!("class '{}' is already registered", class.name()),
            Err(index) => index,
        };
        if let Some(existing) = self.find_by_type(class.type_identity()) {
            panic!(
                "type '{}' is already registered as class '{}'",
                class.type_identity(),
                existing.name()
            );
        }

        tracing::debug!(
            class = class.name(),
            type_name = class.type_identity().name(),
            base = class.base().map(|b| b.name()),
            properties = class.properties().len(),
            methods = class.methods().len(),
            "registered class"
        );
        self.classes.insert(index, Arc::clone(&class));
        class
    }

    fn position(&self, name: &str) -> Result<usize, usize> {
        self.classes.binary_search_by(|c| c.name().cmp(name))
    }

    /// Find a class by name.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn find_by_name(&self, name: &str) -> Option<&Arc<ClassInfo>> {
        self.position(name).ok().map(|index| &self.classes[index])
    }

    /// Find a class by its own exact type identity.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn find_by_type(&self, type_id: TypeIdentity) -> Option<&Arc<ClassInfo>> {
        self.classes.iter().find(|c| c.type_identity() == type_id)
    }

    /// Find the class registered for host type `T`.
    pub fn find_by_type_of<T: Any>(&self) -> Option<&Arc<ClassInfo>> {
        self.find_by_type(TypeIdentity::of::<T>())
    }

    /// Check if a class with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_ok()
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if no class is registered.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Registered classes in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ClassInfo>> {
        self.classes.iter()
    }

    /// Invoke `method` on `receiver`, resolving its class from the type
    /// identity the receiver carries.
    ///
    /// Only [`Value::Ptr`] receivers carry an identity. Any other variant
    /// fails with [`InvokeError::UnknownClass`], even when a class is
    /// registered for the matching Rust type.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn invoke(
        &self,
        ctx: &mut Context,
        receiver: &Value,
        method: &str,
        args: &[Value],
    ) -> Result<Value, InvokeError> {
        // Only an opaque pointer carries the identity of a host object.
        let class = match receiver {
            Value::Ptr(object) => self.find_by_type(object.identity()),
            _ => None,
        };
        let Some(class) = class else {
            let type_name = receiver.type_name();
            tracing::debug!(type_name, method, "unknown receiver type");
            return Err(InvokeError::UnknownClass {
                type_name: type_name.to_string(),
            });
        };
        class.invoke(ctx, receiver, method, args)
    }

    /// Diagnostic dump of every class, in name order.
    pub fn dump(&self, indent: usize) -> String {
        self.classes.iter().map(|c| c.dump(indent)).collect()
    }
}

impl<'a> IntoIterator for &'a ClassRegistry {
    type Item = &'a Arc<ClassInfo>;
    type IntoIter = std::slice::Iter<'a, Arc<ClassInfo>>;

    fn into_iter(self) -> Self::IntoIter {
        self.classes.iter()
    }
}
