//! Class metadata: properties, methods and the base-class link.
//!
//! Properties are kept sorted by name and looked up by binary search.
//! Methods keep registration order; several entries may share a name, and
//! [`ClassInfo::invoke`] always reaches the first one.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use mirror_core::{Context, Value};
//! use mirror_registry::{ClassInfo, PropertyDescriptor};
//!
//! #[derive(Default)]
//! struct Greeter {
//!     greeted: AtomicBool,
//! }
//!
//! let mut class = ClassInfo::new::<Greeter>("Greeter", None);
//! class.add_property(
//!     "greeted",
//!     PropertyDescriptor::constant(|g: &Greeter| g.greeted.load(Ordering::SeqCst)),
//! );
//! class.add_method("greet", |g: &Greeter| g.greeted.store(true, Ordering::SeqCst));
//!
//! let object = Value::ptr(Arc::new(Greeter::default()));
//! let mut ctx = Context::new();
//! class.invoke(&mut ctx, &object, "greet", &[]).unwrap();
//! assert_eq!(class.get_property(&object, "greeted").unwrap().as_bool(), Some(true));
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use mirror_core::{Context, InvokeError, PropertyError, TypeIdentity, Value};

use crate::method::{IntoMethod, MethodInfo};
use crate::name_type::{NameTypeInfo, pad};
use crate::property::{PropertyDescriptor, PropertyInfo};

/// Metadata for one reflected class.
#[derive(Clone)]
pub struct ClassInfo {
    info: NameTypeInfo,
    base: Option<Arc<ClassInfo>>,
    /// Sorted by name, unique within this class.
    properties: Vec<PropertyInfo>,
    /// Registration order.
    methods: Vec<MethodInfo>,
}

impl ClassInfo {
    /// Create an empty class descriptor for host type `T`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty.
    pub fn new<T: Any>(name: impl Into<String>, base: Option<Arc<ClassInfo>>) -> Self {
        Self::with_type(name, TypeIdentity::of::<T>(), base)
    }

    /// Create an empty class descriptor with an explicit type identity.
    pub fn with_type(
        name: impl Into<String>,
        type_id: TypeIdentity,
        base: Option<Arc<ClassInfo>>,
    ) -> Self {
        Self {
            info: NameTypeInfo::new(name, type_id),
            base,
            properties: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Class name.
    pub fn name(&self) -> &str {
        self.info.name()
    }

    /// Identity of the host type this class describes.
    pub fn type_identity(&self) -> TypeIdentity {
        self.info.type_identity()
    }

    /// Shared name and type metadata.
    pub fn info(&self) -> &NameTypeInfo {
        &self.info
    }

    /// Base class, if any.
    pub fn base(&self) -> Option<&Arc<ClassInfo>> {
        self.base.as_ref()
    }

    /// This class's own properties, sorted by name.
    pub fn properties(&self) -> &[PropertyInfo] {
        &self.properties
    }

    /// This class's own methods, in registration order.
    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    /// Whether `other` is this class or appears in its base chain.
    pub fn is_subclass_of(&self, other: &ClassInfo) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        let mut current = self.base.as_deref();
        while let Some(class) = current {
            if std::ptr::eq(class, other) {
                return true;
            }
            current = class.base.as_deref();
        }
        false
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// Register a property built from `descriptor`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty or already present in this class's own
    /// property list. Reusing a base-class name is allowed.
    pub fn add_property(
        &mut self,
        name: impl Into<String>,
        descriptor: PropertyDescriptor,
    ) -> &mut Self {
        self.add_property_info(PropertyInfo::new(name, descriptor))
    }

    /// Register a prebuilt property.
    ///
    /// # Panics
    ///
    /// Panics if the name is already present in this class's own list.
    pub fn add_property_info(&mut self, property: PropertyInfo) -> &mut Self {
        let index = match self.position(property.name()) {
            Ok(_) => panic!(
                "duplicate property '{}' on class '{}'",
                property.name(),
                self.name()
            ),
            Err(index) => index,
        };
        tracing::debug!(
            class = self.name(),
            property = property.name(),
            read_only = property.read_only(),
            "registered property"
        );
        self.properties.insert(index, property);
        self
    }

    fn position(&self, name: &str) -> Result<usize, usize> {
        self.properties.binary_search_by(|p| p.name().cmp(name))
    }

    /// Find a property by name.
    ///
    /// With `search_base`, a miss continues into the base chain; without it,
    /// a property declared only on a base class is invisible.
    pub fn find_property(&self, name: &str, search_base: bool) -> Option<&PropertyInfo> {
        match self.position(name) {
            Ok(index) => Some(&self.properties[index]),
            Err(_) if search_base => self.base.as_deref()?.find_property(name, true),
            Err(_) => None,
        }
    }

    /// Read a property, searching the base chain.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn get_property(&self, object: &Value, name: &str) -> Result<Value, PropertyError> {
        self.find_property(name, true)
            .ok_or_else(|| self.no_such_property(name))?
            .get(object)
    }

    /// Write a property, searching the base chain.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn set_property(
        &self,
        object: &Value,
        name: &str,
        value: &Value,
    ) -> Result<(), PropertyError> {
        self.find_property(name, true)
            .ok_or_else(|| self.no_such_property(name))?
            .set(object, value)
    }

    fn no_such_property(&self, name: &str) -> PropertyError {
        PropertyError::NoSuchProperty {
            class: self.name().to_string(),
            property: name.to_string(),
        }
    }

    // ========================================================================
    // Methods
    // ========================================================================

    /// Register a typed closure `Fn(&T, A1, .., An) -> R` as a method.
    ///
    /// Arity, signature identity and fingerprint are derived from the
    /// closure type. Names need not be unique.
    pub fn add_method<T, M, F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: IntoMethod<T, M>,
    {
        let method = MethodInfo::from_fn(self.name(), name, f);
        self.add_method_info(method)
    }

    /// Register a prebuilt method.
    pub fn add_method_info(&mut self, method: MethodInfo) -> &mut Self {
        tracing::debug!(
            class = self.name(),
            method = method.name(),
            arity = method.arity(),
            "registered method"
        );
        self.methods.push(method);
        self
    }

    /// First method registered under `name`.
    pub fn find_method(&self, name: &str) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.name() == name)
    }

    /// All methods registered under `name`, in registration order.
    pub fn find_methods<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a MethodInfo> + 'a {
        self.methods.iter().filter(move |m| m.name() == name)
    }

    /// Invoke the first method named `name` on `receiver`.
    ///
    /// Arity and argument types play no part in selecting the method. Only
    /// this class's own methods are searched.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn invoke(
        &self,
        ctx: &mut Context,
        receiver: &Value,
        name: &str,
        args: &[Value],
    ) -> Result<Value, InvokeError> {
        let Some(method) = self.find_method(name) else {
            tracing::debug!(class = self.name(), method = name, "no such method");
            return Err(InvokeError::NoSuchMethod {
                class: self.name().to_string(),
                method: name.to_string(),
            });
        };

        tracing::trace!(
            class = self.name(),
            method = name,
            args = args.len(),
            depth = ctx.depth(),
            "invoke"
        );
        let result = {
            let mut scope = ctx.scope();
            method.invoke(&mut scope, receiver, args)
        };

        if let Err(err) = &result {
            tracing::debug!(class = self.name(), method = name, error = %err, "invocation failed");
        }
        result
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Recursive diagnostic dump.
    pub fn dump(&self, indent: usize) -> String {
        let mut out = self.info.dump(indent);

        if let Some(base) = &self.base {
            let field = pad(indent + 1);
            out.push_str(&format!("{field}base: {}\n", base.name()));
            out.push_str(&base.dump(indent + 2));
            out.push('\n');
        }

        if !self.properties.is_empty() {
            out.push_str(&format!("{}properties:\n", pad(indent + 1)));
            for property in &self.properties {
                out.push_str(&property.dump(indent + 2));
            }
        }

        if !self.methods.is_empty() {
            out.push_str(&format!("{}methods:\n", pad(indent + 1)));
            for method in &self.methods {
                out.push_str(&method.dump(indent + 2));
            }
        }

        out
    }
}

impl fmt::Display for ClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump(0))
    }
}

impl fmt::Debug for ClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInfo")
            .field("name", &self.name())
            .field("type_id", &self.type_identity())
            .field("base", &self.base.as_ref().map(|b| b.name().to_string()))
            .field("properties", &self.properties)
            .field("methods", &self.methods)
            .finish()
    }
}
