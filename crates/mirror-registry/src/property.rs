//! Reflected properties.
//!
//! A property is registered from a [`PropertyDescriptor`]: the explicit
//! `(type, read_only, getter, setter)` tuple for one data member. The
//! descriptor decides read-only-ness once, at creation:
//!
//! ```
//! use std::sync::atomic::{AtomicI64, Ordering};
//! use mirror_registry::{PropertyDescriptor, PropertyInfo};
//!
//! struct Counter {
//!     hits: AtomicI64,
//!     limit: i64,
//! }
//!
//! let hits = PropertyInfo::new(
//!     "hits",
//!     PropertyDescriptor::mutable(
//!         |c: &Counter| c.hits.load(Ordering::Relaxed),
//!         |c: &Counter, v: i64| c.hits.store(v, Ordering::Relaxed),
//!     ),
//! );
//! let limit = PropertyInfo::new("limit", PropertyDescriptor::constant(|c: &Counter| c.limit));
//!
//! assert!(!hits.read_only());
//! assert!(limit.read_only());
//! ```
//!
//! The receiver object is shared, so accessors see it through `&T`; a
//! writable property needs interior mutability in the host type.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use mirror_core::{FromValue, IntoValue, PropertyError, TypeIdentity, Value};

use crate::name_type::{NameTypeInfo, pad};

type Getter = Arc<dyn Fn(&Value) -> Result<Value, PropertyError> + Send + Sync>;
type Setter = Arc<dyn Fn(&Value, &Value) -> Result<(), PropertyError> + Send + Sync>;

/// Extract the typed receiver of an accessor.
fn receiver<T: Any + Send + Sync>(value: &Value) -> Result<Arc<T>, PropertyError> {
    value.as_ptr::<T>().ok_or_else(|| PropertyError::InvalidReceiver {
        expected: std::any::type_name::<T>(),
        actual: value.type_name(),
    })
}

/// Explicit description of one data member.
#[derive(Clone)]
pub struct PropertyDescriptor {
    type_id: TypeIdentity,
    read_only: bool,
    getter: Option<Getter>,
    setter: Option<Setter>,
}

impl PropertyDescriptor {
    /// A read-only member of `T` with value type `V`.
    pub fn constant<T, V, G>(get: G) -> Self
    where
        T: Any + Send + Sync,
        V: IntoValue + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        Self {
            type_id: TypeIdentity::of::<V>(),
            read_only: true,
            getter: Some(Self::erase_getter(get)),
            setter: None,
        }
    }

    /// A writable member of `T` with value type `V`.
    pub fn mutable<T, V, G, S>(get: G, set: S) -> Self
    where
        T: Any + Send + Sync,
        V: IntoValue + FromValue + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&T, V) + Send + Sync + 'static,
    {
        let setter: Setter = Arc::new(move |object: &Value, value: &Value| {
            let this = receiver::<T>(object)?;
            set(&*this, V::from_value(value)?);
            Ok(())
        });
        Self {
            type_id: TypeIdentity::of::<V>(),
            read_only: false,
            getter: Some(Self::erase_getter(get)),
            setter: Some(setter),
        }
    }

    /// Metadata without accessors.
    pub fn metadata(type_id: TypeIdentity, read_only: bool) -> Self {
        Self {
            type_id,
            read_only,
            getter: None,
            setter: None,
        }
    }

    fn erase_getter<T, V, G>(get: G) -> Getter
    where
        T: Any + Send + Sync,
        V: IntoValue + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        Arc::new(move |object: &Value| {
            let this = receiver::<T>(object)?;
            Ok(get(&*this).into_value())
        })
    }

    /// Identity of the property's value type.
    pub fn type_identity(&self) -> TypeIdentity {
        self.type_id
    }

    /// Whether the descriptor was built without a setter path.
    pub fn read_only(&self) -> bool {
        self.read_only
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("type_id", &self.type_id)
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}

/// Metadata and accessors for one reflected property.
#[derive(Clone)]
pub struct PropertyInfo {
    info: NameTypeInfo,
    read_only: bool,
    getter: Option<Getter>,
    setter: Option<Setter>,
}

impl PropertyInfo {
    /// Create a property from its descriptor.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty.
    pub fn new(name: impl Into<String>, descriptor: PropertyDescriptor) -> Self {
        Self {
            info: NameTypeInfo::new(name, descriptor.type_id),
            read_only: descriptor.read_only,
            getter: descriptor.getter,
            setter: descriptor.setter,
        }
    }

    /// Property name.
    pub fn name(&self) -> &str {
        self.info.name()
    }

    /// Identity of the property's value type.
    pub fn type_identity(&self) -> TypeIdentity {
        self.info.type_identity()
    }

    /// Shared name and type metadata.
    pub fn info(&self) -> &NameTypeInfo {
        &self.info
    }

    /// Whether writes are rejected with `PropertyError::ReadOnly`.
    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// Read the property from a receiver wrapping the owning object.
    pub fn get(&self, object: &Value) -> Result<Value, PropertyError> {
        let getter = self.getter.as_ref().ok_or_else(|| PropertyError::NoAccessor {
            property: self.name().to_string(),
        })?;
        getter(object)
    }

    /// Write the property on a receiver wrapping the owning object.
    pub fn set(&self, object: &Value, value: &Value) -> Result<(), PropertyError> {
        if self.read_only {
            return Err(PropertyError::ReadOnly {
                property: self.name().to_string(),
            });
        }
        let setter = self.setter.as_ref().ok_or_else(|| PropertyError::NoAccessor {
            property: self.name().to_string(),
        })?;
        setter(object, value)
    }

    /// Diagnostic dump.
    pub fn dump(&self, indent: usize) -> String {
        let mut out = self.info.dump(indent);
        let field = pad(indent + 1);
        out.push_str(&format!("{field}read_only: {}\n", self.read_only));
        out
    }
}

impl fmt::Debug for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyInfo")
            .field("name", &self.name())
            .field("type_id", &self.type_identity())
            .field("read_only", &self.read_only)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct A {
        a: Mutex<i32>,
        a_const: i32,
    }

    struct B;

    fn make_a() -> Value {
        Value::ptr(Arc::new(A {
            a: Mutex::new(42),
            a_const: 15,
        }))
    }

    fn prop_a() -> PropertyInfo {
        PropertyInfo::new(
            "a",
            PropertyDescriptor::mutable(
                |a: &A| *a.a.lock().unwrap(),
                |a: &A, v: i32| *a.a.lock().unwrap() = v,
            ),
        )
    }

    fn prop_a_const() -> PropertyInfo {
        PropertyInfo::new("a_const", PropertyDescriptor::constant(|a: &A| a.a_const))
    }

    #[test]
    fn read_only_derivation() {
        let p = prop_a();
        assert_eq!(p.name(), "a");
        assert_eq!(p.type_identity(), TypeIdentity::of::<i32>());
        assert!(!p.read_only());

        let p = prop_a_const();
        assert_eq!(p.type_identity(), TypeIdentity::of::<i32>());
        assert!(p.read_only());
    }

    #[test]
    fn get_and_set() {
        let obj = make_a();
        let p = prop_a();
        assert_eq!(p.get(&obj).unwrap().as_int(), Some(42));
        p.set(&obj, &Value::from(7)).unwrap();
        assert_eq!(p.get(&obj).unwrap().as_int(), Some(7));
    }

    #[test]
    fn set_read_only_fails() {
        let obj = make_a();
        let p = prop_a_const();
        assert_eq!(p.get(&obj).unwrap().as_int(), Some(15));
        assert!(matches!(
            p.set(&obj, &Value::from(1)),
            Err(PropertyError::ReadOnly { .. })
        ));
    }

    #[test]
    fn set_with_wrong_value_type_fails() {
        let obj = make_a();
        assert!(matches!(
            prop_a().set(&obj, &Value::from("nope")),
            Err(PropertyError::Conversion(_))
        ));
    }

    #[test]
    fn wrong_receiver_fails() {
        let other = Value::ptr(Arc::new(B));
        assert!(matches!(
            prop_a().get(&other),
            Err(PropertyError::InvalidReceiver { .. })
        ));
        assert!(prop_a().get(&Value::null()).is_err());
    }

    #[test]
    fn metadata_only_property() {
        let p = PropertyInfo::new(
            "raw",
            PropertyDescriptor::metadata(TypeIdentity::of::<f64>(), false),
        );
        assert!(!p.read_only());
        assert!(matches!(
            p.get(&Value::null()),
            Err(PropertyError::NoAccessor { .. })
        ));
        assert!(matches!(
            p.set(&Value::null(), &Value::from(1.0)),
            Err(PropertyError::NoAccessor { .. })
        ));
    }

    #[test]
    fn dump_includes_read_only() {
        let dump = prop_a_const().dump(1);
        assert_eq!(dump, " name: a_const\n  type: i32\n  read_only: true\n");
    }
}
