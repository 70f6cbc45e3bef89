//! Type-erased value container used across the dynamic-invocation boundary.
//!
//! A [`Value`] is one of eight variants: null, bool, 64-bit integer, double,
//! string, array, dict, or an opaque shared pointer to a host object. Cloning
//! a `Value` is cheap. Strings and opaque objects are reference counted, and
//! arrays and dicts live in shared storage: mutating the contents through one
//! copy is visible through every other copy.
//!
//! ```
//! use mirror_core::Value;
//!
//! let list = Value::array();
//! let alias = list.clone();
//! alias.as_array().push(Value::from(1));
//! assert_eq!(list.as_array().len(), 1);
//! ```
//!
//! ## Auto-vivification
//!
//! [`Value::as_array_mut`] and [`Value::as_dict_mut`] turn a null value into
//! an empty container in place. Any other mismatched variant is left alone and
//! a detached empty container is returned instead; writes to it are lost.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rustc_hash::FxHashMap;

use crate::TypeIdentity;

/// Ordered sequence payload of an array value.
pub type Array = Vec<Value>;

/// Keyed payload of a dict value. Iteration order is unspecified.
pub type Dict = FxHashMap<String, Value>;

// ============================================================================
// Shared containers
// ============================================================================

/// Shared, in-place mutable array storage.
#[derive(Clone, Default)]
pub struct SharedArray(Arc<RwLock<Array>>);

impl SharedArray {
    /// Create a new empty array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, Array> {
        self.0.read()
    }

    /// Lock for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, Array> {
        self.0.write()
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Append an element.
    pub fn push(&self, value: impl Into<Value>) {
        self.0.write().push(value.into());
    }

    /// Get a copy of the element at `index`. Copies share storage.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().get(index).cloned()
    }

    /// Replace the element at `index`, returning the previous one.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Option<Value> {
        let mut guard = self.0.write();
        let slot = guard.get_mut(index)?;
        Some(std::mem::replace(slot, value.into()))
    }

    /// Snapshot of the elements.
    pub fn to_vec(&self) -> Array {
        self.0.read().clone()
    }

    /// Check whether both handles share the same storage.
    pub fn ptr_eq(&self, other: &SharedArray) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Array> for SharedArray {
    fn from(items: Array) -> Self {
        SharedArray(Arc::new(RwLock::new(items)))
    }
}

/// Shared, in-place mutable dict storage.
#[derive(Clone, Default)]
pub struct SharedDict(Arc<RwLock<Dict>>);

impl SharedDict {
    /// Create a new empty dict.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, Dict> {
        self.0.read()
    }

    /// Lock for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, Dict> {
        self.0.write()
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Insert or replace an entry, returning the previous value.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.write().insert(key.into(), value.into())
    }

    /// Get a copy of the entry for `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.read().get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.write().remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.read().contains_key(key)
    }

    /// Keys in unspecified order.
    pub fn keys(&self) -> Vec<String> {
        self.0.read().keys().cloned().collect()
    }

    /// Check whether both handles share the same storage.
    pub fn ptr_eq(&self, other: &SharedDict) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Dict> for SharedDict {
    fn from(entries: Dict) -> Self {
        SharedDict(Arc::new(RwLock::new(entries)))
    }
}

// ============================================================================
// Opaque pointers
// ============================================================================

/// A shared pointer to a host object together with its exact type identity.
#[derive(Clone)]
pub struct Opaque {
    object: Arc<dyn Any + Send + Sync>,
    identity: TypeIdentity,
}

impl Opaque {
    /// Wrap a shared host object.
    pub fn new<T: Any + Send + Sync>(object: Arc<T>) -> Self {
        Self {
            object,
            identity: TypeIdentity::of::<T>(),
        }
    }

    /// Identity of the pointee type.
    pub fn identity(&self) -> TypeIdentity {
        self.identity
    }

    /// Recover the typed pointer. Requires an exact identity match.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        if self.identity != TypeIdentity::of::<T>() {
            return None;
        }
        Arc::clone(&self.object).downcast::<T>().ok()
    }

    /// Check whether both pointers refer to the same object.
    pub fn ptr_eq(&self, other: &Opaque) -> bool {
        Arc::ptr_eq(&self.object, &other.object)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({})", self.identity.name())
    }
}

// ============================================================================
// Value
// ============================================================================

/// A type-erased, reference-counted value.
///
/// Exactly one of `is_null`, `is_bool`, `is_int`, `is_double`, `is_string`,
/// `is_array`, `is_dict` holds for a non-pointer value; for an opaque pointer
/// none of them holds and `is_ptr` is true.
#[derive(Clone, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// Double-precision float.
    Double(f64),
    /// Immutable shared text.
    String(Arc<str>),
    /// Ordered sequence in shared storage.
    Array(SharedArray),
    /// Name to value mapping in shared storage.
    Dict(SharedDict),
    /// Opaque pointer to a host object.
    Ptr(Opaque),
}

impl Value {
    /// The null value.
    pub const fn null() -> Self {
        Value::Null
    }

    /// A new empty array.
    pub fn array() -> Self {
        Value::Array(SharedArray::new())
    }

    /// A new empty dict.
    pub fn dict() -> Self {
        Value::Dict(SharedDict::new())
    }

    /// Wrap a shared host object.
    pub fn ptr<T: Any + Send + Sync>(object: Arc<T>) -> Self {
        Value::Ptr(Opaque::new(object))
    }

    /// Wrap an optional host object; `None` becomes null.
    pub fn from_option_ptr<T: Any + Send + Sync>(object: Option<Arc<T>>) -> Self {
        object.map_or(Value::Null, Value::ptr)
    }

    // === Predicates ===

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value holds a boolean.
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Check if this value holds an integer.
    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    /// Check if this value holds a double.
    pub fn is_double(&self) -> bool {
        matches!(self, Value::Double(_))
    }

    /// Check if this value holds text.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Check if this value holds an array.
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Check if this value holds a dict.
    pub fn is_dict(&self) -> bool {
        matches!(self, Value::Dict(_))
    }

    /// True when none of the other predicates hold.
    pub fn is_ptr(&self) -> bool {
        !(self.is_null()
            || self.is_bool()
            || self.is_int()
            || self.is_double()
            || self.is_string()
            || self.is_array()
            || self.is_dict())
    }

    /// True when this is an opaque pointer to exactly `T`.
    pub fn is_ptr_type<T: Any + Send + Sync>(&self) -> bool {
        matches!(self, Value::Ptr(p) if p.identity() == TypeIdentity::of::<T>())
    }

    // === Scalar access ===

    /// The boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The integer payload, if any. Doubles are not truncated.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The double payload, if any. Integers are not widened.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// The text payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&**s),
            _ => None,
        }
    }

    // === Container access ===

    /// Array storage of this value, upgrading a null value in place.
    ///
    /// For any other non-array variant a detached empty array is returned
    /// and `self` is left untouched.
    pub fn as_array_mut(&mut self) -> SharedArray {
        if self.is_null() {
            *self = Value::array();
        }
        self.as_array()
    }

    /// Dict storage of this value, upgrading a null value in place.
    ///
    /// For any other non-dict variant a detached empty dict is returned
    /// and `self` is left untouched.
    pub fn as_dict_mut(&mut self) -> SharedDict {
        if self.is_null() {
            *self = Value::dict();
        }
        self.as_dict()
    }

    /// Array storage of this value, or a detached empty array.
    pub fn as_array(&self) -> SharedArray {
        match self {
            Value::Array(a) => a.clone(),
            _ => SharedArray::new(),
        }
    }

    /// Dict storage of this value, or a detached empty dict.
    pub fn as_dict(&self) -> SharedDict {
        match self {
            Value::Dict(d) => d.clone(),
            _ => SharedDict::new(),
        }
    }

    /// The stored pointer, if it points to exactly `T`.
    ///
    /// There is no upcast or downcast traversal.
    pub fn as_ptr<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Value::Ptr(p) => p.downcast::<T>(),
            _ => None,
        }
    }

    // === Identity ===

    /// Identity of the stored payload type, for diagnostics.
    ///
    /// Null reports the unit type; pointers report the pointee type. Class
    /// resolution only trusts the identity carried by [`Value::Ptr`].
    pub fn type_identity(&self) -> TypeIdentity {
        match self {
            Value::Null => TypeIdentity::of::<()>(),
            Value::Bool(_) => TypeIdentity::of::<bool>(),
            Value::Int(_) => TypeIdentity::of::<i64>(),
            Value::Double(_) => TypeIdentity::of::<f64>(),
            Value::String(_) => TypeIdentity::of::<String>(),
            Value::Array(_) => TypeIdentity::of::<Array>(),
            Value::Dict(_) => TypeIdentity::of::<Dict>(),
            Value::Ptr(p) => p.identity(),
        }
    }

    /// Short name of the active variant; pointers report the pointee type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Dict(_) => "dict",
            Value::Ptr(p) => p.identity().name(),
        }
    }

    /// Check whether both values share the same underlying storage.
    ///
    /// Scalars never share storage, so this is false for them.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Arc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Dict(a), Value::Dict(b)) => a.ptr_eq(b),
            (Value::Ptr(a), Value::Ptr(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => *a.read() == *b.read(),
            (Value::Dict(a), Value::Dict(b)) => *a.read() == *b.read(),
            // distinct objects are never equal
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(v) => write!(f, "Bool({})", v),
            Value::Int(v) => write!(f, "Int({})", v),
            Value::Double(v) => write!(f, "Double({})", v),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Array(a) => f.debug_tuple("Array").field(&*a.read()).finish(),
            Value::Dict(d) => f.debug_tuple("Dict").field(&*d.read()).finish(),
            Value::Ptr(p) => write!(f, "Ptr({})", p.identity().name()),
        }
    }
}

// ============================================================================
// Construction
// ============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(v as i64)
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Double(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(Arc::from(v))
    }
}

/// `None` becomes null.
impl From<Option<&str>> for Value {
    fn from(v: Option<&str>) -> Self {
        v.map_or(Value::Null, Value::from)
    }
}

impl From<Array> for Value {
    fn from(items: Array) -> Self {
        Value::Array(SharedArray::from(items))
    }
}

impl From<Dict> for Value {
    fn from(entries: Dict) -> Self {
        Value::Dict(SharedDict::from(entries))
    }
}

impl From<SharedArray> for Value {
    fn from(a: SharedArray) -> Self {
        Value::Array(a)
    }
}

impl From<SharedDict> for Value {
    fn from(d: SharedDict) -> Self {
        Value::Dict(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A {
        n: i32,
    }

    struct B;

    fn predicates(v: &Value) -> [bool; 8] {
        [
            v.is_null(),
            v.is_bool(),
            v.is_int(),
            v.is_double(),
            v.is_string(),
            v.is_array(),
            v.is_dict(),
            v.is_ptr(),
        ]
    }

    #[test]
    fn exactly_one_predicate_holds() {
        let values = [
            Value::null(),
            Value::from(true),
            Value::from(42i64),
            Value::from(1.5),
            Value::from("hello"),
            Value::array(),
            Value::dict(),
            Value::ptr(Arc::new(A { n: 1 })),
        ];
        for (i, v) in values.iter().enumerate() {
            let p = predicates(v);
            assert_eq!(p.iter().filter(|b| **b).count(), 1, "{:?}", v);
            assert!(p[i], "{:?} should satisfy predicate {}", v, i);
        }
    }

    #[test]
    fn default_is_null() {
        assert!(Value::default().is_null());
    }

    #[test]
    fn null_str_is_null() {
        assert!(Value::from(None::<&str>).is_null());
        assert!(Value::from(Some("x")).is_string());
    }

    #[test]
    fn ptr_round_trip() {
        let a = Arc::new(A { n: 7 });
        let v = Value::ptr(Arc::clone(&a));
        let back = v.as_ptr::<A>().unwrap();
        assert!(Arc::ptr_eq(&a, &back));
        assert_eq!(back.n, 7);
        assert!(v.as_ptr::<B>().is_none());
        assert!(v.is_ptr_type::<A>());
        assert!(!v.is_ptr_type::<B>());
    }

    #[test]
    fn as_ptr_on_non_pointer_is_none() {
        assert!(Value::from(1).as_ptr::<A>().is_none());
        assert!(Value::null().as_ptr::<A>().is_none());
    }

    #[test]
    fn optional_ptr() {
        assert!(Value::from_option_ptr::<A>(None).is_null());
        assert!(Value::from_option_ptr(Some(Arc::new(B))).is_ptr());
    }

    #[test]
    fn copies_share_array_storage() {
        let v = Value::array();
        let copy = v.clone();
        copy.as_array().push(1);
        copy.as_array().push("two");
        assert_eq!(v.as_array().len(), 2);
        assert_eq!(v.as_array().get(1).unwrap().as_str(), Some("two"));
        assert!(v.ptr_eq(&copy));
    }

    #[test]
    fn copies_share_dict_storage() {
        let v = Value::dict();
        let copy = v.clone();
        copy.as_dict().insert("k", 3);
        assert_eq!(v.as_dict().get("k").and_then(|x| x.as_int()), Some(3));
        assert!(v.as_dict().contains_key("k"));
    }

    #[test]
    fn null_upgrades_to_array() {
        let mut v = Value::null();
        v.as_array_mut().push(true);
        assert!(v.is_array());
        assert_eq!(v.as_array().len(), 1);
    }

    #[test]
    fn null_upgrades_to_dict() {
        let mut v = Value::null();
        v.as_dict_mut().insert("a", 1);
        assert!(v.is_dict());
        assert_eq!(v.as_dict().len(), 1);
    }

    #[test]
    fn mismatched_variant_is_not_upgraded() {
        let mut v = Value::from(5);
        let fallback = v.as_array_mut();
        fallback.push(1);
        assert!(v.is_int());
        assert!(v.as_array().is_empty());

        let mut s = Value::from("x");
        s.as_dict_mut().insert("k", 1);
        assert!(s.is_string());
    }

    #[test]
    fn read_access_does_not_upgrade() {
        let v = Value::null();
        assert!(v.as_array().is_empty());
        assert!(v.as_dict().is_empty());
        assert!(v.is_null());
    }

    #[test]
    fn shared_array_set_and_snapshot() {
        let a = SharedArray::from(vec![Value::from(1), Value::from(2)]);
        assert_eq!(a.set(0, 10).and_then(|v| v.as_int()), Some(1));
        assert!(a.set(5, 0).is_none());
        let snapshot = a.to_vec();
        a.push(3);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn shared_dict_remove_and_keys() {
        let d = SharedDict::new();
        d.insert("a", 1);
        d.insert("b", 2);
        let mut keys = d.keys();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
        assert!(d.remove("a").is_some());
        assert!(!d.contains_key("a"));
    }

    #[test]
    fn scalar_accessors() {
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(3u8).as_int(), Some(3));
        assert_eq!(Value::from(2.5f32).as_double(), Some(2.5));
        assert_eq!(Value::from(String::from("s")).as_str(), Some("s"));
        assert_eq!(Value::from(1).as_bool(), None);
    }

    #[test]
    fn type_identity_and_names() {
        assert_eq!(Value::from(1).type_identity(), TypeIdentity::of::<i64>());
        assert_eq!(Value::null().type_identity(), TypeIdentity::of::<()>());
        assert_eq!(
            Value::ptr(Arc::new(A { n: 0 })).type_identity(),
            TypeIdentity::of::<A>()
        );
        assert_eq!(Value::from(1.0).type_name(), "double");
        assert_eq!(Value::dict().type_name(), "dict");
    }

    #[test]
    fn equality() {
        assert_eq!(Value::from(1), Value::from(1));
        assert_ne!(Value::from(1), Value::from(1.0));
        assert_eq!(Value::from("a"), Value::from("a"));
        assert_eq!(
            Value::from(vec![Value::from(1)]),
            Value::from(vec![Value::from(1)])
        );
        assert_ne!(Value::ptr(Arc::new(B)), Value::ptr(Arc::new(B)));
        let p = Value::ptr(Arc::new(B));
        assert_eq!(p, p.clone());
    }

    #[test]
    fn debug_output() {
        assert_eq!(format!("{:?}", Value::null()), "Null");
        assert_eq!(format!("{:?}", Value::from(42)), "Int(42)");
        let array = Value::from(vec![Value::from(true)]);
        assert!(format!("{:?}", array).contains("Bool(true)"));
        assert!(format!("{:?}", Value::ptr(Arc::new(B))).starts_with("Ptr("));
    }
}
