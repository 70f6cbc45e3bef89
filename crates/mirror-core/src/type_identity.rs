//! Exact-match runtime type identity.
//!
//! [`TypeIdentity`] is the token used wherever the reflection layer needs to
//! know whether two things are *the same* Rust type. It never encodes an
//! "is-a" relationship: a derived class and its base have distinct identities,
//! and `&T`, `T` and `Arc<T>` are all different.
//!
//! # Examples
//!
//! ```
//! use mirror_core::TypeIdentity;
//!
//! let a = TypeIdentity::of::<i64>();
//! assert_eq!(a, TypeIdentity::of::<i64>());
//! assert_ne!(a, TypeIdentity::of::<i32>());
//! assert_eq!(a.name(), "i64");
//! ```

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A process-wide stable identifier for a host type.
///
/// Equality, ordering and hashing only look at the underlying [`TypeId`].
/// The type name is kept for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeIdentity {
    id: TypeId,
    name: &'static str,
}

impl TypeIdentity {
    /// Identity of `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`.
    #[inline]
    pub const fn raw_id(&self) -> TypeId {
        self.id
    }

    /// Diagnostic name of the type, as reported by `std::any::type_name`.
    ///
    /// Not guaranteed to be unique or stable across compiler versions.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Check whether this identity denotes `T`.
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeIdentity {}

impl Hash for TypeIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeIdentity({})", self.name)
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
