//! Deterministic signature fingerprints.
//!
//! [`TypeHash`] is a 64-bit hash computed from names: a class name, or an
//! owner + method name + ordered parameter types + return type. Unlike
//! [`TypeIdentity`](crate::TypeIdentity), the value is stable across builds,
//! which makes it useful in diagnostic dumps and logs where overloads sharing
//! a name must be told apart.
//!
//! Fingerprints are never used to select a method at call time.
//!
//! # Examples
//!
//! ```
//! use mirror_core::TypeHash;
//!
//! let owner = TypeHash::from_name("Player");
//! let a = TypeHash::from_method(owner, "move_by", &["f64"], "()");
//! let b = TypeHash::from_method(owner, "move_by", &["i64"], "()");
//! assert_ne!(a, b);
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Separator constant for chained components.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for type hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for method hashes.
    pub const METHOD: u64 = 0x7d3c8b4a92e15f6d;

    /// Domain marker mixed in for the return type.
    pub const RETURN: u64 = 0x5ea77ffbcdf5f302;

    /// Parameter position mixing constants.
    /// Each position gets its own constant so parameter order matters.
    pub const PARAM_MARKERS: [u64; 8] = [
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xd6e8feb86659fd93,
        0xe7037ed1a0b428db,
        0xc6a4a7935bd1e995,
        0x8648dbbc94d49b8d,
        0xa2b48b2c69e0d657,
    ];
}

/// A deterministic 64-bit fingerprint of a type or method signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Hash of a type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Hash of a method signature.
    ///
    /// Parameter order matters: `(i64, f64)` and `(f64, i64)` hash differently.
    pub fn from_method(owner: TypeHash, name: &str, params: &[&str], ret: &str) -> Self {
        let mut hash = hash_constants::METHOD ^ owner.0 ^ xxh64(name.as_bytes(), 0);
        for (i, param) in params.iter().enumerate() {
            let marker = hash_constants::PARAM_MARKERS
                .get(i)
                .copied()
                .unwrap_or_else(|| hash_constants::PARAM_MARKERS[0].wrapping_add(i as u64));
            // wrapping_mul keeps the chain non-commutative
            hash = hash
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(marker ^ xxh64(param.as_bytes(), 0));
        }
        hash = hash
            .wrapping_mul(hash_constants::SEP)
            .wrapping_add(hash_constants::RETURN ^ xxh64(ret.as_bytes(), 0));
        TypeHash(hash)
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
