//! Process-wide class registry.
//!
//! The registry is populated exactly once by [`init`] and is read-only
//! afterwards, so lookups and invocations from any thread need no locking.
//!
//! ```
//! use mirror_registry::{global, ClassInfo};
//!
//! struct Greeter;
//!
//! let registry = global::init(|registry| {
//!     registry.add_class(ClassInfo::new::<Greeter>("Greeter", None));
//! });
//! assert!(registry.contains("Greeter"));
//! assert!(std::ptr::eq(registry, global::global().unwrap()));
//! ```

use std::sync::OnceLock;

use crate::registry::ClassRegistry;

static GLOBAL: OnceLock<ClassRegistry> = OnceLock::new();

/// Populate the process-wide registry and return it.
///
/// Only the first call runs `register`; later calls return the registry
/// built by that first call.
pub fn init<F>(register: F) -> &'static ClassRegistry
where
    F: FnOnce(&mut ClassRegistry),
{
    let mut fresh = false;
    let registry = GLOBAL.get_or_init(|| {
        fresh = true;
        let mut registry = ClassRegistry::new();
        register(&mut registry);
        registry
    });
    if fresh {
        tracing::debug!(classes = registry.len(), "initialised global class registry");
    } else {
        tracing::debug!("global class registry already initialised");
    }
    registry
}

/// The process-wide registry, if [`init`] has run.
pub fn global() -> Option<&'static ClassRegistry> {
    GLOBAL.get()
}
