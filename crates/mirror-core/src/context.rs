//! Per-call invocation context.
//!
//! A [`Context`] is handed to every invocation thunk. It carries typed user
//! data supplied by the embedding application and tracks how deeply
//! invocations are nested, so a thunk that calls back into the registry can
//! see where it sits in the call chain.

use std::any::{Any, TypeId};
use std::fmt;
use std::ops::{Deref, DerefMut};

use rustc_hash::FxHashMap;

/// State shared by the invocations of one logical call chain.
#[derive(Default)]
pub struct Context {
    user_data: FxHashMap<TypeId, Box<dyn Any + Send>>,
    depth: usize,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store user data, replacing any previous value of the same type.
    pub fn insert<T: Any + Send>(&mut self, data: T) -> Option<T> {
        self.user_data
            .insert(TypeId::of::<T>(), Box::new(data))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Get user data of type `T`.
    pub fn get<T: Any + Send>(&self) -> Option<&T> {
        self.user_data.get(&TypeId::of::<T>())?.downcast_ref::<T>()
    }

    /// Get mutable user data of type `T`.
    pub fn get_mut<T: Any + Send>(&mut self) -> Option<&mut T> {
        self.user_data
            .get_mut(&TypeId::of::<T>())?
            .downcast_mut::<T>()
    }

    /// Remove user data of type `T`.
    pub fn remove<T: Any + Send>(&mut self) -> Option<T> {
        self.user_data
            .remove(&TypeId::of::<T>())
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Number of invocations currently in progress on this context.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Mark the start of a nested invocation.
    pub fn enter(&mut self) {
        self.depth += 1;
    }

    /// Mark the end of a nested invocation.
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Enter a nested invocation that is left when the guard drops,
    /// including during unwinding.
    pub fn scope(&mut self) -> ContextScope<'_> {
        self.enter();
        ContextScope { ctx: self }
    }
}

/// Guard returned by [`Context::scope`].
pub struct ContextScope<'a> {
    ctx: &'a mut Context,
}

impl Deref for ContextScope<'_> {
    type Target = Context;

    fn deref(&self) -> &Context {
        self.ctx
    }
}

impl DerefMut for ContextScope<'_> {
    fn deref_mut(&mut self) -> &mut Context {
        self.ctx
    }
}

impl Drop for ContextScope<'_> {
    fn drop(&mut self) {
        self.ctx.leave();
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("user_data_count", &self.user_data.len())
            .field("depth", &self.depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Counter(u32);

    #[test]
    fn user_data_round_trip() {
        let mut ctx = Context::new();
        assert!(ctx.get::<Counter>().is_none());

        assert!(ctx.insert(Counter(1)).is_none());
        assert_eq!(ctx.get::<Counter>(), Some(&Counter(1)));

        ctx.get_mut::<Counter>().unwrap().0 += 1;
        assert_eq!(ctx.insert(Counter(10)), Some(Counter(2)));
        assert_eq!(ctx.remove::<Counter>(), Some(Counter(10)));
        assert!(ctx.get::<Counter>().is_none());
    }

    #[test]
    fn user_data_is_keyed_by_type() {
        let mut ctx = Context::new();
        ctx.insert(5u32);
        ctx.insert(String::from("x"));
        assert_eq!(ctx.get::<u32>(), Some(&5));
        assert_eq!(ctx.get::<String>().map(String::as_str), Some("x"));
    }

    #[test]
    fn depth_tracking() {
        let mut ctx = Context::new();
        ctx.enter();
        ctx.enter();
        assert_eq!(ctx.depth(), 2);
        ctx.leave();
        ctx.leave();
        ctx.leave();
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn scope_leaves_on_drop() {
        let mut ctx = Context::new();
        {
            let mut outer = ctx.scope();
            assert_eq!(outer.depth(), 1);
            let inner = outer.scope();
            assert_eq!(inner.depth(), 2);
        }
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn scope_leaves_on_panic() {
        let mut ctx = Context::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _scope = ctx.scope();
            panic!("thunk failed");
        }));
        assert!(result.is_err());
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn debug_output() {
        let debug = format!("{:?}", Context::new());
        assert_eq!(debug, "Context { user_data_count: 0, depth: 0 }");
    }
}
