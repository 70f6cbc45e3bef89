//! Reflected methods and their invocation thunks.
//!
//! A [`MethodInfo`] can be built two ways:
//!
//! - explicitly, from `(name, signature identity, fingerprint, arity, invoker)`
//!   with [`MethodInfo::new`] and an [`Invoker`] closure that does its own
//!   argument handling;
//! - from a typed Rust closure `Fn(&T, A1, .., An) -> R` (up to four
//!   arguments) through [`IntoMethod`], which derives arity, signature
//!   identity and fingerprint from the closure's type.
//!
//! ## Dispatch of typed closures
//!
//! Without the `full-dispatch` feature, only zero-argument closures returning
//! `()` are callable through the dynamic boundary; every other typed signature
//! is registered with a thunk that fails with [`InvokeError::NotImplemented`].
//! With `full-dispatch`, arguments are decoded with [`FromValue`], the arity
//! is checked, and the result is converted with [`IntoValue`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use mirror_core::{Context, FromValue, IntoValue, InvokeError, TypeHash, TypeIdentity, Value};

use crate::name_type::{NameTypeInfo, pad};

// ============================================================================
// Invoker
// ============================================================================

/// Trait for invocation thunks.
///
/// Receives the call context, the receiver value and the argument list.
pub trait Invocable {
    fn invoke(
        &self,
        ctx: &mut Context,
        receiver: &Value,
        args: &[Value],
    ) -> Result<Value, InvokeError>;
}

impl<F> Invocable for F
where
    F: Fn(&mut Context, &Value, &[Value]) -> Result<Value, InvokeError>,
{
    fn invoke(
        &self,
        ctx: &mut Context,
        receiver: &Value,
        args: &[Value],
    ) -> Result<Value, InvokeError> {
        (self)(ctx, receiver, args)
    }
}

/// Type-erased, cheaply clonable invocation thunk.
#[derive(Clone)]
pub struct Invoker {
    inner: Arc<dyn Invocable + Send + Sync>,
}

impl Invoker {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Context, &Value, &[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Wrap any [`Invocable`] implementation.
    pub fn from_invocable<I>(invocable: I) -> Self
    where
        I: Invocable + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(invocable),
        }
    }

    /// A thunk that always fails with [`InvokeError::NotImplemented`].
    pub fn not_implemented(method: impl Into<String>, signature: &'static str) -> Self {
        let method = method.into();
        Self::new(move |_: &mut Context, _: &Value, _: &[Value]| {
            Err(InvokeError::NotImplemented {
                method: method.clone(),
                signature,
            })
        })
    }

    /// Call the thunk.
    pub fn call(
        &self,
        ctx: &mut Context,
        receiver: &Value,
        args: &[Value],
    ) -> Result<Value, InvokeError> {
        self.inner.invoke(ctx, receiver, args)
    }
}

impl fmt::Debug for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invoker").finish_non_exhaustive()
    }
}

// ============================================================================
// MethodInfo
// ============================================================================

/// Metadata and thunk for one reflected method.
#[derive(Clone)]
pub struct MethodInfo {
    /// Name plus the identity of the full signature type.
    info: NameTypeInfo,
    /// Build-stable fingerprint of the signature.
    signature: TypeHash,
    arity: usize,
    invoker: Invoker,
}

impl MethodInfo {
    /// Create a method from an explicit descriptor tuple.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty.
    pub fn new(
        name: impl Into<String>,
        type_id: TypeIdentity,
        signature: TypeHash,
        arity: usize,
        invoker: Invoker,
    ) -> Self {
        Self {
            info: NameTypeInfo::new(name, type_id),
            signature,
            arity,
            invoker,
        }
    }

    /// Create a method of class `owner` from a typed closure.
    pub fn from_fn<T, M, F>(owner: &str, name: impl Into<String>, f: F) -> Self
    where
        F: IntoMethod<T, M>,
    {
        let name = name.into();
        let params = F::param_names();
        let signature = TypeHash::from_method(
            TypeHash::from_name(owner),
            &name,
            &params,
            F::return_name(),
        );
        let invoker = f.into_invoker(&name);
        Self::new(name, F::signature_type(), signature, F::ARITY, invoker)
    }

    /// Method name. Several methods of one class may share it.
    pub fn name(&self) -> &str {
        self.info.name()
    }

    /// Identity of the signature type. Used for diagnostics only.
    pub fn type_identity(&self) -> TypeIdentity {
        self.info.type_identity()
    }

    /// Shared name and type metadata.
    pub fn info(&self) -> &NameTypeInfo {
        &self.info
    }

    /// Fingerprint of owner, name, parameter types and return type.
    pub fn signature(&self) -> TypeHash {
        self.signature
    }

    /// Declared argument count.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Call the thunk with a receiver and an argument list.
    pub fn invoke(
        &self,
        ctx: &mut Context,
        receiver: &Value,
        args: &[Value],
    ) -> Result<Value, InvokeError> {
        self.invoker.call(ctx, receiver, args)
    }

    /// Diagnostic dump.
    pub fn dump(&self, indent: usize) -> String {
        let mut out = self.info.dump(indent);
        let field = pad(indent + 1);
        out.push_str(&format!("{field}arity: {}\n", self.arity));
        out.push_str(&format!("{field}signature: {}\n", self.signature));
        out
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("name", &self.name())
            .field("type_id", &self.type_identity())
            .field("signature", &self.signature)
            .field("arity", &self.arity)
            .finish()
    }
}

// ============================================================================
// Typed closures
// ============================================================================

/// Conversion of a typed closure into method metadata and a thunk.
///
/// `T` is the receiver type; `Marker` only disambiguates the arity-specific
/// implementations and is inferred.
pub trait IntoMethod<T, Marker>: Send + Sync + 'static {
    /// Number of arguments, excluding the receiver.
    const ARITY: usize;

    /// Identity of `fn(&T, A1, .., An) -> R`.
    fn signature_type() -> TypeIdentity;

    /// Diagnostic names of the argument types, in order.
    fn param_names() -> Vec<&'static str>;

    /// Diagnostic name of the return type.
    fn return_name() -> &'static str;

    /// Build the invocation thunk for a method called `method`.
    fn into_invoker(self, method: &str) -> Invoker;
}

fn method_receiver<T: Any + Send + Sync>(receiver: &Value) -> Result<Arc<T>, InvokeError> {
    receiver.as_ptr::<T>().ok_or_else(|| InvokeError::InvalidReceiver {
        expected: std::any::type_name::<T>(),
        actual: receiver.type_name(),
    })
}

/// Whether a typed signature can be called through the dynamic boundary.
const fn dispatchable(arity: usize, returns_void: bool) -> bool {
    cfg!(feature = "full-dispatch") || (arity == 0 && returns_void)
}

macro_rules! impl_into_method {
    ($arity:expr; $($arg:ident $val:ident),*) => {
        impl<T, R, F, $($arg,)*> IntoMethod<T, fn($($arg,)*) -> R> for F
        where
            T: Any + Send + Sync,
            R: IntoValue + 'static,
            $($arg: FromValue + 'static,)*
            F: Fn(&T, $($arg),*) -> R + Send + Sync + 'static,
        {
            const ARITY: usize = $arity;

            fn signature_type() -> TypeIdentity {
                TypeIdentity::of::<fn(&T, $($arg),*) -> R>()
            }

            fn param_names() -> Vec<&'static str> {
                vec![$(<$arg as FromValue>::TYPE_NAME),*]
            }

            fn return_name() -> &'static str {
                <R as IntoValue>::TYPE_NAME
            }

            fn into_invoker(self, method: &str) -> Invoker {
                if !dispatchable($arity, R::IS_VOID) {
                    return Invoker::not_implemented(
                        method,
                        std::any::type_name::<fn(&T, $($arg),*) -> R>(),
                    );
                }
                let method = method.to_string();
                Invoker::new(move |_: &mut Context, receiver: &Value, args: &[Value]| {
                    let [$($val),*] = args else {
                        return Err(InvokeError::ArityMismatch {
                            method: method.clone(),
                            expected: $arity,
                            got: args.len(),
                        });
                    };
                    let this = method_receiver::<T>(receiver)?;
                    let result = (self)(&*this, $(<$arg as FromValue>::from_value($val)?),*);
                    Ok(result.into_value())
                })
            }
        }
    };
}

impl_into_method!(0;);
impl_into_method!(1; A1 a1);
impl_into_method!(2; A1 a1, A2 a2);
impl_into_method!(3; A1 a1, A2 a2, A3 a3);
impl_into_method!(4; A1 a1, A2 a2, A3 a3, A4 a4);
