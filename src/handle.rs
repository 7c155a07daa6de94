//! Benchmark handles.
//!
//! A [`BenchFn`] is the identity the registry keys everything by. The id is
//! generated once when the handle is created, and every clone shares it, so
//! markers that return the handle never break identity-based association.

use crate::error::InvokeError;
use crate::value::{FromParam, Params};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Stable identity of a registered function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BenchId(u64);

impl BenchId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

type Invoke = dyn Fn(&Params) -> Result<(), InvokeError> + Send + Sync;

/// A callable registered as a benchmark or setup routine.
///
/// Equality and hashing use the identity only; the callable is never
/// inspected.
#[derive(Clone)]
pub struct BenchFn {
    id: BenchId,
    name: Arc<str>,
    arity: Option<usize>,
    func: Arc<Invoke>,
}

impl BenchFn {
    /// Wrap a typed function. Each argument is converted with [`FromParam`]
    /// when the handle is called.
    ///
    /// ```rust
    /// use cntryl_bench_registry::{params, BenchFn};
    ///
    /// let add = BenchFn::new("add", |a: i64, b: i64| a + b);
    /// assert_eq!(add.arity(), Some(2));
    /// assert!(add.call(&params![1, 2]).is_ok());
    /// assert!(add.call(&params![1]).is_err());
    /// ```
    pub fn new<F, Args>(name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: IntoBenchFn<Args>,
    {
        let name = name.into();
        let arity = F::ARITY;
        let func = f.into_invoke(Arc::clone(&name));
        Self {
            id: BenchId::next(),
            name,
            arity: Some(arity),
            func,
        }
    }

    /// Wrap a callable that receives the bound tuple as-is.
    pub fn raw<F>(name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(&Params) -> Result<(), InvokeError> + Send + Sync + 'static,
    {
        Self {
            id: BenchId::next(),
            name: name.into(),
            arity: None,
            func: Arc::new(f),
        }
    }

    /// Like [`BenchFn::raw`], but reports a declared argument count.
    ///
    /// The attribute macros use this to wrap functions of any arity,
    /// including ones that borrow their arguments.
    pub fn with_arity<F>(name: impl Into<Arc<str>>, arity: usize, f: F) -> Self
    where
        F: Fn(&Params) -> Result<(), InvokeError> + Send + Sync + 'static,
    {
        Self {
            arity: Some(arity),
            ..Self::raw(name, f)
        }
    }

    pub fn id(&self) -> BenchId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared argument count; `None` for raw callables.
    pub fn arity(&self) -> Option<usize> {
        self.arity
    }

    /// Invoke the callable with a bound tuple.
    pub fn call(&self, params: &Params) -> Result<(), InvokeError> {
        (self.func)(params)
    }
}

impl PartialEq for BenchFn {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BenchFn {}

impl Hash for BenchFn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for BenchFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BenchFn")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Functions that can be turned into a [`BenchFn`].
///
/// Implemented for `Fn(A1, .., An) -> R` up to twelve owned arguments where
/// every argument implements [`FromParam`]. `Args` only disambiguates the
/// impls. Functions taking references are wrapped by the attribute macros,
/// or by hand with [`BenchFn::with_arity`].
pub trait IntoBenchFn<Args>: Send + Sync + 'static {
    const ARITY: usize;

    #[doc(hidden)]
    fn into_invoke(self, name: Arc<str>) -> Arc<Invoke>;
}

#[doc(hidden)]
pub fn check_arity(name: &str, expected: usize, params: &Params) -> Result<(), InvokeError> {
    if params.len() == expected {
        Ok(())
    } else {
        Err(InvokeError::Arity {
            name: name.to_string(),
            expected,
            found: params.len(),
        })
    }
}

#[doc(hidden)]
pub fn arg<T: FromParam>(name: &str, params: &Params, index: usize) -> Result<T, InvokeError> {
    // Arity was checked first, so the index is always bound.
    let value = &params.as_slice()[index];
    T::from_param(value).map_err(|source| InvokeError::Param {
        name: name.to_string(),
        index,
        source,
    })
}

macro_rules! impl_into_bench_fn {
    ($arity:literal; $($arg:ident : $idx:tt),*) => {
        impl<F, R, $($arg,)*> IntoBenchFn<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            $($arg: FromParam,)*
        {
            const ARITY: usize = $arity;

            fn into_invoke(self, name: Arc<str>) -> Arc<Invoke> {
                Arc::new(move |params: &Params| -> Result<(), InvokeError> {
                    check_arity(&name, $arity, params)?;
                    let result = (self)($(arg::<$arg>(&name, params, $idx)?),*);
                    std::hint::black_box(result);
                    Ok(())
                })
            }
        }
    };
}

impl_into_bench_fn!(0;);
impl_into_bench_fn!(1; A1: 0);
impl_into_bench_fn!(2; A1: 0, A2: 1);
impl_into_bench_fn!(3; A1: 0, A2: 1, A3: 2);
impl_into_bench_fn!(4; A1: 0, A2: 1, A3: 2, A4: 3);
impl_into_bench_fn!(5; A1: 0, A2: 1, A3: 2, A4: 3, A5: 4);
impl_into_bench_fn!(6; A1: 0, A2: 1, A3: 2, A4: 3, A5: 4, A6: 5);
impl_into_bench_fn!(7; A1: 0, A2: 1, A3: 2, A4: 3, A5: 4, A6: 5, A7: 6);
impl_into_bench_fn!(8; A1: 0, A2: 1, A3: 2, A4: 3, A5: 4, A6: 5, A7: 6, A8: 7);
impl_into_bench_fn!(9; A1: 0, A2: 1, A3: 2, A4: 3, A5: 4, A6: 5, A7: 6, A8: 7, A9: 8);
impl_into_bench_fn!(10; A1: 0, A2: 1, A3: 2, A4: 3, A5: 4, A6: 5, A7: 6, A8: 7, A9: 8, A10: 9);
impl_into_bench_fn!(11; A1: 0, A2: 1, A3: 2, A4: 3, A5: 4, A6: 5, A7: 6, A8: 7, A9: 8, A10: 9, A11: 10);
impl_into_bench_fn!(12; A1: 0, A2: 1, A3: 2, A4: 3, A5: 4, A6: 5, A7: 6, A8: 7, A9: 8, A10: 9, A11: 10, A12: 11);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParamError;
    use crate::params;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn should_share_identity_when_cloned() {
        let f = BenchFn::new("noop", || {});
        let g = f.clone();
        assert_eq!(f, g);
        assert_eq!(f.id(), g.id());
    }

    #[test]
    fn should_differ_when_wrapping_same_function_twice() {
        fn noop() {}
        assert_ne!(BenchFn::new("noop", noop), BenchFn::new("noop", noop));
    }

    #[test]
    fn should_forward_arguments_when_called() {
        static SUM: AtomicUsize = AtomicUsize::new(0);
        let f = BenchFn::new("sum", |a: usize, b: usize| {
            SUM.store(a + b, Ordering::SeqCst);
        });
        f.call(&params![2, 3]).unwrap();
        assert_eq!(SUM.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn should_fail_late_when_arity_differs() {
        let f = BenchFn::new("pair", |_: i64, _: i64| {});
        let err = f.call(&Params::empty()).unwrap_err();
        assert_eq!(
            err,
            InvokeError::Arity {
                name: "pair".to_string(),
                expected: 2,
                found: 0,
            }
        );
    }

    #[test]
    fn should_fail_late_when_argument_type_differs() {
        let f = BenchFn::new("flag", |_: bool| {});
        let err = f.call(&params![1]).unwrap_err();
        assert_eq!(
            err,
            InvokeError::Param {
                name: "flag".to_string(),
                index: 0,
                source: ParamError::TypeMismatch {
                    expected: "bool",
                    found: "int",
                },
            }
        );
    }

    #[test]
    fn should_pass_tuple_through_when_raw() {
        let f = BenchFn::raw("raw", |p: &Params| {
            if p.len() == 3 {
                Ok(())
            } else {
                Err(InvokeError::failed("raw", "want three"))
            }
        });
        assert_eq!(f.arity(), None);
        assert!(f.call(&params![1, 2, 3]).is_ok());
        assert!(f.call(&params![1]).is_err());
    }

    #[test]
    fn should_accept_seven_arguments_when_typed() {
        static TOTAL: AtomicUsize = AtomicUsize::new(0);
        let f = BenchFn::new(
            "seven",
            |a: usize, b: usize, c: usize, d: usize, e: usize, g: usize, h: usize| {
                TOTAL.store(a + b + c + d + e + g + h, Ordering::SeqCst);
            },
        );
        assert_eq!(f.arity(), Some(7));
        f.call(&params![1, 2, 3, 4, 5, 6, 7]).unwrap();
        assert_eq!(TOTAL.load(Ordering::SeqCst), 28);
    }

    #[test]
    fn should_report_declared_arity_when_wrapping_borrowed_arguments() {
        fn checksum(data: &[u8], label: &str) -> usize {
            data.iter().map(|&b| b as usize).sum::<usize>() + label.len()
        }
        static SEEN: AtomicUsize = AtomicUsize::new(0);
        let f = BenchFn::with_arity("checksum", 2, |p: &Params| -> Result<(), InvokeError> {
            check_arity("checksum", 2, p)?;
            let data: Vec<u8> = arg("checksum", p, 0)?;
            let label: String = arg("checksum", p, 1)?;
            SEEN.store(checksum(&data, &label), Ordering::SeqCst);
            Ok(())
        });
        assert_eq!(f.arity(), Some(2));
        f.call(&params![vec![1u8, 2, 3], "ab"]).unwrap();
        assert_eq!(SEEN.load(Ordering::SeqCst), 8);
        assert!(matches!(
            f.call(&params![1]),
            Err(InvokeError::Arity { expected: 2, found: 1, .. })
        ));
    }
}
