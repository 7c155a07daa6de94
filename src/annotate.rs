//! Explicit markers over a caller-owned [`Registry`].
//!
//! These mirror the `#[benchmark]`, `#[param(..)]` and `#[case_setup]`
//! attributes for code that builds registries at runtime. Every marker
//! returns the handle it was given, so markers can be applied in any order
//! and still resolve to one identity.
//!
//! ```rust
//! use cntryl_bench_registry::{annotate, params, BenchFn, Registry};
//!
//! let mut registry = Registry::new();
//! let f = BenchFn::new("encode", |size: usize| vec![0u8; size]);
//!
//! let f = annotate::param(params![4096]).apply(&mut registry, f);
//! let f = annotate::benchmark(&mut registry, f);
//!
//! assert_eq!(registry.benchmarks(), &[f.clone()]);
//! assert_eq!(registry.parameters_for(&f), Some(&params![4096]));
//! ```

use crate::handle::BenchFn;
use crate::registry::Registry;
use crate::value::Params;

/// Mark `f` as a benchmark.
pub fn benchmark(registry: &mut Registry, f: BenchFn) -> BenchFn {
    registry.register_benchmark(f)
}

/// Build a marker that binds `args` to whatever it is applied to.
pub fn param(args: impl Into<Params>) -> ParamMarker {
    ParamMarker { args: args.into() }
}

/// Make `f` its own setup routine.
pub fn case_setup(registry: &mut Registry, f: BenchFn) -> BenchFn {
    registry.bind_setup(f)
}

/// Bind `setup` to a different benchmark.
pub fn case_setup_for(registry: &mut Registry, target: &BenchFn, setup: BenchFn) -> BenchFn {
    registry.bind_setup_for(target, setup)
}

/// Marker produced by [`param`].
#[derive(Debug, Clone)]
pub struct ParamMarker {
    args: Params,
}

impl ParamMarker {
    pub fn apply(self, registry: &mut Registry, f: BenchFn) -> BenchFn {
        registry.bind_parameters(f, self.args)
    }
}

/// Fluent form: apply several markers to one handle.
///
/// ```rust
/// use cntryl_bench_registry::{params, BenchFn, Registry};
///
/// let mut registry = Registry::new();
/// let f = registry
///     .declare(BenchFn::new("add", |a: i64, b: i64| a + b))
///     .case_setup()
///     .param(params![1, 2])
///     .benchmark()
///     .finish();
///
/// assert!(registry.contains(&f));
/// assert_eq!(registry.setup_for(&f), Some(&f));
/// ```
pub struct Declaration<'r> {
    registry: &'r mut Registry,
    f: BenchFn,
}

impl Registry {
    /// Start a [`Declaration`] for `f`.
    pub fn declare(&mut self, f: BenchFn) -> Declaration<'_> {
        Declaration { registry: self, f }
    }
}

impl<'r> Declaration<'r> {
    pub fn benchmark(self) -> Self {
        self.registry.register_benchmark(self.f.clone());
        self
    }

    pub fn param(self, args: impl Into<Params>) -> Self {
        self.registry.bind_parameters(self.f.clone(), args);
        self
    }

    pub fn case_setup(self) -> Self {
        self.registry.bind_setup(self.f.clone());
        self
    }

    /// Bind `setup` to the declared function.
    pub fn with_setup(self, setup: BenchFn) -> Self {
        self.registry.bind_setup_for(&self.f, setup);
        self
    }

    /// The declared handle, identical to the one passed to `declare`.
    pub fn finish(self) -> BenchFn {
        self.f
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    fn stacked(order: &[&str]) -> (Registry, BenchFn) {
        let mut registry = Registry::new();
        let mut f = BenchFn::new("f", |_: i64, _: i64| {});
        for marker in order {
            f = match *marker {
                "benchmark" => benchmark(&mut registry, f),
                "param" => param(params![1, 2]).apply(&mut registry, f),
                "case_setup" => case_setup(&mut registry, f),
                other => unreachable!("unknown marker {other}"),
            };
        }
        (registry, f)
    }

    #[test]
    fn should_reach_same_state_when_stacking_order_differs() {
        let orders: [[&str; 3]; 6] = [
            ["benchmark", "param", "case_setup"],
            ["benchmark", "case_setup", "param"],
            ["param", "benchmark", "case_setup"],
            ["param", "case_setup", "benchmark"],
            ["case_setup", "benchmark", "param"],
            ["case_setup", "param", "benchmark"],
        ];
        for order in orders {
            let (registry, f) = stacked(&order);
            assert_eq!(registry.benchmarks(), &[f.clone()], "{order:?}");
            assert_eq!(registry.parameters_for(&f), Some(&params![1, 2]), "{order:?}");
            assert_eq!(registry.setup_for(&f), Some(&f), "{order:?}");
        }
    }

    #[test]
    fn should_return_same_identity_when_marked() {
        let mut registry = Registry::new();
        let f = BenchFn::new("f", || {});
        let g = param(params![]).apply(&mut registry, f.clone());
        assert_eq!(f.id(), g.id());
    }

    #[test]
    fn should_bind_other_setup_when_declared_with_setup() {
        let mut registry = Registry::new();
        let prepare = BenchFn::new("prepare", || {});
        let f = registry
            .declare(BenchFn::new("run", || {}))
            .with_setup(prepare.clone())
            .benchmark()
            .finish();

        assert_eq!(registry.setup_for(&f), Some(&prepare));
        assert!(registry.setup_for(&prepare).is_none());
    }
}
