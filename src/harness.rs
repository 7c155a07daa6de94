//! Discovery of benchmarks declared with attributes.
//!
//! When you use `#[benchmark]`, `#[param(..)]` and `#[case_setup]`, this is
//! what happens:
//!
//! 1. Each attribute leaves the function untouched and adds one entry to a
//!    distributed slice via linkme, keyed by `module_path!()::fn_name`
//! 2. [`Registry::discover`] walks the slices and creates exactly one
//!    [`BenchFn`] per key, so stacked attributes share an identity
//! 3. [`Registry::global`] does that once per process, on first use
//!
//! Benchmarks are listed by (source file, line, column) of their attribute,
//! which is declaration order within a file. Parameter attributes stacked on
//! one function apply innermost first, so the outermost one wins.

use crate::handle::BenchFn;
use crate::registry::Registry;
use crate::value::{ParamValue, Params};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Location of an attribute, used to order entries.
#[doc(hidden)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Site {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

/// Emitted by `#[benchmark]`.
#[doc(hidden)]
pub struct BenchmarkEntry {
    /// `module_path!()::fn_name`
    pub key: &'static str,
    /// Builds the handle for this function
    pub make: fn() -> BenchFn,
    pub site: Site,
}

/// Emitted by `#[param(..)]`.
#[doc(hidden)]
pub struct ParamEntry {
    pub key: &'static str,
    pub make: fn() -> BenchFn,
    pub values: &'static [ParamValue],
    /// Number of `#[param]` attributes nested below this one
    pub rank: u32,
    pub site: Site,
}

/// Emitted by `#[case_setup]`.
#[doc(hidden)]
pub struct SetupEntry {
    /// Key of the benchmark being set up; equals `key` for self-association
    pub target: &'static str,
    /// Fallback used only when the target has no entry of its own
    pub make_target: fn() -> BenchFn,
    /// Key of the setup routine itself
    pub key: &'static str,
    pub make: fn() -> BenchFn,
    pub site: Site,
}

// Re-export linkme for the proc macros
#[doc(hidden)]
pub use linkme;

/// Distributed slice collecting `#[benchmark]` declarations.
#[doc(hidden)]
#[linkme::distributed_slice]
pub static BENCHMARKS: [BenchmarkEntry];

/// Distributed slice collecting `#[param(..)]` declarations.
#[doc(hidden)]
#[linkme::distributed_slice]
pub static PARAMS: [ParamEntry];

/// Distributed slice collecting `#[case_setup]` declarations.
#[doc(hidden)]
#[linkme::distributed_slice]
pub static SETUPS: [SetupEntry];

impl Registry {
    /// Build a fresh registry from every attribute-declared benchmark linked
    /// into the binary.
    ///
    /// Each call creates new handles; use [`Registry::global`] to share one
    /// instance.
    pub fn discover() -> Self {
        resolve(&BENCHMARKS, &PARAMS, &SETUPS)
    }

    /// The process-wide registry, discovered on first use and read-only
    /// afterwards.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::discover)
    }

    /// Look up a discovered handle by its `module::function` name.
    ///
    /// Searches benchmarks first, then functions carrying only metadata.
    pub fn find(&self, name: &str) -> Option<&BenchFn> {
        self.benchmarks()
            .iter()
            .find(|f| f.name() == name)
            .or_else(|| self.orphans().into_iter().find(|f| f.name() == name))
    }
}

/// One handle per declared function.
#[derive(Default)]
struct Handles(HashMap<&'static str, BenchFn>);

impl Handles {
    fn get(&mut self, key: &'static str, make: fn() -> BenchFn) -> BenchFn {
        self.0.entry(key).or_insert_with(make).clone()
    }
}

fn resolve(
    benchmarks: &[BenchmarkEntry],
    params: &[ParamEntry],
    setups: &[SetupEntry],
) -> Registry {
    let mut handles = Handles::default();
    let mut registry = Registry::new();

    let mut benchmarks: Vec<&BenchmarkEntry> = benchmarks.iter().collect();
    benchmarks.sort_by_key(|e| e.site);
    for entry in benchmarks {
        registry.register_benchmark(handles.get(entry.key, entry.make));
    }

    let mut params: Vec<&ParamEntry> = params.iter().collect();
    params.sort_by_key(|e| (e.key, e.rank, e.site));
    for entry in params {
        let f = handles.get(entry.key, entry.make);
        registry.bind_parameters(f, Params::from(entry.values));
    }

    let mut setups: Vec<&SetupEntry> = setups.iter().collect();
    setups.sort_by_key(|e| e.site);
    // A setup's own make knows its signature; a target's make may not.
    for entry in &setups {
        handles.get(entry.key, entry.make);
    }
    for entry in setups {
        let target = handles.get(entry.target, entry.make_target);
        let setup = handles.get(entry.key, entry.make);
        registry.bind_setup_for(&target, setup);
    }

    tracing::debug!(
        benchmarks = registry.len(),
        declared = handles.0.len(),
        orphans = registry.orphans().len(),
        "discovered declared benchmarks"
    );

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    fn site(line: u32) -> Site {
        Site {
            file: "benches/suite.rs",
            line,
            column: 1,
        }
    }

    fn make_a() -> BenchFn {
        BenchFn::new("suite::a", || {})
    }

    fn make_b() -> BenchFn {
        BenchFn::new("suite::b", |_: i64, _: i64| {})
    }

    fn make_c() -> BenchFn {
        BenchFn::new("suite::c", || {})
    }

    static ONE: [ParamValue; 1] = [ParamValue::Int(1)];
    static ONE_TWO: [ParamValue; 2] = [ParamValue::Int(1), ParamValue::Int(2)];

    fn names(registry: &Registry) -> Vec<&str> {
        registry.benchmarks().iter().map(|f| f.name()).collect()
    }

    #[test]
    fn should_order_by_site_when_slice_is_unordered() {
        let entries = [
            BenchmarkEntry { key: "suite::c", make: make_c, site: site(30) },
            BenchmarkEntry { key: "suite::a", make: make_a, site: site(10) },
            BenchmarkEntry { key: "suite::b", make: make_b, site: site(20) },
        ];
        let registry = resolve(&entries, &[], &[]);
        assert_eq!(names(&registry), vec!["suite::a", "suite::b", "suite::c"]);
    }

    #[test]
    fn should_share_handle_when_key_repeats() {
        let entries = [
            BenchmarkEntry { key: "suite::a", make: make_a, site: site(10) },
            BenchmarkEntry { key: "suite::a", make: make_a, site: site(11) },
        ];
        let registry = resolve(&entries, &[], &[]);
        let listed = registry.benchmarks();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0], listed[1]);
    }

    #[test]
    fn should_keep_outermost_params_when_stacked() {
        let benches = [BenchmarkEntry { key: "suite::b", make: make_b, site: site(20) }];
        let params = [
            ParamEntry { key: "suite::b", make: make_b, values: &ONE_TWO, rank: 1, site: site(18) },
            ParamEntry { key: "suite::b", make: make_b, values: &ONE, rank: 0, site: site(19) },
        ];
        let registry = resolve(&benches, &params, &[]);
        let b = &registry.benchmarks()[0];
        assert_eq!(registry.parameters_for(b), Some(&params![1, 2]));
    }

    #[test]
    fn should_bind_other_benchmark_when_setup_has_target() {
        let benches = [BenchmarkEntry { key: "suite::b", make: make_b, site: site(20) }];
        let setups = [SetupEntry {
            target: "suite::b",
            make_target: make_b,
            key: "suite::c",
            make: make_c,
            site: site(5),
        }];
        let registry = resolve(&benches, &[], &setups);
        let b = &registry.benchmarks()[0];
        assert_eq!(registry.setup_for(b).map(|s| s.name()), Some("suite::c"));
        assert!(registry.orphans().is_empty());
    }

    fn make_unbound_b() -> BenchFn {
        BenchFn::raw("suite::b", |_: &Params| {
            Err(crate::error::InvokeError::failed("suite::b", "declared only as a setup target"))
        })
    }

    #[test]
    fn should_prefer_declared_handle_when_setup_target_has_own_entry() {
        let setups = [
            SetupEntry {
                target: "suite::b",
                make_target: make_unbound_b,
                key: "suite::c",
                make: make_c,
                site: site(5),
            },
            SetupEntry {
                target: "suite::b",
                make_target: make_b,
                key: "suite::b",
                make: make_b,
                site: site(9),
            },
        ];
        let registry = resolve(&[], &[], &setups);
        let b = registry.find("suite::b").expect("target is discoverable");
        assert_eq!(b.arity(), Some(2));
        assert!(b.call(&params![1, 2]).is_ok());
    }

    #[test]
    fn should_fail_late_when_setup_target_has_no_entry() {
        let setups = [SetupEntry {
            target: "suite::b",
            make_target: make_unbound_b,
            key: "suite::c",
            make: make_c,
            site: site(5),
        }];
        let registry = resolve(&[], &[], &setups);
        let b = registry.find("suite::b").expect("target is discoverable");
        assert_eq!(registry.setup_for(b).map(|s| s.name()), Some("suite::c"));
        assert!(matches!(
            b.call(&Params::empty()),
            Err(crate::error::InvokeError::Failed { .. })
        ));
    }

    #[test]
    fn should_keep_orphan_params_when_never_marked_benchmark() {
        let params = [ParamEntry { key: "suite::a", make: make_a, values: &ONE, rank: 0, site: site(1) }];
        let registry = resolve(&[], &params, &[]);
        assert!(registry.is_empty());
        let orphan = registry.find("suite::a").expect("orphan is discoverable by name");
        assert_eq!(registry.parameters_for(orphan), Some(&params![1]));
    }
}
