//! The benchmark registry.
//!
//! Holds the three associations a runner consumes: the ordered benchmark
//! sequence, the parameter tuple per identity and the setup routine per
//! identity. Mutation never validates or fails; problems surface when a
//! [`Case`] is invoked.

use crate::case::Case;
use crate::config::SelectionConfig;
use crate::handle::{BenchFn, BenchId};
use crate::manifest::{Manifest, ManifestEntry};
use crate::value::Params;
use std::collections::HashMap;

/// Registered benchmarks with their parameter and setup bindings.
///
/// # Example
///
/// ```rust
/// use cntryl_bench_registry::{params, BenchFn, Registry};
///
/// let mut registry = Registry::new();
/// let add = registry.register_benchmark(BenchFn::new("add", |a: i64, b: i64| a + b));
/// registry.bind_parameters(add.clone(), params![1, 2]);
///
/// assert_eq!(registry.benchmarks(), &[add.clone()]);
/// assert_eq!(registry.parameters_for(&add), Some(&params![1, 2]));
/// assert!(registry.setup_for(&add).is_none());
/// ```
#[derive(Debug, Default, Clone)]
pub struct Registry {
    benchmarks: Vec<BenchFn>,
    parameters: HashMap<BenchId, Params>,
    setups: HashMap<BenchId, BenchFn>,
    // Handles that own metadata, so orphans can still be named.
    known: HashMap<BenchId, BenchFn>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `f` to the benchmark sequence. Registering twice lists it twice.
    pub fn register_benchmark(&mut self, f: BenchFn) -> BenchFn {
        self.benchmarks.push(f.clone());
        f
    }

    /// Bind `args` to `f`'s identity, replacing any earlier tuple.
    pub fn bind_parameters(&mut self, f: BenchFn, args: impl Into<Params>) -> BenchFn {
        self.parameters.insert(f.id(), args.into());
        self.remember(&f);
        f
    }

    /// Make `f` its own setup routine.
    pub fn bind_setup(&mut self, f: BenchFn) -> BenchFn {
        self.bind_setup_for(&f, f.clone())
    }

    /// Bind `setup` as the setup routine of `target`, replacing any earlier
    /// binding. Returns `setup`.
    pub fn bind_setup_for(&mut self, target: &BenchFn, setup: BenchFn) -> BenchFn {
        self.setups.insert(target.id(), setup.clone());
        self.remember(target);
        setup
    }

    fn remember(&mut self, f: &BenchFn) {
        self.known.entry(f.id()).or_insert_with(|| f.clone());
    }

    /// Registered benchmarks in declaration order.
    pub fn benchmarks(&self) -> &[BenchFn] {
        &self.benchmarks
    }

    /// `None` means "invoke with no arguments".
    pub fn parameters_for(&self, f: &BenchFn) -> Option<&Params> {
        self.parameters.get(&f.id())
    }

    /// `None` means "no setup routine".
    pub fn setup_for(&self, f: &BenchFn) -> Option<&BenchFn> {
        self.setups.get(&f.id())
    }

    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }

    pub fn contains(&self, f: &BenchFn) -> bool {
        self.benchmarks.iter().any(|b| b == f)
    }

    /// Handles carrying parameters or a setup binding that were never
    /// registered as benchmarks, ordered by identity.
    pub fn orphans(&self) -> Vec<&BenchFn> {
        let mut orphans: Vec<&BenchFn> = self
            .known
            .values()
            .filter(|f| !self.contains(f))
            .collect();
        orphans.sort_by_key(|f| f.id());
        orphans
    }

    /// Every registered benchmark joined with its bindings, in order.
    pub fn cases(&self) -> Vec<Case<'_>> {
        self.benchmarks
            .iter()
            .map(|bench| Case::new(bench, self.parameters_for(bench), self.setup_for(bench)))
            .collect()
    }

    /// Cases whose benchmark name matches the configured filter.
    pub fn select(&self, config: &SelectionConfig) -> Vec<Case<'_>> {
        self.cases()
            .into_iter()
            .filter(|case| config.matches(case.benchmark().name()))
            .collect()
    }

    /// Describe the registry for tooling.
    pub fn manifest(&self, config: &SelectionConfig) -> Manifest {
        let describe = |f: &BenchFn| ManifestEntry {
            name: f.name().to_string(),
            params: self.parameters_for(f).cloned(),
            setup: self.setup_for(f).map(|s| s.name().to_string()),
        };

        let benchmarks = self
            .benchmarks
            .iter()
            .filter(|f| config.matches(f.name()))
            .map(describe)
            .collect();
        let orphans = if config.include_orphans {
            self.orphans().into_iter().map(describe).collect()
        } else {
            Vec::new()
        };

        Manifest {
            benchmarks,
            orphans,
        }
    }
}
