//! # cntryl-bench-registry
//!
//! A registry that lets functions declare themselves as benchmarks, attach a
//! parameter tuple and designate a setup routine, without their call sites
//! knowing about any runner.
//!
//! Runners read the registry; this crate never times or reports anything.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cntryl_bench_registry::{benchmark, case_setup, param, Registry};
//!
//! #[case_setup]
//! fn warm_cache() {}
//!
//! #[benchmark]
//! #[param(4096, "lz4")]
//! fn compress(size: usize, codec: &str) -> usize {
//!     size / codec.len()
//! }
//!
//! for case in Registry::global().cases() {
//!     case.invoke().expect("declared arguments match");
//! }
//! ```
//!
//! ## Explicit registries
//!
//! Attributes feed a process-wide registry. Code that wants isolation (tests
//! in particular) builds its own [`Registry`] and marks handles with the
//! functions in [`annotate`] or the [`Registry::declare`] builder.

pub mod annotate;
mod case;
mod config;
mod error;
mod handle;
mod harness;
mod manifest;
mod registry;
mod value;

pub use case::Case;
pub use config::SelectionConfig;
pub use error::{InvokeError, ParamError};
pub use handle::{BenchFn, BenchId, IntoBenchFn};
pub use manifest::{Manifest, ManifestEntry};
pub use registry::Registry;
pub use value::{FromParam, ParamValue, Params};

pub use cntryl_bench_registry_macros::{benchmark, case_setup, param};

/// Items used by the attribute macros.
#[doc(hidden)]
pub mod __private {
    pub use crate::error::InvokeError;
    pub use crate::handle::{arg, check_arity, BenchFn};
    pub use crate::harness::{
        linkme, BenchmarkEntry, ParamEntry, SetupEntry, Site, BENCHMARKS, PARAMS, SETUPS,
    };
    pub use crate::value::{ParamValue, Params};
    pub use std::borrow::Cow;
}
