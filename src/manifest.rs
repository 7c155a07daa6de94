//! Serializable description of a registry.

use crate::value::Params;
use serde::{Deserialize, Serialize};

/// One registered function as seen by tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Handle name, `module::function` for attribute-declared benchmarks
    pub name: String,
    /// Bound parameter tuple
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
    /// Name of the setup routine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<String>,
}

/// Snapshot of what a registry would hand to a runner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Benchmarks in declaration order
    pub benchmarks: Vec<ManifestEntry>,
    /// Metadata bound to functions never registered as benchmarks
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orphans: Vec<ManifestEntry>,
}

impl Manifest {
    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a manifest previously produced by [`Manifest::to_json`].
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Benchmark names in order.
    pub fn names(&self) -> Vec<&str> {
        self.benchmarks.iter().map(|e| e.name.as_str()).collect()
    }
}
