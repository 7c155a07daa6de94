//! Configuration for selecting registered cases.

/// Which registered benchmarks a runner should see.
#[derive(Debug, Clone, Default)]
pub struct SelectionConfig {
    /// Glob pattern on benchmark names (`*` wildcards, otherwise substring).
    pub filter: Option<String>,
    /// List orphaned metadata in manifests.
    pub include_orphans: bool,
}

impl SelectionConfig {
    /// A config that selects every registered benchmark.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse config from environment variables.
    ///
    /// Supported variables:
    /// - `BENCH_FILTER`: glob pattern on benchmark names
    /// - `BENCH_INCLUDE_ORPHANS`: list orphaned metadata (default: false)
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("BENCH_FILTER") {
            if !v.is_empty() {
                cfg.filter = Some(v);
            }
        }
        if let Ok(v) = std::env::var("BENCH_INCLUDE_ORPHANS") {
            cfg.include_orphans = v == "1" || v.eq_ignore_ascii_case("true");
        }

        cfg
    }

    /// Select only benchmarks whose `module::function` name matches `pattern`.
    pub fn filter(mut self, pattern: impl Into<String>) -> Self {
        self.filter = Some(pattern.into());
        self
    }

    /// Select every benchmark again.
    pub fn no_filter(mut self) -> Self {
        self.filter = None;
        self
    }

    /// Include orphaned metadata in manifests.
    pub fn include_orphans(mut self, v: bool) -> Self {
        self.include_orphans = v;
        self
    }

    /// Whether a benchmark name passes the filter.
    pub fn matches(&self, name: &str) -> bool {
        match &self.filter {
            Some(pattern) => matches_glob(name, pattern),
            None => true,
        }
    }
}

/// Case-insensitive glob matching supporting `*`; no wildcard means substring.
fn matches_glob(text: &str, pattern: &str) -> bool {
    let pattern = pattern.to_lowercase();
    let text = text.to_lowercase();

    if !pattern.contains('*') {
        return text.contains(&pattern);
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    let last = parts.len() - 1;
    let mut remaining = text.as_str();

    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            // Anchored at the start
            match remaining.strip_prefix(part) {
                Some(rest) => remaining = rest,
                None => return false,
            }
        } else if i == last {
            // Anchored at the end
            return remaining.ends_with(part);
        } else {
            match remaining.find(part) {
                Some(pos) => remaining = &remaining[pos + part.len()..],
                None => return false,
            }
        }
    }
    true
}
