//! Resolved benchmark cases handed to a runner.

use crate::error::InvokeError;
use crate::handle::BenchFn;
use crate::value::Params;
use std::fmt;

/// One benchmark joined with its optional parameter tuple and setup routine.
#[derive(Debug, Clone, Copy)]
pub struct Case<'r> {
    bench: &'r BenchFn,
    params: Option<&'r Params>,
    setup: Option<&'r BenchFn>,
}

impl<'r> Case<'r> {
    pub(crate) fn new(
        bench: &'r BenchFn,
        params: Option<&'r Params>,
        setup: Option<&'r BenchFn>,
    ) -> Self {
        Self {
            bench,
            params,
            setup,
        }
    }

    pub fn benchmark(&self) -> &'r BenchFn {
        self.bench
    }

    pub fn params(&self) -> Option<&'r Params> {
        self.params
    }

    pub fn setup(&self) -> Option<&'r BenchFn> {
        self.setup
    }

    /// Display name including the bound arguments, e.g. `suite::add(1, 2)`.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Run the setup routine, if any. Setups declared without arguments are
    /// called with an empty tuple; all others receive the case's parameters.
    pub fn run_setup(&self) -> Result<(), InvokeError> {
        let Some(setup) = self.setup else {
            return Ok(());
        };
        let empty = Params::empty();
        let args = match setup.arity() {
            Some(0) => &empty,
            _ => self.params.unwrap_or(&empty),
        };
        tracing::trace!(case = %self, setup = setup.name(), "running setup");
        setup.call(args).map_err(|source| InvokeError::Setup {
            name: self.bench.name().to_string(),
            source: Box::new(source),
        })
    }

    /// Run only the benchmark body with its bound parameters.
    pub fn run_benchmark(&self) -> Result<(), InvokeError> {
        tracing::trace!(case = %self, "invoking benchmark");
        match self.params {
            Some(params) => self.bench.call(params),
            None => self.bench.call(&Params::empty()),
        }
    }

    /// Setup followed by one invocation of the benchmark.
    ///
    /// Runners that time the body should call [`Case::run_setup`] and
    /// [`Case::run_benchmark`] separately.
    pub fn invoke(&self) -> Result<(), InvokeError> {
        self.run_setup()?;
        self.run_benchmark()
    }
}

impl fmt::Display for Case<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.params {
            Some(params) => write!(f, "{}({})", self.bench.name(), params),
            None => f.write_str(self.bench.name()),
        }
    }
}
