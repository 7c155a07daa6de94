//! State shared between the demo benchmarks and their setup routines.

use std::sync::{Mutex, MutexGuard};

/// A byte buffer a setup routine clears and a benchmark fills.
#[derive(Debug, Default)]
pub struct Scratch(Mutex<Vec<u8>>);

impl Scratch {
    pub const fn new() -> Self {
        Self(Mutex::new(Vec::new()))
    }

    /// Lock the buffer, recovering it if an earlier holder panicked.
    pub fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn should_keep_filling_when_lock_was_poisoned() {
        let scratch = Arc::new(Scratch::new());
        let held = Arc::clone(&scratch);
        let outcome = std::thread::spawn(move || {
            let _guard = held.lock();
            panic!("benchmark panicked while holding the buffer");
        })
        .join();
        assert!(outcome.is_err());
        assert!(scratch.0.is_poisoned());

        scratch.lock().resize(8, 0xAB);
        assert_eq!(scratch.lock().len(), 8);
        scratch.lock().clear();
        assert!(scratch.lock().is_empty());
    }
}
