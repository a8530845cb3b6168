use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counter bumped on every identity transition.
///
/// Async work captures [`current`](Self::current) when it starts and checks
/// [`is_current`](Self::is_current) before committing its result. A mismatch
/// means the identity changed underneath it and the result must be dropped.
#[derive(Debug, Clone, Default)]
pub struct IdentityGeneration {
    value: Arc<AtomicU64>,
}

impl IdentityGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }

    /// Advances the counter and returns the new generation.
    pub fn bump(&self) -> u64 {
        self.value.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_invalidates_captured_generation() {
        let generation = IdentityGeneration::new();
        let captured = generation.current();
        assert!(generation.is_current(captured));

        let shared = generation.clone();
        assert_eq!(shared.bump(), captured + 1);
        assert!(!generation.is_current(captured));
        assert!(generation.is_current(captured + 1));
    }
}
