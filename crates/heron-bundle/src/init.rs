//! Process-wide syntax environment.
//!
//! swc interns syntax contexts through a [`Globals`] instance. Sharing one
//! instance across every bundling request keeps setup idempotent: the first
//! caller initializes it, concurrent first callers race safely on the
//! `OnceLock`, and everyone afterwards reuses it. The instance is treated as
//! immutable after setup.

use std::sync::OnceLock;
use swc_common::{GLOBALS, Globals};

static SYNTAX_ENV: OnceLock<Globals> = OnceLock::new();

/// The shared, lazily-initialized syntax environment.
pub fn syntax_env() -> &'static Globals {
    SYNTAX_ENV.get_or_init(Globals::default)
}

/// Run `f` with the shared environment installed.
pub fn with_syntax_env<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    GLOBALS.set(syntax_env(), f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_is_shared() {
        let first = syntax_env() as *const Globals;
        let second = syntax_env() as *const Globals;
        assert_eq!(first, second);
    }

    #[test]
    fn test_concurrent_first_callers_initialize_once() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| syntax_env() as *const Globals as usize))
            .collect();
        let mut addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        addresses.dedup();
        assert_eq!(addresses.len(), 1);
    }
}
