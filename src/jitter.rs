//! Symmetric multiplicative jitter for delays and timeouts
//!
//! Jitter desynchronizes concurrent retriers so they do not hammer a
//! recovering service in lockstep.

use rand::Rng;

/// Apply symmetric jitter to a positive quantity.
///
/// Returns a value uniformly distributed in `[value·(1−factor),
/// value·(1+factor)]`. Non-positive values and a zero factor are returned
/// unchanged, so sentinel values and already-overrun budgets never get
/// randomized.
pub fn apply_jitter(value: f64, factor: f64) -> f64 {
    apply_jitter_with(value, factor, &mut rand::thread_rng())
}

/// Apply symmetric jitter drawing from an injected generator.
///
/// Use with a seeded `StdRng` when tests need deterministic jitter.
pub fn apply_jitter_with<R: Rng + ?Sized>(value: f64, factor: f64, rng: &mut R) -> f64 {
    if value <= 0.0 || factor == 0.0 {
        return value;
    }
    rng.gen_range(value * (1.0 - factor)..=value * (1.0 + factor))
}
