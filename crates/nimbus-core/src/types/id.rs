//! Generated document identifiers.
//!
//! A [`UniqueId`] is a 96-bit composite of a 32-bit seconds-since-epoch
//! timestamp, a 40-bit random draw and a 24-bit monotone process-local
//! counter. Uniqueness comes from the combination of all three parts, not
//! from inter-thread ordering, so the counter only needs relaxed atomics.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Largest value of the 40-bit random component.
const RANDOM_MAX: u64 = (1 << 40) - 1;

/// Mask for the 24-bit counter component.
const COUNTER_MASK: u32 = (1 << 24) - 1;

/// Process-local counter feeding [`UniqueId::generate`].
///
/// The only process-wide mutable state in the crate. Relaxed ordering
/// suffices: uniqueness derives from combining the counter with wall-clock
/// and random bits.
static COUNTER: AtomicU32 = AtomicU32::new(0);

/// A generated document identifier.
///
/// Identifiers order lexicographically on (timestamp, random/counter bits)
/// and hash by the non-timestamp bits.
///
/// # Example
///
/// ```
/// use nimbus_core::UniqueId;
///
/// let a = UniqueId::generate();
/// let b = UniqueId::generate();
/// assert_ne!(a, b);
/// assert!(a.is_valid());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UniqueId {
    /// Seconds since the Unix epoch at generation time.
    secs: u32,
    /// 40-bit random draw in the high bits, 24-bit counter in the low bits.
    entropy: u64,
}

impl UniqueId {
    /// Generate a fresh identifier.
    ///
    /// Reads the wall clock, draws random bits from the thread-local RNG and
    /// fetches-and-increments the process-local counter.
    #[must_use]
    pub fn generate() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        let random = rand::thread_rng().gen_range(1..=RANDOM_MAX);
        let count = COUNTER.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;
        Self { secs, entropy: (random << 24) | u64::from(count) }
    }

    /// Returns `true` for generated identifiers.
    ///
    /// The default (all-zero) identifier is not valid.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.entropy > 0 && self.secs > 0
    }

    /// Seconds since the Unix epoch at generation time.
    #[must_use]
    pub const fn timestamp_secs(&self) -> u32 {
        self.secs
    }

    /// The packed 64-bit random + counter block.
    #[must_use]
    pub const fn entropy(&self) -> u64 {
        self.entropy
    }

    /// The monotone counter component (low 24 bits).
    #[must_use]
    pub const fn counter(&self) -> u32 {
        (self.entropy as u32) & COUNTER_MASK
    }
}

// Folds the non-timestamp bits; two equal ids share all bits, so the
// Eq/Hash contract holds.
impl Hash for UniqueId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entropy.hash(state);
    }
}

impl std::fmt::Display for UniqueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.secs, self.entropy)
    }
}
