//! Counter-based correlation IDs.
//!
//! # Privacy
//!
//! Every ID embeds a process-wide counter verbatim in its first 8 bytes
//! (little-endian). Anyone who sees two IDs can subtract their counters and
//! learn how many IDs were issued in between, which exposes request volume
//! and rate. The counter is re-based from fresh randomness on every process
//! start, so restarts are visible too. Only the counter region changes
//! between IDs from one process; the remaining bytes are a fixed random seed.
//!
//! Use this only where IDs stay internal and that exposure is acceptable.
//! The default generator is [`secure_id`](super::secure_id).
//!
//! # Cost
//!
//! After the one-time seeding, a call is one relaxed atomic add, a 24-byte
//! copy and hyphenated hex formatting. No lock is taken.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use rand::RngCore;
use uuid::Uuid;

static STATE: OnceLock<FastState> = OnceLock::new();

struct FastState {
    seed: [u8; 24],
    counter: AtomicU64,
}

impl FastState {
    fn from_seed(seed: [u8; 24]) -> Self {
        let mut base = [0u8; 8];
        base.copy_from_slice(&seed[..8]);
        Self {
            seed,
            counter: AtomicU64::new(u64::from_le_bytes(base)),
        }
    }

    fn seeded() -> Self {
        let mut seed = [0u8; 24];
        rand::rng().fill_bytes(&mut seed);
        Self::from_seed(seed)
    }

    fn next(&self) -> String {
        let x = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        let mut id = self.seed;
        id[..8].copy_from_slice(&x.to_le_bytes());
        render(&id)
    }
}

/// Render bytes `0..16` as `8-4-4-4-12` lowercase hex.
fn render(id: &[u8; 24]) -> String {
    let mut head = [0u8; 16];
    head.copy_from_slice(&id[..16]);
    Uuid::from_bytes(head).hyphenated().to_string()
}

/// Generate a counter-based ID. See the module docs for the privacy cost.
pub fn fast_id() -> String {
    STATE.get_or_init(FastState::seeded).next()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::generator::is_uuid_shaped;

    /// Recover the embedded counter from an ID.
    fn counter_of(id: &str) -> u64 {
        let hex: String = id.split('-').take(3).collect();
        let mut bytes = [0u8; 8];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).unwrap();
        }
        u64::from_le_bytes(bytes)
    }

    fn seed_region(id: &str) -> &str {
        &id[19..]
    }

    #[test]
    fn test_render_groups_first_sixteen_bytes() {
        let mut id = [0u8; 24];
        for (i, byte) in id.iter_mut().enumerate() {
            *byte = i as u8;
        }
        assert_eq!(render(&id), "00010203-0405-0607-0809-0a0b0c0d0e0f");
    }

    #[test]
    fn test_counter_starts_from_seed_and_increments_by_one() {
        let mut seed = [0xab_u8; 24];
        seed[..8].copy_from_slice(&41_u64.to_le_bytes());
        let state = FastState::from_seed(seed);

        let first = state.next();
        let second = state.next();
        assert_eq!(counter_of(&first), 42);
        assert_eq!(counter_of(&second), 43);
        assert_eq!(first, "2a000000-0000-0000-abab-abababababab");
    }

    #[test]
    fn test_counter_wraps_at_u64_max() {
        let mut seed = [0u8; 24];
        seed[..8].copy_from_slice(&u64::MAX.to_le_bytes());
        let state = FastState::from_seed(seed);
        assert_eq!(counter_of(&state.next()), 0);
    }

    #[test]
    fn test_fast_ids_are_uuid_shaped() {
        for _ in 0..100 {
            let id = fast_id();
            assert!(is_uuid_shaped(&id), "{id}");
        }
    }

    #[test]
    fn test_consecutive_ids_differ_only_in_counter() {
        let a = fast_id();
        let b = fast_id();

        assert_ne!(a, b);
        assert_eq!(seed_region(&a), seed_region(&b));

        // Other tests may draw IDs in between; the gap is still tiny and
        // positive, which is exactly what leaks request volume.
        let gap = counter_of(&b).wrapping_sub(counter_of(&a));
        assert!((1..1_000_000).contains(&gap), "gap {gap}");
    }

    #[test]
    fn test_concurrent_calls_never_collide() {
        const THREADS: usize = 100;
        const PER_THREAD: usize = 100;

        let batches: Vec<Vec<String>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| s.spawn(|| (0..PER_THREAD).map(|_| fast_id()).collect::<Vec<_>>()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let unique: HashSet<String> = batches.into_iter().flatten().collect();
        assert_eq!(unique.len(), THREADS * PER_THREAD);
    }

    #[test]
    fn test_seed_is_initialized_once() {
        let a = fast_id();
        let from_other_thread = std::thread::spawn(fast_id).join().unwrap();
        assert_eq!(seed_region(&a), seed_region(&from_other_thread));
    }
}
