//! Declaration identities.
//!
//! Every declaration carries a `DeclId`. It starts out as the unassigned
//! sentinel and is set exactly once, when the declaration is handed to an
//! [`IdAllocator`]. Type references use the identity to point back at the
//! declaration that defines them (e.g. an anonymous struct behind a typedef).

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Process-assigned sequence number of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DeclId(pub u32);

impl DeclId {
    /// The value every declaration starts with.
    pub const UNASSIGNED: DeclId = DeclId(0);

    /// Whether an allocator has handed out this identity.
    #[inline]
    pub fn is_assigned(self) -> bool {
        self != Self::UNASSIGNED
    }

    /// The raw sequence number.
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out strictly increasing, never repeating identities.
///
/// The counter is atomic so one allocator can be shared between threads that
/// extract independent translation units; a single-threaded extraction can
/// equally own one per unit.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicU32,
}

impl IdAllocator {
    /// Create an allocator whose first identity is `1`.
    pub fn new() -> Self {
        IdAllocator {
            next: AtomicU32::new(1),
        }
    }

    /// Allocate the next identity.
    pub fn next_id(&self) -> DeclId {
        DeclId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// The identity the next call to [`IdAllocator::next_id`] will return.
    pub fn peek(&self) -> DeclId {
        DeclId(self.next.load(Ordering::Relaxed))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_is_zero() {
        assert_eq!(DeclId::UNASSIGNED.get(), 0);
        assert!(!DeclId::default().is_assigned());
        assert!(DeclId(7).is_assigned());
    }

    #[test]
    fn test_allocator_strictly_increasing() {
        let alloc = IdAllocator::new();
        assert_eq!(alloc.peek(), DeclId(1));

        let ids: Vec<DeclId> = (0..5).map(|_| alloc.next_id()).collect();
        assert_eq!(ids, vec![DeclId(1), DeclId(2), DeclId(3), DeclId(4), DeclId(5)]);
        assert!(ids.iter().all(|id| id.is_assigned()));
    }

    #[test]
    fn test_allocator_shared_across_threads() {
        let alloc = std::sync::Arc::new(IdAllocator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let alloc = alloc.clone();
                std::thread::spawn(move || (0..100).map(|_| alloc.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<DeclId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 400);
    }
}
