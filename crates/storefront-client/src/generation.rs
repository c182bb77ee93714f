//! # Request Generations
//!
//! Keeps a slow response from overwriting a newer one.
//!
//! ## The Race
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Latest-Issued Wins                                   │
//! │                                                                         │
//! │  apply_coupon("SAVE10")  begin() → gen 1 ─────────────────────┐         │
//! │  apply_coupon("SAVE20")  begin() → gen 2 ───────┐             │         │
//! │                                                 ▼             │         │
//! │                               response 2: current == 2 → APPLY│         │
//! │                                                               ▼         │
//! │                               response 1: current == 2 ≠ 1 → DROP       │
//! │                                                                         │
//! │  Same idea as an election term: anything stamped with an older          │
//! │  generation is fenced off.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each request kind (shipping tiers, coupon) has its own counter so a
//! tier refresh never invalidates a coupon lookup.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic generation counter for one kind of request.
#[derive(Debug)]
pub struct RequestGeneration {
    name: &'static str,
    current: AtomicU64,
}

/// Stamp handed out when a request starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket {
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.generation)
    }
}

impl RequestGeneration {
    /// Creates a counter at generation 0. `name` is used in log fields.
    pub const fn new(name: &'static str) -> Self {
        RequestGeneration {
            name,
            current: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Starts a new request, superseding every earlier ticket.
    pub fn begin(&self) -> Ticket {
        let generation = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        Ticket { generation }
    }

    /// Supersedes every outstanding ticket without starting a request.
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::AcqRel);
    }

    /// True if no newer request was started since `ticket` was issued.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current.load(Ordering::Acquire) == ticket.generation
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }
}

/// Outcome of a request whose response may have arrived too late.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied<T> {
    /// The response was the newest and its result is now in effect.
    Fresh(T),
    /// A newer request superseded this one; its response was discarded.
    Stale,
}

impl<T> Applied<T> {
    pub fn is_stale(&self) -> bool {
        matches!(self, Applied::Stale)
    }

    /// Returns the value if the response was applied.
    pub fn fresh(self) -> Option<T> {
        match self {
            Applied::Fresh(value) => Some(value),
            Applied::Stale => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_ticket_wins() {
        let gen = RequestGeneration::new("coupon");
        let first = gen.begin();
        let second = gen.begin();

        assert!(!gen.is_current(first));
        assert!(gen.is_current(second));
        assert!(second > first);
    }

    #[test]
    fn test_invalidate_fences_outstanding() {
        let gen = RequestGeneration::new("tiers");
        let ticket = gen.begin();
        gen.invalidate();
        assert!(!gen.is_current(ticket));
        assert_eq!(gen.current(), 2);
    }

    #[test]
    fn test_applied_helpers() {
        assert_eq!(Applied::Fresh(3).fresh(), Some(3));
        assert!(Applied::<u8>::Stale.is_stale());
        assert_eq!(Applied::<u8>::Stale.fresh(), None);
    }
}
