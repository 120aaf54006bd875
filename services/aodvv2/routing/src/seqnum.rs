//! Node sequence number.
//!
//! A 16-bit counter that starts at 1. Zero means "unknown" on the wire and is
//! never issued, so the counter wraps from 65535 straight to 1.

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicU16, Ordering};
use tracing::trace;

/// Value the store starts from
pub const SEQNUM_INITIAL: u16 = 1;

/// Reserved "unset" value
pub const SEQNUM_UNKNOWN: u16 = 0;

/// Successor of `seqnum`, skipping the reserved zero
pub fn next_seqnum(seqnum: u16) -> u16 {
    match seqnum {
        u16::MAX => SEQNUM_INITIAL,
        n => n + 1,
    }
}

/// Compare two sequence numbers with wraparound.
///
/// `Greater` means `a` is newer than `b`. The zero value is older than
/// anything else.
pub fn compare(a: u16, b: u16) -> CmpOrdering {
    if a == b {
        return CmpOrdering::Equal;
    }
    match (a, b) {
        (SEQNUM_UNKNOWN, _) => CmpOrdering::Less,
        (_, SEQNUM_UNKNOWN) => CmpOrdering::Greater,
        _ => {
            let diff = a.wrapping_sub(b) as i16;
            if diff > 0 {
                CmpOrdering::Greater
            } else {
                CmpOrdering::Less
            }
        }
    }
}

/// Whether `a` is newer than `b`
pub fn is_newer(a: u16, b: u16) -> bool {
    compare(a, b) == CmpOrdering::Greater
}

/// The node's own sequence number
#[derive(Debug)]
pub struct SeqNumStore {
    value: AtomicU16,
}

impl SeqNumStore {
    /// Store starting at [`SEQNUM_INITIAL`]
    pub fn new() -> Self {
        Self::starting_at(SEQNUM_INITIAL)
    }

    /// Store starting at `value`; zero is bumped to [`SEQNUM_INITIAL`]
    pub fn starting_at(value: u16) -> Self {
        let value = if value == SEQNUM_UNKNOWN {
            SEQNUM_INITIAL
        } else {
            value
        };
        Self {
            value: AtomicU16::new(value),
        }
    }

    /// Current value, without side effects
    pub fn current(&self) -> u16 {
        self.value.load(Ordering::Acquire)
    }

    /// Advance by one and return the new value
    pub fn increment(&self) -> u16 {
        let (_, next) = self.advance();
        next
    }

    /// Take the current value for a message and advance past it in one
    /// atomic step, so no two callers ever get the same number.
    ///
    /// Hand the value back with [`SeqNumStore::release`] if it is never sent.
    pub fn reserve(&self) -> u16 {
        let (issued, _) = self.advance();
        issued
    }

    /// Give back a number from [`SeqNumStore::reserve`] that was never sent.
    ///
    /// The store only steps back when nothing was reserved after `issued`;
    /// otherwise the number is skipped. Returns whether it stepped back.
    pub fn release(&self, issued: u16) -> bool {
        let rolled_back = self
            .value
            .compare_exchange(next_seqnum(issued), issued, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        trace!(issued, rolled_back, "sequence number released");
        rolled_back
    }

    fn advance(&self) -> (u16, u16) {
        let mut current = self.value.load(Ordering::Acquire);
        loop {
            let next = next_seqnum(current);
            match self
                .value
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    trace!(from = current, to = next, "sequence number incremented");
                    return (current, next);
                }
                Err(actual) => current = actual,
            }
        }
    }
}

impl Default for SeqNumStore {
    fn default() -> Self {
        Self::new()
    }
}
