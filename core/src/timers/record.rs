//! Timer records and the ids they are keyed by
//!
//! A `TimerRecord` is created by `set_timeout`/`set_interval`, has its
//! `fire_at` advanced in place by the dispatcher for repeating timers, and is
//! removed on cancel, on expiry of a one-shot, or when its target no longer
//! resolves.

use std::fmt;
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

/// Opaque handle returned when a timer is scheduled.
///
/// Handles are allocated from a strictly increasing counter and never reused
/// for the lifetime of an engine, so a stale handle can only ever miss.
/// "No timer" is `Option::<TimerHandle>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerHandle(NonZeroU64);

impl TimerHandle {
    /// Wrap a raw handle value. Returns `None` for the reserved value 0.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// The handle directly after `last` (the first handle when `last == 0`).
    pub(crate) fn after(last: u64) -> Self {
        Self(NonZeroU64::MIN.saturating_add(last))
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Entity a timer is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Interface (component type) on the entity that receives the callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterfaceId(pub u32);

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A scheduled callback
///
/// `H` selects which handler the target component runs, `P` is caller data
/// handed back untouched on every firing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerRecord<H, P> {
    pub handle: TimerHandle,

    // ─── Target ─────────────────────────────────────────────────────────────
    pub entity: EntityId,
    pub interface: InterfaceId,
    pub handler: H,

    // ─── Timing (engine milliseconds) ───────────────────────────────────────
    /// Absolute time of the next firing
    pub fire_at: u64,

    /// Repeat period, 0 for one-shot timers
    pub period: u64,

    pub payload: P,
}

impl<H, P> TimerRecord<H, P> {
    pub fn is_repeating(&self) -> bool {
        self.period > 0
    }

    pub fn is_due(&self, now: u64) -> bool {
        self.fire_at <= now
    }
}
