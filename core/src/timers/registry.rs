//! Timer table and handle allocation
//!
//! The registry is only ever mutated through schedule/cancel (here) and the
//! dispatcher's reschedule/expire step. Hosts and handlers reach it through
//! [`Timers`], never directly.

use std::fmt::Debug;

use hashbrown::HashMap;

use super::clock::Clock;
use super::error::TimerError;
use super::record::{EntityId, InterfaceId, TimerHandle, TimerRecord};

#[derive(Debug, Clone)]
pub(crate) struct Registry<H, P> {
    /// Last handle handed out (0 before the first allocation)
    last_handle: u64,
    timers: HashMap<TimerHandle, TimerRecord<H, P>>,
}

impl<H, P> Default for Registry<H, P> {
    fn default() -> Self {
        Self {
            last_handle: 0,
            timers: HashMap::new(),
        }
    }
}

impl<H, P> Registry<H, P> {
    /// Rebuild from stored records, keeping the counter ahead of every handle.
    pub(crate) fn restore(last_handle: u64, records: Vec<TimerRecord<H, P>>) -> Self {
        let last_handle = records
            .iter()
            .map(|t| t.handle.get())
            .fold(last_handle, u64::max);
        Self {
            last_handle,
            timers: records.into_iter().map(|t| (t.handle, t)).collect(),
        }
    }

    pub(crate) fn last_handle(&self) -> u64 {
        self.last_handle
    }

    pub(crate) fn insert(
        &mut self,
        entity: EntityId,
        interface: InterfaceId,
        handler: H,
        fire_at: u64,
        period: u64,
        payload: P,
    ) -> TimerHandle {
        let handle = TimerHandle::after(self.last_handle);
        self.last_handle = handle.get();
        self.timers.insert(
            handle,
            TimerRecord {
                handle,
                entity,
                interface,
                handler,
                fire_at,
                period,
                payload,
            },
        );
        handle
    }

    pub(crate) fn remove(&mut self, handle: TimerHandle) -> Option<TimerRecord<H, P>> {
        self.timers.remove(&handle)
    }

    pub(crate) fn get(&self, handle: TimerHandle) -> Option<&TimerRecord<H, P>> {
        self.timers.get(&handle)
    }

    pub(crate) fn get_mut(&mut self, handle: TimerHandle) -> Option<&mut TimerRecord<H, P>> {
        self.timers.get_mut(&handle)
    }

    pub(crate) fn len(&self) -> usize {
        self.timers.len()
    }

    /// Handles due at `now`, ascending.
    ///
    /// The table's own iteration order is arbitrary; sorting here is what
    /// makes a turn replay identically.
    pub(crate) fn due(&self, now: u64) -> Vec<TimerHandle> {
        let mut due: Vec<_> = self
            .timers
            .values()
            .filter(|t| t.is_due(now))
            .map(|t| t.handle)
            .collect();
        due.sort_unstable();
        due
    }

    /// All records, ascending by handle
    pub(crate) fn sorted(&self) -> Vec<&TimerRecord<H, P>> {
        let mut timers: Vec<_> = self.timers.values().collect();
        timers.sort_unstable_by_key(|t| t.handle);
        timers
    }
}

/// Scheduling access to a running engine.
///
/// Handed to every [`TimerHandler`](super::TimerHandler) invocation so
/// callbacks can schedule follow-ups or cancel other timers mid-turn.
pub struct Timers<'a, H, P> {
    pub(crate) clock: &'a Clock,
    pub(crate) registry: &'a mut Registry<H, P>,
}

impl<H: Debug, P> Timers<'_, H, P> {
    /// Time since the start of the simulation (ms)
    pub fn time(&self) -> u64 {
        self.clock.time()
    }

    pub fn last_turn_length(&self) -> u64 {
        self.clock.last_turn_length()
    }

    /// Call `handler` on the target once, `delay` ms from now.
    ///
    /// A zero delay fires on the next turn.
    pub fn set_timeout(
        &mut self,
        entity: EntityId,
        interface: InterfaceId,
        handler: H,
        delay: u64,
        payload: P,
    ) -> TimerHandle {
        let fire_at = self.clock.time().saturating_add(delay);
        let handle = self
            .registry
            .insert(entity, interface, handler, fire_at, 0, payload);
        tracing::trace!(timer = %handle, %entity, %interface, fire_at, "Timeout scheduled");
        handle
    }

    /// Call `handler` on the target `delay` ms from now and every `period` ms
    /// after that, until cancelled.
    ///
    /// `period` must be positive; anything else is rejected without touching
    /// the table.
    pub fn set_interval(
        &mut self,
        entity: EntityId,
        interface: InterfaceId,
        handler: H,
        delay: u64,
        period: i64,
        payload: P,
    ) -> Result<TimerHandle, TimerError> {
        let period = match u64::try_from(period) {
            Ok(p) if p > 0 => p,
            _ => {
                return Err(TimerError::InvalidRepeatTime {
                    handler: format!("{handler:?}"),
                    period,
                });
            }
        };

        let fire_at = self.clock.time().saturating_add(delay);
        let handle = self
            .registry
            .insert(entity, interface, handler, fire_at, period, payload);
        tracing::trace!(timer = %handle, %entity, %interface, fire_at, period, "Interval scheduled");
        Ok(handle)
    }

    /// Cancel a timer. Unknown or already expired handles are ignored.
    ///
    /// Returns whether a timer was removed.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let removed = self.registry.remove(handle).is_some();
        if removed {
            tracing::trace!(timer = %handle, "Timer cancelled");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestRegistry = Registry<&'static str, ()>;

    fn timers<'a>(
        clock: &'a Clock,
        registry: &'a mut TestRegistry,
    ) -> Timers<'a, &'static str, ()> {
        Timers { clock, registry }
    }

    #[test]
    fn handles_start_at_one_and_increase() {
        let clock = Clock::new();
        let mut registry = Registry::default();
        let mut t = timers(&clock, &mut registry);

        let a = t.set_timeout(EntityId(1), InterfaceId(1), "a", 10, ());
        let b = t.set_timeout(EntityId(1), InterfaceId(1), "b", 10, ());
        t.cancel(b);
        let c = t.set_timeout(EntityId(1), InterfaceId(1), "c", 10, ());

        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
        // Cancelled handles are not reused
        assert_eq!(c.get(), 3);
    }

    #[test]
    fn rejects_non_positive_period() {
        let clock = Clock::new();
        let mut registry = Registry::default();
        let mut t = timers(&clock, &mut registry);

        let err = t
            .set_interval(EntityId(1), InterfaceId(1), "tick", 0, -5, ())
            .unwrap_err();
        assert_eq!(
            err,
            TimerError::InvalidRepeatTime {
                handler: "\"tick\"".to_string(),
                period: -5
            }
        );
        assert!(t.set_interval(EntityId(1), InterfaceId(1), "tick", 0, 0, ()).is_err());
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.last_handle(), 0);
    }

    #[test]
    fn cancel_is_idempotent() {
        let clock = Clock::new();
        let mut registry = Registry::default();
        let mut t = timers(&clock, &mut registry);

        let handle = t.set_timeout(EntityId(1), InterfaceId(1), "a", 0, ());
        assert!(t.cancel(handle));
        assert!(!t.cancel(handle));
        assert!(!t.cancel(TimerHandle::new(99).unwrap()));
    }

    #[test]
    fn due_is_sorted_by_handle() {
        let mut registry: Registry<&str, ()> = Registry::default();
        for delay in [30, 10, 20, 500, 0] {
            registry.insert(EntityId(1), InterfaceId(1), "a", delay, 0, ());
        }
        let due: Vec<_> = registry.due(30).into_iter().map(TimerHandle::get).collect();
        assert_eq!(due, vec![1, 2, 3, 5]);
    }

    #[test]
    fn restore_keeps_counter_ahead_of_records() {
        let mut registry: Registry<&str, ()> = Registry::default();
        registry.insert(EntityId(1), InterfaceId(1), "a", 0, 0, ());
        registry.insert(EntityId(1), InterfaceId(1), "b", 0, 0, ());
        let records = registry.sorted().into_iter().cloned().collect();

        let mut restored = Registry::restore(0, records);
        assert_eq!(restored.last_handle(), 2);
        let next = restored.insert(EntityId(1), InterfaceId(1), "c", 0, 0, ());
        assert_eq!(next.get(), 3);
    }
}
