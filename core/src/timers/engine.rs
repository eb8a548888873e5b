//! Turn-driven timer engine
//!
//! Owns the clock and the timer table. The host calls [`TimerEngine::advance`]
//! once per simulation turn; every timer due by the new time fires in
//! ascending handle order.

use std::fmt::Debug;
use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use super::clock::Clock;
use super::error::{HandlerFailure, TimerError};
use super::handler::ComponentResolver;
use super::record::{EntityId, InterfaceId, TimerHandle, TimerRecord};
use super::registry::{Registry, Timers};

/// What happened during one [`TimerEngine::advance`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceSummary {
    /// Handler invocations, catch-up repeats included
    pub fired: usize,
    /// Invocations that returned an error or panicked (subset of `fired`)
    pub failed: usize,
    /// Timers dropped because their target no longer resolved
    pub orphaned: usize,
}

/// Serializable engine state, for save games and replays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState<H, P> {
    /// Last handle handed out
    pub last_handle: u64,
    pub time: u64,
    pub last_turn_length: u64,
    /// Pending timers, ascending by handle
    pub timers: Vec<TimerRecord<H, P>>,
}

/// Deterministic timer dispatch for one simulation session
#[derive(Debug, Clone)]
pub struct TimerEngine<H, P> {
    clock: Clock,
    registry: Registry<H, P>,
}

impl<H, P> Default for TimerEngine<H, P> {
    fn default() -> Self {
        Self {
            clock: Clock::new(),
            registry: Registry::default(),
        }
    }
}

impl<H, P> TimerEngine<H, P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time since the start of the simulation (ms)
    pub fn time(&self) -> u64 {
        self.clock.time()
    }

    /// Length of the most recent turn (ms)
    pub fn last_turn_length(&self) -> u64 {
        self.clock.last_turn_length()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    pub fn contains(&self, handle: TimerHandle) -> bool {
        self.registry.get(handle).is_some()
    }

    pub fn get(&self, handle: TimerHandle) -> Option<&TimerRecord<H, P>> {
        self.registry.get(handle)
    }

    /// Pending timers in ascending handle order
    pub fn timers(&self) -> Vec<&TimerRecord<H, P>> {
        self.registry.sorted()
    }

    /// Rebuild an engine from a stored state.
    ///
    /// Handle allocation resumes after the highest handle seen, so restored
    /// and new timers never collide.
    pub fn from_state(state: EngineState<H, P>) -> Self {
        Self {
            clock: Clock::restore(state.time, state.last_turn_length),
            registry: Registry::restore(state.last_handle, state.timers),
        }
    }

    fn scheduler(&mut self) -> Timers<'_, H, P> {
        Timers {
            clock: &self.clock,
            registry: &mut self.registry,
        }
    }
}

impl<H: Clone, P: Clone> TimerEngine<H, P> {
    /// Snapshot of everything needed to resume this engine
    pub fn state(&self) -> EngineState<H, P> {
        EngineState {
            last_handle: self.registry.last_handle(),
            time: self.clock.time(),
            last_turn_length: self.clock.last_turn_length(),
            timers: self.registry.sorted().into_iter().cloned().collect(),
        }
    }
}

impl<H: Debug, P> TimerEngine<H, P> {
    /// Schedule a one-shot timer `delay` ms from now. See [`Timers::set_timeout`].
    pub fn set_timeout(
        &mut self,
        entity: EntityId,
        interface: InterfaceId,
        handler: H,
        delay: u64,
        payload: P,
    ) -> TimerHandle {
        self.scheduler()
            .set_timeout(entity, interface, handler, delay, payload)
    }

    /// Schedule a repeating timer. See [`Timers::set_interval`].
    pub fn set_interval(
        &mut self,
        entity: EntityId,
        interface: InterfaceId,
        handler: H,
        delay: u64,
        period: i64,
        payload: P,
    ) -> Result<TimerHandle, TimerError> {
        self.scheduler()
            .set_interval(entity, interface, handler, delay, period, payload)
    }

    /// Cancel a timer. Returns whether anything was removed; stale handles are
    /// a no-op.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.scheduler().cancel(handle)
    }
}

impl<H: Clone + Debug, P: Clone> TimerEngine<H, P> {
    /// Apply one turn of `turn_length_secs` and fire everything now due.
    ///
    /// Never fails: handler errors are logged and counted in the summary.
    /// Handler panics are caught and logged the same way; the process panic
    /// hook still sees them first, so hosts that want a single report should
    /// install their own hook.
    pub fn advance<R>(&mut self, turn_length_secs: f64, world: &mut R) -> AdvanceSummary
    where
        R: ComponentResolver<H, P> + ?Sized,
    {
        let turn_length = self.clock.advance(turn_length_secs);
        trace!(turn_length, time = self.clock.time(), "Turn advanced");
        self.run_due(world)
    }

    fn run_due<R>(&mut self, world: &mut R) -> AdvanceSummary
    where
        R: ComponentResolver<H, P> + ?Sized,
    {
        let now = self.clock.time();
        let mut summary = AdvanceSummary::default();

        // Collect what is due before running anything. Timers scheduled by a
        // callback are not in this list and wait for the next turn.
        let mut run = self.registry.due(now);

        // Indexed loop: repeats that are still due get pushed onto the end.
        let mut i = 0;
        while i < run.len() {
            let handle = run[i];
            i += 1;

            // An earlier callback in this turn may have cancelled it
            let Some(timer) = self.registry.get(handle) else {
                continue;
            };
            let entity = timer.entity;
            let interface = timer.interface;
            let fire_at = timer.fire_at;
            let handler = timer.handler.clone();
            let payload = timer.payload.clone();

            let Some(component) = world.resolve(entity, interface) else {
                // Entity was probably destroyed
                debug!(
                    timer = %handle,
                    %entity,
                    %interface,
                    handler = ?handler,
                    "Timer target gone, dropping timer"
                );
                self.registry.remove(handle);
                summary.orphaned += 1;
                continue;
            };

            let lateness = now.saturating_sub(fire_at);
            let mut timers = Timers {
                clock: &self.clock,
                registry: &mut self.registry,
            };
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                component.on_timer(&handler, &payload, lateness, &mut timers)
            }));

            summary.fired += 1;
            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(HandlerFailure::Returned(err)),
                Err(panic) => Some(HandlerFailure::from_panic(panic)),
            };
            if let Some(failure) = failure {
                summary.failed += 1;
                report_failure(handle, entity, interface, &handler, lateness, &failure);
            }

            // Fetch again: the callback may have cancelled its own timer
            match self.registry.get_mut(handle) {
                Some(timer) if timer.is_repeating() => {
                    // Advance from the scheduled time, not from now, so the
                    // phase holds when a turn covers several periods
                    match timer.fire_at.checked_add(timer.period) {
                        Some(fire_at) => {
                            timer.fire_at = fire_at;
                            if timer.is_due(now) {
                                run.push(handle);
                            }
                        }
                        None => {
                            // Next firing is past the end of the timeline
                            debug!(
                                timer = %handle,
                                %entity,
                                "Interval past end of time, dropping"
                            );
                            self.registry.remove(handle);
                        }
                    }
                }
                Some(_) => {
                    self.registry.remove(handle);
                }
                None => {}
            }
        }

        summary
    }
}

fn report_failure<H: Debug>(
    handle: TimerHandle,
    entity: EntityId,
    interface: InterfaceId,
    handler: &H,
    lateness: u64,
    failure: &HandlerFailure,
) {
    let trace = failure.trace();
    error!(
        timer = %handle,
        %entity,
        %interface,
        handler = ?handler,
        lateness,
        "Error in timer on entity {entity}, IID {interface}, function {handler:?}: {failure}\n{trace}"
    );
}
