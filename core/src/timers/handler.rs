use super::error::HandlerError;
use super::record::{EntityId, InterfaceId};
use super::registry::Timers;

/// Trait for components that receive timer callbacks.
///
/// `handler` is the selector the timer was scheduled with; implementations
/// match on it to pick the behavior. `lateness` is how far past the scheduled
/// time the firing happens (ms, never negative).
///
/// `timers` gives access to the live registry during dispatch: a cancel takes
/// effect immediately, including for timers already due in the current turn,
/// while new timers only become eligible on a later turn.
pub trait TimerHandler<H, P> {
    fn on_timer(
        &mut self,
        handler: &H,
        payload: &P,
        lateness: u64,
        timers: &mut Timers<'_, H, P>,
    ) -> Result<(), HandlerError>;
}

/// Looks up the component a timer targets.
///
/// Returning `None` means the entity was destroyed or no longer has the
/// interface; the engine drops the timer without reporting an error.
pub trait ComponentResolver<H, P> {
    fn resolve(
        &mut self,
        entity: EntityId,
        interface: InterfaceId,
    ) -> Option<&mut dyn TimerHandler<H, P>>;
}
