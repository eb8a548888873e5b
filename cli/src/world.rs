//! Demo entity world
//!
//! Every spawned entity carries one `Echo` component on [`IID_ECHO`]. Timers
//! target it with an [`Action`] and a numeric argument; each firing is written
//! to a journal shared by the whole world so the driver can print firings in
//! the order they happened.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use turnclock_core::{
    ComponentResolver, EntityId, HandlerError, InterfaceId, TimerEngine, TimerHandle,
    TimerHandler, Timers,
};

/// Interface id of the echo component
pub const IID_ECHO: InterfaceId = InterfaceId(1);

/// Engine type driven by the CLI: actions carry a single numeric argument
pub type Engine = TimerEngine<Action, u64>;

/// What an echo component does when its timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Report the firing
    Print,
    /// Report the firing, then return an error
    Fail,
    /// Cancel the timer whose handle is the argument
    Cancel,
    /// Schedule a `print` timeout on the same entity, delayed by the argument
    Chain,
}

#[derive(Debug, Error)]
#[error("scripted failure (arg {arg})")]
pub struct ScriptedFailure {
    pub arg: u64,
}

/// One handler invocation, as seen by the component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireEvent {
    pub entity: EntityId,
    pub action: Action,
    pub arg: u64,
    pub lateness: u64,
    pub time: u64,
}

type Journal = Rc<RefCell<Vec<FireEvent>>>;

/// Component that journals every firing
#[derive(Debug)]
pub struct Echo {
    entity: EntityId,
    journal: Journal,
}

impl TimerHandler<Action, u64> for Echo {
    fn on_timer(
        &mut self,
        action: &Action,
        arg: &u64,
        lateness: u64,
        timers: &mut Timers<'_, Action, u64>,
    ) -> Result<(), HandlerError> {
        self.journal.borrow_mut().push(FireEvent {
            entity: self.entity,
            action: *action,
            arg: *arg,
            lateness,
            time: timers.time(),
        });

        match action {
            Action::Print => {}
            Action::Fail => return Err(ScriptedFailure { arg: *arg }.into()),
            Action::Cancel => {
                if let Some(handle) = TimerHandle::new(*arg) {
                    timers.cancel(handle);
                }
            }
            Action::Chain => {
                timers.set_timeout(self.entity, IID_ECHO, Action::Print, *arg, *arg);
            }
        }
        Ok(())
    }
}

/// Live entities and their components
#[derive(Debug, Default)]
pub struct World {
    entities: BTreeMap<EntityId, Echo>,
    journal: Journal,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity. Returns false if it already exists.
    pub fn spawn(&mut self, entity: EntityId) -> bool {
        if self.entities.contains_key(&entity) {
            return false;
        }
        let echo = Echo {
            entity,
            journal: Rc::clone(&self.journal),
        };
        self.entities.insert(entity, echo);
        true
    }

    /// Remove an entity. Its timers are dropped the next time they come due.
    pub fn destroy(&mut self, entity: EntityId) -> bool {
        self.entities.remove(&entity).is_some()
    }

    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Take every firing journaled since the last call
    pub fn drain_events(&mut self) -> Vec<FireEvent> {
        std::mem::take(&mut *self.journal.borrow_mut())
    }
}

impl ComponentResolver<Action, u64> for World {
    fn resolve(
        &mut self,
        entity: EntityId,
        interface: InterfaceId,
    ) -> Option<&mut dyn TimerHandler<Action, u64>> {
        if interface != IID_ECHO {
            return None;
        }
        self.entities
            .get_mut(&entity)
            .map(|echo| echo as &mut dyn TimerHandler<Action, u64>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destroyed_entities_stop_resolving() {
        let mut world = World::new();
        assert!(world.spawn(EntityId(3)));
        assert!(!world.spawn(EntityId(3)));
        assert!(world.resolve(EntityId(3), IID_ECHO).is_some());
        assert!(world.resolve(EntityId(3), InterfaceId(2)).is_none());

        assert!(world.destroy(EntityId(3)));
        assert!(world.resolve(EntityId(3), IID_ECHO).is_none());
    }

    #[test]
    fn chain_schedules_for_the_next_turn() {
        let mut engine = Engine::new();
        let mut world = World::new();
        world.spawn(EntityId(1));

        engine.set_timeout(EntityId(1), IID_ECHO, Action::Chain, 0, 100);
        engine.advance(0.2, &mut world);
        let first = world.drain_events();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].action, Action::Chain);
        assert_eq!(engine.len(), 1);

        engine.advance(0.2, &mut world);
        let second = world.drain_events();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].action, Action::Print);
        assert_eq!(second[0].lateness, 100);
        assert!(engine.is_empty());
    }

    #[test]
    fn failing_echo_is_counted() {
        let mut engine = Engine::new();
        let mut world = World::new();
        world.spawn(EntityId(1));

        engine.set_timeout(EntityId(1), IID_ECHO, Action::Fail, 0, 7);
        engine.set_timeout(EntityId(1), IID_ECHO, Action::Print, 0, 8);
        let summary = engine.advance(0.2, &mut world);

        assert_eq!(summary.fired, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(world.drain_events().len(), 2);
    }
}
