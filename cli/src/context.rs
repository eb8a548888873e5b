use serde::{Deserialize, Serialize};
use turnclock_core::{AdvanceSummary, EngineState, EntityId, SimulationConfig};

use crate::world::{Action, Engine, FireEvent, World};

/// One simulation session: config, engine and the world it fires into.
///
/// The engine's lifetime is the session's; nothing is process-global.
#[derive(Debug)]
pub struct Session {
    pub config: SimulationConfig,
    pub engine: Engine,
    pub world: World,
}

/// Result of one turn
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub time: u64,
    pub turn_length: u64,
    pub summary: AdvanceSummary,
    pub events: Vec<FireEvent>,
}

/// On-disk form of a session (`save`/`load` commands)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSession {
    pub entities: Vec<EntityId>,
    pub engine: EngineState<Action, u64>,
}

impl Session {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            engine: Engine::new(),
            world: World::new(),
        }
    }

    /// Run one turn. Uses the configured turn length unless `secs` is given.
    pub fn turn(&mut self, secs: Option<f64>) -> TurnReport {
        let secs = secs.unwrap_or(self.config.turn_length_secs);
        let summary = self.engine.advance(secs, &mut self.world);
        TurnReport {
            time: self.engine.time(),
            turn_length: self.engine.last_turn_length(),
            summary,
            events: self.world.drain_events(),
        }
    }

    pub fn save(&self) -> SavedSession {
        SavedSession {
            entities: self.world.entities().collect(),
            engine: self.engine.state(),
        }
    }

    /// Replace engine and world with a saved session, keeping the config.
    pub fn restore(&mut self, saved: SavedSession) {
        let mut world = World::new();
        for entity in saved.entities {
            world.spawn(entity);
        }
        self.world = world;
        self.engine = Engine::from_state(saved.engine);
    }
}
