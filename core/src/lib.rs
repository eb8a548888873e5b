pub mod context;
pub mod timers;

// Re-exports for convenience
pub use context::{SimulationConfig, SimulationConfigExt};
pub use timers::{
    AdvanceSummary, ComponentResolver, EngineState, EntityId, HandlerError, InterfaceId,
    TimerEngine, TimerError, TimerHandle, TimerHandler, TimerRecord, Timers,
};
