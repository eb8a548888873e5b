//! Timer system
//!
//! This module provides:
//! - **Clock**: simulation time, moved only by reported turns
//! - **Registry**: the handle → timer table and handle allocation
//! - **Engine**: per-turn dispatch of due timers to their target components
//!
//! # Dispatch
//!
//! ```text
//!   host turn ──► TimerEngine::advance(secs)
//!                      │  clock += round(secs * 1000)
//!                      ▼
//!              due handles, ascending ──► resolve(entity, interface)
//!                      ▲                        │
//!                      │                        ▼
//!         repeat still due? ◄──── on_timer(handler, payload, lateness)
//! ```
//!
//! Within one turn, timers fire in handle order and catch-up repeats of a
//! repeating timer run after every first-pass firing. A timer cancelled by an
//! earlier callback does not fire; a timer created by a callback waits for
//! the next turn.

mod clock;
mod engine;
mod error;
mod handler;
mod record;
mod registry;


pub use clock::turn_length_ms;
pub use engine::{AdvanceSummary, EngineState, TimerEngine};
pub use error::{HandlerError, HandlerFailure, TimerError};
pub use handler::{ComponentResolver, TimerHandler};
pub use record::{EntityId, InterfaceId, TimerHandle, TimerRecord};
pub use registry::Timers;
