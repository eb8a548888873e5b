use std::path::PathBuf;

use thiserror::Error;
use turnclock_core::context::{ConfigError, SimulationConfigExt};
use turnclock_core::timers::turn_length_ms;
use turnclock_core::{EntityId, TimerError, TimerHandle};

use crate::context::{SavedSession, Session, TurnReport};
use crate::repl::Command;
use crate::world::IID_ECHO;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),

    #[error("entity {0} already exists")]
    EntityExists(EntityId),

    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error("invalid turn length {0}")]
    InvalidTurnLength(f64),

    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid session file")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Execute one command. Returns true when the session should end.
pub fn run(command: Command, session: &mut Session) -> Result<bool, CommandError> {
    match command {
        Command::Spawn { entity } => spawn(session, EntityId(entity))?,
        Command::Destroy { entity } => destroy(session, EntityId(entity))?,
        Command::Timeout {
            entity,
            action,
            delay,
            arg,
        } => {
            let handle =
                session
                    .engine
                    .set_timeout(EntityId(entity), IID_ECHO, action, delay, arg);
            println!("timer {handle}: {action:?} on entity {entity} in {delay}ms");
        }
        Command::Interval {
            entity,
            action,
            delay,
            period,
            arg,
        } => {
            let handle = session.engine.set_interval(
                EntityId(entity),
                IID_ECHO,
                action,
                delay,
                period,
                arg,
            )?;
            println!("timer {handle}: {action:?} on entity {entity} in {delay}ms, every {period}ms");
        }
        Command::Cancel { id } => cancel(session, id),
        Command::Advance { secs } => {
            if let Some(secs) = secs {
                check_turn_length(secs)?;
            }
            print_turn(&session.turn(secs));
        }
        Command::Turns { count } => {
            for _ in 0..count {
                print_turn(&session.turn(None));
            }
        }
        Command::Time => println!(
            "time {}ms (last turn {}ms)",
            session.engine.time(),
            session.engine.last_turn_length()
        ),
        Command::List => list_timers(session),
        Command::Config => show_config(session),
        Command::SetTurn { secs } => set_turn(session, secs)?,
        Command::Save { path } => save(session, PathBuf::from(path))?,
        Command::Load { path } => load(session, PathBuf::from(path))?,
        Command::Exit => {
            println!("quitting...");
            return Ok(true);
        }
    }
    Ok(false)
}

fn spawn(session: &mut Session, entity: EntityId) -> Result<(), CommandError> {
    if !session.world.spawn(entity) {
        return Err(CommandError::EntityExists(entity));
    }
    println!("spawned entity {entity}");
    Ok(())
}

fn destroy(session: &mut Session, entity: EntityId) -> Result<(), CommandError> {
    if !session.world.destroy(entity) {
        return Err(CommandError::UnknownEntity(entity));
    }
    println!("destroyed entity {entity}");
    Ok(())
}

fn cancel(session: &mut Session, id: u64) {
    let removed = TimerHandle::new(id).is_some_and(|h| session.engine.cancel(h));
    if removed {
        println!("cancelled timer {id}");
    } else {
        println!("no pending timer {id}");
    }
}

fn check_turn_length(secs: f64) -> Result<(), CommandError> {
    if secs.is_finite() && secs >= 0.0 {
        Ok(())
    } else {
        Err(CommandError::InvalidTurnLength(secs))
    }
}

fn print_turn(report: &TurnReport) {
    for event in &report.events {
        println!(
            "  [{:>6}ms] entity {} {:?}({}) late {}ms",
            event.time, event.entity, event.action, event.arg, event.lateness
        );
    }
    let summary = report.summary;
    println!(
        "turn +{}ms -> {}ms: {} fired, {} failed, {} dropped",
        report.turn_length, report.time, summary.fired, summary.failed, summary.orphaned
    );
}

fn list_timers(session: &Session) {
    let timers = session.engine.timers();
    if timers.is_empty() {
        println!("No pending timers");
        return;
    }

    println!(
        "{:<8} {:<8} {:<8} {:<10} {:<10} Arg",
        "Timer", "Entity", "Action", "Next", "Period"
    );
    println!("{}", "-".repeat(56));
    for timer in timers {
        let period = if timer.is_repeating() {
            format!("{}ms", timer.period)
        } else {
            "-".to_string()
        };
        println!(
            "{:<8} {:<8} {:<8} {:<10} {:<10} {}",
            timer.handle,
            timer.entity,
            format!("{:?}", timer.handler),
            format!("{}ms", timer.fire_at),
            period,
            timer.payload
        );
    }
}

fn show_config(session: &Session) {
    let config = &session.config;
    println!(
        "turn length: {}s ({}ms)",
        config.turn_length_secs,
        turn_length_ms(config.turn_length_secs)
    );
    println!("debug logging: {}", config.logging.debug);
}

fn set_turn(session: &mut Session, secs: f64) -> Result<(), CommandError> {
    check_turn_length(secs)?;
    session.config.turn_length_secs = secs;
    session.config.save()?;
    println!("turn length set to {secs}s");
    Ok(())
}

fn save(session: &Session, path: PathBuf) -> Result<(), CommandError> {
    let json = serde_json::to_string_pretty(&session.save())?;
    std::fs::write(&path, json).map_err(|source| CommandError::Io {
        path: path.clone(),
        source,
    })?;
    println!("saved session to {}", path.display());
    Ok(())
}

fn load(session: &mut Session, path: PathBuf) -> Result<(), CommandError> {
    let json = std::fs::read_to_string(&path).map_err(|source| CommandError::Io {
        path: path.clone(),
        source,
    })?;
    let saved: SavedSession = serde_json::from_str(&json)?;
    session.restore(saved);
    println!(
        "loaded session from {} at {}ms ({} timers)",
        path.display(),
        session.engine.time(),
        session.engine.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use turnclock_core::SimulationConfig;

    use super::*;
    use crate::repl::parse_line;

    fn session() -> Session {
        Session::new(SimulationConfig::default())
    }

    fn exec(session: &mut Session, line: &str) -> Result<bool, CommandError> {
        let command = parse_line(line).unwrap().unwrap();
        run(command, session)
    }

    #[test]
    fn scripted_turns_fire_timers() {
        let mut s = session();
        exec(&mut s, "spawn -e 1").unwrap();
        exec(&mut s, "timeout -e 1 -d 250").unwrap();

        let first = s.turn(None);
        assert!(first.events.is_empty());
        let second = s.turn(None);
        assert_eq!(second.events.len(), 1);
        assert_eq!(second.events[0].lateness, 150);
        assert_eq!(second.time, 400);
    }

    #[test]
    fn invalid_period_reports_error() {
        let mut s = session();
        let err = exec(&mut s, "interval -e 1 -p -5").unwrap_err();
        assert!(matches!(
            err,
            CommandError::Timer(TimerError::InvalidRepeatTime { period: -5, .. })
        ));
        assert!(s.engine.is_empty());
    }

    #[test]
    fn destroy_unknown_entity_is_an_error() {
        let mut s = session();
        assert!(matches!(
            exec(&mut s, "destroy -e 4"),
            Err(CommandError::UnknownEntity(EntityId(4)))
        ));
        exec(&mut s, "spawn -e 4").unwrap();
        assert!(matches!(
            exec(&mut s, "spawn -e 4"),
            Err(CommandError::EntityExists(EntityId(4)))
        ));
    }

    #[test]
    fn negative_turn_length_is_rejected() {
        let mut s = session();
        assert!(matches!(
            exec(&mut s, "advance -s -0.2"),
            Err(CommandError::InvalidTurnLength(_))
        ));
        assert_eq!(s.engine.time(), 0);
    }

    #[test]
    fn exit_ends_session() {
        let mut s = session();
        assert!(exec(&mut s, "exit").unwrap());
        assert!(!exec(&mut s, "time").unwrap());
    }

    #[test]
    fn saved_session_restores_world_and_timers() {
        let mut s = session();
        exec(&mut s, "spawn -e 1").unwrap();
        exec(&mut s, "spawn -e 2").unwrap();
        exec(&mut s, "interval -e 1 -p 100").unwrap();
        exec(&mut s, "timeout -e 2 -d 500").unwrap();
        s.turn(Some(0.25));

        let saved = s.save();
        let mut restored = session();
        restored.restore(saved.clone());
        assert_eq!(restored.save(), saved);

        let a = s.turn(Some(0.5));
        let b = restored.turn(Some(0.5));
        assert_eq!(a.events, b.events);
        assert_eq!(a.summary, b.summary);
    }
}
