use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;
use turnclock_cli::{Session, logging, readline, respond};
use turnclock_core::{SimulationConfig, SimulationConfigExt};

#[derive(Parser)]
#[command(version, about = "Turn-driven timer simulation driver")]
struct Args {
    /// Run commands from a file instead of the interactive prompt
    #[arg(long)]
    script: Option<PathBuf>,

    /// Turn length in seconds for this run (overrides the config file)
    #[arg(long)]
    turn: Option<f64>,
}

fn main() -> Result<(), String> {
    let args = Args::parse();

    let loaded = SimulationConfig::load();
    let mut config = loaded.as_ref().cloned().unwrap_or_default();
    if let Some(turn) = args.turn {
        config.turn_length_secs = turn;
    }

    logging::init(config.logging.debug || logging::debug_from_env());
    if let Err(err) = &loaded {
        tracing::warn!(error = %err, "Using default simulation config");
    }

    let mut session = Session::new(config);

    match args.script {
        Some(path) => run_script(&path, &mut session),
        None => run_repl(&mut session),
    }
}

fn run_script(path: &Path, session: &mut Session) -> Result<(), String> {
    let script = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

    for (line_num, line) in script.lines().enumerate() {
        match respond(line, session) {
            Ok(true) => break,
            Ok(false) => {}
            Err(err) => println!("line {}: {err}", line_num + 1),
        }
    }
    Ok(())
}

fn run_repl(session: &mut Session) -> Result<(), String> {
    loop {
        let line = readline()?;
        // EOF
        if line.is_empty() {
            break;
        }

        match respond(&line, session) {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}
