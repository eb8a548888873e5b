use std::io::Write;

use clap::{Parser, Subcommand};

use crate::world::Action;

#[derive(Parser, Debug)]
#[command(version, about = "turnclock")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Add an entity with an echo component
    Spawn {
        #[arg(short, long)]
        entity: u32,
    },
    /// Remove an entity; its timers are dropped when they next come due
    Destroy {
        #[arg(short, long)]
        entity: u32,
    },
    /// Schedule a one-shot timer
    Timeout {
        #[arg(short, long)]
        entity: u32,
        #[arg(short, long, value_enum, default_value = "print")]
        action: Action,
        #[arg(short, long)]
        delay: u64,
        #[arg(long, default_value_t = 0)]
        arg: u64,
    },
    /// Schedule a repeating timer
    Interval {
        #[arg(short, long)]
        entity: u32,
        #[arg(short, long, value_enum, default_value = "print")]
        action: Action,
        #[arg(short, long, default_value_t = 0)]
        delay: u64,
        #[arg(short, long, allow_negative_numbers = true)]
        period: i64,
        #[arg(long, default_value_t = 0)]
        arg: u64,
    },
    Cancel {
        #[arg(long)]
        id: u64,
    },
    /// Run one turn (configured length unless given)
    Advance {
        #[arg(short, long, allow_negative_numbers = true)]
        secs: Option<f64>,
    },
    /// Run several turns of the configured length
    Turns {
        #[arg(short, long)]
        count: u32,
    },
    Time,
    List,
    Config,
    /// Change and persist the turn length
    SetTurn {
        #[arg(short, long, allow_negative_numbers = true)]
        secs: f64,
    },
    Save {
        #[arg(short, long)]
        path: String,
    },
    Load {
        #[arg(short, long)]
        path: String,
    },
    Exit,
}

/// Parse one REPL/script line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "turnclock".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;
    Ok(cli.command)
}

pub fn readline() -> Result<String, String> {
    write!(std::io::stdout(), "> ").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())?;
    let mut buffer = String::new();
    std::io::stdin()
        .read_line(&mut buffer)
        .map_err(|e| e.to_string())?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_interval_with_negative_period() {
        let command = parse_line("interval -e 1 -a fail --period -5 --arg 3").unwrap();
        assert_eq!(
            command,
            Some(Command::Interval {
                entity: 1,
                action: Action::Fail,
                delay: 0,
                period: -5,
                arg: 3,
            })
        );
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# spawn -e 1").unwrap(), None);
    }

    #[test]
    fn rejects_unknown_commands() {
        assert!(parse_line("explode").is_err());
        assert!(parse_line("timeout -e 1 -d 'unterminated").is_err());
    }

    #[test]
    fn parses_optional_turn_length() {
        assert_eq!(
            parse_line("advance").unwrap(),
            Some(Command::Advance { secs: None })
        );
        assert_eq!(
            parse_line("advance -s 0.35").unwrap(),
            Some(Command::Advance { secs: Some(0.35) })
        );
    }
}
