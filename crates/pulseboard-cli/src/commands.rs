//! Interactive commands accepted on stdin while watching

use chrono::NaiveDate;
use pulseboard_core::DateBound;
use pulseboard_core::types::parse_date;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    Refresh,
    SetBound(DateBound, NaiveDate),
    Quit,
    Help,
}

pub const HELP: &str = "commands: r (refresh), start YYYY-MM-DD, end YYYY-MM-DD, q (quit)";

impl FromStr for WatchCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or("");

        let parsed = match command {
            "r" | "refresh" => WatchCommand::Refresh,
            "q" | "quit" | "exit" => WatchCommand::Quit,
            "h" | "help" | "?" => WatchCommand::Help,
            "start" | "end" => {
                let bound: DateBound = command.parse().map_err(|e| format!("{}", e))?;
                let value = parts
                    .next()
                    .ok_or_else(|| format!("usage: {} YYYY-MM-DD", command))?;
                let date = parse_date(value).map_err(|e| e.to_string())?;
                WatchCommand::SetBound(bound, date)
            }
            "" => return Err("empty command".to_string()),
            other => return Err(format!("unknown command '{}'", other)),
        };

        if parts.next().is_some() {
            return Err(format!("unexpected arguments after '{}'", command));
        }
        Ok(parsed)
    }
}
