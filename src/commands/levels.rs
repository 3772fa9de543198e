//! Level table command
//!
//! Shows which level each event type is logged at once config overrides are
//! applied, and whether a handler exists for it.

use colored::*;
use eyre::Result;
use monlog::{HandlerTable, LevelConfig};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::config::Config;

#[derive(Debug, Serialize, PartialEq)]
struct LevelEntry {
    event: String,
    level: String,
    handled: bool,
    overridden: bool,
}

pub fn run(format: OutputFormat, config: &Config) -> Result<()> {
    let entries = gather(config);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&entries)?),
        OutputFormat::Text => print_text(&entries),
    }

    Ok(())
}

fn gather(config: &Config) -> Vec<LevelEntry> {
    let levels = LevelConfig::with_overrides(config.levels.clone());
    let handlers = HandlerTable::with_defaults();

    levels
        .iter()
        .map(|(event, level)| LevelEntry {
            event: event.to_string(),
            level: level.to_string(),
            handled: handlers.contains(event),
            overridden: config.levels.contains_key(event),
        })
        .collect()
}

fn print_text(entries: &[LevelEntry]) {
    println!("{}", "Event levels".bold());
    for entry in entries {
        let level = match entry.level.as_str() {
            "error" => entry.level.red(),
            "warn" | "warning" => entry.level.yellow(),
            "info" => entry.level.green(),
            "debug" | "trace" => entry.level.dimmed(),
            _ => entry.level.normal(),
        };

        let mut line = format!("  {:<10} {}", entry.event, level);
        if entry.overridden {
            line.push_str(&format!(" {}", "(config)".cyan()));
        }
        if !entry.handled {
            line.push_str(&format!(" {}", "(no handler)".dimmed()));
        }
        println!("{}", line);
    }
}
