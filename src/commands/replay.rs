//! Event replay command
//!
//! Reads newline-delimited JSON monitoring events and pushes each one through
//! a sink into the configured logger. With `--follow` the file is tailed,
//! similar to `tail -f`.

use colored::*;
use eyre::{Context, Result};
use monlog::{Event, LoggerRegistry, Sink, SinkOptions, create_sink, report_error};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::config::Config;

/// Counters for one replay run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplayStats {
    pub lines: usize,
    pub forwarded: usize,
    pub ignored: usize,
    pub malformed: usize,
}

/// Run the replay command
pub fn run(input: &Path, follow: bool, overrides: &[(String, String)], config: &Config) -> Result<()> {
    let sink = build_sink(config, overrides)?;
    if config.capture_errors {
        install_panic_hook();
    }
    let mut stats = ReplayStats::default();

    if input == Path::new("-") {
        if follow {
            log::warn!("--follow has no effect when reading stdin");
        }
        let stdin = io::stdin();
        replay_reader(&mut stdin.lock(), &sink, &mut stats, false)?;
    } else {
        let file = File::open(input).context(format!("Failed to open {}", input.display()))?;
        if follow {
            println!("{} Following {} (Ctrl+C to stop)...", "👁".blue(), input.display().to_string().cyan());
        }
        replay_reader(&mut BufReader::new(file), &sink, &mut stats, follow)?;
    }

    print_summary(&stats);
    Ok(())
}

/// Resolve the configured backend and build a sink around it
pub fn build_sink(config: &Config, overrides: &[(String, String)]) -> Result<Sink> {
    build_sink_with(config, overrides, &LoggerRegistry::with_defaults())
}

/// Build a sink, resolving `config.logger` through `registry`
///
/// With `capture_errors` set, the process-wide error channel is redirected to
/// the resolved backend.
pub fn build_sink_with(config: &Config, overrides: &[(String, String)], registry: &LoggerRegistry) -> Result<Sink> {
    let logger = registry.resolve(&config.logger);
    if logger.is_none() {
        log::warn!(
            "Logger '{}' not found, available: {}",
            config.logger,
            registry.names().join(", ")
        );
    }

    let mut options = SinkOptions::new()
        .with_levels(config.levels.clone())
        .with_levels(overrides.iter().cloned());
    if config.capture_errors {
        options = options.with_global_error_channel();
    }

    create_sink(logger, options).context(format!("Failed to create sink for logger '{}'", config.logger))
}

/// Send panic messages through the process-wide error channel
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let detail = Value::String(info.to_string());
        if report_error("panic:", std::slice::from_ref(&detail)).is_err() {
            eprintln!("panic: {}", info);
        }
    }));
}

/// Feed every line of `reader` through the sink
///
/// In follow mode EOF is not the end: the reader is polled until more data
/// arrives, and partial lines are held back until their newline shows up.
pub fn replay_reader<R: BufRead>(reader: &mut R, sink: &Sink, stats: &mut ReplayStats, follow: bool) -> Result<()> {
    let mut line = String::new();

    loop {
        let read = reader.read_line(&mut line).context("Failed to read input")?;

        if read == 0 || (follow && !line.ends_with('\n')) {
            if !follow {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(100));
            continue;
        }

        stats.lines += 1;
        process_line(sink, &line, stats)?;
        line.clear();
    }
}

/// Parse one line and hand it to the sink
pub fn process_line(sink: &Sink, line: &str, stats: &mut ReplayStats) -> Result<()> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(());
    }

    let event: Event = match serde_json::from_str(trimmed) {
        Ok(event) => event,
        Err(e) => {
            stats.malformed += 1;
            report_error(
                &format!("Skipping malformed event on line {}:", stats.lines),
                &[Value::String(e.to_string())],
            )
            .context("Failed to report malformed event")?;
            return Ok(());
        }
    };

    if !sink.handles(event.event_type()) {
        log::trace!("No handler for '{}' on line {}", event.event_type(), stats.lines);
        stats.ignored += 1;
        return Ok(());
    }

    sink.write(&event)
        .context(format!("Logger rejected '{}' event on line {}", event.event_type(), stats.lines))?;
    stats.forwarded += 1;
    Ok(())
}

fn print_summary(stats: &ReplayStats) {
    println!(
        "{} {} lines: {} forwarded, {} ignored, {} malformed",
        "✓".green(),
        stats.lines,
        stats.forwarded.to_string().green(),
        stats.ignored.to_string().yellow(),
        if stats.malformed > 0 {
            stats.malformed.to_string().red()
        } else {
            stats.malformed.to_string().normal()
        }
    );
}
