use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "monlog",
    about = "Route web-server monitoring events into a leveled logger",
    version,
    after_help = "Events are read as newline-delimited JSON, one object per line, each with an \"event\" field."
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to monlog.yaml config file")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Forward monitoring events from a file or stdin to the logger
    Replay {
        /// Input file of JSON lines ("-" for stdin)
        #[arg(default_value = "-")]
        input: PathBuf,

        /// Keep reading as the file grows
        #[arg(short, long)]
        follow: bool,

        /// Override a level, e.g. --level ops=warn (repeatable)
        #[arg(short, long = "level", value_parser = parse_level_override)]
        levels: Vec<(String, String)>,
    },

    /// Show the resolved event type to level table
    Levels {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

fn parse_level_override(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((event_type, level)) if !event_type.is_empty() && !level.is_empty() => {
            Ok((event_type.to_string(), level.to_string()))
        }
        _ => Err(format!("expected TYPE=LEVEL, got '{}'", s)),
    }
}
