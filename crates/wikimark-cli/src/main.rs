use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};
use wikimark_config::Config;
use wikimark_handler::{Handler, LexEvent, format_calls};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    /// One call per line, nested calls indented.
    #[default]
    Text,
    /// Calls and diagnostics as JSON.
    Json,
}

/// Turn a JSON array of lexer events into renderer instructions.
#[derive(Debug, Parser)]
#[command(name = "wikimark", version, about)]
struct Cli {
    /// Event file; reads stdin when missing or `-`.
    events: Option<PathBuf>,

    /// Config file to use instead of ~/.config/wikimark/config.toml.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit the raw calls, without restructuring blocks.
    #[arg(long)]
    no_rewrite: bool,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let mut options = config.handler_options();
    if cli.no_rewrite {
        options.rewrite_blocks = false;
    }

    let events = read_events(cli.events.as_deref())?;
    log::debug!("Read {} events", events.len());

    let instructions = Handler::with_options(options)
        .run(&events)
        .context("Event stream rejected")?;

    for diagnostic in instructions.diagnostics() {
        log::warn!("{diagnostic}");
    }

    match cli.format {
        Format::Text => println!("{}", format_calls(instructions.calls())),
        Format::Json => println!("{}", serde_json::to_string_pretty(&instructions)?),
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let loaded = match path {
        Some(path) => {
            log::info!("Config path: {}", path.display());
            Config::load_from_path(path)?
                .with_context(|| format!("Config file not found: {}", path.display()))?
        }
        None => {
            log::info!("Config path: {}", Config::config_path().display());
            Config::load()?.unwrap_or_else(|| {
                log::debug!("Using default config");
                Config::default()
            })
        }
    };
    Ok(loaded)
}

fn read_events(path: Option<&Path>) -> Result<Vec<LexEvent>> {
    let (content, source) = match path {
        Some(path) if path != Path::new("-") => (
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            path.display().to_string(),
        ),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            (buf, "stdin".to_string())
        }
    };

    serde_json::from_str(&content).with_context(|| format!("Invalid event list in {source}"))
}
