//! kv CLI Client
//!
//! Command-line interface for interacting with the KV storage engine.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use kvcli::commands::{Action, Handler};
use kvcli::config::{self, ConfigBuilder, OutputFormat};
use kvcli::output::{self, Outcome, Renderer};
use kvcli::{Config, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// KV Storage Engine CLI
#[derive(Parser, Debug)]
#[command(name = "kv")]
#[command(about = "KV Storage Engine CLI")]
#[command(long_about = "A command-line interface for interacting with the KV Storage Engine.\n\n\
Settings are read from ~/.kv/config.toml or ./config.toml, then KV_* environment \
variables, then the flags below.")]
#[command(version)]
struct Args {
    /// Server host (default: from config or 127.0.0.1)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Server port (default: from config or 9000)
    #[arg(long, global = true, value_parser = clap::value_parser!(u16).range(1..))]
    port: Option<u16>,

    /// Per-operation timeout in milliseconds, 0 to wait forever (default: 3000)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Output format (default: text)
    #[arg(long, global = true, value_enum)]
    format: Option<FormatArg>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get the value of a key
    Get {
        /// The key to get
        key: String,
    },

    /// Set the value of a key (the value may contain spaces)
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    #[command(visible_aliases = ["del", "rm"])]
    Delete {
        /// The key to delete
        key: String,
    },

    /// Check server connectivity
    Ping,

    /// Show server status
    Status,

    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Create a default config file at ~/.kv/config.toml
    Init,
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only command output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let renderer = output::renderer_for(&config.output);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match run(args.command, &config, renderer.as_ref(), &mut out) {
        Ok(outcome) if outcome.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("Failed to write output: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Load config from file and environment, then apply flags
fn resolve_config(args: &Args) -> Result<Config> {
    let loaded = Config::load().or_else(|e| {
        eprintln!("Warning: failed to load config file: {}", e);
        Config::load_from(None, |name| std::env::var(name).ok())
    })?;

    let mut builder = ConfigBuilder::from_config(loaded);
    if let Some(host) = &args.host {
        builder = builder.host(host.clone());
    }
    if let Some(port) = args.port {
        builder = builder.port(port);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        builder = builder.timeout_ms(timeout_ms);
    }
    if let Some(format) = args.format {
        builder = builder.format(format.into());
    }
    if args.no_color {
        builder = builder.color(false);
    }

    let config = builder.build();
    config.validate()?;
    tracing::debug!("Resolved configuration: {:?}", config);
    Ok(config)
}

fn run(
    command: Commands,
    config: &Config,
    renderer: &dyn Renderer,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let action = match command {
        Commands::Get { key } => Action::Get { key },
        Commands::Set { key, value } => Action::Set { key, value },
        Commands::Delete { key } => Action::Delete { key },
        Commands::Ping => Action::Ping,
        Commands::Status => Action::Status,
        Commands::Config { action } => return run_config(action, config, renderer, out),
    };

    let settings = config.settings();
    Handler::new(&settings, renderer).run(&action, out)
}

fn run_config(
    action: ConfigCommands,
    config: &Config,
    renderer: &dyn Renderer,
    out: &mut dyn Write,
) -> Result<Outcome> {
    match action {
        ConfigCommands::Show => {
            renderer.render_config(config, out)?;
            Ok(Outcome::Success {
                message: String::new(),
            })
        }
        ConfigCommands::Init => {
            let outcome = match config::create_default_config() {
                Ok(path) => Outcome::Success {
                    message: format!("Created default config at {}", path.display()),
                },
                Err(e) => Outcome::Error {
                    message: format!("failed to create config: {}", e),
                },
            };
            renderer.render(&outcome, out)?;
            Ok(outcome)
        }
    }
}
