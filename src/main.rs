use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use portable_pty::{native_pty_system, PtySize};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use ptytest::config::{BroadcastConfig, Config, LoggingConfig};
use ptytest::keys::{self, KeyMap};
use ptytest::logging::init_tracing;
use ptytest::mux::TmuxCli;
use ptytest::ui::{run_viewer, ViewerOptions};
use ptytest::{Broadcaster, Session, SessionBuilder, TerminalSession};

#[derive(Parser, Debug)]
#[command(name = "ptytest")]
#[command(about = "Drive interactive terminal programs with real keystrokes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that tmux, pty allocation and the config file work
    Check,
    /// Print the version
    Version,
    /// List application key maps, or dump one
    Keys {
        /// Application name (fzf, vim, tmux, ...)
        app: Option<String>,
    },
    /// Run a command and watch its screen in a read-only viewer
    View {
        /// Keys to type once the command is up, each followed by Enter
        #[arg(short, long = "send", value_name = "KEYS")]
        send: Vec<String>,
        /// Pause between scripted keys in milliseconds
        #[arg(long, default_value_t = 500)]
        step_ms: u64,
        /// Broadcaster poll interval in milliseconds
        #[arg(short, long, value_name = "MS")]
        interval: Option<u64>,
        /// Log file while the viewer owns the terminal
        #[arg(long)]
        log_file: Option<PathBuf>,
        /// Command and its arguments
        #[arg(required = true, last = true)]
        command: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Check => cmd_check(),
        Command::Version => {
            println!("ptytest {}", env!("CARGO_PKG_VERSION"));
            Ok(true)
        }
        Command::Keys { app } => cmd_keys(app.as_deref()),
        Command::View {
            send,
            step_ms,
            interval,
            log_file,
            command,
        } => cmd_view(ViewArgs {
            send,
            step: Duration::from_millis(step_ms),
            interval,
            log_file,
            command,
        }),
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn report(ok: bool, message: impl std::fmt::Display) -> bool {
    println!("{} {message}", if ok { "✓" } else { "✗" });
    ok
}

fn cmd_check() -> Result<bool> {
    println!("ptytest environment check\n");
    let mut all_ok = true;

    all_ok &= match TmuxCli::new().version() {
        Ok(version) => report(true, format!("tmux found: {version}")),
        Err(err) => report(false, format!("tmux unavailable: {err}")),
    };

    let size = PtySize {
        rows: 24,
        cols: 80,
        pixel_width: 0,
        pixel_height: 0,
    };
    all_ok &= match native_pty_system().openpty(size) {
        Ok(_) => report(true, "pty allocation works"),
        Err(err) => report(false, format!("pty allocation failed: {err}")),
    };

    let path = Config::config_path();
    all_ok &= match Config::load() {
        Ok(_) if path.exists() => report(true, format!("config loaded: {}", path.display())),
        Ok(_) => report(true, format!("no config at {}, using defaults", path.display())),
        Err(err) => report(false, format!("config invalid: {err}")),
    };

    println!();
    if all_ok {
        println!("All checks passed! ptytest is ready to use.");
    } else {
        println!("Some checks failed.");
    }
    Ok(all_ok)
}

fn print_map(map: &KeyMap) {
    println!("{} - {}", map.name, map.description);
    let width = map.names().map(str::len).max().unwrap_or(0);
    for (name, sequence) in map.iter() {
        println!("  {name:<width$}  {}", keys::describe(sequence));
    }
}

fn cmd_keys(app: Option<&str>) -> Result<bool> {
    match app {
        Some(name) => match keys::app(name) {
            Some(map) => {
                print_map(map);
                Ok(true)
            }
            None => {
                eprintln!("unknown application '{name}'");
                Ok(false)
            }
        },
        None => {
            for map in keys::APPS {
                println!("{:<10} {:>3} bindings  {}", map.name, map.len(), map.description);
            }
            Ok(true)
        }
    }
}

struct ViewArgs {
    send: Vec<String>,
    step: Duration,
    interval: Option<u64>,
    log_file: Option<PathBuf>,
    command: Vec<String>,
}

fn drive(session: &Session, keys: &[String], step: Duration) {
    for keys in keys {
        thread::sleep(step);
        if let Err(err) = session.send_keys(keys) {
            tracing::warn!(error = %err, "scripted keys stopped");
            return;
        }
    }
}

fn cmd_view(args: ViewArgs) -> Result<bool> {
    let config = Config::load().context("failed to load config")?;
    let logging = LoggingConfig {
        file: Some(
            args.log_file
                .or(config.logging.file.clone())
                .unwrap_or_else(|| std::env::temp_dir().join("ptytest-view.log")),
        ),
        ..config.logging.clone()
    };
    init_tracing(&logging).context("failed to open log file")?;

    let (program, program_args) = args
        .command
        .split_first()
        .context("no command given")?;
    let session = SessionBuilder::with_defaults(program.clone(), &config.session)
        .args(program_args.iter().cloned())
        .spawn()?;

    let broadcast = BroadcastConfig {
        poll_interval_ms: args
            .interval
            .unwrap_or(config.broadcast.poll_interval_ms),
        ..config.broadcast.clone()
    };
    let broadcaster = Broadcaster::from_buffer(session.buffer(), &broadcast);
    broadcaster.start()?;

    let options = ViewerOptions {
        title: args.command.join(" "),
        ..ViewerOptions::default()
    };
    let viewed = thread::scope(|scope| {
        scope.spawn(|| drive(&session, &args.send, args.step));
        run_viewer(&broadcaster, options)
    });

    broadcaster.shutdown();
    session.cleanup();
    viewed.context("viewer failed")?;
    Ok(true)
}
