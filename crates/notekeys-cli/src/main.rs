//! notekeys: play a MIDI keyboard as a computer keyboard.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use notekeys_core::mapping::DEFAULT_SET_NAME;
use notekeys_core::{
    build_synthesizer, parser, ChannelSink, InputSink, KeyLookup, MappingSelector, MappingSets,
    NoteTracker, SynthMode,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod midi_input;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Send virtual-key codes
    VirtualKey,
    /// Send hardware scancodes (for games reading raw input)
    Scancode,
}

impl From<Mode> for SynthMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::VirtualKey => SynthMode::VirtualKey,
            Mode::Scancode => SynthMode::Scancode,
        }
    }
}

/// Play a MIDI keyboard as a computer keyboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Mapping file with named note-to-key sets
    #[arg(short, long)]
    mappings: Option<PathBuf>,

    /// Mapping set to use
    #[arg(short, long, default_value = DEFAULT_SET_NAME)]
    set: String,

    /// Key injection strategy
    #[arg(long, value_enum, default_value_t = Mode::VirtualKey)]
    mode: Mode,

    /// MIDI input port, by index or name fragment (default: first port)
    #[arg(short, long)]
    port: Option<String>,

    /// List available MIDI input ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Log key actions instead of injecting them
    #[arg(long)]
    dry_run: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    if args.list_ports {
        for (i, name) in midi_input::list_ports()?.iter().enumerate() {
            println!("{}: {}", i, name);
        }
        return Ok(());
    }

    let selector = Arc::new(load_selector(&args)?);
    let (lookup, sink, printer) = build_output(args.dry_run);
    let tracker = Arc::new(NoteTracker::new(
        selector,
        build_synthesizer(args.mode.into(), lookup),
        sink,
    ));

    let conn = midi_input::connect(args.port.as_deref(), Arc::clone(&tracker))?;
    info!("Listening ({:?} mode). Press Enter to quit.", args.mode);

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;

    // Stop delivery before touching the state.
    conn.close();
    let released = tracker.release_all();
    if !released.is_empty() {
        info!("Released {} held key(s) on exit", released.len());
    }

    drop(tracker);
    if let Some(handle) = printer {
        let _ = handle.join();
    }
    info!("Bye");
    Ok(())
}

fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// Load the requested set, falling back to the built-in table.
fn load_selector(args: &Args) -> Result<MappingSelector> {
    let sets = match &args.mappings {
        Some(path) => match parser::load_mappings(path) {
            Ok(sets) => {
                let names: Vec<&str> = sets.names().collect();
                info!(
                    "Loaded {} ({}): {}",
                    path.display(),
                    sets.name.as_deref().unwrap_or("unnamed"),
                    names.join(", ")
                );
                sets
            }
            Err(e) => {
                warn!("{:#}; using built-in mappings", e);
                MappingSets::builtin()
            }
        },
        None => MappingSets::builtin(),
    };

    let selector = MappingSelector::default();
    selector.load_sets(sets);
    if let Err(e) = selector.select_set(&args.set) {
        warn!("{}; using built-in '{}'", e, DEFAULT_SET_NAME);
        selector.load_sets(MappingSets::builtin());
        selector.select_set(DEFAULT_SET_NAME)?;
    }
    Ok(selector)
}

type Output = (Arc<dyn KeyLookup>, Box<dyn InputSink>, Option<JoinHandle<()>>);

#[cfg(windows)]
fn build_output(dry_run: bool) -> Output {
    use notekeys_core::os_input::{SendInputSink, SystemLayout};

    if dry_run {
        dry_run_output(Arc::new(SystemLayout))
    } else {
        (Arc::new(SystemLayout), Box::new(SendInputSink::new()), None)
    }
}

#[cfg(not(windows))]
fn build_output(dry_run: bool) -> Output {
    if !dry_run {
        warn!("Key injection is only available on Windows; running as --dry-run");
    }
    dry_run_output(Arc::new(notekeys_core::UsLayout))
}

/// Actions go to a channel and are logged from a separate thread.
fn dry_run_output(lookup: Arc<dyn KeyLookup>) -> Output {
    let (sink, rx) = ChannelSink::new();
    let printer = std::thread::spawn(move || {
        for ev in rx {
            info!("inject {:?}", ev);
        }
    });
    (lookup, Box::new(sink), Some(printer))
}
