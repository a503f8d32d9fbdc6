use std::sync::atomic::AtomicBool;
use std::time::Instant;

use clap::Parser;
use tracing::Level;

use window_gravity::debug_log::{DebugLogHandle, set_global_debug_log};
use window_gravity::drivers::console::ConsoleDesktop;
use window_gravity::{ControlFlow, Session, StepLoop, WindowError, tracing_sub};

#[derive(Parser, Debug)]
#[command(
    name = "window-gravity",
    version = env!("CARGO_PKG_VERSION"),
    about = "Drops, stacks and throws desktop windows"
)]
struct Cli {
    /// Simulate a demo desktop inside this terminal instead of the real one.
    #[arg(long)]
    terminal: bool,

    /// Log per-tick details.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), WindowError> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    #[cfg(windows)]
    if !cli.terminal {
        return run_native(level);
    }
    #[cfg(not(windows))]
    if !cli.terminal {
        eprintln!("no native window backend on this platform, using the terminal desktop");
    }
    run_terminal(level)
}

#[cfg(windows)]
fn run_native(level: Level) -> Result<(), WindowError> {
    use window_gravity::drivers::win32::{Win32Desktop, install_interrupt_handler};

    tracing_sub::init(level);
    let interrupted = install_interrupt_handler()?;
    let mut session = Session::new(Win32Desktop::new(), Instant::now())?;
    println!("Running window physics (Ctrl+C to quit)");
    StepLoop::default().run(interrupted, |now| {
        session.step(now).map(|()| ControlFlow::Continue)
    });
    Ok(())
}

fn run_terminal(level: Level) -> Result<(), WindowError> {
    let log = DebugLogHandle::default();
    set_global_debug_log(log.clone());
    tracing_sub::init(level);

    let mut console = ConsoleDesktop::new(log)?;
    let mut session = Session::new(console.desktop(), Instant::now())?;
    console.enter()?;
    tracing::info!("running window physics (q or Ctrl+C to quit)");

    // Raw mode delivers Ctrl+C as a key event, handled by `pump_events`.
    let interrupted = AtomicBool::new(false);
    StepLoop::default().run(&interrupted, |now| -> Result<ControlFlow, WindowError> {
        if console.pump_events()? == ControlFlow::Quit {
            return Ok(ControlFlow::Quit);
        }
        session.step(now)?;
        console.draw()?;
        Ok(ControlFlow::Continue)
    });
    console.exit()?;
    Ok(())
}
