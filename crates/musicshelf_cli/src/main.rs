//! Interactive catalog shell.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the default database.
//! - Hand stdin/stdout to the line-oriented shell.

mod config;
mod repl;

use config::{ReplConfig, USAGE};
use log::{info, warn};
use musicshelf_core::{core_version, init_logging, Session};
use repl::Repl;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match ReplConfig::from_process() {
        Ok(Some(config)) => config,
        Ok(None) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    // Logging is diagnostic only; the shell still runs without it.
    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }

    match run(&config) {
        Ok(()) => {
            info!("event=repl_exit module=cli status=ok");
            ExitCode::SUCCESS
        }
        Err(err) => {
            warn!("event=repl_exit module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &ReplConfig) -> io::Result<()> {
    println!("musicshelf {}", core_version());
    println!("Type `help` for commands, `quit` to exit.");

    let mut repl = Repl::new(Session::new(), io::stdout().lock());
    repl.connect(Some(config.db_path.clone()))?;
    if !repl.session().is_connected() {
        println!("Use `connect <path>` to open another database.");
    }

    repl.run(io::stdin().lock())
}
