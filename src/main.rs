//! Interactive front end: reads one line at a time, hands it to the shared
//! command interpreter, prints the response, loops until `quit` or EOF.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use maptool::{CommandInterpreter, MapService, MapToolConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = MapToolConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .with_writer(io::stderr)
        .init();

    let service = MapService::new(config)?;
    let mut interpreter = CommandInterpreter::new(service);

    println!(
        "maptool {} - type 'help' for commands, 'quit' to exit.",
        maptool::VERSION
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();

    while interpreter.is_running() {
        print!("> ");
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        if line.trim().is_empty() {
            continue;
        }

        println!("{}", interpreter.process_command(&line));
    }

    Ok(())
}
