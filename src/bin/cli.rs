//! CityVault CLI Client
//!
//! Interactive shell that forwards commands to a CityVault server.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use cityvault::session::{InterruptibleBackoff, Session, TcpConnector};
use cityvault::shell::{Outcome, Shell};
use cityvault::{CityError, SessionConfig};
use signal_hook::consts::SIGINT;
use signal_hook::iterator::Signals;
use tracing_subscriber::{fmt, EnvFilter};

/// CityVault CLI
#[derive(Parser, Debug)]
#[command(name = "cityvault-cli")]
#[command(about = "CLI for the CityVault city collection")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:12345")]
    server: String,

    /// Connection attempts before giving up
    #[arg(long, default_value = "3")]
    attempts: u32,

    /// Delay between attempts in milliseconds
    #[arg(long, default_value = "300")]
    retry_delay_ms: u64,

    /// Run this script and exit instead of reading stdin
    #[arg(long)]
    script: Option<PathBuf>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,cityvault=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = SessionConfig {
        server_addr: args.server.clone(),
        max_attempts: args.attempts,
        retry_delay: Duration::from_millis(args.retry_delay_ms),
    };

    let (backoff, canceller) = InterruptibleBackoff::new();

    // Ctrl+C cancels a pending retry delay; if nothing picks that up, quit
    if let Ok(mut signals) = Signals::new([SIGINT]) {
        std::thread::spawn(move || {
            if signals.forever().next().is_some() {
                canceller.cancel();
                std::thread::sleep(Duration::from_millis(200));
                eprintln!("Interrupted");
                std::process::exit(130);
            }
        });
    }

    let connector = TcpConnector::new(&config.server_addr);
    let mut session = Session::new(connector, backoff, config);
    if let Err(e) = session.connect() {
        exit_with(e);
    }

    let mut shell = Shell::new(session, io::stdout());

    let result = match &args.script {
        Some(path) => shell.run_script(path).map(|_| ()),
        None => repl(&mut shell),
    };

    let (mut session, _) = shell.into_parts();
    session.close();

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => exit_with(e),
    }
}

fn repl<W: Write>(
    shell: &mut Shell<Session<TcpConnector, InterruptibleBackoff>, W>,
) -> cityvault::Result<()> {
    println!("Type 'help' for command list");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => return Ok(()),
        };
        if shell.execute_line(&line)? == Outcome::Exit {
            return Ok(());
        }
    }
}

fn exit_with(e: CityError) -> ! {
    eprintln!("Fatal: {}", e);
    let code = match e {
        CityError::Interrupted => 130,
        _ => 1,
    };
    std::process::exit(code);
}
