// server.rs — dedicated server entry point. Loads `server.properties`,
// initializes structured logging, binds the reactor, installs a `ctrlc`
// handler for graceful shutdown (S7), and blocks on the receive loop.
// Mirrors the shape of `sys_main`/`qcommon_init` startup
// sequence, stripped of everything windowing/rendering related since this
// is a headless dedicated server.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;

use wingman_server::{load_server_config, InMemoryPlayerStore, Reactor};

fn print_help() {
    println!("wingman-server [--help]");
    println!();
    println!("Reads server.properties from the current directory.");
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let config_path = PathBuf::from("server.properties");
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            other => {
                eprintln!("unrecognized argument: {other}");
                print_help();
                return ExitCode::FAILURE;
            }
        }
    }

    let config = match load_server_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load {}: {e}", config_path.display());
            return ExitCode::FAILURE;
        }
    };

    let player_store = Arc::new(Mutex::new(InMemoryPlayerStore::new()));
    let reactor = match Reactor::bind(&config, player_store) {
        Ok(reactor) => reactor,
        Err(e) => {
            eprintln!("failed to bind {}:{}: {e}", config.bind_ip, config.port);
            return ExitCode::FAILURE;
        }
    };

    let shutdown = reactor.shutdown_flag();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("shutdown signal received");
        shutdown.store(true, Ordering::Relaxed);
    }) {
        eprintln!("failed to install signal handler: {e}");
        return ExitCode::FAILURE;
    }

    reactor.run();
    ExitCode::SUCCESS
}
