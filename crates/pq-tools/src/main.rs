//! `pq`: inspect, count and split Parquet files
//!
//! Log output goes to stderr; set `PQ_LOG` (for example `PQ_LOG=debug`) to
//! change the level.

mod commands;

use commands::CommandRegistry;
use std::io;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("PQ_LOG", "warn")).init();
    pq_core::quiet_decoder_panics();

    let registry = CommandRegistry::with_builtin_commands();
    let matches = registry.cli().get_matches();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = registry.dispatch(&matches, &mut out) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
