pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod packages;
pub mod project_identity;
pub mod state;
pub mod traits;
pub mod ui;
pub mod utils;

use clap::Parser;
use std::process::exit;

/// Run allpac CLI entrypoint.
pub fn run_cli() {
    // 0. Initialize color settings (must be first)
    ui::init_colors();

    // 1. Signal handling: running backends are killed at their next poll
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!();
        ui::mark_interrupted();
        ui::warning("Operation cancelled by user.");
    }) {
        ui::warning(&format!("Could not install Ctrl-C handler: {}", e));
    }

    // 2. Parse
    let args = cli::args::Cli::parse();
    ui::set_quiet(args.global.quiet);
    ui::set_verbose(args.global.verbose);

    // 3. Diagnostic log; allpac still works without it
    if let Err(e) = logging::init() {
        ui::warning(&format!("Logging disabled: {}", e));
    }

    // 4. Run
    if let Err(e) = cli::dispatcher::dispatch(&args) {
        tracing::error!(error = %e, "command failed");
        ui::error(&format!("{}", e));
        exit(1);
    }
}
