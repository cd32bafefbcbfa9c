//! Command dispatcher
//!
//! Routes CLI commands to their appropriate handlers.

use crate::cli::args::{Cli, Command, GlobalFlags};
use crate::commands;
use crate::config::Settings;
use crate::error::Result;
use crate::state::io::acquire_lock;
use crate::traits::AppContext;
use crate::utils::paths;
use std::path::Path;
use tracing::debug;

/// Dispatch the parsed CLI command to the appropriate handler
pub fn dispatch(args: &Cli) -> Result<()> {
    if let Command::Completions { shell } = &args.command {
        return commands::completions::run(*shell);
    }

    let settings = load_settings(&args.global, &paths::config_file()?)?;
    let ctx = AppContext::from_settings(settings)?;

    // Held until the command returns; a second mutating allpac fails fast
    let _lock = if args.command.is_mutating() {
        let lock = acquire_lock(&paths::lock_file()?)?;
        debug!(lock = %lock.path().display(), "process lock held");
        Some(lock)
    } else {
        None
    };
    debug!(command = ?args.command, "dispatching");

    match &args.command {
        Command::Install {
            packages,
            from,
            force,
        } => commands::install::run(
            &ctx,
            commands::install::InstallOptions {
                packages: packages.clone(),
                from: *from,
                force: *force,
                yes: args.global.yes,
            },
        ),

        Command::Uninstall { packages } => commands::uninstall::run(
            &ctx,
            commands::uninstall::UninstallOptions {
                packages: packages.clone(),
            },
        ),

        Command::Update { target, package } => commands::update::run(
            &ctx,
            commands::update::UpdateOptions {
                scope: target.scope(package.clone()),
            },
        ),

        Command::Search { name } => commands::search::run(
            &ctx,
            commands::search::SearchOptions {
                query: name.clone(),
            },
        ),

        Command::Rebuild { package } => commands::rebuild::run(&ctx, package),

        Command::CleanAur => commands::cache::run(&ctx),

        Command::List { from } => {
            commands::list::run(&ctx.store, commands::list::ListOptions { source: *from })
        }

        Command::Repair => commands::repair::run(&ctx.store),

        Command::Doctor => commands::doctor::run(&ctx.store, &paths::config_file()?),

        Command::Completions { shell } => commands::completions::run(*shell),
    }
}

/// Settings file merged with the command-line overrides
pub fn load_settings(global: &GlobalFlags, config_path: &Path) -> Result<Settings> {
    Settings::load_from(config_path)?.with_command_timeout(global.timeout)
}
