use crate::core::types::{Source, UpdateScope};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(
    name = "allpac",
    about = "One front end for pacman, snap, flatpak and the AUR",
    long_about = "Installs packages from whichever source has them, remembers where each \
                  package came from, and keeps them all up to date with one command.",
    version,
    next_line_help = false,
    term_width = 80
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Parser, Debug)]
pub struct GlobalFlags {
    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Quiet mode
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Never prompt; packages offered by several sources are skipped
    /// unless --from picks one
    #[arg(short = 'y', long = "yes", global = true)]
    pub yes: bool,

    /// Timeout in seconds for install, update, uninstall and builds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install packages from whichever source has an exact match
    Install {
        /// Package names (space or comma separated)
        #[arg(required = true, num_args = 1.., value_delimiter = ',')]
        packages: Vec<String>,

        /// Only consider this source (pacman, snap, flatpak, aur)
        #[arg(long, value_name = "SOURCE")]
        from: Option<Source>,

        /// Reinstall packages that are already tracked
        #[arg(long)]
        force: bool,
    },

    /// Uninstall packages installed through allpac
    #[command(alias = "remove")]
    Uninstall {
        #[arg(required = true, num_args = 1.., value_delimiter = ',')]
        packages: Vec<String>,
    },

    /// Update tracked packages whose source has a newer version
    Update {
        /// Which sources to check
        #[arg(value_enum, default_value_t = UpdateTarget::All)]
        target: UpdateTarget,

        /// Update a single tracked package
        #[arg(long, value_name = "NAME", conflicts_with = "target")]
        package: Option<String>,
    },

    /// Search every source for a package
    Search {
        name: String,
    },

    /// Rebuild an AUR package from a fresh clone
    Rebuild {
        package: String,
    },

    /// Delete all cached AUR clones and builds
    #[command(name = "clean-aur", alias = "clean-cache")]
    CleanAur,

    /// List packages installed through allpac
    List {
        /// Only show packages from this source
        #[arg(long, value_name = "SOURCE")]
        from: Option<Source>,
    },

    /// Recover an unreadable package list from its backups
    Repair,

    /// Check which backend tools are available
    Doctor,

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateTarget {
    All,
    Pacman,
    Snap,
    Flatpak,
    Aur,
}

impl UpdateTarget {
    pub fn scope(self, package: Option<String>) -> UpdateScope {
        if let Some(name) = package {
            return UpdateScope::Package(name);
        }
        match self {
            Self::All => UpdateScope::All,
            Self::Pacman => UpdateScope::Source(Source::Pacman),
            Self::Snap => UpdateScope::Source(Source::Snap),
            Self::Flatpak => UpdateScope::Source(Source::Flatpak),
            Self::Aur => UpdateScope::Source(Source::Aur),
        }
    }
}

impl Command {
    /// Commands that may change the package list or the system
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::Install { .. }
                | Self::Uninstall { .. }
                | Self::Update { .. }
                | Self::Rebuild { .. }
                | Self::CleanAur
                | Self::Repair
        )
    }
}
