use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Supported backends.
// Variant order is the order backends are searched and listed in.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Pacman,  // Native Arch repositories
    Snap,    // Snap store
    Flatpak, // Flatpak remotes
    Aur,     // Arch User Repository, built from source
}

impl Source {
    pub const ALL: [Source; 4] = [Source::Pacman, Source::Snap, Source::Flatpak, Source::Aur];

    /// Tag used in the package list and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pacman => "pacman",
            Self::Snap => "snap",
            Self::Flatpak => "flatpak",
            Self::Aur => "aur",
        }
    }

    /// Human readable name for prompts and reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pacman => "Pacman",
            Self::Snap => "Snap",
            Self::Flatpak => "Flatpak",
            Self::Aur => "AUR",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Accepts the record tags plus the flag names the old CLI used
// (--arch, --flats).
impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pacman" | "arch" | "native" => Ok(Self::Pacman),
            "snap" => Ok(Self::Snap),
            "flatpak" | "flats" => Ok(Self::Flatpak),
            "aur" => Ok(Self::Aur),
            other => Err(format!(
                "unknown source '{}' (expected one of: pacman, snap, flatpak, aur)",
                other
            )),
        }
    }
}

/// Which tracked packages a reconciliation run looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateScope {
    All,
    Source(Source),
    Package(String),
}

impl fmt::Display for UpdateScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all sources"),
            Self::Source(source) => write!(f, "{} packages", source.label()),
            Self::Package(name) => write!(f, "package '{}'", name),
        }
    }
}

/// Raw search lines returned by one backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceResults {
    pub source: Source,
    pub entries: Vec<String>,
}

/// A backend whose search primitive failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFailure {
    pub source: Source,
    pub message: String,
}

/// Search results for one requested name across every backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub package_name: String,
    pub results: Vec<SourceResults>,
    pub failures: Vec<SearchFailure>,
}

impl SearchResult {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.iter().all(|r| r.entries.is_empty())
    }
}
