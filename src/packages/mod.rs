//! # Backend Adapters
//!
//! One [`PackageManager`] implementation per [`Source`](crate::core::types::Source):
//!
//! - **pacman** (`pacman.rs`): native repositories, `pacman -Ss/-Si/-S/-Rns`
//! - **snap** (`snap.rs`): `snap find/info/install/remove/refresh`
//! - **flatpak** (`flatpak.rs`): one configured remote, `flatpak search/remote-info/install`
//! - **AUR** (`aur.rs`): RPC lookups over HTTP, builds via `git clone` + `makepkg`
//!
//! Commands never talk to a backend directly; they go through a
//! [`ManagerSet`], which tests fill with in-memory adapters instead.
//!
//! Every subprocess runs through [`command::CommandRunner`], which enforces
//! the configured timeout and aborts on Ctrl-C.

pub mod aur;
pub mod command;
pub mod flatpak;
pub mod pacman;
mod parse;
pub mod registry;
pub mod snap;
pub mod traits;

#[cfg(test)]
pub mod fake;

pub use registry::ManagerSet;
pub use traits::{PackageManager, UpdateStrategy};
