pub mod cache;
pub mod completions;
pub mod doctor;
pub mod install;
pub mod list;
pub mod rebuild;
pub mod repair;
pub mod report;
pub mod search;
pub mod uninstall;
pub mod update;

#[cfg(test)]
mod testing;
