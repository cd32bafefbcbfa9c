//! Input validation for package names
//!
//! Names end up as subprocess arguments, AUR clone URLs and cache directory
//! names, so they are checked once before any of that happens.

use crate::error::{AllpacError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Allows: alphanumeric, dash, underscore, dot, plus, at sign, slash
static SAFE_PACKAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9@._+/-]+$").expect("Invalid regex pattern"));

/// Characters that could be dangerous in shell contexts
static SHELL_DANGEROUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[;`$(){}|&<>\\'"\n\r\t ]"#).expect("Invalid regex pattern"));

const MAX_NAME_LEN: usize = 256;

/// Validate a package name is safe to hand to a backend command
///
/// Package names like `foo; rm -rf /` or `--help` are rejected.
pub fn validate_package_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AllpacError::InvalidPackageName(
            "package name cannot be empty".to_string(),
        ));
    }

    if name.len() > MAX_NAME_LEN {
        let preview: String = name.chars().take(50).collect();
        return Err(AllpacError::InvalidPackageName(format!(
            "package name too long (max {} chars): {}...",
            MAX_NAME_LEN, preview
        )));
    }

    if SHELL_DANGEROUS.is_match(name) {
        return Err(AllpacError::InvalidPackageName(format!(
            "package name contains unsafe characters: {}",
            name
        )));
    }

    if !SAFE_PACKAGE_NAME.is_match(name) {
        return Err(AllpacError::InvalidPackageName(format!(
            "package name contains invalid characters: {}",
            name
        )));
    }

    // Would be parsed as an option by pacman/snap/flatpak
    if name.starts_with('-') {
        return Err(AllpacError::InvalidPackageName(format!(
            "package name cannot start with '-': {}",
            name
        )));
    }

    if name.contains("..") {
        return Err(AllpacError::InvalidPackageName(format!(
            "package name cannot contain path traversal: {}",
            name
        )));
    }

    Ok(())
}

/// Stricter check for names used as a single path component or URL segment
pub fn validate_path_component(name: &str) -> Result<()> {
    validate_package_name(name)?;
    if name.contains('/') {
        return Err(AllpacError::InvalidPackageName(format!(
            "package name cannot contain '/': {}",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
