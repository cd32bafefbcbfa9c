use colored::Colorize;
use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};

static QUIET: AtomicBool = AtomicBool::new(false);
static VERBOSE: AtomicBool = AtomicBool::new(false);
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Disable colors when stdout is not a terminal. `colored` already
/// honours `NO_COLOR` and `CLICOLOR_FORCE`.
pub fn init_colors() {
    if !io::stdout().is_terminal() && std::env::var_os("CLICOLOR_FORCE").is_none() {
        colored::control::set_override(false);
    }
}

pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Called from the Ctrl-C handler; running subprocesses are killed at
/// their next poll.
pub fn mark_interrupted() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

pub fn is_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

pub fn header(title: &str) {
    if is_quiet() {
        return;
    }
    println!("\n{}", title.bold().underline());
}

pub fn success(msg: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", "✓".green().bold(), msg);
}

pub fn info(msg: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", "ℹ".blue().bold(), msg);
}

/// Only shown with `--verbose`
pub fn verbose(msg: &str) {
    if !is_verbose() || is_quiet() {
        return;
    }
    println!("{} {}", "·".bright_black(), msg.dimmed());
}

pub fn warning(msg: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

pub fn indent(msg: &str, level: usize) {
    if is_quiet() {
        return;
    }
    let spaces = " ".repeat(level * 2);
    println!("{}{}", spaces, msg);
}

/// Numbered menu. Returns the zero-based index the user typed, which may be
/// out of range; `None` for empty or unparsable input.
pub fn prompt_choice(question: &str, options: &[String]) -> Option<usize> {
    println!("{} {}", "?".yellow().bold(), question);
    for (i, option) in options.iter().enumerate() {
        println!("  {} {}", format!("{})", i + 1).cyan().bold(), option);
    }
    print!("{} ", "Choice:".bold());
    if io::stdout().flush().is_err() {
        return None;
    }

    read_line().and_then(|input| parse_choice(&input))
}

/// `"2"` -> `Some(1)`; `"0"`, `""` and junk -> `None`
pub fn parse_choice(input: &str) -> Option<usize> {
    input.trim().parse::<usize>().ok()?.checked_sub(1)
}

fn read_line() -> Option<String> {
    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) => None,
        Ok(_) => Some(input),
        Err(e) => {
            eprintln!("\nWarning: Failed to read input: {}", e);
            None
        }
    }
}
