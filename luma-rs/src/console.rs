//! Console output sink.
//!
//! Leveled host-side logging plus the error-report printer. Colors are
//! applied only when the target stream is a tty; piped output stays plain
//! so it can be grepped and diffed.

use crossterm::style::Stylize;

// ── Tty detection ─────────────────────────────────────────────────────────────

pub fn stdout_is_tty() -> bool {
    unsafe { libc::isatty(libc::STDOUT_FILENO) != 0 }
}

pub fn stderr_is_tty() -> bool {
    unsafe { libc::isatty(libc::STDERR_FILENO) != 0 }
}

// ── Leveled output ────────────────────────────────────────────────────────────

pub fn info(msg: &str) {
    if stdout_is_tty() {
        println!("{} {}", "INFO:".green().bold(), msg);
    } else {
        println!("INFO: {msg}");
    }
}

pub fn warn(msg: &str) {
    if stdout_is_tty() {
        println!("{} {}", "WARN:".yellow().bold(), msg);
    } else {
        println!("WARN: {msg}");
    }
}

pub fn error(msg: &str) {
    if stderr_is_tty() {
        eprintln!("{} {}", "ERROR:".red().bold(), msg);
    } else {
        eprintln!("ERROR: {msg}");
    }
}

pub fn debug(msg: &str) {
    if stdout_is_tty() {
        println!("{} {}", "DEBUG:".magenta().bold(), msg);
    } else {
        println!("DEBUG: {msg}");
    }
}

// ── Error reports ─────────────────────────────────────────────────────────────

/// Print a rendered error report to stderr, highlighting the offending
/// context line when stderr is a tty.
pub fn print_report(report: &str) {
    let tty = stderr_is_tty();
    for line in report.lines() {
        if tty && line.starts_with("│ >") {
            eprintln!("{}", line.red());
        } else {
            eprintln!("{line}");
        }
    }
}
