//! Logging with colored module prefixes.
//!
//! - `log!` prints `[module] message`
//! - `debug!` prints only when verbose mode is on
//!
//! Native builds write to stdout through crossterm; wasm builds write to the
//! browser console.
//!
//! # Example
//!
//! ```ignore
//! log!("nav"; "loaded {}", path);
//! debug!("sidenote"; "pushed {} down by {}px", id, delta);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

/// Global verbose flag (set by --verbose or `QuireApp::set_verbose`)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Macros
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when verbose is enabled)
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Sinks
// ============================================================================

/// Log a message with a colored module prefix
#[cfg(not(target_arch = "wasm32"))]
pub fn log(module: &str, message: &str) {
    use crossterm::{
        execute,
        terminal::{Clear, ClearType},
    };
    use std::io::{Write, stdout};

    let prefix = colorize_prefix(module);
    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Log a message to the browser console
#[cfg(target_arch = "wasm32")]
pub fn log(module: &str, message: &str) {
    let line = format!("[{module}] {message}");
    if matches!(module, "error" | "fetch") {
        web_sys::console::warn_1(&line.into());
    } else {
        web_sys::console::log_1(&line.into());
    }
}

/// Apply color to a module prefix based on module type
#[cfg(not(target_arch = "wasm32"))]
fn colorize_prefix(module: &str) -> String {
    use owo_colors::OwoColorize;

    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "nav" | "route" => prefix.bright_blue().bold().to_string(),
        "check" => prefix.bright_green().bold().to_string(),
        "error" | "fetch" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}
