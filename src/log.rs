use lazy_static::lazy_static;
use std::sync::atomic::{AtomicBool, Ordering};

lazy_static! {
    static ref ENABLED: AtomicBool = AtomicBool::new(false);
}

/// Environment variable turning the debug log on without `--debug`
pub const DEBUG_ENV: &str = "HXREPL_DEBUG";

pub fn enable() {
    ENABLED.store(true, Ordering::Relaxed);
}

pub fn disable() {
    ENABLED.store(false, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Enable the log if the debug environment variable is set to anything
pub fn enable_from_env() {
    if std::env::var_os(DEBUG_ENV).is_some_and(|v| !v.is_empty()) {
        enable();
    }
}

#[macro_export]
macro_rules! log {
    (turn, $($token:tt)*) => (
        if $crate::log::is_enabled() {
            use colored::Colorize;

            eprintln!("<{}> [{}] {}", "LOG".black().on_purple(), "turn".black().on_green(), format_args!($($token)*));
        }
    );
    (compile, $($token:tt)*) => (
        if $crate::log::is_enabled() {
            use colored::Colorize;

            eprintln!("<{}> [{}] {}", "LOG".black().on_purple(), "compile".black().on_blue(), format_args!($($token)*));
        }
    );
    (eval, $($token:tt)*) => (
        if $crate::log::is_enabled() {
            use colored::Colorize;

            eprintln!("<{}> [{}] {}", "LOG".black().on_purple(), "eval".black().on_cyan(), format_args!($($token)*));
        }
    );
    ($($token:tt)*) => (
        if $crate::log::is_enabled() {
            use colored::Colorize;

            eprintln!("<{}> {}", "LOG".black().on_purple(), format_args!($($token)*));
        }
    );
}
