#![deny(missing_docs)]
//! Shared logging utilities for the HireLens workspace.
//!
//! Provides the `lens_*` logging macros used across the crates. When a job
//! context is set on the current thread, every message is prefixed with
//! `[job <id>]` so interleaved output from a tracking session stays readable.

use std::cell::RefCell;

thread_local! {
    /// Job id the current thread is working on, if any.
    static JOB_CONTEXT: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Sets (or clears) the job id that prefixes log lines on this thread.
pub fn set_job_context(job_id: Option<&str>) {
    JOB_CONTEXT.with(|ctx| *ctx.borrow_mut() = job_id.map(ToOwned::to_owned));
}

/// Returns the job id currently attached to this thread.
pub fn job_context() -> Option<String> {
    JOB_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Formats the prefix for the current job context; empty when unset.
#[doc(hidden)]
pub fn context_prefix() -> String {
    JOB_CONTEXT.with(|ctx| match ctx.borrow().as_deref() {
        Some(job_id) => format!("[job {job_id}] "),
        None => String::new(),
    })
}

#[doc(hidden)]
pub use log as __log;

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! lens_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!("{}{}", $crate::context_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! lens_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!("{}{}", $crate::context_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! lens_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!("{}{}", $crate::context_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! lens_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!("{}{}", $crate::context_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! lens_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!("{}{}", $crate::context_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may have installed the logger already.
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_follows_job_context() {
        set_job_context(None);
        assert_eq!(context_prefix(), "");

        set_job_context(Some("4f1c"));
        assert_eq!(context_prefix(), "[job 4f1c] ");
        assert_eq!(job_context().as_deref(), Some("4f1c"));

        set_job_context(None);
        assert!(job_context().is_none());
    }
}
