//! Message macros routing output to either the console or `tracing`.
//!
//! When `TOCK_DEBUG` or `RUST_LOG` is set, every message goes through the
//! tracing subscriber installed by the binary, so it carries timestamps and
//! levels. Otherwise messages are printed plainly: informational output to
//! stdout, errors to stderr.
//!
//! ```rust
//! use tock::{msg_info, msg_success};
//! use tock::libs::messages::Message;
//!
//! msg_success!(Message::ProjectCreated("acme".to_string()));
//! msg_info!(Message::NoRunningEntries);
//! ```

use std::sync::OnceLock;

static DEBUG_MODE: OnceLock<bool> = OnceLock::new();

/// Whether structured logging is requested. Cached after the first call.
#[doc(hidden)]
pub fn is_debug_mode() -> bool {
    *DEBUG_MODE.get_or_init(|| std::env::var("TOCK_DEBUG").is_ok() || std::env::var("RUST_LOG").is_ok())
}

/// Emits `$msg` through `tracing` at `$level` in debug mode, or through
/// `$print` otherwise. `$prefix` is a format string with one `{}` slot.
#[doc(hidden)]
#[macro_export]
macro_rules! __tock_emit {
    ($level:ident, $print:ident, $prefix:literal, $msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::$level!($prefix, $msg);
        } else {
            $print!($prefix, $msg);
        }
    };
}

#[macro_export]
macro_rules! msg_print {
    ($msg:expr) => {
        $crate::__tock_emit!(info, println, "{}", $msg)
    };
    ($msg:expr, true) => {
        $crate::__tock_emit!(info, println, "\n{}\n", $msg)
    };
}

#[macro_export]
macro_rules! msg_success {
    ($msg:expr) => {
        $crate::__tock_emit!(info, println, "✅ {}", $msg)
    };
}

/// Errors go to stderr so they never mix with report output.
#[macro_export]
macro_rules! msg_error {
    ($msg:expr) => {
        $crate::__tock_emit!(error, eprintln, "❌ {}", $msg)
    };
}

#[macro_export]
macro_rules! msg_warning {
    ($msg:expr) => {
        $crate::__tock_emit!(warn, println, "⚠️ {}", $msg)
    };
}

#[macro_export]
macro_rules! msg_info {
    ($msg:expr) => {
        $crate::__tock_emit!(info, println, "ℹ️ {}", $msg)
    };
}

/// Debug-only output; silent unless debug mode is on.
#[macro_export]
macro_rules! msg_debug {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::debug!("🔍 {}", $msg);
        }
    };
}
