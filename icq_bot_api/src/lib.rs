//! Small client for the ICQ / VK Teams bot API: long-polls for events,
//! dispatches them to handlers by type, and sends messages with inline
//! keyboards.

use std::future::Future;

mod bot;
mod dispatching;
mod error;
mod event;
mod keyboard;
mod transport;

#[cfg(test)]
mod mock;

pub use bot::{Bot, DEFAULT_POLL_TIME};
pub use dispatching::{respond, Dispatcher, DispatcherState, Handler, ShutdownToken, WILDCARD};
pub use error::{Error, HandlerResult, Result};
pub use event::Event;
pub use keyboard::{btn, Button, ButtonStyle, Keyboard};
pub use transport::{HttpTransport, Params, Transport, DEFAULT_API_URL};

/// Initialize logging and start the `closure` in an async runtime.
/// Logging is enabled by default on level `info` unless overridden
/// by environment variable `RUST_LOG`. This uses the crate
/// [pretty_env_logger][] internally, see its documentation for more details.
///
/// [pretty_env_logger]: https://docs.rs/pretty_env_logger
///
/// # Panics
///
/// Panics if the tokio runtime fails to build.
pub fn start_everything(closure: impl Future<Output = ()>) {
    let log_level = std::env::var_os("RUST_LOG")
        .unwrap_or_else(|| std::ffi::OsString::from("info"))
        .into_string()
        .unwrap_or_else(|_| String::from("info"));

    let running_as_systemd_service = std::env::var_os("JOURNAL_STREAM").is_some();

    let mut builder = match running_as_systemd_service {
        true => pretty_env_logger::formatted_builder(),
        false => pretty_env_logger::formatted_timed_builder(),
    };

    builder.parse_filters(&log_level);

    if builder.try_init().is_err() {
        log::error!("Tried to init logger twice!");
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build the tokio runtime")
        .block_on(closure);
}

/// Read the bot token from the `key_debug` file in debug builds,
/// or from `key` in release builds.
pub fn load_token() -> std::io::Result<String> {
    let path = match cfg!(debug_assertions) {
        true => "key_debug",
        false => "key",
    };

    Ok(std::fs::read_to_string(path)?.trim().to_string())
}
