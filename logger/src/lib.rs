//! Process-wide `tracing` setup for the tip jar crates.
//!
//! Other crates log through the macros re-exported here and never depend on
//! `tracing` directly.
pub mod config;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, OnceLock,
};

use color_eyre::{eyre::bail, Report, Result};
pub use config::{Config, Format, Level, UserLayer as UserConfigLayer};
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, instrument as log, trace, trace_span,
    warn, warn_span, Instrument,
};
pub use tracing_subscriber::reload::Error as ReloadError;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, registry::Registry, reload};

/// Set once a global logger was installed or explicitly disabled.
static CLAIMED: AtomicBool = AtomicBool::new(false);

fn claim_global() -> Result<()> {
    if CLAIMED.swap(true, Ordering::SeqCst) {
        bail!("Global logger was already claimed");
    }
    Ok(())
}

/// Handle to the installed global logger.
#[derive(Clone)]
pub struct LoggerHandle {
    set_filter: Arc<dyn Fn(LevelFilter) -> Result<(), ReloadError> + Send + Sync>,
}

impl std::fmt::Debug for LoggerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LoggerHandle")
    }
}

impl LoggerHandle {
    /// Change verbosity of the running logger.
    ///
    /// # Errors
    /// If the subscriber behind the handle was dropped.
    pub fn reload_level(&self, level: Level) -> Result<(), ReloadError> {
        (self.set_filter)(LevelFilter::from_level(level.into()))
    }
}

/// Install the global logger described by `config`.
///
/// Only the first call in a process succeeds. Tests should use
/// [`test_logger`] instead.
///
/// # Errors
/// If a global logger was already installed or disabled.
pub fn init_global(config: &Config, terminal_colors: bool) -> Result<LoggerHandle> {
    claim_global()?;

    let fmt = tracing_subscriber::fmt::layer()
        .with_ansi(terminal_colors)
        .with_test_writer();
    match config.format {
        Format::Full => install(config.level, fmt),
        Format::Compact => install(config.level, fmt.compact()),
        Format::Pretty => install(config.level, fmt.pretty()),
        Format::Json => install(config.level, fmt.json()),
    }
}

fn install<L>(level: Level, fmt: L) -> Result<LoggerHandle>
where
    L: tracing_subscriber::Layer<Registry> + Send + Sync + 'static,
{
    let (filter, handle) = reload::Layer::new(LevelFilter::from_level(level.into()));
    let subscriber = Registry::default()
        .with(fmt)
        .with(filter)
        .with(tracing_error::ErrorLayer::default());
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(LoggerHandle {
        set_filter: Arc::new(move |filter| handle.reload(filter)),
    })
}

/// Debug level, pretty printed logger shared by every test of a binary.
///
/// # Panics
/// If [`init_global`] or [`disable_global`] ran first.
pub fn test_logger() -> LoggerHandle {
    static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

    LOGGER
        .get_or_init(|| {
            let config = UserConfigLayer {
                level: Some(Level::Debug),
                format: Some(Format::Pretty),
            }
            .complete();
            init_global(&config, true)
                .expect("`test_logger()` must be the only logger installer in tests")
        })
        .clone()
}

/// Make every later [`init_global`] fail.
///
/// # Errors
/// If a global logger was already installed or disabled.
pub fn disable_global() -> Result<()> {
    claim_global()
}

/// Install [`color_eyre`] report and panic hooks, once.
///
/// # Errors
/// If [`color_eyre::install`] fails.
pub fn install_panic_hook() -> Result<(), Report> {
    static INSTALLED: AtomicBool = AtomicBool::new(false);
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    color_eyre::install()
}

pub mod prelude {
    //! Logging macros, for crates that want a single glob import.

    pub use tracing::{self, debug, error, info, instrument as log, span, trace, warn, Span};
}
