// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::{
    fmt::{self, Display},
    str::FromStr,
    sync::atomic::{AtomicUsize, Ordering},
};

static MAX_LOG_LEVEL: AtomicUsize = AtomicUsize::new(LevelFilter::Error as usize);

pub fn set_max_level(lvl: LevelFilter) {
    MAX_LOG_LEVEL.store(lvl as usize, Ordering::Relaxed)
}

pub fn max_level() -> LevelFilter {
    match MAX_LOG_LEVEL.load(Ordering::Relaxed) {
        0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

#[repr(usize)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd)]
#[non_exhaustive]
/// The level at which the library will log
pub enum LevelFilter {
    Off,
    #[default]
    Error,
    Warn,
    Info,
    Debug,
}

impl FromStr for LevelFilter {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("debug") {
            Ok(LevelFilter::Debug)
        } else if s.eq_ignore_ascii_case("info") {
            Ok(LevelFilter::Info)
        } else if s.eq_ignore_ascii_case("warn") {
            Ok(LevelFilter::Warn)
        } else if s.eq_ignore_ascii_case("error") {
            Ok(LevelFilter::Error)
        } else if s.eq_ignore_ascii_case("off") {
            Ok(LevelFilter::Off)
        } else {
            Err("log level filter should be one of DEBUG, INFO, WARN, ERROR, OFF")
        }
    }
}

impl Display for LevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filter = match self {
            LevelFilter::Debug => "DEBUG",
            LevelFilter::Info => "INFO",
            LevelFilter::Warn => "WARN",
            LevelFilter::Error => "ERROR",
            LevelFilter::Off => "OFF",
        };

        write!(f, "{filter}")
    }
}

#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Error = 1, // this value must match with LevelFilter::Error
    Warn,
    Info,
    Debug,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        };

        write!(f, "{level}")
    }
}

impl PartialEq<LevelFilter> for Level {
    #[inline]
    fn eq(&self, other: &LevelFilter) -> bool {
        (*self as usize) == (*other as usize)
    }
}

impl PartialOrd<LevelFilter> for Level {
    #[inline]
    fn partial_cmp(&self, other: &LevelFilter) -> Option<std::cmp::Ordering> {
        Some((*self as usize).cmp(&(*other as usize)))
    }
}

/// Whether any active test logger should observe logs regardless of the
/// configured max level.
pub fn capture_active() -> bool {
    #[cfg(feature = "test-utils")]
    {
        test_logger::is_active()
    }
    #[cfg(not(feature = "test-utils"))]
    {
        false
    }
}

pub fn print_log(lvl: Level, log: fmt::Arguments, file: &str, line: u32) {
    #[cfg(feature = "test-utils")]
    if test_logger::capture(lvl, log) {
        return;
    }
    if lvl == Level::Error {
        eprintln!("\x1b[91m{lvl}\x1b[0m {file}:{line} - {log}");
    } else {
        println!("\x1b[93m{lvl}\x1b[0m {file}:{line} - {log}");
    }
}

#[cfg(feature = "test-utils")]
pub mod test_logger {
    //! Implements a thread local, overridable logger
    //!
    //! Tests can locally intercept logs by calling `activate_test_logger`
    //!
    //! ```ignore
    //! let _log_guard = dd_trace_api::log::test_logger::activate_test_logger();
    //! // whatever is logged by the dd_(level)! macros will be stored
    //! dd_trace_api::dd_debug!("my log");
    //! let logs = dd_trace_api::log::test_logger::take_test_logs().unwrap();
    //! // logs should contain (Debug, "my log")
    //!
    //! // to see logs in threads spawned from the test, the function passed to
    //! // spawn should be wrapped by `with_local_logger`
    //! std::thread::spawn(dd_trace_api::log::test_logger::with_local_logger(|| {
    //!     dd_trace_api::dd_debug!("my log");
    //! }))
    //! .join();
    //! ```
    use std::{
        cell::RefCell,
        fmt,
        sync::{Arc, Mutex},
    };

    use super::Level;

    #[derive(Default)]
    struct CapturedLogs(Mutex<Vec<(Level, String)>>);

    thread_local! {
        static LOCAL_LOGGER: RefCell<Option<Arc<CapturedLogs>>> = const { RefCell::new(None) };
    }

    pub struct LoggerGuard {
        prev: Option<Arc<CapturedLogs>>,
    }

    impl Drop for LoggerGuard {
        fn drop(&mut self) {
            LOCAL_LOGGER.set(self.prev.take());
        }
    }

    pub fn activate_test_logger() -> LoggerGuard {
        let prev = LOCAL_LOGGER.replace(Some(Arc::new(CapturedLogs::default())));
        LoggerGuard { prev }
    }

    pub fn is_active() -> bool {
        LOCAL_LOGGER
            .try_with(|l| l.borrow().is_some())
            .unwrap_or(false)
    }

    /// Stores the log in the active test logger, if any. Returns whether the
    /// log was consumed.
    pub fn capture(lvl: Level, log: fmt::Arguments) -> bool {
        LOCAL_LOGGER
            .try_with(|l| {
                if let Some(logs) = &*l.borrow() {
                    logs.0.lock().unwrap().push((lvl, log.to_string()));
                    true
                } else {
                    false
                }
            })
            .unwrap_or(false)
    }

    pub fn take_test_logs() -> Option<Vec<(Level, String)>> {
        LOCAL_LOGGER
            .try_with(|l| {
                l.borrow()
                    .as_deref()
                    .map(|logs| std::mem::take(&mut *logs.0.lock().unwrap()))
            })
            .ok()
            .flatten()
    }

    pub fn with_local_logger<F: FnOnce() -> R, R>(f: F) -> impl FnOnce() -> R {
        let logger = LOCAL_LOGGER.try_with(|l| l.borrow().clone()).ok().flatten();
        move || {
            let _guard = LoggerGuard {
                prev: LOCAL_LOGGER.replace(logger),
            };
            f()
        }
    }
}

#[macro_export]
macro_rules! dd_debug {
    // dd_debug!("a {} event", "log")
    ($($arg:tt)+) => {
      $crate::dd_log!($crate::log::Level::Debug, $($arg)*)
    };
}

#[macro_export]
macro_rules! dd_info {
  // dd_info!("a {} event", "log")
  ($($arg:tt)+) => {
    $crate::dd_log!($crate::log::Level::Info, $($arg)*)
  };
}

#[macro_export]
macro_rules! dd_warn {
  // dd_warn!("a {} event", "log")
  ($($arg:tt)+) => {
    $crate::dd_log!($crate::log::Level::Warn, $($arg)*)
  };
}

#[macro_export]
macro_rules! dd_error {
  // dd_error!("a {} event", "log")
  ($($arg:tt)+) => {
    $crate::dd_log!($crate::log::Level::Error, $($arg)*)
  };
}

#[macro_export]
macro_rules! dd_log {
    ($lvl:expr, $($arg:tt)+) => {{
      let lvl = $lvl;
      if lvl <= $crate::log::max_level() || $crate::log::capture_active() {
        let loc = ::std::panic::Location::caller();
        $crate::log::print_log(lvl, format_args!($($arg)+), loc.file(), loc.line());
      }
    }};
}

#[cfg(test)]
mod tests {
    use crate::log::{max_level, set_max_level, Level, LevelFilter};

    #[test]
    fn test_max_level() {
        let default_lvl = max_level();
        assert!(LevelFilter::Error == default_lvl);

        set_max_level(LevelFilter::Warn);

        assert!(LevelFilter::Warn == max_level());
        assert!(LevelFilter::Debug > max_level());
        assert!(LevelFilter::Error < max_level());

        set_max_level(default_lvl);
    }

    #[test]
    fn test_level_against_filter() {
        const LEVELS: [Level; 4] = [Level::Error, Level::Warn, Level::Info, Level::Debug];
        const FILTERS: [LevelFilter; 4] = [
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
        ];

        for (lvl_index, lvl) in LEVELS.iter().enumerate() {
            assert!(*lvl > LevelFilter::Off);
            assert!(*lvl == FILTERS[lvl_index]);

            for filter in &FILTERS[lvl_index..] {
                assert!(*lvl <= *filter);
            }
        }
    }

    #[test]
    fn test_level_filter_from_str() {
        assert_eq!("debug".parse::<LevelFilter>(), Ok(LevelFilter::Debug));
        assert_eq!("WARN".parse::<LevelFilter>(), Ok(LevelFilter::Warn));
        assert_eq!("Off".parse::<LevelFilter>(), Ok(LevelFilter::Off));
        assert!("verbose".parse::<LevelFilter>().is_err());
    }
}
