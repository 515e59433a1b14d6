//! `log` sink that writes to the browser console.

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Routes `log` records to `console.{error,warn,info,debug}`.
///
/// Native builds write to stderr so headless runs still see warnings.
#[derive(Debug)]
pub struct ConsoleLogger {
    level: LevelFilter,
}

impl ConsoleLogger {
    /// Creates a logger that keeps records at or above `level`.
    pub const fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// Installs the logger globally.
    ///
    /// # Errors
    ///
    /// Returns an error when another logger is already installed.
    pub fn install(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(Self::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }
}

fn format_record(record: &Record<'_>) -> String {
    format!("[{}] {}: {}", record.level(), record.target(), record.args())
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(record);

        #[cfg(target_arch = "wasm32")]
        {
            let line = wasm_bindgen::JsValue::from_str(&line);
            match record.level() {
                Level::Error => web_sys::console::error_1(&line),
                Level::Warn => web_sys::console::warn_1(&line),
                Level::Info => web_sys::console::info_1(&line),
                Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            if record.level() <= Level::Warn {
                eprintln!("{line}");
            }
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_by_level_and_formats_target() {
        let logger = ConsoleLogger::new(LevelFilter::Info);
        let debug = Metadata::builder().level(Level::Debug).build();
        let warn = Metadata::builder().level(Level::Warn).build();
        assert!(!logger.enabled(&debug));
        assert!(logger.enabled(&warn));

        assert_eq!(
            format_record(
                &Record::builder()
                    .level(Level::Warn)
                    .target("terminal_core::engine")
                    .args(format_args!("history persist failed"))
                    .build()
            ),
            "[WARN] terminal_core::engine: history persist failed"
        );
    }
}
