use std::path::Path;

use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming, opt_format,
};

use crate::Result;

/// Start the global logger. `RUST_LOG` overrides `level`.
///
/// Without a directory everything goes to stderr; with one, logs are written
/// to rotating files there and warnings are duplicated to stderr. Keep the
/// returned handle alive for as long as logging is needed.
pub fn setup_logging(level: &str, log_dir: Option<&Path>) -> Result<LoggerHandle> {
    let logger = Logger::try_with_env_or_str(level)?.format(opt_format);

    let handle = match log_dir {
        Some(dir) => logger
            .log_to_file(FileSpec::default().directory(dir))
            .duplicate_to_stderr(Duplicate::Warn)
            .rotate(
                Criterion::Size(10 * 1024 * 1024), // Rotate logs after they reach 10 MB
                Naming::Numbers,
                Cleanup::KeepLogFiles(1),
            )
            .start()?,
        None => logger.log_to_stderr().start()?,
    };
    Ok(handle)
}
