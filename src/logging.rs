use log::LevelFilter;
use std::path::Path;

/// Sends log records to stdout and appends them to `log_file`.
pub fn init(level: LevelFilter, log_file: &Path) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {}: {} [in {}:{}]",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                message,
                record.file().unwrap_or_else(|| record.target()),
                record.line().unwrap_or(0),
            ))
        })
        .level(level)
        .level_for("hyper", LevelFilter::Warn)
        .level_for("tokio_reactor", LevelFilter::Warn)
        .chain(std::io::stdout())
        .chain(fern::log_file(log_file)?)
        .apply()?;
    Ok(())
}
