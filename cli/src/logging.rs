use common::logging::LogError;
use log::LevelFilter;

pub fn setup(log_level: &LevelFilter, format: String) -> Result<(), LogError> {
    if log_level.eq(&LevelFilter::Off) {
        return Ok(());
    }

    fern::Dispatch::new()
        .level(*log_level)
        .format(move |out, message, record| {
            let formatted = common::logging::parse_format(&format, message, record);

            out.finish(format_args!("{}", formatted))
        })
        .chain(std::io::stdout())
        .apply()
        .map_err(LogError::SetLoggerError)
}
