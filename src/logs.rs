use log::LevelFilter;
use log4rs::{
    Config,
    append::{
        console::{ConsoleAppender, Target},
        rolling_file::{
            RollingFileAppender,
            policy::compound::{
                CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
            },
        },
    },
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};
use thiserror::Error;

const LOG_SIZE_LIMIT: u64 = 10 * 1024 * 1024; // 10 MB

const LOG_FILE_COUNT: u32 = 3;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("LOG_ARCHIVE_PATTERN must be set when LOG_FILE_PATH is")]
    MissingArchivePattern,
    #[error("invalid log archive pattern: {0}")]
    Roller(String),
    #[error("cannot open log file: {0}")]
    File(#[from] std::io::Error),
    #[error("invalid logger configuration: {0}")]
    Config(String),
    #[error("logger already initialized")]
    Init(#[from] log::SetLoggerError),
}

/// Logs to stderr, and additionally to a size-rolled file when `LOG_FILE_PATH`
/// is set.
pub fn init_logger(verbose: bool) -> Result<(), LoggerError> {
    let stderr_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let file_level = LevelFilter::Debug;

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{h({l})} {m}{n}")))
        .build();

    let mut config = Config::builder().appender(
        Appender::builder()
            .filter(Box::new(ThresholdFilter::new(stderr_level)))
            .build("stderr", Box::new(stderr)),
    );
    let mut root = Root::builder().appender("stderr");

    if let Ok(file_path) = std::env::var("LOG_FILE_PATH") {
        let archive_pattern =
            std::env::var("LOG_ARCHIVE_PATTERN").map_err(|_| LoggerError::MissingArchivePattern)?;

        let trigger = SizeTrigger::new(LOG_SIZE_LIMIT);
        let roller = FixedWindowRoller::builder()
            .build(&archive_pattern, LOG_FILE_COUNT)
            .map_err(|e| LoggerError::Roller(e.to_string()))?;
        let policy = CompoundPolicy::new(Box::new(trigger), Box::new(roller));

        let logfile = RollingFileAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{d} {l} {t} - {m}{n}")))
            .build(file_path, Box::new(policy))?;

        config = config.appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(file_level)))
                .build("logfile", Box::new(logfile)),
        );
        root = root.appender("logfile");
    }

    let config = config
        .build(root.build(LevelFilter::Trace))
        .map_err(|e| LoggerError::Config(e.to_string()))?;

    log4rs::init_config(config)?;
    Ok(())
}
