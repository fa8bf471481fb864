use std::error::Error;
use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use espcompose::{builtin_registry, load_config, CoreConfig};
use espcompose_core::ValidatedConfig;
use flexi_logger::writers::FileLogWriter;
use flexi_logger::{detailed_format, Age, Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};
use log::{debug, info};

/// Logger and validated configuration shared by every subcommand.
pub(crate) struct Session {
    // Dropping the handle stops file logging.
    _logger: LoggerHandle,
    pub core: CoreConfig,
    pub config: ValidatedConfig,
}

fn log_directory() -> Result<PathBuf, Box<dyn Error>> {
    if cfg!(debug_assertions) {
        return Ok(PathBuf::from("./"));
    }
    let base_dirs = BaseDirs::new().ok_or("failed to get base directories")?;
    Ok(base_dirs.data_local_dir().join("espcompose"))
}

fn read_base_config(path: &str) -> Result<String, Box<dyn Error>> {
    let config_file_path = fs::canonicalize(path)
        .map_err(|e| format!("Failed to find the configuration file at '{}': {}", path, e))?;
    debug!("Config: {}", config_file_path.display());
    let content = fs::read_to_string(&config_file_path)
        .map_err(|e| format!("Failed to read the configuration file at '{}': {}", path, e))?;
    Ok(content)
}

pub(crate) fn start(config_path: &str) -> Result<Session, Box<dyn Error>> {
    let log_directory = log_directory()?;

    #[cfg(not(debug_assertions))]
    let log_level = "info";

    #[cfg(debug_assertions)]
    let log_level = "debug";

    // Composed graphs go to stdout, so the console copy of the log goes to stderr.
    let mut logger = Logger::try_with_env_or_str(log_level)?
        .format_for_files(detailed_format)
        .log_to_file(FileSpec::default().directory(&log_directory))
        .append()
        .rotate(
            Criterion::AgeOrSize(Age::Day, 10 * 1024 * 1024),
            Naming::Timestamps,
            Cleanup::KeepLogFiles(7),
        )
        .duplicate_to_stderr(Duplicate::Info)
        .start()?;

    debug!("LogDirectory: {}", log_directory.display());

    let content = read_base_config(config_path)?;
    let (core, config) = load_config(&content, &builtin_registry())?;

    if let Some(logger_config) = &core.logger {
        logger.reset_flw(&FileLogWriter::builder(FileSpec::default().directory(
            logger_config
                .directory
                .clone()
                .unwrap_or_else(|| log_directory.to_string_lossy().to_string()),
        )))?;
        logger.parse_and_push_temp_spec(logger_config.get_flexi_logger_spec())?;
    }

    info!(
        "Loaded '{}' with {} devices",
        core.espcompose.friendly_name.as_deref().unwrap_or(&core.espcompose.name),
        config.devices.len()
    );

    Ok(Session {
        _logger: logger,
        core,
        config,
    })
}
