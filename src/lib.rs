use espcompose_core::{validate_config, Error, Registry, ValidatedConfig};
use serde::Deserialize;

include!(concat!(env!("OUT_DIR"), "/registry.rs"));

/// Node identity, the `espcompose:` section.
#[derive(Clone, Deserialize, Debug)]
pub struct EspCompose {
    pub name: String,
    pub friendly_name: Option<String>,
    pub area: Option<String>,
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub enum LogLevel {
    #[serde(alias = "error", alias = "ERROR")]
    Error,
    #[serde(alias = "warn", alias = "WARN")]
    Warn,
    #[serde(alias = "info", alias = "INFO")]
    Info,
    #[serde(alias = "debug", alias = "DEBUG")]
    Debug,
    #[serde(alias = "trace", alias = "TRACE")]
    Trace,
}

#[derive(Clone, Deserialize, Debug)]
pub struct Logger {
    pub level: LogLevel,
    pub directory: Option<String>,
}

impl Logger {
    pub fn get_flexi_logger_spec(&self) -> String {
        match self.level {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
        .to_string()
    }
}

/// Host-level sections; device and platform keys are left to the validator.
#[derive(Clone, Deserialize, Debug)]
pub struct CoreConfig {
    pub espcompose: EspCompose,
    pub logger: Option<Logger>,
}

/// Parses a configuration document and validates its device tree.
pub fn load_config(content: &str, registry: &Registry) -> Result<(CoreConfig, ValidatedConfig), Error> {
    let root: serde_yaml::Value = serde_yaml::from_str(content)?;
    let core = serde_yaml::from_value::<CoreConfig>(root.clone())?;
    let config = validate_config(&root, registry)?;
    Ok((core, config))
}
