use serde::{Deserialize, Serialize};

use crate::error::ValidationResult;
use crate::fields::{Choice, Fields};

/// Power-on behaviour for switches and lights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RestoreMode {
    #[default]
    #[serde(alias = "restore_default_off")]
    RestoreDefaultOff,
    #[serde(alias = "restore_default_on")]
    RestoreDefaultOn,
    #[serde(alias = "always_off")]
    AlwaysOff,
    #[serde(alias = "always_on")]
    AlwaysOn,
}

impl Choice for RestoreMode {
    const NAMES: &'static [&'static str] = &[
        "RESTORE_DEFAULT_OFF",
        "RESTORE_DEFAULT_ON",
        "ALWAYS_OFF",
        "ALWAYS_ON",
    ];
}

pub(crate) fn restore_mode(fields: &mut Fields) -> ValidationResult<RestoreMode> {
    Ok(fields.choice("restore_mode")?.unwrap_or_default())
}
