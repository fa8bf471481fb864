use serde::{Deserialize, Serialize};

use crate::entity::{Constraints, EntitySlot};
use crate::error::{ValidationError, ValidationResult};
use crate::fields::{Choice, Fields};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberMode {
    #[default]
    #[serde(alias = "AUTO")]
    Auto,
    #[serde(alias = "BOX")]
    Box,
    #[serde(alias = "SLIDER")]
    Slider,
}

impl Choice for NumberMode {
    const NAMES: &'static [&'static str] = &["auto", "box", "slider"];
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NumberTraits {
    pub min_value: f64,
    pub max_value: f64,
    pub step: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,
    pub mode: NumberMode,
}

impl NumberTraits {
    pub fn contains(&self, value: f64) -> bool {
        self.min_value <= value && value <= self.max_value
    }
}

pub(crate) fn validate(fields: &mut Fields, slot: &EntitySlot) -> ValidationResult<NumberTraits> {
    let (min_value, max_value, step) = match slot.constraints {
        Constraints::Number {
            min_value,
            max_value,
            step,
        } => (min_value, max_value, step),
        _ => (f64::MIN, f64::MAX, 1.0),
    };

    let initial_value = fields.float("initial_value")?;
    if let Some(value) = initial_value {
        if value < min_value || value > max_value {
            return Err(ValidationError::OutOfRange {
                path: fields.child_path("initial_value"),
                value,
                min: min_value,
                max: max_value,
            });
        }
    }

    let unit_of_measurement = fields
        .string("unit_of_measurement")?
        .or_else(|| slot.metadata.unit_of_measurement.map(String::from));

    let mode = fields.choice("mode")?.unwrap_or_default();

    Ok(NumberTraits {
        min_value,
        max_value,
        step,
        initial_value,
        unit_of_measurement,
        mode,
    })
}
