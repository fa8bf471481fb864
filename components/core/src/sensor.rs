use serde::Serialize;

use crate::entity::{EntitySlot, StateClass};
use crate::error::{ValidationError, ValidationResult};
use crate::fields::Fields;

// https://developers.home-assistant.io/docs/core/entity/sensor/
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SensorTraits {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_decimals: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_class: Option<StateClass>,
}

pub(crate) fn validate(fields: &mut Fields, slot: &EntitySlot) -> ValidationResult<SensorTraits> {
    let unit_of_measurement = fields
        .string("unit_of_measurement")?
        .or_else(|| slot.metadata.unit_of_measurement.map(String::from));

    let accuracy_decimals = match fields.unsigned("accuracy_decimals")? {
        Some(decimals) if decimals <= u8::MAX as u64 => Some(decimals as u8),
        Some(decimals) => {
            return Err(ValidationError::OutOfRange {
                path: fields.child_path("accuracy_decimals"),
                value: decimals as f64,
                min: 0.0,
                max: u8::MAX as f64,
            })
        }
        None => slot.metadata.accuracy_decimals,
    };

    let state_class = fields
        .choice::<StateClass>("state_class")?
        .or(slot.metadata.state_class);

    Ok(SensorTraits {
        unit_of_measurement,
        accuracy_decimals,
        state_class,
    })
}
