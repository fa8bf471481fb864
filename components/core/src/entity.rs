//! Static entity slot descriptors and the validated per-entity configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::fields::{Choice, Fields};
use crate::id::Identifier;
use crate::number::NumberTraits;
use crate::select::SelectTraits;
use crate::sensor::SensorTraits;
use crate::switch::RestoreMode;
use crate::utils::default_name;
use crate::{number, select, sensor, switch};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Switch,
    Number,
    Select,
    Sensor,
    Button,
    TextSensor,
    Light,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Switch,
        EntityKind::Number,
        EntityKind::Select,
        EntityKind::Sensor,
        EntityKind::Button,
        EntityKind::TextSensor,
        EntityKind::Light,
    ];

    /// Top-level configuration key holding platform blocks of this kind.
    pub fn domain(&self) -> &'static str {
        match self {
            EntityKind::Switch => "switch",
            EntityKind::Number => "number",
            EntityKind::Select => "select",
            EntityKind::Sensor => "sensor",
            EntityKind::Button => "button",
            EntityKind::TextSensor => "text_sensor",
            EntityKind::Light => "light",
        }
    }

    pub fn from_domain(domain: &str) -> Option<Self> {
        EntityKind::ALL.into_iter().find(|k| k.domain() == domain)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    #[serde(alias = "CONFIG")]
    Config,
    #[serde(alias = "DIAGNOSTIC")]
    Diagnostic,
}

impl Choice for EntityCategory {
    const NAMES: &'static [&'static str] = &["config", "diagnostic"];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    #[serde(alias = "MEASUREMENT")]
    Measurement,
    #[serde(alias = "TOTAL")]
    Total,
    #[serde(alias = "TOTAL_INCREASING")]
    TotalIncreasing,
}

impl Choice for StateClass {
    const NAMES: &'static [&'static str] = &["measurement", "total", "total_increasing"];
}

/// Descriptor defaults, overridable per instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metadata {
    pub device_class: Option<&'static str>,
    pub icon: Option<&'static str>,
    pub entity_category: Option<EntityCategory>,
    pub unit_of_measurement: Option<&'static str>,
    pub accuracy_decimals: Option<u8>,
    pub state_class: Option<StateClass>,
}

impl Metadata {
    pub const NONE: Metadata = Metadata {
        device_class: None,
        icon: None,
        entity_category: None,
        unit_of_measurement: None,
        accuracy_decimals: None,
        state_class: None,
    };
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Constraints {
    None,
    /// No divisibility is required between the range and `step`.
    Number {
        min_value: f64,
        max_value: f64,
        step: f64,
    },
    /// Vocabulary an instance may pick its options from.
    Select { options: &'static [&'static str] },
}

/// Declared position at which an entity may be attached to a device.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntitySlot {
    pub key: &'static str,
    pub kind: EntityKind,
    pub presence: Presence,
    pub constraints: Constraints,
    pub metadata: Metadata,
    /// Device method storing a direct reference for this role, `set_<role>`.
    pub setter: Option<&'static str>,
    /// Whether the entity gets a `set_parent` link to its device.
    pub parented: bool,
}

impl EntitySlot {
    pub const fn optional(key: &'static str, kind: EntityKind) -> Self {
        EntitySlot {
            key,
            kind,
            presence: Presence::Optional,
            constraints: Constraints::None,
            metadata: Metadata::NONE,
            setter: None,
            parented: false,
        }
    }

    pub const fn required(key: &'static str, kind: EntityKind) -> Self {
        EntitySlot {
            presence: Presence::Required,
            ..EntitySlot::optional(key, kind)
        }
    }

    pub const fn with_setter(self, setter: &'static str) -> Self {
        EntitySlot {
            setter: Some(setter),
            ..self
        }
    }

    pub const fn with_metadata(self, metadata: Metadata) -> Self {
        EntitySlot { metadata, ..self }
    }

    pub const fn with_constraints(self, constraints: Constraints) -> Self {
        EntitySlot {
            constraints,
            ..self
        }
    }

    pub const fn parented(self) -> Self {
        EntitySlot {
            parented: true,
            ..self
        }
    }

    pub fn is_required(&self) -> bool {
        self.presence == Presence::Required
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityTraits {
    Plain,
    Sensor(SensorTraits),
    Number(NumberTraits),
    Select(SelectTraits),
    Switch { restore_mode: RestoreMode },
    Light { restore_mode: RestoreMode },
}

/// A slot that is present in the configuration, with defaults applied.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntityConfig {
    #[serde(skip)]
    pub slot: &'static EntitySlot,
    #[serde(skip)]
    pub id: Option<Identifier>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_category: Option<EntityCategory>,
    pub internal: bool,
    pub disabled_by_default: bool,
    #[serde(flatten)]
    pub traits: EntityTraits,
}

impl EntityConfig {
    pub fn key(&self) -> &'static str {
        self.slot.key
    }
}

pub(crate) fn enum_error(path: String, value: String, allowed: &[&str]) -> ValidationError {
    ValidationError::UnknownEnumValue {
        path,
        value,
        allowed: allowed.iter().map(|s| s.to_string()).collect(),
    }
}

/// Validates the configuration of one slot found at `parent_path.<slot key>`.
pub fn validate_entity(
    parent_path: &str,
    raw: &serde_yaml::Value,
    slot: &'static EntitySlot,
) -> ValidationResult<EntityConfig> {
    let path = if parent_path.is_empty() {
        slot.key.to_string()
    } else {
        format!("{}.{}", parent_path, slot.key)
    };
    let mut fields = Fields::new(path, raw)?;

    let id = fields.identifier("id")?;
    let name = fields
        .string("name")?
        .unwrap_or_else(|| default_name(slot.key));
    let icon = fields
        .string("icon")?
        .or_else(|| slot.metadata.icon.map(String::from));
    let device_class = fields
        .string("device_class")?
        .or_else(|| slot.metadata.device_class.map(String::from));
    let entity_category = fields
        .choice("entity_category")?
        .or(slot.metadata.entity_category);
    let internal = fields.bool("internal")?.unwrap_or(false);
    let disabled_by_default = fields.bool("disabled_by_default")?.unwrap_or(false);

    let traits = match slot.kind {
        EntityKind::Sensor => EntityTraits::Sensor(sensor::validate(&mut fields, slot)?),
        EntityKind::Number => EntityTraits::Number(number::validate(&mut fields, slot)?),
        EntityKind::Select => EntityTraits::Select(select::validate(&mut fields, slot)?),
        EntityKind::Switch => EntityTraits::Switch {
            restore_mode: switch::restore_mode(&mut fields)?,
        },
        EntityKind::Light => EntityTraits::Light {
            restore_mode: switch::restore_mode(&mut fields)?,
        },
        EntityKind::Button | EntityKind::TextSensor => EntityTraits::Plain,
    };
    fields.finish()?;

    Ok(EntityConfig {
        slot,
        id,
        name,
        icon,
        device_class,
        entity_category,
        internal,
        disabled_by_default,
        traits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    static RESET: EntitySlot = EntitySlot::optional("reset_history", EntityKind::Button)
        .with_setter("set_reset_history_button")
        .with_metadata(Metadata {
            device_class: Some("restart"),
            icon: Some("mdi:restart"),
            entity_category: Some(EntityCategory::Diagnostic),
            ..Metadata::NONE
        })
        .parented();

    fn yaml(s: &str) -> serde_yaml::Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn domains_round_trip_for_every_kind() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_domain(kind.domain()), Some(kind));
        }
        assert_eq!(EntityKind::from_domain("binary_sensor"), None);
    }

    #[test]
    fn applies_descriptor_metadata() {
        let entity = validate_entity("pcbadbm", &serde_yaml::Value::Null, &RESET).unwrap();
        assert_eq!(entity.name, "Reset History");
        assert_eq!(entity.icon.as_deref(), Some("mdi:restart"));
        assert_eq!(entity.device_class.as_deref(), Some("restart"));
        assert_eq!(entity.entity_category, Some(EntityCategory::Diagnostic));
        assert_eq!(entity.traits, EntityTraits::Plain);
        assert!(!entity.internal);
    }

    #[test]
    fn instance_values_override_metadata() {
        let raw = yaml("name: Clear\nicon: mdi:delete\nentity_category: CONFIG\ninternal: true");
        let entity = validate_entity("pcbadbm", &raw, &RESET).unwrap();
        assert_eq!(entity.name, "Clear");
        assert_eq!(entity.icon.as_deref(), Some("mdi:delete"));
        assert_eq!(entity.entity_category, Some(EntityCategory::Config));
        assert!(entity.internal);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let raw = yaml("entity_category: system");
        let err = validate_entity("pcbadbm", &raw, &RESET).unwrap_err();
        assert_eq!(err.path(), "pcbadbm.reset_history.entity_category");
        assert!(matches!(err, ValidationError::UnknownEnumValue { .. }));
    }

    #[test]
    fn kind_specific_keys_are_rejected_on_buttons() {
        let raw = yaml("unit_of_measurement: dB");
        let err = validate_entity("pcbadbm", &raw, &RESET).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownField {
                path: "pcbadbm.reset_history.unit_of_measurement".to_string()
            }
        );
    }
}
