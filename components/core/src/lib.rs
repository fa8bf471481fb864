pub mod compose;
pub mod config;
pub mod device;
pub mod entity;
pub mod error;
pub mod fields;
pub mod id;
pub mod number;
pub mod registry;
pub mod select;
pub mod sensor;
pub mod switch;
pub mod utils;
pub mod validate;

pub use compose::{Composer, DeviceGraph, EntityInstance, RegistrationTable, SetterCall};
pub use config::{BusDeclaration, PlatformBlock, ValidatedConfig};
pub use device::{Bus, BusConfig, BusType, DeviceDescriptor, DeviceOption, ValidatedDevice};
pub use entity::{
    Constraints, EntityCategory, EntityConfig, EntityKind, EntitySlot, EntityTraits, Metadata,
    Presence, StateClass,
};
pub use error::{CompositionError, Error, ValidationError};
pub use id::Identifier;
pub use registry::Registry;
pub use validate::{validate, validate_config};

/// Validates and composes a YAML document in one go.
pub fn compose_str(yaml: &str, registry: &Registry) -> Result<Vec<DeviceGraph>, Error> {
    let root: serde_yaml::Value = serde_yaml::from_str(yaml)?;
    let config = validate_config(&root, registry)?;
    Ok(Composer::new().compose_config(&config)?)
}
