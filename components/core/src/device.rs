use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::entity::{EntityConfig, EntitySlot};
use crate::id::Identifier;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BusType {
    I2c,
    Uart,
}

impl BusType {
    pub fn domain(&self) -> &'static str {
        match self {
            BusType::I2c => "i2c",
            BusType::Uart => "uart",
        }
    }

    /// Device key referencing a declared bus of this type.
    pub fn id_key(&self) -> &'static str {
        match self {
            BusType::I2c => "i2c_id",
            BusType::Uart => "uart_id",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bus {
    I2c { default_address: u8 },
    Uart,
}

impl Bus {
    pub fn bus_type(&self) -> BusType {
        match self {
            Bus::I2c { .. } => BusType::I2c,
            Bus::Uart => BusType::Uart,
        }
    }
}

/// Enumerated device-level setting such as the pcbadbm weighting filter.
///
/// Configured values are uppercased before they are matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceOption {
    pub key: &'static str,
    pub choices: &'static [(&'static str, u8)],
    pub default: Option<&'static str>,
    pub setter: &'static str,
}

impl DeviceOption {
    pub fn choice(&self, name: &str) -> Option<(&'static str, u8)> {
        self.choices.iter().copied().find(|(choice, _)| *choice == name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.choices.iter().map(|(name, _)| *name).collect()
    }
}

/// One revision of a device kind. Later revisions carry every slot of the
/// earlier ones.
#[derive(Debug, PartialEq)]
pub struct DeviceDescriptor {
    pub kind: &'static str,
    pub version: u32,
    /// Component class the external code generator instantiates.
    pub class_name: &'static str,
    pub bus: Bus,
    /// `Some` for polling components, holding the default interval.
    pub update_interval: Option<Duration>,
    pub multi_conf: bool,
    pub options: &'static [DeviceOption],
    pub slots: &'static [EntitySlot],
}

impl DeviceDescriptor {
    pub fn slot(&self, key: &str) -> Option<&'static EntitySlot> {
        self.slots.iter().find(|s| s.key == key)
    }

    pub fn is_polling(&self) -> bool {
        self.update_interval.is_some()
    }

    /// Key platform blocks use to name their parent, e.g. `pcbadbm_id`.
    pub fn parent_key(&self) -> String {
        format!("{}_id", self.kind)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusConfig {
    I2c {
        bus: Option<Identifier>,
        address: u8,
    },
    Uart {
        bus: Option<Identifier>,
    },
}

impl BusConfig {
    pub fn bus_type(&self) -> BusType {
        match self {
            BusConfig::I2c { .. } => BusType::I2c,
            BusConfig::Uart { .. } => BusType::Uart,
        }
    }

    pub fn bus(&self) -> Option<&Identifier> {
        match self {
            BusConfig::I2c { bus, .. } | BusConfig::Uart { bus } => bus.as_ref(),
        }
    }

    pub fn with_bus(&self, bus: Option<Identifier>) -> BusConfig {
        match self {
            BusConfig::I2c { address, .. } => BusConfig::I2c {
                bus,
                address: *address,
            },
            BusConfig::Uart { .. } => BusConfig::Uart { bus },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct OptionValue {
    pub key: &'static str,
    pub choice: &'static str,
    pub value: u8,
    #[serde(skip)]
    pub setter: &'static str,
}

/// Device configuration after defaults and checks were applied.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedDevice {
    pub descriptor: &'static DeviceDescriptor,
    pub id: Identifier,
    pub bus: BusConfig,
    pub update_interval: Option<Duration>,
    pub options: Vec<OptionValue>,
    /// Present slots, in slot declaration order.
    pub entities: Vec<EntityConfig>,
}

impl ValidatedDevice {
    pub fn entity(&self, key: &str) -> Option<&EntityConfig> {
        self.entities.iter().find(|e| e.key() == key)
    }

    pub fn option(&self, key: &str) -> Option<&OptionValue> {
        self.options.iter().find(|o| o.key == key)
    }
}

pub(crate) fn serialize_interval<S: Serializer>(
    interval: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match interval {
        Some(interval) => serializer.serialize_str(&format!("{}ms", interval.as_millis())),
        None => serializer.serialize_none(),
    }
}
