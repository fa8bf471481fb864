//! Composition of validated devices into linked object graphs.
//!
//! A [`Composer`] owns the identifier namespace of one build. Composition
//! is atomic: identifiers are only claimed once the whole call succeeded.

use std::collections::HashSet;
use std::time::Duration;

use log::{debug, info};
use serde::Serialize;

use crate::config::{find_parent, BusDeclaration, ValidatedConfig};
use crate::device::{serialize_interval, BusConfig, OptionValue, ValidatedDevice};
use crate::entity::{EntityConfig, EntityKind};
use crate::error::CompositionError;
use crate::id::Identifier;
use crate::utils::format_id;

pub type CompositionResult<T> = Result<T, CompositionError>;

/// An entity attached to its device.
///
/// `parent` is navigational only; the graph owns both sides.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntityInstance {
    pub key: &'static str,
    pub kind: EntityKind,
    pub id: Identifier,
    pub parent: Identifier,
    #[serde(flatten)]
    pub config: EntityConfig,
}

/// Slot key to entity, in slot declaration order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RegistrationTable {
    entries: Vec<EntityInstance>,
}

impl RegistrationTable {
    fn register(&mut self, instance: EntityInstance) {
        self.entries.push(instance);
    }

    pub fn get(&self, key: &str) -> Option<&EntityInstance> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityInstance> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A method call the code generator emits, e.g. `dbmeter.set_filter(A-WEIGHTING)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SetterCall {
    pub target: Identifier,
    pub method: &'static str,
    pub argument: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeviceGraph {
    pub kind: &'static str,
    pub version: u32,
    pub class_name: &'static str,
    pub id: Identifier,
    pub bus: BusConfig,
    #[serde(
        serialize_with = "serialize_interval",
        skip_serializing_if = "Option::is_none"
    )]
    pub update_interval: Option<Duration>,
    pub options: Vec<OptionValue>,
    pub entities: RegistrationTable,
    pub calls: Vec<SetterCall>,
}

impl DeviceGraph {
    pub fn entity(&self, key: &str) -> Option<&EntityInstance> {
        self.entities.get(key)
    }
}

#[derive(Debug, Default)]
pub struct Composer {
    namespace: HashSet<Identifier>,
    buses: Vec<BusDeclaration>,
}

impl Composer {
    pub fn new() -> Self {
        Composer::default()
    }

    /// Starts a build where the given buses are already declared.
    pub fn with_buses(buses: impl IntoIterator<Item = BusDeclaration>) -> Self {
        let buses: Vec<BusDeclaration> = buses.into_iter().collect();
        Composer {
            namespace: buses.iter().map(|b| b.id.clone()).collect(),
            buses,
        }
    }

    pub fn is_taken(&self, id: &Identifier) -> bool {
        self.namespace.contains(id)
    }

    /// Composes a single device.
    pub fn compose(&mut self, device: &ValidatedDevice) -> CompositionResult<DeviceGraph> {
        let mut claimed = HashSet::new();
        let graph = self.compose_device(device, &self.buses, &mut claimed)?;
        self.namespace.extend(claimed);
        Ok(graph)
    }

    /// Composes every device of a tree, attaching platform blocks to their
    /// parents first. Nothing is claimed unless all devices succeed.
    pub fn compose_config(&mut self, config: &ValidatedConfig) -> CompositionResult<Vec<DeviceGraph>> {
        let mut claimed = HashSet::new();
        let mut buses = self.buses.clone();
        for bus in &config.buses {
            self.claim(&bus.id, &mut claimed)?;
            buses.push(bus.clone());
        }

        let devices = attach_platforms(config)?;
        let graphs = devices
            .iter()
            .map(|device| self.compose_device(device, &buses, &mut claimed))
            .collect::<CompositionResult<Vec<_>>>()?;

        self.namespace.extend(claimed);
        self.buses = buses;
        info!("Composed {} devices", graphs.len());
        Ok(graphs)
    }

    fn claim(&self, id: &Identifier, claimed: &mut HashSet<Identifier>) -> CompositionResult<()> {
        if self.namespace.contains(id) || !claimed.insert(id.clone()) {
            return Err(CompositionError::DuplicateIdentifier { id: id.clone() });
        }
        Ok(())
    }

    fn compose_device(
        &self,
        device: &ValidatedDevice,
        buses: &[BusDeclaration],
        claimed: &mut HashSet<Identifier>,
    ) -> CompositionResult<DeviceGraph> {
        let descriptor = device.descriptor;
        self.claim(&device.id, claimed)?;
        let bus = resolve_bus(&device.bus, buses)?;

        let mut calls: Vec<SetterCall> = device
            .options
            .iter()
            .map(|option| SetterCall {
                target: device.id.clone(),
                method: option.setter,
                argument: option.choice.to_string(),
            })
            .collect();

        let mut entities = RegistrationTable::default();
        for slot in descriptor.slots {
            let Some(config) = device.entity(slot.key) else {
                continue;
            };
            let id = format_id(&device.id, &config.id, slot.key);
            self.claim(&id, claimed)?;

            let instance = EntityInstance {
                key: slot.key,
                kind: slot.kind,
                id,
                parent: device.id.clone(),
                config: config.clone(),
            };
            if slot.parented {
                calls.push(SetterCall {
                    target: instance.id.clone(),
                    method: "set_parent",
                    argument: device.id.to_string(),
                });
            }
            let entity_id = instance.id.to_string();
            entities.register(instance);
            if let Some(setter) = slot.setter {
                calls.push(SetterCall {
                    target: device.id.clone(),
                    method: setter,
                    argument: entity_id,
                });
            }
            debug!("Registered {} '{}' on '{}'", slot.key, config.name, device.id);
        }

        debug!(
            "Composed {} '{}' with {} entities",
            descriptor.kind,
            device.id,
            entities.len()
        );

        Ok(DeviceGraph {
            kind: descriptor.kind,
            version: descriptor.version,
            class_name: descriptor.class_name,
            id: device.id.clone(),
            bus,
            update_interval: device.update_interval,
            options: device.options.clone(),
            entities,
            calls,
        })
    }
}

/// Binds an explicit bus reference, or the only declared bus of the right
/// type when none is given.
fn resolve_bus(bus: &BusConfig, buses: &[BusDeclaration]) -> CompositionResult<BusConfig> {
    let bus_type = bus.bus_type();
    let declared: Vec<&BusDeclaration> = buses.iter().filter(|b| b.bus_type == bus_type).collect();
    let resolved = match bus.bus() {
        Some(id) => match declared.iter().find(|b| &b.id == id) {
            Some(found) => Some(found.id.clone()),
            None => {
                return Err(CompositionError::UnresolvedReference {
                    kind: bus_type.domain().to_string(),
                    id: id.clone(),
                })
            }
        },
        None => match declared.as_slice() {
            [] => None,
            [only] => Some(only.id.clone()),
            _ => {
                return Err(CompositionError::AmbiguousReference {
                    kind: bus_type.domain().to_string(),
                    candidates: declared.iter().map(|b| b.id.clone()).collect(),
                })
            }
        },
    };
    Ok(bus.with_bus(resolved))
}

fn attach_platforms(config: &ValidatedConfig) -> CompositionResult<Vec<ValidatedDevice>> {
    let mut devices = config.devices.clone();
    for block in &config.platforms {
        let kind = block.descriptor.kind;
        let index = find_parent(&devices, kind, block.parent.as_ref())?;
        let parent = &mut devices[index];
        for entity in &block.entities {
            if parent.entity(entity.key()).is_some() {
                return Err(CompositionError::SlotAlreadyBound {
                    device: parent.id.clone(),
                    slot: entity.key().to_string(),
                });
            }
            parent.entities.push(entity.clone());
        }
    }
    Ok(devices)
}
