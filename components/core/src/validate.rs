//! Schema validation of raw configuration against device descriptors.
//!
//! Validation is pure and stops at the first violation.

use log::debug;
use serde_yaml::Value;

use crate::config::{find_parent, BusDeclaration, PlatformBlock, ValidatedConfig};
use crate::device::{Bus, BusConfig, BusType, DeviceDescriptor, OptionValue, ValidatedDevice};
use crate::entity::{enum_error, validate_entity, EntityKind};
use crate::error::{ValidationError, ValidationResult};
use crate::fields::Fields;
use crate::id::Identifier;
use crate::registry::Registry;

const ROOT_PATH: &str = "<root>";
const MAX_I2C_ADDRESS: u64 = 0x7F;

/// Validates one device block against a single descriptor revision.
///
/// The device id defaults to the kind name.
pub fn validate(raw: &Value, descriptor: &'static DeviceDescriptor) -> ValidationResult<ValidatedDevice> {
    validate_device(
        descriptor.kind,
        raw,
        descriptor,
        Identifier::generated(descriptor.kind.to_string()),
        true,
    )
}

fn validate_device(
    path: &str,
    raw: &Value,
    descriptor: &'static DeviceDescriptor,
    default_id: Identifier,
    check_required: bool,
) -> ValidationResult<ValidatedDevice> {
    let mut fields = Fields::new(path, raw)?;

    let id = fields.identifier("id")?.unwrap_or(default_id);

    if let Some(version) = fields.unsigned("version")? {
        if version != u64::from(descriptor.version) {
            let allowed = descriptor.version.to_string();
            return Err(enum_error(
                fields.child_path("version"),
                version.to_string(),
                &[allowed.as_str()],
            ));
        }
    }

    let bus = match descriptor.bus {
        Bus::I2c { default_address } => {
            let address = match fields.unsigned("address")? {
                Some(address) if address <= MAX_I2C_ADDRESS => address as u8,
                Some(address) => {
                    return Err(ValidationError::OutOfRange {
                        path: fields.child_path("address"),
                        value: address as f64,
                        min: 0.0,
                        max: MAX_I2C_ADDRESS as f64,
                    })
                }
                None => default_address,
            };
            BusConfig::I2c {
                bus: fields.identifier(BusType::I2c.id_key())?,
                address,
            }
        }
        Bus::Uart => BusConfig::Uart {
            bus: fields.identifier(BusType::Uart.id_key())?,
        },
    };

    // Non-polling devices leave `update_interval` unread, so it is reported
    // as an unknown field below.
    let update_interval = match descriptor.update_interval {
        Some(default) => {
            let interval = fields.duration("update_interval")?.unwrap_or(default);
            if interval.is_zero() {
                return Err(ValidationError::TypeMismatch {
                    path: fields.child_path("update_interval"),
                    expected: "a positive time period",
                });
            }
            if interval.subsec_nanos() % 1_000_000 != 0 {
                return Err(ValidationError::TypeMismatch {
                    path: fields.child_path("update_interval"),
                    expected: "a time period in whole milliseconds",
                });
            }
            Some(interval)
        }
        None => None,
    };

    let mut options = Vec::with_capacity(descriptor.options.len());
    for option in descriptor.options {
        let (input, name) = match fields.string(option.key)? {
            Some(input) => {
                let name = input.to_uppercase();
                (input, name)
            }
            None => match option.default {
                Some(default) => (default.to_string(), default.to_string()),
                None => {
                    return Err(ValidationError::MissingRequiredField {
                        path: fields.child_path(option.key),
                    })
                }
            },
        };
        let (choice, value) = option
            .choice(&name)
            .ok_or_else(|| enum_error(fields.child_path(option.key), input, &option.names()))?;
        options.push(OptionValue {
            key: option.key,
            choice,
            value,
            setter: option.setter,
        });
    }

    let mut entities = Vec::new();
    for slot in descriptor.slots {
        match fields.get(slot.key) {
            Some(raw) => entities.push(validate_entity(fields.path(), raw, slot)?),
            None if check_required && slot.is_required() => {
                return Err(ValidationError::MissingRequiredField {
                    path: fields.child_path(slot.key),
                })
            }
            None => {}
        }
    }

    fields.finish()?;

    debug!(
        "Validated {} v{} '{}' with {} entities",
        descriptor.kind,
        descriptor.version,
        id,
        entities.len()
    );

    Ok(ValidatedDevice {
        descriptor,
        id,
        bus,
        update_interval,
        options,
        entities,
    })
}

/// Validates a whole configuration tree.
///
/// Bus declarations are read first, then device blocks, then platform
/// blocks. Top-level keys that are neither are left to the rest of the build.
/// A required slot may be supplied by a platform block of its device.
pub fn validate_config(root: &Value, registry: &Registry) -> ValidationResult<ValidatedConfig> {
    let map = match root {
        Value::Mapping(map) => map,
        Value::Null => return Ok(ValidatedConfig::default()),
        _ => {
            return Err(ValidationError::TypeMismatch {
                path: ROOT_PATH.to_string(),
                expected: "a mapping",
            })
        }
    };

    let mut config = ValidatedConfig::default();
    let mut device_paths = Vec::new();

    for bus_type in [BusType::I2c, BusType::Uart] {
        let domain = bus_type.domain();
        let Some(raw) = map.get(domain) else {
            continue;
        };
        let items = as_items(domain, raw)?;
        let count = items.len();
        for (index, item) in items.into_iter().enumerate() {
            let path = item_path(domain, index, count);
            let mut fields = Fields::new(path, item)?;
            let id = fields.identifier("id")?.unwrap_or_else(|| {
                Identifier::generated(if count == 1 {
                    format!("{}_bus", domain)
                } else {
                    format!("{}_bus_{}", domain, index)
                })
            });
            config.buses.push(BusDeclaration { bus_type, id });
        }
    }

    for (key, raw) in map {
        let Some(kind) = key.as_str() else {
            continue;
        };
        let Some(latest) = registry.latest(kind) else {
            continue;
        };
        if !latest.multi_conf && !matches!(raw, Value::Mapping(_) | Value::Null) {
            return Err(ValidationError::TypeMismatch {
                path: kind.to_string(),
                expected: "a mapping",
            });
        }
        let items = as_items(kind, raw)?;
        let count = items.len();
        for (index, item) in items.into_iter().enumerate() {
            let path = item_path(kind, index, count);
            let descriptor = select_revision(&path, item, registry, kind)?;
            let default_id = if count == 1 {
                kind.to_string()
            } else {
                format!("{}_{}", kind, index)
            };
            let device =
                validate_device(&path, item, descriptor, Identifier::generated(default_id), false)?;
            config.devices.push(device);
            device_paths.push(path);
        }
    }

    for (key, raw) in map {
        let Some(name) = key.as_str() else {
            continue;
        };
        let Some(domain) = EntityKind::from_domain(name) else {
            if !registry.contains(name) && BusType::I2c.domain() != name && BusType::Uart.domain() != name {
                debug!("Ignoring top-level key '{}'", name);
            }
            continue;
        };
        let entries = match raw {
            Value::Sequence(entries) => entries,
            Value::Null => continue,
            _ => {
                return Err(ValidationError::TypeMismatch {
                    path: name.to_string(),
                    expected: "a list of platforms",
                })
            }
        };
        for (index, entry) in entries.iter().enumerate() {
            let path = format!("{}[{}]", name, index);
            if let Some(block) = validate_platform(&path, entry, domain, registry, &config)? {
                config.platforms.push(block);
            }
        }
    }

    for (index, device) in config.devices.iter().enumerate() {
        for slot in device.descriptor.slots.iter().filter(|slot| slot.is_required()) {
            if device.entity(slot.key).is_none() && !supplied_by_platform(&config, index, slot.key) {
                return Err(ValidationError::MissingRequiredField {
                    path: format!("{}.{}", device_paths[index], slot.key),
                });
            }
        }
    }

    Ok(config)
}

fn supplied_by_platform(config: &ValidatedConfig, device: usize, key: &str) -> bool {
    let kind = config.devices[device].descriptor.kind;
    config.platforms.iter().any(|block| {
        block.descriptor.kind == kind
            && block.entities.iter().any(|entity| entity.key() == key)
            && find_parent(&config.devices, kind, block.parent.as_ref()).ok() == Some(device)
    })
}

fn validate_platform(
    path: &str,
    raw: &Value,
    domain: EntityKind,
    registry: &Registry,
    config: &ValidatedConfig,
) -> ValidationResult<Option<PlatformBlock>> {
    let mut fields = Fields::new(path, raw)?;
    let platform = fields
        .string("platform")?
        .ok_or_else(|| ValidationError::MissingRequiredField {
            path: fields.child_path("platform"),
        })?;
    let Some(latest) = registry.latest(&platform) else {
        debug!("Skipping {} platform '{}'", domain.domain(), platform);
        return Ok(None);
    };

    let parent = fields.identifier(&latest.parent_key())?;
    // Use the revision of the referenced device so its slots apply; an
    // unresolved or ambiguous parent is reported when the block is linked.
    let descriptor = find_parent(&config.devices, latest.kind, parent.as_ref())
        .ok()
        .map(|index| config.devices[index].descriptor)
        .unwrap_or(latest);

    let mut entities = Vec::new();
    for slot in descriptor.slots.iter().filter(|slot| slot.kind == domain) {
        if let Some(raw) = fields.get(slot.key) {
            entities.push(validate_entity(fields.path(), raw, slot)?);
        }
    }
    fields.finish()?;

    Ok(Some(PlatformBlock {
        domain,
        descriptor,
        parent,
        entities,
    }))
}

fn select_revision(
    path: &str,
    raw: &Value,
    registry: &Registry,
    kind: &str,
) -> ValidationResult<&'static DeviceDescriptor> {
    let mut fields = Fields::new(path, raw)?;
    let version = match fields.unsigned("version")? {
        Some(version) => Some(u32::try_from(version).map_err(|_| ValidationError::TypeMismatch {
            path: fields.child_path("version"),
            expected: "a revision number",
        })?),
        None => None,
    };
    registry.get(kind, version).ok_or_else(|| {
        let allowed: Vec<String> = registry.versions(kind).iter().map(u32::to_string).collect();
        ValidationError::UnknownEnumValue {
            path: fields.child_path("version"),
            value: version.unwrap_or_default().to_string(),
            allowed,
        }
    })
}

fn as_items<'a>(path: &str, raw: &'a Value) -> ValidationResult<Vec<&'a Value>> {
    match raw {
        Value::Sequence(items) => Ok(items.iter().collect()),
        Value::Mapping(_) | Value::Null => Ok(vec![raw]),
        _ => Err(ValidationError::TypeMismatch {
            path: path.to_string(),
            expected: "a mapping or a list of mappings",
        }),
    }
}

fn item_path(key: &str, index: usize, count: usize) -> String {
    if count == 1 {
        key.to_string()
    } else {
        format!("{}[{}]", key, index)
    }
}
