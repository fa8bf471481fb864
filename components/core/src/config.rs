use crate::device::{BusType, DeviceDescriptor, ValidatedDevice};
use crate::entity::{EntityConfig, EntityKind};
use crate::error::CompositionError;
use crate::id::Identifier;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BusDeclaration {
    pub bus_type: BusType,
    pub id: Identifier,
}

/// Entities of one domain attached to a device from outside its own block,
/// e.g. `sensor: [{ platform: pcbadbm, decibels_max: ... }]`.
#[derive(Clone, Debug, PartialEq)]
pub struct PlatformBlock {
    pub domain: EntityKind,
    pub descriptor: &'static DeviceDescriptor,
    /// Explicit `<kind>_id`; `None` means the only device of that kind.
    pub parent: Option<Identifier>,
    pub entities: Vec<EntityConfig>,
}

/// Whole configuration tree after validation, in document order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidatedConfig {
    pub buses: Vec<BusDeclaration>,
    pub devices: Vec<ValidatedDevice>,
    pub platforms: Vec<PlatformBlock>,
}

impl ValidatedConfig {
    pub fn device(&self, id: &str) -> Option<&ValidatedDevice> {
        self.devices.iter().find(|d| d.id.as_str() == id)
    }
}

/// Resolves a parent reference of a platform block.
///
/// Without an explicit id the kind must have exactly one device.
pub(crate) fn find_parent(
    devices: &[ValidatedDevice],
    kind: &str,
    parent: Option<&Identifier>,
) -> Result<usize, CompositionError> {
    let candidates: Vec<usize> = devices
        .iter()
        .enumerate()
        .filter(|(_, device)| {
            device.descriptor.kind == kind && parent.is_none_or(|id| &device.id == id)
        })
        .map(|(index, _)| index)
        .collect();

    match (candidates.as_slice(), parent) {
        ([], _) => Err(CompositionError::UnresolvedReference {
            kind: kind.to_string(),
            id: parent
                .cloned()
                .unwrap_or_else(|| Identifier::generated(kind.to_string())),
        }),
        // Repeated explicit ids are reported as duplicates when composed.
        ([first, ..], Some(_)) | ([first], None) => Ok(*first),
        (_, None) => Err(CompositionError::AmbiguousReference {
            kind: kind.to_string(),
            candidates: candidates.iter().map(|&i| devices[i].id.clone()).collect(),
        }),
    }
}
