use std::collections::BTreeMap;

use log::{debug, warn};

use crate::device::DeviceDescriptor;

/// Immutable lookup of every known device kind and its revisions.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    kinds: BTreeMap<&'static str, BTreeMap<u32, &'static DeviceDescriptor>>,
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    descriptors: Vec<&'static DeviceDescriptor>,
}

impl RegistryBuilder {
    pub fn register(mut self, descriptor: &'static DeviceDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn extend(mut self, descriptors: impl IntoIterator<Item = &'static DeviceDescriptor>) -> Self {
        self.descriptors.extend(descriptors);
        self
    }

    /// A later registration of the same kind and version replaces the earlier one.
    pub fn build(self) -> Registry {
        let mut kinds: BTreeMap<&'static str, BTreeMap<u32, &'static DeviceDescriptor>> =
            BTreeMap::new();
        for descriptor in self.descriptors {
            let versions = kinds.entry(descriptor.kind).or_default();
            if versions.insert(descriptor.version, descriptor).is_some() {
                warn!(
                    "Device '{}' version {} registered twice, keeping the last registration",
                    descriptor.kind, descriptor.version
                );
            } else {
                debug!("Registered device '{}' version {}", descriptor.kind, descriptor.version);
            }
        }
        Registry { kinds }
    }
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.kinds.keys().copied()
    }

    pub fn versions(&self, kind: &str) -> Vec<u32> {
        self.kinds
            .get(kind)
            .map(|versions| versions.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn latest(&self, kind: &str) -> Option<&'static DeviceDescriptor> {
        self.kinds
            .get(kind)
            .and_then(|versions| versions.values().next_back().copied())
    }

    /// `None` selects the latest revision.
    pub fn get(&self, kind: &str, version: Option<u32>) -> Option<&'static DeviceDescriptor> {
        match version {
            Some(version) => self.kinds.get(kind)?.get(&version).copied(),
            None => self.latest(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Bus;

    static V1: DeviceDescriptor = V1_FIELDS;

    static V2: DeviceDescriptor = DeviceDescriptor { version: 2, ..V1_FIELDS };

    static V2_OVERRIDE: DeviceDescriptor = DeviceDescriptor {
        version: 2,
        class_name: "purifier::PurifierV2",
        ..V1_FIELDS
    };

    const V1_FIELDS: DeviceDescriptor = DeviceDescriptor {
        kind: "purifier",
        version: 1,
        class_name: "purifier::Purifier",
        bus: Bus::Uart,
        update_interval: None,
        multi_conf: false,
        options: &[],
        slots: &[],
    };

    #[test]
    fn latest_revision_is_the_default() {
        let registry = Registry::builder().register(&V2).register(&V1).build();
        assert_eq!(registry.versions("purifier"), vec![1, 2]);
        assert_eq!(registry.get("purifier", None).map(|d| d.version), Some(2));
        assert_eq!(registry.get("purifier", Some(1)).map(|d| d.version), Some(1));
        assert!(registry.get("purifier", Some(3)).is_none());
        assert!(registry.get("fan", None).is_none());
    }

    #[test]
    fn last_registration_wins() {
        let registry = Registry::builder().extend([&V1, &V2, &V2_OVERRIDE]).build();
        assert_eq!(
            registry.get("purifier", Some(2)).map(|d| d.class_name),
            Some("purifier::PurifierV2")
        );
        assert_eq!(registry.kinds().collect::<Vec<_>>(), vec!["purifier"]);
    }
}
