//! PCB Artists I2C decibel meter.
//!
//! Three sound level sensors and four reset buttons hang off one polling
//! device. Buttons get a `set_parent` link so they can talk to the meter.

use std::time::Duration;

use espcompose_core::{
    Bus, DeviceDescriptor, DeviceOption, EntityCategory, EntityKind, EntitySlot, Metadata,
    StateClass,
};

const DECIBEL: Metadata = Metadata {
    device_class: Some("sound_pressure"),
    unit_of_measurement: Some("dB"),
    accuracy_decimals: Some(0),
    state_class: Some(StateClass::Measurement),
    ..Metadata::NONE
};

const RESTART: Metadata = Metadata {
    device_class: Some("restart"),
    icon: Some("mdi:restart"),
    entity_category: Some(EntityCategory::Diagnostic),
    ..Metadata::NONE
};

const fn decibel_sensor(key: &'static str, setter: &'static str) -> EntitySlot {
    EntitySlot::optional(key, EntityKind::Sensor)
        .with_setter(setter)
        .with_metadata(DECIBEL)
}

const fn reset_button(key: &'static str, setter: &'static str) -> EntitySlot {
    EntitySlot::optional(key, EntityKind::Button)
        .with_setter(setter)
        .with_metadata(RESTART)
        .parented()
}

static SLOTS: [EntitySlot; 7] = [
    decibel_sensor("decibels", "set_decibels_sensor"),
    decibel_sensor("decibels_max", "set_decibels_max_sensor"),
    decibel_sensor("decibels_min", "set_decibels_min_sensor"),
    reset_button("reset_system", "set_reset_system_button").with_metadata(Metadata {
        icon: Some("mdi:restart-alert"),
        entity_category: Some(EntityCategory::Config),
        ..RESTART
    }),
    reset_button("reset_history", "set_reset_history_button"),
    reset_button("reset_minmax", "set_reset_minmax_button"),
    reset_button("reset_interrupt", "set_reset_interrupt_button"),
];

pub static PCBADBM: DeviceDescriptor = DeviceDescriptor {
    kind: "pcbadbm",
    version: 1,
    class_name: "pcbadbm::PCBADBMComponent",
    bus: Bus::I2c {
        default_address: 0x48,
    },
    update_interval: Some(Duration::from_millis(125)),
    multi_conf: false,
    options: &[DeviceOption {
        key: "filter",
        choices: &[
            ("NONE", 0),
            ("A-WEIGHTING", 1),
            ("C-WEIGHTING", 2),
            ("RESERVED", 3),
        ],
        default: Some("A-WEIGHTING"),
        setter: "set_filter",
    }],
    slots: &SLOTS,
};

pub fn descriptors() -> Vec<&'static DeviceDescriptor> {
    vec![&PCBADBM]
}
