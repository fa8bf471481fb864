//! Levoit air purifier bridged over UART.
//!
//! Each firmware revision adds entities on top of the previous one.

use espcompose_core::{Bus, Constraints, DeviceDescriptor, EntityKind, EntitySlot, Metadata};

pub const COMMANDS: [&str; 14] = [
    "NONE",
    "wifi0",
    "wifi1",
    "wifi2",
    "wifi3",
    "mode0",
    "mode1",
    "mode2",
    "mode3",
    "settimer0",
    "settimer60",
    "settimermax",
    "setfilterstate0",
    "setfilterstate1",
];

const POWER_SWITCH: EntitySlot = EntitySlot::required("power_switch", EntityKind::Switch)
    .with_setter("set_vesyncPowerSwitch")
    .parented();

const FAN_SPEED: EntitySlot = EntitySlot::required("fan_speed", EntityKind::Number)
    .with_setter("set_vesyncFanSpeed")
    .with_constraints(Constraints::Number {
        min_value: 0.0,
        max_value: 4.0,
        step: 1.0,
    })
    .parented();

const FAN_TIMER: EntitySlot = EntitySlot::optional("fan_timer", EntityKind::Number)
    .with_setter("set_vesyncFanTimer")
    .with_constraints(Constraints::Number {
        min_value: 0.0,
        max_value: 4294967295.0,
        step: 1.0,
    })
    .with_metadata(Metadata {
        unit_of_measurement: Some("s"),
        ..Metadata::NONE
    })
    .parented();

const NIGHTLIGHT: EntitySlot = EntitySlot::optional("nightlight", EntityKind::Light)
    .with_setter("set_vesyncNightlight")
    .parented();

const COMMAND: EntitySlot = EntitySlot::optional("command", EntityKind::Select)
    .with_setter("set_vesyncCommandSelect")
    .with_constraints(Constraints::Select { options: &COMMANDS })
    .parented();

const V1: DeviceDescriptor = DeviceDescriptor {
    kind: "vesync",
    version: 1,
    class_name: "vesync::vesync",
    bus: Bus::Uart,
    update_interval: None,
    multi_conf: false,
    options: &[],
    slots: &[POWER_SWITCH, FAN_SPEED],
};

pub static VESYNC_V1: DeviceDescriptor = V1;

pub static VESYNC_V2: DeviceDescriptor = DeviceDescriptor {
    version: 2,
    slots: &[POWER_SWITCH, FAN_SPEED, FAN_TIMER],
    ..V1
};

pub static VESYNC_V3: DeviceDescriptor = DeviceDescriptor {
    version: 3,
    slots: &[POWER_SWITCH, FAN_SPEED, FAN_TIMER, NIGHTLIGHT, COMMAND],
    ..V1
};

pub fn descriptors() -> Vec<&'static DeviceDescriptor> {
    vec![&VESYNC_V1, &VESYNC_V2, &VESYNC_V3]
}
