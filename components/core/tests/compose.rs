use std::time::Duration;

use espcompose_core::{
    compose_str, validate, validate_config, Bus, BusConfig, BusDeclaration, BusType,
    CompositionError, Composer, Constraints, DeviceDescriptor, DeviceOption, EntityKind,
    EntitySlot, Error, Identifier, Registry,
};
use serde_yaml::Value;

static SLOTS: [EntitySlot; 4] = [
    EntitySlot::required("power", EntityKind::Switch)
        .with_setter("set_power_switch")
        .parented(),
    EntitySlot::optional("level", EntityKind::Sensor).with_setter("set_level_sensor"),
    EntitySlot::optional("speed", EntityKind::Number)
        .with_setter("set_speed_number")
        .with_constraints(Constraints::Number {
            min_value: 0.0,
            max_value: 4.0,
            step: 1.0,
        })
        .parented(),
    EntitySlot::optional("reset", EntityKind::Button).parented(),
];

static BOX: DeviceDescriptor = DeviceDescriptor {
    kind: "box",
    version: 1,
    class_name: "box::Box",
    bus: Bus::I2c {
        default_address: 0x20,
    },
    update_interval: Some(Duration::from_secs(1)),
    multi_conf: true,
    options: &[DeviceOption {
        key: "mode",
        choices: &[("FAST", 0), ("SLOW", 1)],
        default: Some("SLOW"),
        setter: "set_mode",
    }],
    slots: &SLOTS,
};

fn yaml(s: &str) -> Value {
    serde_yaml::from_str(s).unwrap()
}

fn id(s: &str) -> Identifier {
    Identifier::parse(s).unwrap()
}

fn registry() -> Registry {
    Registry::builder().register(&BOX).build()
}

#[test]
fn table_holds_exactly_the_present_slots() {
    let device = validate(&yaml("id: b1\nspeed: {}\npower: {}"), &BOX).unwrap();
    let graph = Composer::new().compose(&device).unwrap();

    assert_eq!(graph.entities.keys().collect::<Vec<_>>(), vec!["power", "speed"]);
    assert!(!graph.entities.contains("level"));
    assert_eq!(graph.entities.len(), 2);

    let speed = graph.entity("speed").unwrap();
    assert_eq!(speed.id.as_str(), "b1_speed");
    assert_eq!(speed.parent.as_str(), "b1");
    assert_eq!(speed.kind, EntityKind::Number);
}

#[test]
fn setter_calls_follow_slot_order() {
    let device = validate(&yaml("id: b1\nreset: {}\nlevel: {}\npower:\n  id: main_power"), &BOX).unwrap();
    let graph = Composer::new().compose(&device).unwrap();

    let calls: Vec<_> = graph
        .calls
        .iter()
        .map(|c| format!("{}.{}({})", c.target, c.method, c.argument))
        .collect();
    assert_eq!(
        calls,
        vec![
            "b1.set_mode(SLOW)",
            "main_power.set_parent(b1)",
            "b1.set_power_switch(main_power)",
            "b1.set_level_sensor(b1_level)",
            "b1_reset.set_parent(b1)",
        ]
    );
}

#[test]
fn device_settings_are_carried_over() {
    let device = validate(&yaml("address: 0x21\nupdate_interval: 250ms\nmode: fast\npower: {}"), &BOX).unwrap();
    let graph = Composer::new().compose(&device).unwrap();

    assert_eq!(graph.bus, BusConfig::I2c { bus: None, address: 0x21 });
    assert_eq!(graph.update_interval, Some(Duration::from_millis(250)));
    assert_eq!(graph.options[0].choice, "FAST");
    assert_eq!(graph.class_name, "box::Box");
}

#[test]
fn same_config_with_distinct_ids_gives_identical_graphs() {
    let first = validate(&yaml("id: a\npower: {}\nspeed: {initial_value: 2}"), &BOX).unwrap();
    let second = validate(&yaml("id: b\npower: {}\nspeed: {initial_value: 2}"), &BOX).unwrap();

    let mut composer = Composer::new();
    let a = composer.compose(&first).unwrap();
    let b = composer.compose(&second).unwrap();

    assert_ne!(a.id, b.id);
    assert_eq!(a.bus, b.bus);
    assert_eq!(a.options, b.options);
    assert_eq!(a.calls.len(), b.calls.len());
    for (left, right) in a.entities.iter().zip(b.entities.iter()) {
        assert_eq!(left.key, right.key);
        assert_eq!(left.config, right.config);
        assert_ne!(left.id, right.id);
    }
}

#[test]
fn composing_an_identifier_twice_fails() {
    let device = validate(&yaml("id: twin\npower: {}"), &BOX).unwrap();
    let mut composer = Composer::new();
    composer.compose(&device).unwrap();

    assert_eq!(
        composer.compose(&device),
        Err(CompositionError::DuplicateIdentifier { id: id("twin") })
    );
}

#[test]
fn entity_ids_share_the_namespace() {
    let device = validate(&yaml("id: b1\npower:\n  id: b1"), &BOX).unwrap();
    assert_eq!(
        Composer::new().compose(&device),
        Err(CompositionError::DuplicateIdentifier { id: id("b1") })
    );
}

#[test]
fn failed_composition_claims_nothing() {
    let device = validate(&yaml("id: b1\npower:\n  id: taken\nlevel:\n  id: taken"), &BOX).unwrap();
    let mut composer = Composer::new();
    assert!(composer.compose(&device).is_err());
    assert!(!composer.is_taken(&id("b1")));
    assert!(!composer.is_taken(&id("taken")));

    let fixed = validate(&yaml("id: b1\npower:\n  id: taken"), &BOX).unwrap();
    assert!(composer.compose(&fixed).is_ok());
    assert!(composer.is_taken(&id("taken")));
}

#[test]
fn bus_references_must_resolve() {
    let device = validate(&yaml("i2c_id: bus_b\npower: {}"), &BOX).unwrap();
    assert_eq!(
        Composer::new().compose(&device),
        Err(CompositionError::UnresolvedReference {
            kind: "i2c".to_string(),
            id: id("bus_b")
        })
    );

    let mut composer = Composer::with_buses([
        BusDeclaration {
            bus_type: BusType::I2c,
            id: id("bus_a"),
        },
        BusDeclaration {
            bus_type: BusType::I2c,
            id: id("bus_b"),
        },
    ]);
    let graph = composer.compose(&device).unwrap();
    assert_eq!(graph.bus, BusConfig::I2c { bus: Some(id("bus_b")), address: 0x20 });

    let single = Composer::with_buses([BusDeclaration {
        bus_type: BusType::I2c,
        id: id("bus_a"),
    }])
    .compose(&validate(&yaml("id: other\npower: {}"), &BOX).unwrap())
    .unwrap();
    assert_eq!(single.bus, BusConfig::I2c { bus: Some(id("bus_a")), address: 0x20 });
}

#[test]
fn implicit_bus_needs_a_single_candidate() {
    let config = validate_config(
        &yaml("i2c:\n  - id: bus_a\n  - id: bus_b\nbox:\n  power: {}"),
        &registry(),
    )
    .unwrap();
    let mut composer = Composer::new();
    assert_eq!(
        composer.compose_config(&config),
        Err(CompositionError::AmbiguousReference {
            kind: "i2c".to_string(),
            candidates: vec![id("bus_a"), id("bus_b")]
        })
    );
    assert!(!composer.is_taken(&id("bus_a")));

    let explicit = validate_config(
        &yaml("i2c:\n  - id: bus_a\n  - id: bus_b\nbox:\n  i2c_id: bus_b\n  power: {}"),
        &registry(),
    )
    .unwrap();
    let graphs = Composer::new().compose_config(&explicit).unwrap();
    assert_eq!(graphs[0].bus, BusConfig::I2c { bus: Some(id("bus_b")), address: 0x20 });
}

#[test]
fn platform_blocks_join_their_parent_in_slot_order() {
    let config = validate_config(
        &yaml(
            "
i2c:
  id: bus
box:
  - id: left
    power: {}
    reset: {}
  - id: right
    power: {}
sensor:
  - platform: box
    box_id: left
    level:
      name: Left level
number:
  - platform: box
    box_id: left
    speed: {}
",
        ),
        &registry(),
    )
    .unwrap();

    let graphs = Composer::new().compose_config(&config).unwrap();
    assert_eq!(graphs.len(), 2);

    let left = &graphs[0];
    assert_eq!(
        left.entities.keys().collect::<Vec<_>>(),
        vec!["power", "level", "speed", "reset"]
    );
    assert_eq!(left.entity("level").unwrap().config.name, "Left level");
    assert_eq!(left.bus, BusConfig::I2c { bus: Some(id("bus")), address: 0x20 });
    assert_eq!(graphs[1].entities.keys().collect::<Vec<_>>(), vec!["power"]);
}

#[test]
fn platform_parent_must_exist() {
    let config = validate_config(
        &yaml("box:\n  id: left\n  power: {}\nsensor:\n  - platform: box\n    box_id: middle\n    level: {}"),
        &registry(),
    )
    .unwrap();
    assert_eq!(
        Composer::new().compose_config(&config),
        Err(CompositionError::UnresolvedReference {
            kind: "box".to_string(),
            id: id("middle")
        })
    );

    let orphan = validate_config(&yaml("sensor:\n  - platform: box\n    level: {}"), &registry()).unwrap();
    assert_eq!(
        Composer::new().compose_config(&orphan),
        Err(CompositionError::UnresolvedReference {
            kind: "box".to_string(),
            id: id("box")
        })
    );
}

#[test]
fn implicit_platform_parent_needs_a_single_device() {
    let config = validate_config(
        &yaml("box:\n  - id: left\n    power: {}\n  - id: right\n    power: {}\nsensor:\n  - platform: box\n    level: {}"),
        &registry(),
    )
    .unwrap();
    let err = Composer::new().compose_config(&config).unwrap_err();
    assert_eq!(
        err,
        CompositionError::AmbiguousReference {
            kind: "box".to_string(),
            candidates: vec![id("left"), id("right")]
        }
    );
    assert!(err.to_string().contains("box_id"));
}

#[test]
fn required_slot_can_be_supplied_by_a_platform_block() {
    let graphs = compose_str(
        "box:\n  id: b1\n  level: {}\nswitch:\n  - platform: box\n    power:\n      name: Power",
        &registry(),
    )
    .unwrap();
    assert_eq!(graphs[0].entities.keys().collect::<Vec<_>>(), vec!["power", "level"]);
    assert_eq!(graphs[0].entity("power").unwrap().config.name, "Power");
}

#[test]
fn a_slot_is_bound_once() {
    let config = validate_config(
        &yaml("box:\n  power: {}\n  level: {}\nsensor:\n  - platform: box\n    level: {}"),
        &registry(),
    )
    .unwrap();
    assert_eq!(
        Composer::new().compose_config(&config),
        Err(CompositionError::SlotAlreadyBound {
            device: id("box"),
            slot: "level".to_string()
        })
    );
}

#[test]
fn bus_ids_collide_with_device_ids() {
    let config = validate_config(&yaml("i2c:\n  id: shared\nbox:\n  id: shared\n  power: {}"), &registry()).unwrap();
    assert_eq!(
        Composer::new().compose_config(&config),
        Err(CompositionError::DuplicateIdentifier { id: id("shared") })
    );
}

#[test]
fn compose_str_reports_each_stage() {
    let graphs = compose_str("box:\n  power: {}", &registry()).unwrap();
    assert_eq!(graphs[0].id.as_str(), "box");

    assert!(matches!(compose_str("box: [", &registry()), Err(Error::Yaml(_))));
    assert!(matches!(compose_str("box: {}", &registry()), Err(Error::Validation(_))));
    assert!(matches!(
        compose_str("box:\n  - id: a\n    power: {}\n  - id: a\n    power: {}", &registry()),
        Err(Error::Composition(_))
    ));
}

#[test]
fn graphs_serialize_for_the_emitter() {
    let graphs = compose_str("box:\n  power: {}\n  speed:\n    initial_value: 1", &registry()).unwrap();
    let out: Value = serde_yaml::to_value(&graphs[0]).unwrap();

    assert_eq!(out["update_interval"], Value::from("1000ms"));
    assert_eq!(out["bus"]["type"], Value::from("i2c"));
    assert_eq!(out["bus"]["address"], Value::from(0x20));
    assert_eq!(out["entities"][1]["key"], Value::from("speed"));
    assert_eq!(out["entities"][1]["max_value"], Value::from(4.0));
    assert_eq!(out["entities"][1]["initial_value"], Value::from(1.0));
    assert_eq!(out["calls"][0]["method"], Value::from("set_mode"));
}
