use std::sync::Arc;

use glam::Vec3;
use scene_controls::{
    bind, Axis, BindingTable, ConfigStore, ControlBinder, ControlEvent, MemorySurface, Outcome,
    Rejection, Trigger, SLOT_COUNT,
};

fn binder() -> ControlBinder<Arc<MemorySurface>> {
    let table = BindingTable::standard();
    let surface = Arc::new(MemorySurface::for_table(&table));
    bind(table, ConfigStore::new(), surface).expect("standard table binds")
}

fn input(binder: &ControlBinder<Arc<MemorySurface>>, control: &str, value: &str) -> Outcome {
    binder
        .dispatch(control, Trigger::Input, &ControlEvent::value(value))
        .expect("input binding")
}

fn change(binder: &ControlBinder<Arc<MemorySurface>>, control: &str, value: &str) -> Outcome {
    binder
        .dispatch(control, Trigger::Change, &ControlEvent::value(value))
        .expect("change binding")
}

fn check(binder: &ControlBinder<Arc<MemorySurface>>, control: &str, checked: bool) -> Outcome {
    binder
        .dispatch(control, Trigger::Change, &ControlEvent::checked(checked))
        .expect("checkbox binding")
}

#[test]
fn scale_sliders_write_value_and_readout() {
    let binder = binder();
    for slot in 0..SLOT_COUNT {
        for axis in Axis::ALL {
            let control = format!("c{}-{}-scale", slot + 1, axis.name());
            let value = format!("{}.5", slot + axis.index() + 1);
            assert_eq!(input(&binder, &control, &value), Outcome::Applied);

            let model = binder.store().model(slot).unwrap();
            assert_eq!(model.scale[axis.index()], value.parse::<f32>().unwrap());
            assert_eq!(
                binder.surface().readout(&format!("{control}-value")),
                Some(value)
            );
        }
    }
}

#[test]
fn translation_ignores_non_numeric_text() {
    let binder = binder();
    for slot in 0..SLOT_COUNT {
        for axis in Axis::ALL {
            let control = format!("c{}-{}-pos", slot + 1, axis.name());
            let before = binder.store().model(slot).unwrap().pos;

            let outcome = change(&binder, &control, "abc");
            assert_eq!(outcome, Outcome::Rejected(Rejection::NotANumber("abc".into())));
            assert_eq!(binder.store().model(slot).unwrap().pos, before);

            assert!(change(&binder, &control, "2.5").is_applied());
            assert_eq!(binder.store().model(slot).unwrap().pos[axis.index()], 2.5);
        }
    }
}

#[test]
fn rotate_axis_stays_one_hot() {
    let binder = binder();
    check(&binder, "c2-rotate-axis-y", true);
    assert_eq!(binder.store().model(1).unwrap().rotate_axis, [0, 1, 0]);
    check(&binder, "c2-rotate-axis-z", true);
    assert_eq!(binder.store().model(1).unwrap().rotate_axis, [0, 0, 1]);
    check(&binder, "c2-rotate-axis-x", false);
    assert_eq!(binder.store().model(1).unwrap().rotate_axis, [0, 0, 1]);
    // Other slots are untouched.
    assert_eq!(binder.store().model(0).unwrap().rotate_axis, [0, 1, 0]);
}

#[test]
fn rotate_degree_waits_for_autorotate_off() {
    let binder = binder();
    check(&binder, "c1-autorotate", true);
    assert!(binder.store().model(0).unwrap().autorotate);

    let outcome = change(&binder, "c1-rotate-degree", "45");
    assert_eq!(outcome, Outcome::Rejected(Rejection::AutoRotateActive));
    assert_eq!(binder.store().model(0).unwrap().rotate_degree, 0.0);

    check(&binder, "c1-autorotate", false);
    assert!(change(&binder, "c1-rotate-degree", "45").is_applied());
    assert_eq!(binder.store().model(0).unwrap().rotate_degree, 45.0);

    assert!(!change(&binder, "c1-rotate-degree", "left").is_applied());
    assert_eq!(binder.store().model(0).unwrap().rotate_degree, 45.0);
}

#[test]
fn light_colour_converts_from_byte_range() {
    let binder = binder();
    change(&binder, "c3-light-color-r", "255");
    assert_eq!(binder.store().light(2).unwrap().color[0], 1.0);
    change(&binder, "c3-light-color-r", "0");
    assert_eq!(binder.store().light(2).unwrap().color[0], 0.0);
    change(&binder, "c3-light-color-r", "red");
    assert_eq!(binder.store().light(2).unwrap().color[0], 0.0);
}

#[test]
fn shininess_rejects_negative_values() {
    let binder = binder();
    let before = binder.store().model(0).unwrap().shininess;
    let outcome = change(&binder, "c1-shininess", "-1");
    assert_eq!(outcome, Outcome::Rejected(Rejection::Negative(-1.0)));
    assert_eq!(binder.store().model(0).unwrap().shininess, before);

    assert!(change(&binder, "c1-shininess", "10").is_applied());
    assert_eq!(binder.store().model(0).unwrap().shininess, 10.0);
}

#[test]
fn lighting_constants_and_shear_are_numeric() {
    let binder = binder();
    input(&binder, "c2-ka", "0.25");
    input(&binder, "c2-kd", "0.5");
    input(&binder, "c2-ks", "0.75");
    change(&binder, "c2-shear-degree", "30");
    let model = binder.store().model(1).unwrap();
    assert_eq!((model.ka, model.kd, model.ks), (0.25, 0.5, 0.75));
    assert_eq!(model.shear_degree, 30.0);
    assert_eq!(binder.surface().readout("c2-kd-value").as_deref(), Some("0.5"));
}

#[test]
fn light_position_updates_only_its_slot() {
    let binder = binder();
    change(&binder, "c2-light-y-pos", "-3");
    change(&binder, "c2-light-x-pos", "nope");
    let light = binder.store().light(1).unwrap();
    assert_eq!(light.pos.y, -3.0);
    assert_eq!(light.pos.x, 0.0);
    assert_eq!(binder.store().light(0).unwrap().pos, Vec3::new(-5.0, 5.0, 5.0));
}

#[test]
fn render_side_reads_through_shared_store() {
    let table = BindingTable::standard();
    let surface = MemorySurface::for_table(&table);
    let store = ConfigStore::new();
    let renderer_view = store.clone();
    let binder = bind(table, store, surface).unwrap();

    binder
        .fire("c3-model-value", &ControlEvent::value("bunny"))
        .unwrap();
    assert_eq!(renderer_view.snapshot().models[2].model, "bunny");
}
