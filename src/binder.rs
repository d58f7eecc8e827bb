use std::collections::HashMap;

use thiserror::Error;

use crate::binding::{
    BindingSpec, BindingTable, Coefficient, FieldPath, Guard, LightField, ModelField, Transform,
    Trigger,
};
use crate::config::{LightConfig, ModelConfig, SLOT_COUNT};
use crate::store::ConfigStore;
use crate::surface::ControlSurface;

/// Setup errors: the table does not fit the host document or the config.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    #[error("control `{0}` is not present in the document")]
    MissingControl(String),
    #[error("readout `{readout}` for control `{control}` is not present in the document")]
    MissingReadout { control: String, readout: String },
    #[error("control `{0}` is bound more than once")]
    DuplicateControl(String),
    #[error("control `{control}` targets slot {slot}, expected fewer than {max}", max = SLOT_COUNT)]
    SlotOutOfRange { control: String, slot: usize },
    #[error("control `{0}` transforms its value into the wrong type for its field")]
    Inconsistent(String),
    #[error("no binding for control `{0}`")]
    UnknownControl(String),
    #[error("control `{control}` listens for `{expected}`, got `{actual}`")]
    TriggerMismatch {
        control: String,
        expected: Trigger,
        actual: Trigger,
    },
}

/// Reason a control value was not written. These are never shown to the
/// user; the previous value simply stays in place.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("not a number: {0:?}")]
    NotANumber(String),
    #[error("negative value {0}")]
    Negative(f32),
    #[error("checkbox is not checked")]
    Unchecked,
    #[error("slot is auto-rotating")]
    AutoRotateActive,
    #[error("value does not fit the bound field")]
    Unwritable,
}

/// State of the control that fired.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlEvent {
    pub value: String,
    pub checked: bool,
}

impl ControlEvent {
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            checked: false,
        }
    }

    pub fn checked(checked: bool) -> Self {
        Self {
            value: if checked { "on" } else { "off" }.to_string(),
            checked,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied,
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Number(f32),
    Flag(bool),
    Text(String),
}

/// Interprets a [`BindingTable`] against a [`ConfigStore`].
#[derive(Debug)]
pub struct ControlBinder<S> {
    table: BindingTable,
    index: HashMap<String, usize>,
    store: ConfigStore,
    surface: S,
}

/// Validates `table` against `surface` and returns a binder writing into
/// `store`.
pub fn bind<S: ControlSurface>(
    table: BindingTable,
    store: ConfigStore,
    surface: S,
) -> Result<ControlBinder<S>, BindError> {
    ControlBinder::bind(table, store, surface)
}

impl<S: ControlSurface> ControlBinder<S> {
    pub fn bind(table: BindingTable, store: ConfigStore, surface: S) -> Result<Self, BindError> {
        let mut index = HashMap::with_capacity(table.len());
        for (position, spec) in table.iter().enumerate() {
            if spec.slot >= SLOT_COUNT {
                return Err(BindError::SlotOutOfRange {
                    control: spec.control.clone(),
                    slot: spec.slot,
                });
            }
            if !spec.is_consistent() {
                return Err(BindError::Inconsistent(spec.control.clone()));
            }
            if !surface.has_control(&spec.control) {
                return Err(BindError::MissingControl(spec.control.clone()));
            }
            if let Some(readout) = &spec.readout {
                if !surface.has_control(readout) {
                    return Err(BindError::MissingReadout {
                        control: spec.control.clone(),
                        readout: readout.clone(),
                    });
                }
            }
            if index.insert(spec.control.clone(), position).is_some() {
                return Err(BindError::DuplicateControl(spec.control.clone()));
            }
        }
        log::info!("Bound {} scene control(s)", table.len());
        Ok(Self {
            table,
            index,
            store,
            surface,
        })
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn bindings(&self) -> impl Iterator<Item = &BindingSpec> {
        self.table.iter()
    }

    pub fn binding(&self, control: &str) -> Option<&BindingSpec> {
        self.index
            .get(control)
            .and_then(|&position| self.table.get(position))
    }

    /// Handles `trigger` fired by `control`.
    pub fn dispatch(
        &self,
        control: &str,
        trigger: Trigger,
        event: &ControlEvent,
    ) -> Result<Outcome, BindError> {
        let spec = self
            .binding(control)
            .ok_or_else(|| BindError::UnknownControl(control.to_string()))?;
        if spec.trigger != trigger {
            return Err(BindError::TriggerMismatch {
                control: control.to_string(),
                expected: spec.trigger,
                actual: trigger,
            });
        }
        Ok(self.apply(spec, event))
    }

    /// Handles `control` firing the event it is bound to.
    pub fn fire(&self, control: &str, event: &ControlEvent) -> Result<Outcome, BindError> {
        let spec = self
            .binding(control)
            .ok_or_else(|| BindError::UnknownControl(control.to_string()))?;
        Ok(self.apply(spec, event))
    }

    fn apply(&self, spec: &BindingSpec, event: &ControlEvent) -> Outcome {
        if let Some(readout) = &spec.readout {
            self.surface.set_readout(readout, &event.value);
        }
        let result = read_value(spec.transform, event)
            .and_then(|value| check_guard(spec.guard, event, &value).map(|()| value))
            .and_then(|value| self.write(spec, value));
        match result {
            Ok(()) => {
                log::debug!("{} <- {:?}", spec.control, event.value);
                Outcome::Applied
            }
            Err(rejection) => {
                log::debug!("{} ignored {:?}: {rejection}", spec.control, event.value);
                Outcome::Rejected(rejection)
            }
        }
    }

    fn write(&self, spec: &BindingSpec, value: Value) -> Result<(), Rejection> {
        let written = match spec.path {
            FieldPath::Model(field) => self
                .store
                .update_model(spec.slot, |model| write_model(model, field, spec.guard, value)),
            FieldPath::Light(field) => self
                .store
                .update_light(spec.slot, |light| write_light(light, field, value)),
        };
        written.unwrap_or(Err(Rejection::Unwritable))
    }
}

/// Parses control text the way a number input reports it. Blank and
/// non-finite values are rejected.
pub fn parse_number(raw: &str) -> Result<f32, Rejection> {
    let trimmed = raw.trim();
    match trimmed.parse::<f32>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(Rejection::NotANumber(raw.to_string())),
    }
}

fn read_value(transform: Transform, event: &ControlEvent) -> Result<Value, Rejection> {
    match transform {
        Transform::Number => parse_number(&event.value).map(Value::Number),
        Transform::Normalized(range) => {
            parse_number(&event.value).map(|number| Value::Number(number / range))
        }
        Transform::Checked => Ok(Value::Flag(event.checked)),
        Transform::Text => Ok(Value::Text(event.value.clone())),
    }
}

fn check_guard(guard: Option<Guard>, event: &ControlEvent, value: &Value) -> Result<(), Rejection> {
    match (guard, value) {
        (Some(Guard::NonNegative), Value::Number(number)) if *number < 0.0 => {
            Err(Rejection::Negative(*number))
        }
        (Some(Guard::WhenChecked), _) if !event.checked => Err(Rejection::Unchecked),
        _ => Ok(()),
    }
}

fn write_model(
    model: &mut ModelConfig,
    field: ModelField,
    guard: Option<Guard>,
    value: Value,
) -> Result<(), Rejection> {
    if guard == Some(Guard::WhenNotAutoRotating) && model.autorotate {
        return Err(Rejection::AutoRotateActive);
    }
    match (field, value) {
        (ModelField::Scale(axis), Value::Number(number)) => model.scale[axis.index()] = number,
        (ModelField::Position(axis), Value::Number(number)) => model.pos[axis.index()] = number,
        (ModelField::AutoRotate, Value::Flag(on)) => model.autorotate = on,
        (ModelField::RotateAxis(axis), Value::Flag(checked)) => {
            if !checked {
                return Err(Rejection::Unchecked);
            }
            model.select_rotate_axis(axis);
        }
        (ModelField::RotateDegree, Value::Number(number)) => model.rotate_degree = number,
        (ModelField::ShearDegree, Value::Number(number)) => model.shear_degree = number,
        (ModelField::Coefficient(coefficient), Value::Number(number)) => {
            let target = match coefficient {
                Coefficient::Ambient => &mut model.ka,
                Coefficient::Diffuse => &mut model.kd,
                Coefficient::Specular => &mut model.ks,
            };
            *target = number;
        }
        (ModelField::Shininess, Value::Number(number)) => model.shininess = number,
        (ModelField::Model, Value::Text(text)) => model.model = text,
        (ModelField::Shader, Value::Text(text)) => model.shader = text,
        _ => return Err(Rejection::Unwritable),
    }
    Ok(())
}

fn write_light(light: &mut LightConfig, field: LightField, value: Value) -> Result<(), Rejection> {
    let Value::Number(number) = value else {
        return Err(Rejection::Unwritable);
    };
    match field {
        LightField::Position(axis) => light.pos[axis.index()] = number,
        LightField::Color(channel) => light.color[channel.index()] = number.clamp(0.0, 1.0),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec3;

    use super::*;
    use crate::surface::MemorySurface;

    fn standard_binder() -> ControlBinder<Arc<MemorySurface>> {
        let table = BindingTable::standard();
        let surface = Arc::new(MemorySurface::for_table(&table));
        bind(table, ConfigStore::new(), surface).unwrap()
    }

    #[test]
    fn parse_number_rejects_blank_and_garbage() {
        assert_eq!(parse_number(" 2.5 "), Ok(2.5));
        assert_eq!(parse_number("-1e2"), Ok(-100.0));
        assert!(parse_number("").is_err());
        assert!(parse_number("abc").is_err());
        assert!(parse_number("NaN").is_err());
        assert!(parse_number("inf").is_err());
    }

    #[test]
    fn missing_control_fails_to_bind() {
        let table = BindingTable::standard();
        let mut surface = MemorySurface::for_table(&table);
        surface.remove_control("c2-shininess");
        let err = bind(table, ConfigStore::new(), surface).unwrap_err();
        assert_eq!(err, BindError::MissingControl("c2-shininess".into()));
    }

    #[test]
    fn missing_readout_fails_to_bind() {
        let table = BindingTable::standard();
        let mut surface = MemorySurface::for_table(&table);
        surface.remove_control("c1-ka-value");
        let err = bind(table, ConfigStore::new(), surface).unwrap_err();
        assert!(matches!(err, BindError::MissingReadout { .. }));
    }

    #[test]
    fn duplicate_and_out_of_range_bindings_fail() {
        let spec = BindingSpec::new(
            "c1-x-pos",
            Trigger::Change,
            0,
            FieldPath::Model(ModelField::Position(crate::binding::Axis::X)),
            Transform::Number,
        );
        let table: BindingTable = [spec.clone(), spec.clone()].into_iter().collect();
        let surface = MemorySurface::with_controls(["c1-x-pos"]);
        assert_eq!(
            bind(table, ConfigStore::new(), surface).unwrap_err(),
            BindError::DuplicateControl("c1-x-pos".into())
        );

        let far = BindingSpec { slot: 3, ..spec };
        let table: BindingTable = std::iter::once(far).collect();
        let surface = MemorySurface::with_controls(["c1-x-pos"]);
        assert!(matches!(
            bind(table, ConfigStore::new(), surface),
            Err(BindError::SlotOutOfRange { slot: 3, .. })
        ));
    }

    #[test]
    fn dispatch_checks_trigger_and_control() {
        let binder = standard_binder();
        let event = ControlEvent::value("1");
        assert!(matches!(
            binder.dispatch("c1-x-pos", Trigger::Input, &event),
            Err(BindError::TriggerMismatch { .. })
        ));
        assert!(matches!(
            binder.dispatch("c9-x-pos", Trigger::Change, &event),
            Err(BindError::UnknownControl(_))
        ));
    }

    #[test]
    fn unchecked_axis_box_is_ignored() {
        let binder = standard_binder();
        let outcome = binder
            .dispatch("c1-rotate-axis-x", Trigger::Change, &ControlEvent::checked(false))
            .unwrap();
        assert_eq!(outcome, Outcome::Rejected(Rejection::Unchecked));
        assert_eq!(binder.store().model(0).unwrap().rotate_axis, [0, 1, 0]);
    }

    #[test]
    fn readout_mirrors_even_rejected_values() {
        let binder = standard_binder();
        let outcome = binder
            .dispatch("c3-ks", Trigger::Input, &ControlEvent::value("oops"))
            .unwrap();
        assert!(!outcome.is_applied());
        assert_eq!(binder.surface().readout("c3-ks-value").as_deref(), Some("oops"));
        assert_eq!(binder.store().model(2).unwrap().ks, 0.3);
    }

    #[test]
    fn light_colour_is_clamped() {
        let binder = standard_binder();
        binder
            .fire("c1-light-color-g", &ControlEvent::value("510"))
            .unwrap();
        binder
            .fire("c1-light-color-b", &ControlEvent::value("-20"))
            .unwrap();
        assert_eq!(binder.store().light(0).unwrap().color, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn text_fields_keep_raw_strings() {
        let binder = standard_binder();
        binder
            .fire("c2-shader-value", &ControlEvent::value("gouraud"))
            .unwrap();
        binder
            .fire("c2-model-value", &ControlEvent::value("bunny"))
            .unwrap();
        let model = binder.store().model(1).unwrap();
        assert_eq!(model.shader, "gouraud");
        assert_eq!(model.model, "bunny");
    }
}
